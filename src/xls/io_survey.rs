use calamine::{DataType, Range};

use questionnaire::SurveyRecord;

use crate::xls::io_common::{cell_at, split_header, Header};
use crate::xls::*;

pub const SURVEY_SHEET: &str = "survey";

/// Where to find each field of a survey row.
///
/// `type`, `name` and `calculation` are required to classify the rows. The other
/// columns are read when they are present.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyColumns {
    pub type_idx: usize,
    pub name_idx: usize,
    pub calculation_idx: usize,
    pub relevant_idx: Option<usize>,
    pub repeat_count_idx: Option<usize>,
    pub label_english_idx: Option<usize>,
    pub label_localized_idx: Option<usize>,
    pub hint_idx: Option<usize>,
    /// The optional columns that were not found.
    pub missing: Vec<String>,
}

pub fn resolve_survey_columns(header: &Header) -> XlsResult<SurveyColumns> {
    let type_idx = header.require(SURVEY_SHEET, &["type"])?;
    let name_idx = header.require(SURVEY_SHEET, &["name"])?;
    let calculation_idx = header.require(SURVEY_SHEET, &["calculation"])?;

    let label_english_idx = header
        .find(&["labelStata", "label", "label::english"])
        .or_else(|| header.find_by(|n| n.starts_with("label::") && n.contains("english")))
        .or_else(|| header.find_by(|n| n.starts_with("label::")));
    // The first other translation of the label.
    let label_localized_idx = header
        .positions_by(|n| n.starts_with("label::"))
        .into_iter()
        .find(|idx| Some(*idx) != label_english_idx);
    let hint_idx = header
        .find(&["hint", "hint::english"])
        .or_else(|| header.find_by(|n| n.starts_with("hint::") && n.contains("english")));

    let mut columns = SurveyColumns {
        type_idx,
        name_idx,
        calculation_idx,
        relevant_idx: header.find(&["relevant", "relevance"]),
        repeat_count_idx: header.find(&["repeat_count"]),
        label_english_idx,
        label_localized_idx,
        hint_idx,
        missing: vec![],
    };
    for (name, idx) in [
        ("relevant", columns.relevant_idx),
        ("repeat_count", columns.repeat_count_idx),
        ("label", columns.label_english_idx),
        ("hint", columns.hint_idx),
    ] {
        if idx.is_none() {
            warn!(
                "resolve_survey_columns: column {:?} not found in sheet {:?}, it will be read as empty",
                name, SURVEY_SHEET
            );
            columns.missing.push(name.to_string());
        }
    }
    Ok(columns)
}

/// Reads the rows of the survey sheet, in sheet order. Blank rows are skipped.
pub fn read_survey(wrange: &Range<DataType>) -> XlsResult<Vec<SurveyRecord>> {
    let (header, rows) = split_header(wrange, SURVEY_SHEET)?;
    let columns = resolve_survey_columns(&header)?;
    debug!("read_survey: columns: {:?}", columns);

    let mut res: Vec<SurveyRecord> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let rec = SurveyRecord {
            raw_type: cell_at(row, Some(columns.type_idx)),
            name: cell_at(row, Some(columns.name_idx)),
            calculation: cell_at(row, Some(columns.calculation_idx)),
            relevant: cell_at(row, columns.relevant_idx),
            repeat_count: cell_at(row, columns.repeat_count_idx),
            label_english: cell_at(row, columns.label_english_idx),
            label_localized: cell_at(row, columns.label_localized_idx),
            hint: cell_at(row, columns.hint_idx),
        };
        if rec.raw_type.trim().is_empty() && rec.name.trim().is_empty() {
            debug!("read_survey: skipping blank row {}", idx + 2);
            continue;
        }
        res.push(rec);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xls::io_common::make_range;

    #[test]
    fn reads_rows() {
        let wrange = make_range(&[
            vec!["type", "name", "label::English", "label::Swahili", "hint", "calculation", "relevant", "repeat_count"],
            vec!["begin_group", "g1", "Household", "Kaya", "", "", "", ""],
            vec!["integer", "age", "Age", "Umri", "In years", "", "${consent}=1", ""],
            vec!["", "", "", "", "", "", "", ""],
            vec!["end_group", "g1", "", "", "", "", "", ""],
        ]);
        let records = read_survey(&wrange).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].raw_type, "begin_group");
        assert_eq!(records[0].label_english, "Household");
        assert_eq!(records[0].label_localized, "Kaya");
        assert_eq!(records[1].hint, "In years");
        assert_eq!(records[1].relevant, "${consent}=1");
        assert_eq!(records[2].raw_type, "end_group");
    }

    #[test]
    fn optional_columns_may_be_missing() {
        let wrange = make_range(&[
            vec!["type", "name", "calculation", "labelStata"],
            vec!["text", "q1", "", "Name"],
        ]);
        let header = split_header(&wrange, SURVEY_SHEET).unwrap().0;
        let columns = resolve_survey_columns(&header).unwrap();
        assert_eq!(columns.label_english_idx, Some(3));
        assert_eq!(columns.label_localized_idx, None);
        assert_eq!(columns.missing, vec!["relevant", "repeat_count", "hint"]);

        let records = read_survey(&wrange).unwrap();
        assert_eq!(records[0].label_english, "Name");
        assert_eq!(records[0].label_localized, "");
        assert_eq!(records[0].hint, "");
    }

    #[test]
    fn required_columns() {
        let wrange = make_range(&[vec!["type", "label", "calculation"], vec!["text", "Name", ""]]);
        match read_survey(&wrange) {
            Err(XlsError::MissingColumn { sheet, column }) => {
                assert_eq!(sheet, "survey");
                assert_eq!(column, "name");
            }
            x => panic!("unexpected result {:?}", x),
        }
    }
}
