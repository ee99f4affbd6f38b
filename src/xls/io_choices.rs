use calamine::{DataType, Range};

use questionnaire::ChoiceRecord;

use crate::xls::io_common::{cell_at, split_header};
use crate::xls::*;

pub const CHOICES_SHEET: &str = "choices";

/// Reads the rows of the choices sheet, in sheet order.
///
/// The rows are not validated here: incomplete rows and non-numeric values are
/// filtered out when the choice table is built.
pub fn read_choices(wrange: &Range<DataType>) -> XlsResult<Vec<ChoiceRecord>> {
    let (header, rows) = split_header(wrange, CHOICES_SHEET)?;
    let list_name_idx = header.require(CHOICES_SHEET, &["list_name", "listname"])?;
    let value_idx = header.require(CHOICES_SHEET, &["name", "value"])?;
    let label_idx = header
        .find(&["label", "label::english"])
        .or_else(|| header.find_by(|n| n.starts_with("label::")))
        .context(MissingColumnSnafu {
            sheet: CHOICES_SHEET,
            column: "label",
        })?;
    debug!(
        "read_choices: list_name: {} value: {} label: {}",
        list_name_idx, value_idx, label_idx
    );

    let res: Vec<ChoiceRecord> = rows
        .map(|row| ChoiceRecord {
            list_name: cell_at(row, Some(list_name_idx)),
            value: cell_at(row, Some(value_idx)),
            label: cell_at(row, Some(label_idx)),
        })
        .collect();
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xls::io_common::make_range;

    #[test]
    fn reads_rows() {
        let wrange = make_range(&[
            vec!["listname", "name", "label::English", "label::French"],
            vec!["yesno", "1", "Yes", "Oui"],
            vec!["yesno", "0", "No", "Non"],
        ]);
        let records = read_choices(&wrange).unwrap();
        assert_eq!(
            records,
            vec![
                ChoiceRecord {
                    list_name: "yesno".to_string(),
                    value: "1".to_string(),
                    label: "Yes".to_string(),
                },
                ChoiceRecord {
                    list_name: "yesno".to_string(),
                    value: "0".to_string(),
                    label: "No".to_string(),
                },
            ]
        );
    }

    #[test]
    fn numeric_cells() {
        let mut wrange = make_range(&[vec!["list_name", "name", "label"], vec!["yesno", "", "Yes"]]);
        wrange.set_value((1, 1), DataType::Float(1.0));
        let records = read_choices(&wrange).unwrap();
        assert_eq!(records[0].value, "1");
    }

    #[test]
    fn missing_list_name() {
        let wrange = make_range(&[vec!["name", "label"], vec!["1", "Yes"]]);
        match read_choices(&wrange) {
            Err(XlsError::MissingColumn { sheet, column }) => {
                assert_eq!(sheet, "choices");
                assert_eq!(column, "list_name");
            }
            x => panic!("unexpected result {:?}", x),
        }
    }
}
