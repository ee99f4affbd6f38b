use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::xls::*;

pub type Workbook = Xlsx<BufReader<File>>;

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn open_instrument(path: &Path) -> XlsResult<Workbook> {
    debug!("open_instrument: path: {:?}", path);
    let workbook: Workbook = open_workbook(path).context(OpeningExcelSnafu {
        path: path.display().to_string(),
    })?;
    Ok(workbook)
}

/// Finds a worksheet by name. An exact match is preferred, then a case-insensitive one.
pub fn get_range(
    workbook: &mut Workbook,
    sheet: &str,
    path: &Path,
) -> XlsResult<Range<DataType>> {
    let names: Vec<String> = workbook.sheet_names().to_vec();
    let worksheet_name = names
        .iter()
        .find(|n| n.as_str() == sheet)
        .or_else(|| names.iter().find(|n| n.trim().eq_ignore_ascii_case(sheet)))
        .cloned()
        .context(MissingSheetSnafu {
            sheet,
            path: path.display().to_string(),
        })?;
    debug!("get_range: sheet: {:?} worksheet: {:?}", sheet, worksheet_name);
    let wrange = workbook
        .worksheet_range(&worksheet_name)
        .context(MissingSheetSnafu {
            sheet,
            path: path.display().to_string(),
        })?
        .context(OpeningExcelSnafu {
            path: path.display().to_string(),
        })?;
    Ok(wrange)
}

/// The text content of a cell.
///
/// Numbers without a fractional part are written as integers, so that a choice value
/// typed as `1` in the workbook reads as "1" and not "1.0".
pub fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => format!("{}", f),
        DataType::Int(i) => format!("{}", i),
        DataType::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        DataType::DateTime(f) => format!("{}", f),
        DataType::Error(e) => {
            warn!("cell_to_string: error cell {:?}", e);
            String::new()
        }
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

/// The text of a row at a given column. Missing columns and short rows read as empty.
pub fn cell_at(row: &[DataType], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(cell_to_string)
        .unwrap_or_default()
}

/// The column names of the header row of a sheet.
///
/// Names are compared after trimming and lowercasing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    pub fn new(header: &[DataType]) -> Header {
        let names: Vec<String> = header
            .iter()
            .map(|c| cell_to_string(c).trim().to_lowercase())
            .collect();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, name) in names.iter().enumerate() {
            if !name.is_empty() {
                // The first column wins for duplicated names.
                positions.entry(name.clone()).or_insert(idx);
            }
        }
        Header { names, positions }
    }

    /// The index of the first of the candidate names that is present.
    pub fn find(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| self.positions.get(&c.to_lowercase()).cloned())
    }

    /// The index of the first column whose name satisfies the predicate.
    pub fn find_by(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.names.iter().position(|n| pred(n.as_str()))
    }

    /// The indexes of all the columns whose name satisfies the predicate.
    pub fn positions_by(&self, pred: impl Fn(&str) -> bool) -> Vec<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, n)| pred(n.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Like `find`, but a missing column is an error.
    pub fn require(&self, sheet: &str, candidates: &[&str]) -> XlsResult<usize> {
        self.find(candidates).context(MissingColumnSnafu {
            sheet,
            column: candidates.first().cloned().unwrap_or_default(),
        })
    }
}

/// The header row of a sheet and the rows that follow it.
pub fn split_header<'a>(
    wrange: &'a Range<DataType>,
    sheet: &str,
) -> XlsResult<(Header, impl Iterator<Item = &'a [DataType]>)> {
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptySheetSnafu { sheet })?;
    debug!("split_header: sheet: {:?} header: {:?}", sheet, header);
    Ok((Header::new(header), iter))
}

#[cfg(test)]
pub(crate) fn make_range(rows: &[Vec<&str>]) -> Range<DataType> {
    let height = rows.len() as u32;
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
    let mut range = Range::new((0, 0), (height - 1, width - 1));
    for (r, row) in rows.iter().enumerate() {
        for (c, s) in row.iter().enumerate() {
            if !s.is_empty() {
                range.set_value((r as u32, c as u32), DataType::String(s.to_string()));
            }
        }
    }
    range
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&DataType::Float(1.0)), "1");
        assert_eq!(cell_to_string(&DataType::Float(-99.0)), "-99");
        assert_eq!(cell_to_string(&DataType::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&DataType::Int(7)), "7");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(cell_to_string(&DataType::String("a b".to_string())), "a b");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "TRUE");
    }

    #[test]
    fn header_lookup() {
        let header = Header::new(&[
            DataType::String(" Type ".to_string()),
            DataType::String("name".to_string()),
            DataType::Empty,
            DataType::String("label::English".to_string()),
            DataType::String("label::Français".to_string()),
            DataType::String("name".to_string()),
        ]);
        assert_eq!(header.find(&["type"]), Some(0));
        assert_eq!(header.find(&["name"]), Some(1));
        assert_eq!(header.find(&["labelStata", "label", "label::english"]), Some(3));
        assert_eq!(header.find(&["hint"]), None);
        assert_eq!(
            header.find_by(|n| n.starts_with("label::") && !n.contains("english")),
            Some(4)
        );
        assert!(header.require("survey", &["calculation"]).is_err());
    }

    #[test]
    fn short_rows() {
        let row = vec![DataType::String("a".to_string())];
        assert_eq!(cell_at(&row, Some(0)), "a");
        assert_eq!(cell_at(&row, Some(3)), "");
        assert_eq!(cell_at(&row, None), "");
    }

    #[test]
    fn file_names() {
        assert_eq!(
            simplify_file_name(Path::new("/data/forms/baseline.xlsx")),
            "baseline.xlsx"
        );
    }
}
