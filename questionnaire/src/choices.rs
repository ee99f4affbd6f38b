use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::config::{ChoiceEntry, ChoiceRecord};
use crate::sanitize::clean_choice_label;

lazy_static! {
    // Only numeric codes are supported for the values of the choices.
    static ref CHOICE_VALUE: Regex = Regex::new(r"^[0-9-]+$").unwrap();
}

/// All the choice lists of an instrument, by list name.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ChoiceTable {
    lists: HashMap<String, Vec<ChoiceEntry>>,
}

impl ChoiceTable {
    /// Builds the table from the rows of the `choices` sheet, in sheet order.
    ///
    /// Rows without a list name or a value, and rows with a non-numeric value, are skipped.
    pub fn build(records: &[ChoiceRecord]) -> ChoiceTable {
        let mut lists: HashMap<String, Vec<ChoiceEntry>> = HashMap::new();
        for (idx, rec) in records.iter().enumerate() {
            let list_name = rec.list_name.trim().to_string();
            let value = rec.value.trim().to_string();
            if list_name.is_empty() || value.is_empty() {
                debug!("ChoiceTable::build: skipping incomplete row {}: {:?}", idx + 1, rec);
                continue;
            }
            if !CHOICE_VALUE.is_match(&value) {
                debug!(
                    "ChoiceTable::build: skipping row {} with non-numeric value {:?}",
                    idx + 1,
                    value
                );
                continue;
            }
            let entries = lists.entry(list_name.clone()).or_default();
            let order = (entries.len() + 1) as u32;
            entries.push(ChoiceEntry {
                list_name,
                value,
                label: clean_choice_label(&rec.label),
                order,
            });
        }
        ChoiceTable { lists }
    }

    /// The entries of a list, in their original order. Empty if the list is unknown.
    pub fn lookup(&self, list_name: &str) -> &[ChoiceEntry] {
        self.lists
            .get(list_name.trim())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn labels(&self, list_name: &str) -> Vec<String> {
        self.lookup(list_name)
            .iter()
            .map(|e| e.label.clone())
            .collect()
    }

    pub fn contains(&self, list_name: &str) -> bool {
        self.lists.contains_key(list_name.trim())
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
