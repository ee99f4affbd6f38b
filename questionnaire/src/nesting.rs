use std::collections::BTreeMap;

use log::{debug, info};

use crate::config::{InstrumentError, QuestionRow, Scope, Scopes};

const ROOT: u32 = 0;

/// Reconstructs the groups and repeat groups from the begin/end markers.
///
/// The rows must be visited in their original order. Each row gets the id of the innermost
/// open group and repeat group. A `begin_*` row belongs to the scope it opens, and an
/// `end_*` row to the scope it closes.
#[derive(Debug, Clone)]
pub struct NestingTracker {
    group_stack: Vec<u32>,
    repeat_stack: Vec<u32>,
    next_group_id: u32,
    next_repeat_id: u32,
    groups: BTreeMap<u32, Scope>,
    repeats: BTreeMap<u32, Scope>,
}

impl Default for NestingTracker {
    fn default() -> Self {
        NestingTracker::new()
    }
}

impl NestingTracker {
    pub fn new() -> NestingTracker {
        NestingTracker {
            group_stack: vec![ROOT],
            repeat_stack: vec![ROOT],
            next_group_id: ROOT,
            next_repeat_id: ROOT,
            groups: BTreeMap::from([(ROOT, Scope::root())]),
            repeats: BTreeMap::from([(ROOT, Scope::root())]),
        }
    }

    /// Processes one row and returns its (group, repeat group) ids.
    pub fn visit(&mut self, row: &QuestionRow) -> Result<(u32, u32), InstrumentError> {
        match row.raw_type.as_str() {
            "begin_group" => {
                self.next_group_id += 1;
                self.group_stack.push(self.next_group_id);
                self.groups.insert(
                    self.next_group_id,
                    Scope {
                        label: row.label_localized.clone(),
                        repeat_count: String::new(),
                    },
                );
                debug!(
                    "visit: row {} opens group {} {:?}",
                    row.order, self.next_group_id, row.label_localized
                );
                Ok(self.current())
            }
            "end_group" => {
                let ids = self.current();
                if self.group_stack.len() <= 1 {
                    return Err(InstrumentError::UnbalancedGroup { order: row.order });
                }
                self.group_stack.pop();
                debug!("visit: row {} closes group {}", row.order, ids.0);
                Ok(ids)
            }
            "begin_repeat" => {
                self.next_repeat_id += 1;
                self.repeat_stack.push(self.next_repeat_id);
                self.repeats.insert(
                    self.next_repeat_id,
                    Scope {
                        label: row.label_localized.clone(),
                        repeat_count: row.repeat_count.clone(),
                    },
                );
                debug!(
                    "visit: row {} opens repeat group {} {:?}",
                    row.order, self.next_repeat_id, row.label_localized
                );
                Ok(self.current())
            }
            "end_repeat" => {
                let ids = self.current();
                if self.repeat_stack.len() <= 1 {
                    return Err(InstrumentError::UnbalancedRepeat { order: row.order });
                }
                self.repeat_stack.pop();
                debug!("visit: row {} closes repeat group {}", row.order, ids.1);
                Ok(ids)
            }
            _ => Ok(self.current()),
        }
    }

    /// The number of groups and repeat groups currently open, the root excluded.
    pub fn depth(&self) -> (usize, usize) {
        (self.group_stack.len() - 1, self.repeat_stack.len() - 1)
    }

    /// Checks that all the scopes have been closed and returns them.
    pub fn finish(self) -> Result<Scopes, InstrumentError> {
        if let Some(id) = self.group_stack.last().filter(|id| **id != ROOT) {
            return Err(InstrumentError::UnclosedGroup {
                label: self.groups.get(id).map(|s| s.label.clone()).unwrap_or_default(),
            });
        }
        if let Some(id) = self.repeat_stack.last().filter(|id| **id != ROOT) {
            return Err(InstrumentError::UnclosedRepeat {
                label: self.repeats.get(id).map(|s| s.label.clone()).unwrap_or_default(),
            });
        }
        Ok(Scopes {
            groups: self.groups,
            repeats: self.repeats,
        })
    }

    fn current(&self) -> (u32, u32) {
        (
            *self.group_stack.last().unwrap_or(&ROOT),
            *self.repeat_stack.last().unwrap_or(&ROOT),
        )
    }
}

/// Assigns the group and repeat group of every row, and flags the rows that start a new
/// scope compared to the row before them.
///
/// The rows are sorted by their original order first.
pub fn annotate(rows: &mut [QuestionRow]) -> Result<Scopes, InstrumentError> {
    rows.sort_by_key(|r| r.order);
    let mut tracker = NestingTracker::new();
    let mut previous: Option<(u32, u32)> = None;
    for row in rows.iter_mut() {
        let (group, repeat_group) = tracker.visit(row)?;
        row.group = group;
        row.repeat_group = repeat_group;
        row.is_first_in_group = previous.map(|p| p.0 != group).unwrap_or(true);
        row.is_first_in_repeat = previous.map(|p| p.1 != repeat_group).unwrap_or(true);
        previous = Some((group, repeat_group));
    }
    let scopes = tracker.finish()?;
    info!(
        "annotate: {} rows, {} groups, {} repeat groups",
        rows.len(),
        scopes.groups.len() - 1,
        scopes.repeats.len() - 1
    );
    Ok(scopes)
}
