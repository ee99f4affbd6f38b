mod config;

pub mod builder;
pub mod choices;
pub mod classify;
pub mod manual;
pub mod nesting;
pub mod render;
pub mod sanitize;

pub use crate::choices::ChoiceTable;
pub use crate::config::*;
pub use crate::render::{is_rendered, render_document};

/// A survey instrument, ready to be rendered.
///
/// The rows are sorted by their original order and annotated with their groups.
/// Rows that carry no question at all (notes, text audits) are already removed, but
/// structural and computed rows are kept: use `rendered_rows` for the questions that
/// appear in the document.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    pub rows: Vec<QuestionRow>,
    pub scopes: Scopes,
    pub choices: ChoiceTable,
}

impl Questionnaire {
    pub fn rendered_rows(&self) -> impl Iterator<Item = &QuestionRow> {
        self.rows.iter().filter(|r| is_rendered(r))
    }

    pub fn question_count(&self) -> usize {
        self.rendered_rows().count()
    }
}
