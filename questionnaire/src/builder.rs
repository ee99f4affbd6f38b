use log::{debug, info, warn};

use crate::choices::ChoiceTable;
use crate::classify::{classify, is_discarded, normalize_type, type_argument};
pub use crate::config::*;
use crate::nesting::annotate;
use crate::sanitize::{clean_label, clean_name, tex_text};
use crate::Questionnaire;

/// A builder for assembling an instrument row by row.
///
/// ```
/// use questionnaire::builder::Builder;
/// use questionnaire::ClassifierRules;
/// # use questionnaire::InstrumentError;
///
/// let mut builder = Builder::new(&ClassifierRules::DEFAULT_RULES);
/// builder.add_question_simple("begin_group", "g1", "G1")?;
/// builder.add_question_simple("select_one gender", "gender", "Gender")?;
/// builder.add_question_simple("end_group", "g1", "")?;
/// builder.add_choice("gender", "1", "Male");
/// builder.add_choice("gender", "2", "Female");
///
/// let questionnaire = builder.build()?;
/// assert_eq!(questionnaire.rows.len(), 3);
/// # Ok::<(), InstrumentError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ClassifierRules,
    pub(crate) _questions: Vec<SurveyRecord>,
    pub(crate) _choices: Vec<ChoiceRecord>,
}

impl Builder {
    pub fn new(rules: &ClassifierRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _questions: Vec::new(),
            _choices: Vec::new(),
        }
    }

    /// Adds a row of the survey sheet. Rows must be added in sheet order.
    ///
    /// Every row must have a type.
    pub fn add_question(&mut self, record: SurveyRecord) -> Result<(), InstrumentError> {
        let order = (self._questions.len() + 1) as u32;
        if record.raw_type.trim().is_empty() {
            return Err(InstrumentError::MissingType {
                order,
                name: record.name.trim().to_string(),
            });
        }
        self._questions.push(record);
        Ok(())
    }

    pub fn add_question_simple(
        &mut self,
        raw_type: &str,
        name: &str,
        label: &str,
    ) -> Result<(), InstrumentError> {
        self.add_question(SurveyRecord {
            raw_type: raw_type.to_string(),
            name: name.to_string(),
            label_english: label.to_string(),
            ..Default::default()
        })
    }

    pub fn add_choice_record(&mut self, record: ChoiceRecord) {
        self._choices.push(record);
    }

    pub fn add_choice(&mut self, list_name: &str, value: &str, label: &str) {
        self.add_choice_record(ChoiceRecord {
            list_name: list_name.to_string(),
            value: value.to_string(),
            label: label.to_string(),
        })
    }

    /// Classifies the rows, drops the meta rows and reconstructs the nesting.
    pub fn build(self) -> Result<Questionnaire, InstrumentError> {
        info!(
            "build: {} survey rows, {} choice rows",
            self._questions.len(),
            self._choices.len()
        );
        let mut rows: Vec<QuestionRow> = Vec::new();
        for (idx, rec) in self._questions.iter().enumerate() {
            let row = prepare_row((idx + 1) as u32, rec, &self._rules);
            if is_discarded(row.question_type) {
                debug!(
                    "build: dropping row {} {:?} ({:?})",
                    row.order, row.raw_type, row.question_type
                );
                continue;
            }
            rows.push(row);
        }

        let scopes = annotate(&mut rows)?;
        let choices = ChoiceTable::build(&self._choices);

        for row in rows.iter().filter(|r| r.question_type.is_select()) {
            match row.type_argument.as_deref() {
                Some(list_name) if choices.contains(list_name) => {}
                x => warn!(
                    "build: question {:?} refers to unknown choice list {:?}",
                    row.name, x
                ),
            }
        }

        Ok(Questionnaire {
            rows,
            scopes,
            choices,
        })
    }
}

/// Sanitizes and classifies one row of the survey sheet.
pub fn prepare_row(order: u32, rec: &SurveyRecord, rules: &ClassifierRules) -> QuestionRow {
    let raw_type = normalize_type(&rec.raw_type);
    let name = clean_name(&rec.name);
    let calculation = rec.calculation.trim().to_string();
    let label_english = clean_label(&rec.label_english);
    let label_localized = match clean_label(&rec.label_localized) {
        s if s.is_empty() => label_english.clone(),
        s => s,
    };
    let hint = Some(clean_label(&rec.hint)).filter(|s| !s.is_empty());
    let question_type = classify(&raw_type, &calculation, &name, rules);
    let tex_name = tex_text(&name);
    let tex_label = if label_english.is_empty() {
        tex_name.clone()
    } else {
        tex_text(&label_english)
    };
    QuestionRow {
        order,
        type_argument: type_argument(&raw_type),
        raw_type,
        tex_label,
        tex_hint: hint.as_deref().map(tex_text).unwrap_or_default(),
        tex_relevant: tex_text(rec.relevant.trim()),
        tex_name,
        name,
        calculation,
        relevant: rec.relevant.trim().to_string(),
        repeat_count: rec.repeat_count.trim().to_string(),
        label_english,
        label_localized,
        hint,
        question_type,
        group: 0,
        repeat_group: 0,
        is_first_in_group: false,
        is_first_in_repeat: false,
    }
}

#[cfg(test)]
pub(crate) fn test_row(order: u32, raw_type: &str, label: &str) -> QuestionRow {
    prepare_row(
        order,
        &SurveyRecord {
            raw_type: raw_type.to_string(),
            name: format!("q{}", order),
            label_english: label.to_string(),
            ..Default::default()
        },
        &ClassifierRules::DEFAULT_RULES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepares_rows() {
        let row = prepare_row(
            4,
            &SurveyRecord {
                raw_type: "Select_One  yesno".to_string(),
                name: "hh.member".to_string(),
                label_english: "<i>Is</i> \"${name}\" a member?".to_string(),
                hint: "  ".to_string(),
                relevant: " ${age} > 15 ".to_string(),
                ..Default::default()
            },
            &ClassifierRules::DEFAULT_RULES,
        );
        assert_eq!(row.order, 4);
        assert_eq!(row.raw_type, "select_one yesno");
        assert_eq!(row.type_argument, Some("yesno".to_string()));
        assert_eq!(row.name, "hhmember");
        assert_eq!(row.question_type, QuestionType::SelectOne);
        assert_eq!(row.label_english, "Is \\${name} a member?");
        assert_eq!(row.label_localized, row.label_english);
        assert_eq!(row.hint, None);
        assert_eq!(row.tex_hint, "");
        assert_eq!(row.tex_label, "Is \\$\\{name\\} a member?");
        assert_eq!(row.tex_relevant, "\\$\\{age\\} \\textgreater{} 15");
    }

    #[test]
    fn localized_label() {
        let row = prepare_row(
            1,
            &SurveyRecord {
                raw_type: "begin group".to_string(),
                name: "g".to_string(),
                label_english: "Household".to_string(),
                label_localized: "Ménage".to_string(),
                ..Default::default()
            },
            &ClassifierRules::DEFAULT_RULES,
        );
        assert_eq!(row.raw_type, "begin_group");
        assert_eq!(row.question_type, QuestionType::GroupBoundary);
        assert_eq!(row.label_localized, "Ménage");
    }

    #[test]
    fn drops_meta_rows() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut builder = Builder::new(&ClassifierRules::DEFAULT_RULES);
        builder.add_question_simple("integer", "a", "A").unwrap();
        builder.add_question_simple("note", "n", "Read this").unwrap();
        builder.add_question_simple("text audit", "audit", "").unwrap();
        builder.add_question_simple("text", "b", "B").unwrap();
        let q = builder.build().unwrap();
        let orders: Vec<u32> = q.rows.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 4]);
    }

    #[test]
    fn structural_errors_are_reported() {
        let mut builder = Builder::new(&ClassifierRules::DEFAULT_RULES);
        builder.add_question_simple("integer", "a", "A").unwrap();
        builder.add_question_simple("end group", "g", "").unwrap();
        assert_eq!(
            builder.build().err(),
            Some(InstrumentError::UnbalancedGroup { order: 2 })
        );
    }

    #[test]
    fn rows_need_a_type() {
        let mut builder = Builder::new(&ClassifierRules::DEFAULT_RULES);
        builder.add_question_simple("integer", "a", "A").unwrap();
        assert_eq!(
            builder.add_question_simple("  ", "b", "B"),
            Err(InstrumentError::MissingType {
                order: 2,
                name: "b".to_string()
            })
        );
        builder.add_question_simple("text", "c", "C").unwrap();
        let q = builder.build().unwrap();
        let names: Vec<&str> = q.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn list_name_keeps_its_case() {
        let row = prepare_row(
            2,
            &SurveyRecord {
                raw_type: "Select_One HH_YesNo".to_string(),
                name: "member".to_string(),
                label_english: "Member?".to_string(),
                ..Default::default()
            },
            &ClassifierRules::DEFAULT_RULES,
        );
        assert_eq!(row.raw_type, "select_one HH_YesNo");
        assert_eq!(row.type_argument, Some("HH_YesNo".to_string()));
        assert_eq!(row.question_type, QuestionType::SelectOne);

        let mut builder = Builder::new(&ClassifierRules::DEFAULT_RULES);
        builder.add_question_simple("select_one YesNo", "consent", "Consent?").unwrap();
        builder.add_choice("YesNo", "1", "Yes");
        builder.add_choice("YesNo", "0", "No");
        let q = builder.build().unwrap();
        assert_eq!(q.choices.lookup("YesNo").len(), 2);
        assert!(q.choices.lookup("yesno").is_empty());
        assert_eq!(q.rows[0].type_argument.as_deref(), Some("YesNo"));
    }
}
