// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use regex::Regex;

/// Label given to the implicit root group and root repeat group.
pub const ROOT_LABEL: &str = "Survey-level";

/// One row of the `survey` sheet, as read from the workbook.
///
/// Columns that are missing in the workbook are left empty. No sanitization has
/// been applied yet: this is the raw content of the cells.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SurveyRecord {
    pub raw_type: String,
    pub name: String,
    pub calculation: String,
    pub relevant: String,
    pub repeat_count: String,
    pub label_english: String,
    pub label_localized: String,
    pub hint: String,
}

/// One row of the `choices` sheet, as read from the workbook.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ChoiceRecord {
    pub list_name: String,
    pub value: String,
    pub label: String,
}

/// The type of a question, as inferred from the `type` column.
///
/// The discriminants are the codes used in the questionnaire metadata.
/// Negative codes are structural or meta rows that are never rendered as questions.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QuestionType {
    String = 1,
    SelectOne = 2,
    SelectMultiple = 3,
    Numeric = 4,
    Date = 5,
    DateTime = 6,
    Gps = 7,
    GroupBoundary = -111,
    Note = -222,
    /// Assigned to `text audit` rows.
    Geopoint = -333,
    Other = -555,
}

impl QuestionType {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_select(&self) -> bool {
        matches!(self, QuestionType::SelectOne | QuestionType::SelectMultiple)
    }
}

/// Name-based overrides for the classifier.
///
/// A question whose (sanitized) name matches `string_force` is classified as a string,
/// and one that matches `numeric_force` as numeric. The numeric override always wins.
#[derive(Debug, Clone, Default)]
pub struct ClassifierRules {
    pub string_force: Option<Regex>,
    pub numeric_force: Option<Regex>,
}

impl ClassifierRules {
    pub const DEFAULT_RULES: ClassifierRules = ClassifierRules {
        string_force: None,
        numeric_force: None,
    };

    pub fn from_patterns(
        string_force: Option<&str>,
        numeric_force: Option<&str>,
    ) -> Result<ClassifierRules, InstrumentError> {
        Ok(ClassifierRules {
            string_force: string_force.map(compile_pattern).transpose()?,
            numeric_force: numeric_force.map(compile_pattern).transpose()?,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, InstrumentError> {
    Regex::new(pattern).map_err(|_| InstrumentError::InvalidPattern {
        pattern: pattern.to_string(),
    })
}

/// The date layout used in the title page and in date placeholders.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DateFormat {
    DayMonthYear,
    MonthDayYear,
}

impl DateFormat {
    pub fn from_american(american: bool) -> DateFormat {
        if american {
            DateFormat::MonthDayYear
        } else {
            DateFormat::DayMonthYear
        }
    }

    /// The pattern shown to the enumerator.
    pub fn placeholder(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "DD/MM/YYYY",
            DateFormat::MonthDayYear => "MM/DD/YYYY",
        }
    }

    /// The equivalent strftime pattern.
    pub fn strftime(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
        }
    }
}

/// Title page information for the rendered document.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DocumentInfo {
    pub survey_name: String,
    /// Already formatted according to `date_format`.
    pub date: String,
    pub date_format: DateFormat,
}

// ******** Output data structures *********

/// One instrument row, after sanitization, classification and nesting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionRow {
    /// 1-based position in the survey sheet.
    pub order: u32,
    pub raw_type: String,
    pub type_argument: Option<String>,
    pub name: String,
    pub calculation: String,
    pub relevant: String,
    pub repeat_count: String,
    pub label_english: String,
    pub label_localized: String,
    pub hint: Option<String>,
    pub question_type: QuestionType,
    pub group: u32,
    pub repeat_group: u32,
    pub is_first_in_group: bool,
    pub is_first_in_repeat: bool,
    pub tex_label: String,
    pub tex_hint: String,
    pub tex_name: String,
    pub tex_relevant: String,
}

/// One entry of a choice list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceEntry {
    pub list_name: String,
    pub value: String,
    pub label: String,
    /// Position within its list, starting at 1.
    pub order: u32,
}

impl ChoiceEntry {
    /// The value with minus signs replaced, suitable to build value-label names.
    pub fn value_name(&self) -> String {
        self.value.replace('-', "_")
    }
}

/// A group or a repeat group, as opened by a `begin_group` or `begin_repeat` row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Scope {
    pub label: String,
    /// Only meaningful for repeat groups.
    pub repeat_count: String,
}

impl Scope {
    pub fn root() -> Scope {
        Scope {
            label: ROOT_LABEL.to_string(),
            repeat_count: String::new(),
        }
    }
}

/// All the groups and repeat groups found while walking the instrument, by id.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Scopes {
    pub groups: BTreeMap<u32, Scope>,
    pub repeats: BTreeMap<u32, Scope>,
}

impl Scopes {
    pub fn group_label(&self, id: u32) -> &str {
        self.groups
            .get(&id)
            .map(|s| s.label.as_str())
            .unwrap_or(ROOT_LABEL)
    }

    pub fn repeat(&self, id: u32) -> Option<&Scope> {
        self.repeats.get(&id)
    }
}

/// Errors that prevent the instrument from being reconstructed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum InstrumentError {
    /// An `end_group` row without a matching `begin_group`.
    UnbalancedGroup { order: u32 },
    /// An `end_repeat` row without a matching `begin_repeat`.
    UnbalancedRepeat { order: u32 },
    /// A row with a name but an empty `type` cell.
    MissingType { order: u32, name: String },
    UnclosedGroup { label: String },
    UnclosedRepeat { label: String },
    InvalidPattern { pattern: String },
}

impl Error for InstrumentError {}

impl Display for InstrumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentError::UnbalancedGroup { order } => {
                write!(f, "end_group on row {} closes no open group", order)
            }
            InstrumentError::UnbalancedRepeat { order } => {
                write!(f, "end_repeat on row {} closes no open repeat group", order)
            }
            InstrumentError::MissingType { order, name } => {
                write!(f, "row {} ({:?}) has no type", order, name)
            }
            InstrumentError::UnclosedGroup { label } => {
                write!(f, "group {:?} is never closed", label)
            }
            InstrumentError::UnclosedRepeat { label } => {
                write!(f, "repeat group {:?} is never closed", label)
            }
            InstrumentError::InvalidPattern { pattern } => {
                write!(f, "invalid name pattern {:?}", pattern)
            }
        }
    }
}
