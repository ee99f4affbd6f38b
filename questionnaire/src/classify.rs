use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::config::{ClassifierRules, QuestionType};

lazy_static! {
    static ref PULLDATA: Regex = Regex::new(r"^\s*pulldata").unwrap();
    // Calculations starting with one of these functions produce numbers.
    static ref NUMERIC_FORMULA: Regex = Regex::new(
        r"^\s*(index|area|number|round|count|count-if|sum|sum-if|min|min-if|max|max-if|distance-between|int|abs|duration)\("
    )
    .unwrap();
}

/// Normalizes the content of the `type` column.
///
/// Tokens are separated by single spaces and the type keyword is lowercased. The
/// arguments (the list name in `select_one YesNo`) are kept verbatim, since list names are
/// case-sensitive. The two-word forms of the structural types (`Begin Group`) become
/// `begin_group`.
pub fn normalize_type(raw_type: &str) -> String {
    let tokens: Vec<&str> = raw_type.split_whitespace().collect();
    let keyword = match tokens.first() {
        Some(t) => t.to_lowercase(),
        None => return String::new(),
    };
    let second = tokens.get(1).map(|t| t.to_lowercase());
    match (keyword.as_str(), second.as_deref(), tokens.len()) {
        ("begin" | "end", Some(scope @ ("group" | "repeat")), 2) => {
            format!("{}_{}", keyword, scope)
        }
        ("text", Some("audit"), 2) => "text audit".to_string(),
        _ => std::iter::once(keyword.as_str())
            .chain(tokens[1..].iter().cloned())
            .collect::<Vec<&str>>()
            .join(" "),
    }
}

/// The second token of the type, for example the list name in `select_one yesno`.
pub fn type_argument(raw_type: &str) -> Option<String> {
    raw_type.split_whitespace().nth(1).map(|s| s.to_string())
}

pub fn is_preloaded(calculation: &str) -> bool {
    PULLDATA.is_match(calculation)
}

/// Assigns a question type to a row.
///
/// The rules are evaluated in order. The first four only apply while the type is still
/// undecided (except for the name overrides), the structural ones always take precedence.
pub fn classify(
    raw_type: &str,
    calculation: &str,
    name: &str,
    rules: &ClassifierRules,
) -> QuestionType {
    let first_token = raw_type.split_whitespace().next().unwrap_or("");
    let mut res: Option<QuestionType> = None;

    let string_forced = rules
        .string_force
        .as_ref()
        .map(|r| r.is_match(name))
        .unwrap_or(false);
    if matches!(raw_type, "text" | "deviceid" | "image")
        || is_preloaded(calculation)
        || (raw_type == "calculate" && !NUMERIC_FORMULA.is_match(calculation))
        || string_forced
    {
        res = Some(QuestionType::String);
    }
    if res.is_none() && first_token == "select_one" {
        res = Some(QuestionType::SelectOne);
    }
    if res.is_none() && first_token == "select_multiple" {
        res = Some(QuestionType::SelectMultiple);
    }
    let numeric_forced = rules
        .numeric_force
        .as_ref()
        .map(|r| r.is_match(name))
        .unwrap_or(false);
    if (res.is_none() && !matches!(raw_type, "date" | "text")) || numeric_forced {
        res = Some(QuestionType::Numeric);
    }

    match raw_type {
        "date" | "today" => res = Some(QuestionType::Date),
        "start" | "end" | "submissiondate" => res = Some(QuestionType::DateTime),
        "geopoint" | "geotrace" => res = Some(QuestionType::Gps),
        "begin_group" | "end_group" | "begin_repeat" | "end_repeat" => {
            res = Some(QuestionType::GroupBoundary)
        }
        "note" => res = Some(QuestionType::Note),
        "text audit" => res = Some(QuestionType::Geopoint),
        _ => {}
    }

    let qt = res.unwrap_or(QuestionType::Other);
    debug!(
        "classify: type: {:?} name: {:?} calculation: {:?} -> {:?}",
        raw_type, name, calculation, qt
    );
    qt
}

/// Rows with these codes carry no question and are removed before the nesting walk.
pub fn is_discarded(question_type: QuestionType) -> bool {
    question_type.code() < QuestionType::GroupBoundary.code()
}
