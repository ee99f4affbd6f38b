//! LaTeX rendering of a questionnaire.

use log::debug;

use crate::choices::ChoiceTable;
use crate::classify::is_preloaded;
use crate::config::*;
use crate::sanitize::tex_text;
use crate::Questionnaire;

/// Emitted once at the top of every document.
pub const PREAMBLE: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[T1]{fontenc}
\usepackage[utf8]{inputenc}
\usepackage{lmodern}
\usepackage[margin=2.5cm]{geometry}
\usepackage{enumitem}
\usepackage{xcolor}
\usepackage[hidelinks]{hyperref}

\definecolor{placeholdergray}{gray}{0.45}
\setlength{\parindent}{0pt}
\setcounter{secnumdepth}{2}

% #1: label, #2: variable name
\newenvironment{question}[2]
  {\par\medskip\noindent\textbf{#1}\hfill{\footnotesize\texttt{#2}}\par\smallskip
   \begin{list}{}{\setlength{\leftmargin}{1.5em}}\item[]}
  {\end{list}\par\medskip}
\newcommand{\placeholder}[1]{\textcolor{placeholdergray}{\textit{[#1]}}}
\newcommand{\instruction}[1]{\textit{#1}\par}
\newcommand{\relevance}[1]{\par{\footnotesize\textcolor{placeholdergray}{Asked if: \texttt{#1}}}}
\newcommand{\hint}[1]{\par{\small\textcolor{placeholdergray}{Hint: #1}}}
\newcommand{\repeatcount}[1]{{\small\textit{Repeated: #1}}\par\medskip}
";

pub const CLOSING: &str = "\\end{document}\n";

const SELECT_PLACEHOLDER: &str = "Select from answer options";

/// Raw types that hold computed or automatic values, never shown to the respondent.
const COMPUTED_TYPES: [&str; 5] = ["calculate", "today", "start", "end", "deviceid"];

/// True if the row appears as a question in the document.
pub fn is_rendered(row: &QuestionRow) -> bool {
    match row.question_type {
        QuestionType::GroupBoundary | QuestionType::Note => false,
        QuestionType::String if is_preloaded(&row.calculation) => false,
        _ => !COMPUTED_TYPES.contains(&row.raw_type.as_str()),
    }
}

/// Renders the complete document: preamble, title page, body and closing marker.
pub fn render_document(questionnaire: &Questionnaire, info: &DocumentInfo) -> String {
    let mut doc = String::from(PREAMBLE);
    doc.push('\n');
    doc.push_str(&render_front_matter(questionnaire, info));
    doc.push_str(&render_body(questionnaire, info.date_format));
    doc.push('\n');
    doc.push_str(CLOSING);
    doc
}

fn render_front_matter(questionnaire: &Questionnaire, info: &DocumentInfo) -> String {
    let name = tex_text(&info.survey_name);
    let num_questions = questionnaire.rendered_rows().count();
    let num_groups = questionnaire.scopes.groups.len() - 1;
    let num_repeats = questionnaire.scopes.repeats.len() - 1;
    format!(
        "\\title{{{name} Questionnaire}}\n\
         \\author{{Generated from the XLSForm instrument}}\n\
         \\date{{{date}}}\n\
         \n\
         \\begin{{document}}\n\
         \\maketitle\n\
         \n\
         \\begin{{abstract}}\n\
         This document presents the questions of the {name} survey instrument. \
         It contains {num_questions} {questions} organized in {num_groups} {groups} \
         and {num_repeats} repeat {repeats}.\n\
         \\end{{abstract}}\n\
         \n\
         \\tableofcontents\n\
         \\newpage\n",
        name = name,
        date = tex_text(&info.date),
        num_questions = num_questions,
        questions = plural(num_questions, "question", "questions"),
        num_groups = num_groups,
        groups = plural(num_groups, "group", "groups"),
        num_repeats = num_repeats,
        repeats = plural(num_repeats, "group", "groups"),
    )
}

fn plural<'a>(n: usize, singular: &'a str, several: &'a str) -> &'a str {
    if n == 1 {
        singular
    } else {
        several
    }
}

/// Renders the questions, with the section headings of the groups and repeat groups.
///
/// A scope transition flagged on a row that is not rendered (for example the `begin_group`
/// row itself) is carried over to the next rendered row.
pub fn render_body(questionnaire: &Questionnaire, date_format: DateFormat) -> String {
    let mut body = String::new();
    let mut pending_group = false;
    let mut pending_repeat = false;
    for row in questionnaire.rows.iter() {
        pending_group |= row.is_first_in_group;
        pending_repeat |= row.is_first_in_repeat;
        if !is_rendered(row) {
            continue;
        }
        if pending_repeat {
            body.push_str(&render_repeat_heading(questionnaire, row.repeat_group));
            pending_repeat = false;
        }
        if pending_group {
            body.push_str(&format!(
                "\\subsection{{{}}}\n\n",
                tex_text(questionnaire.scopes.group_label(row.group))
            ));
            pending_group = false;
        }
        body.push_str(&render_question(row, &questionnaire.choices, date_format));
    }
    body
}

fn render_repeat_heading(questionnaire: &Questionnaire, repeat_group: u32) -> String {
    if repeat_group == 0 {
        return format!("\\section{{{}}}\n\n", ROOT_LABEL);
    }
    match questionnaire.scopes.repeat(repeat_group) {
        Some(scope) => {
            let mut res = format!("\\section{{Repeat Group: {}}}\n\n", tex_text(&scope.label));
            if !scope.repeat_count.is_empty() {
                res.push_str(&format!(
                    "\\repeatcount{{{}}}\n\n",
                    tex_text(&scope.repeat_count)
                ));
            }
            res
        }
        None => format!("\\section{{Repeat Group {}}}\n\n", repeat_group),
    }
}

/// Renders the block of a single question.
pub fn render_question(row: &QuestionRow, choices: &ChoiceTable, date_format: DateFormat) -> String {
    debug!(
        "render_question: row {} {:?} {:?}",
        row.order, row.name, row.question_type
    );
    let mut res = format!("\\begin{{question}}{{{}}}{{{}}}\n", row.tex_label, row.tex_name);
    match row.question_type {
        QuestionType::String => res.push_str("\\placeholder{Enter text}\n"),
        QuestionType::Numeric => res.push_str("\\placeholder{Enter number}\n"),
        QuestionType::Date => res.push_str(&format!(
            "\\placeholder{{Select date ({})}}\n",
            date_format.placeholder()
        )),
        QuestionType::DateTime => res.push_str(&format!(
            "\\placeholder{{Select date and time ({} hh:mm)}}\n",
            date_format.placeholder()
        )),
        QuestionType::Gps => res.push_str("\\placeholder{Record GPS location}\n"),
        QuestionType::SelectOne | QuestionType::SelectMultiple => {
            res.push_str(&render_choices(row, choices))
        }
        QuestionType::GroupBoundary
        | QuestionType::Note
        | QuestionType::Geopoint
        | QuestionType::Other => {}
    }
    if !row.tex_relevant.is_empty() {
        res.push_str(&format!("\\relevance{{{}}}\n", row.tex_relevant));
    }
    if !row.tex_hint.is_empty() {
        res.push_str(&format!("\\hint{{{}}}\n", row.tex_hint));
    }
    res.push_str("\\end{question}\n\n");
    res
}

fn render_choices(row: &QuestionRow, choices: &ChoiceTable) -> String {
    let entries = row
        .type_argument
        .as_deref()
        .map(|list_name| choices.lookup(list_name))
        .unwrap_or(&[]);
    if entries.is_empty() {
        return format!("\\placeholder{{{}}}\n", SELECT_PLACEHOLDER);
    }
    let mut res = String::new();
    if row.question_type == QuestionType::SelectMultiple {
        res.push_str("\\instruction{Select all that apply}\n");
    }
    res.push_str("\\begin{enumerate}[label=\\alph*)]\n");
    for entry in entries {
        let label = if entry.label.is_empty() {
            &entry.value
        } else {
            &entry.label
        };
        res.push_str(&format!("\\item {}\n", tex_text(label)));
    }
    res.push_str("\\end{enumerate}\n");
    res
}
