//! Text cleaning for labels, names and LaTeX output.
//!
//! Two levels of cleaning are applied. The `clean_*` functions produce the strings stored
//! in the questionnaire rows. The `tex_*` functions produce the strings written in the
//! document, and are safe to apply more than once.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

// Commands produced by escape_latex for characters that have no `\c` form.
const EMITTED_COMMANDS: [&str; 6] = [
    "textbackslash{}",
    "textasciicircum{}",
    "textasciitilde{}",
    "textless{}",
    "textgreater{}",
    "textbar{}",
];

const ESCAPED_CHARS: &str = "{}$&#%_";

pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").to_string()
}

/// Collapses all the runs of whitespace (including line breaks) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Escapes the dollar signs that are not escaped yet.
pub fn escape_dollar(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if c == '$' && previous != Some('\\') {
            result.push('\\');
        }
        result.push(c);
        previous = Some(c);
    }
    result
}

/// Cleaning applied to question labels and hints.
pub fn clean_label(text: &str) -> String {
    let stripped = strip_html(text).replace('"', "");
    normalize_whitespace(&escape_dollar(&stripped))
}

/// Cleaning applied to the labels of the choice lists.
pub fn clean_choice_label(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| *c != '$' && *c != '"')
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    normalize_whitespace(&stripped)
}

/// Question names may not contain periods.
pub fn clean_name(text: &str) -> String {
    text.trim().replace('.', "")
}

/// Transliterates to ASCII. Characters without a known equivalent become `?`.
pub fn to_ascii(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut unknown = 0;
    for c in text.chars() {
        if c.is_ascii() {
            result.push(c);
            continue;
        }
        match ascii_equivalent(c) {
            Some(s) => result.push_str(s),
            None => {
                unknown += 1;
                result.push('?');
            }
        }
    }
    if unknown > 0 {
        warn!(
            "to_ascii: {} character(s) without an ASCII equivalent replaced by '?' in {:?}",
            unknown, text
        );
    }
    result
}

/// The ASCII form of a non-ASCII character, if there is one.
pub fn ascii_equivalent(c: char) -> Option<&'static str> {
    let replacement = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => "I",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' | 'Ÿ' => "Y",
        'š' | 'ś' | 'ş' => "s",
        'Š' | 'Ś' | 'Ş' => "S",
        'ž' | 'ź' | 'ż' => "z",
        'Ž' | 'Ź' | 'Ż' => "Z",
        'ł' => "l",
        'Ł' => "L",
        'ř' => "r",
        'Ř' => "R",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        '‘' | '’' | '‚' | '′' => "'",
        '“' => "``",
        '”' | '„' => "''",
        '–' => "--",
        '—' => "---",
        '…' => "...",
        '\u{a0}' | '\u{2009}' | '\u{202f}' => " ",
        _ => return None,
    };
    Some(replacement)
}

/// Escapes the characters that have a special meaning in LaTeX.
///
/// Sequences that are already escaped are kept as they are, so that
/// `escape_latex(escape_latex(s)) == escape_latex(s)`. As a consequence a literal
/// backslash followed by one of `{}$&#%_` (as in `C:\_data`) is read as an escape and
/// kept. Any other backslash becomes `\textbackslash{}`.
pub fn escape_latex(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let tail = &rest[c.len_utf8()..];
        if c == '\\' {
            if let Some(kept) = escaped_prefix(tail) {
                result.push('\\');
                result.push_str(kept);
                rest = &tail[kept.len()..];
                continue;
            }
        }
        match c {
            '\\' => result.push_str("\\textbackslash{}"),
            '{' => result.push_str("\\{"),
            '}' => result.push_str("\\}"),
            '$' => result.push_str("\\$"),
            '&' => result.push_str("\\&"),
            '#' => result.push_str("\\#"),
            '%' => result.push_str("\\%"),
            '_' => result.push_str("\\_"),
            '^' => result.push_str("\\textasciicircum{}"),
            '~' => result.push_str("\\textasciitilde{}"),
            '<' => result.push_str("\\textless{}"),
            '>' => result.push_str("\\textgreater{}"),
            '|' => result.push_str("\\textbar{}"),
            _ => result.push(c),
        }
        rest = tail;
    }
    result
}

fn escaped_prefix(tail: &str) -> Option<&str> {
    if let Some(next) = tail.chars().next() {
        if ESCAPED_CHARS.contains(next) {
            return Some(&tail[..next.len_utf8()]);
        }
    }
    EMITTED_COMMANDS
        .iter()
        .find(|cmd| tail.starts_with(*cmd))
        .map(|cmd| &tail[..cmd.len()])
}

/// The form of a string that goes in the document.
pub fn tex_text(text: &str) -> String {
    escape_latex(&to_ascii(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_and_quotes() {
        assert_eq!(
            clean_label("  <b>How old</b> is \"the\"\n child?  "),
            "How old is the child?"
        );
    }

    #[test]
    fn escapes_dollar_references_once() {
        let once = clean_label("Is ${name} present?");
        assert_eq!(once, "Is \\${name} present?");
        assert_eq!(clean_label(&once), once);
    }

    #[test]
    fn cleans_choice_labels() {
        assert_eq!(clean_choice_label("Yes, \"$always\"\r\nor often"), "Yes, always or often");
    }

    #[test]
    fn removes_periods_from_names() {
        assert_eq!(clean_name(" hh.size "), "hhsize");
    }

    #[test]
    fn plain_text_is_unchanged() {
        let s = "How many people live in this household?";
        assert_eq!(escape_latex(s), s);
        assert_eq!(tex_text(s), s);
    }

    #[test]
    fn escaping_is_idempotent() {
        let raw = "50% of A&B_c costs $5 {approx} ~ ^ \\ <x> | #1";
        let once = escape_latex(raw);
        assert_eq!(
            once,
            "50\\% of A\\&B\\_c costs \\$5 \\{approx\\} \\textasciitilde{} \\textasciicircum{} \\textbackslash{} \\textless{}x\\textgreater{} \\textbar{} \\#1"
        );
        assert_eq!(escape_latex(&once), once);
    }

    #[test]
    fn transliterates_to_ascii() {
        assert_eq!(to_ascii("Año de nacimiento – ¿señor?"), "Ano de nacimiento -- ?senor?");
        assert_eq!(to_ascii("Straße “x”"), "Strasse ``x''");
    }

    #[test]
    fn tex_text_of_escaped_label() {
        assert_eq!(tex_text(&clean_label("Cost in $")), "Cost in \\$");
    }

    #[test]
    fn non_latin_scripts() {
        assert_eq!(ascii_equivalent('é'), Some("e"));
        assert_eq!(ascii_equivalent('ж'), None);
        assert_eq!(ascii_equivalent('名'), None);
        assert_eq!(to_ascii("Имя: Ana"), "???: Ana");
    }

    #[test]
    fn backslash_before_special_character() {
        assert_eq!(escape_latex("C:\\data"), "C:\\textbackslash{}data");
        // Read as an escaped underscore.
        assert_eq!(escape_latex("C:\\_data"), "C:\\_data");
        assert_eq!(escape_latex("C:_data"), "C:\\_data");
    }
}
