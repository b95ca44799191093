//! Docstring text handling
//!
//! Turns the source text of a Python string literal into its value and
//! normalizes the indentation of the result the way Python help tools do.

use thiserror::Error;

const TAB_SIZE: usize = 8;

/// Prefixes Python 3 accepts on a string literal, lower-cased
const VALID_PREFIXES: [&str; 9] = ["", "r", "u", "b", "br", "rb", "f", "fr", "rf"];

/// A string literal the Python 3 compiler rejects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("invalid string prefix '{0}'")]
    InvalidPrefix(String),

    #[error("unknown Unicode character name '{0}'")]
    UnknownName(String),

    #[error("malformed \\N character escape")]
    MalformedName,
}

/// Pieces of a string literal's source text
struct Literal<'a> {
    raw: bool,
    bytes: bool,
    formatted: bool,
    body: &'a str,
}

/// Split a literal into prefix flags and body, `Ok(None)` when the quoting
/// is not well formed
fn split_literal(literal: &str) -> Result<Option<Literal<'_>>, LiteralError> {
    let Some(quote_start) = literal.find(|c: char| c == '\'' || c == '"') else {
        return Ok(None);
    };
    let prefix = literal[..quote_start].to_ascii_lowercase();
    if !VALID_PREFIXES.contains(&prefix.as_str()) {
        return Err(LiteralError::InvalidPrefix(literal[..quote_start].to_string()));
    }

    let quoted = &literal[quote_start..];
    let delimiter = if quoted.starts_with("\"\"\"") {
        "\"\"\""
    } else if quoted.starts_with("'''") {
        "'''"
    } else {
        &quoted[..1]
    };

    if quoted.len() < delimiter.len() * 2 || !quoted.ends_with(delimiter) {
        return Ok(None);
    }

    Ok(Some(Literal {
        raw: prefix.contains('r'),
        bytes: prefix.contains('b'),
        formatted: prefix.contains('f'),
        body: &quoted[delimiter.len()..quoted.len() - delimiter.len()],
    }))
}

/// Decode a single Python string literal.
///
/// Returns `None` for literals that do not evaluate to plain text (bytes
/// and f-strings) or that are not well formed.
pub fn decode_string_literal(literal: &str) -> Option<String> {
    let literal = split_literal(literal).ok()??;
    if literal.bytes || literal.formatted {
        return None;
    }
    if literal.raw {
        Some(literal.body.to_string())
    } else {
        unescape(literal.body).ok()
    }
}

/// Check a literal against what the Python 3 compiler accepts: a known
/// prefix, and `\N{...}` escapes naming real characters
pub fn check_literal(literal: &str) -> Result<(), LiteralError> {
    match split_literal(literal)? {
        Some(literal) if !literal.raw && !literal.bytes => unescape(literal.body).map(|_| ()),
        _ => Ok(()),
    }
}

/// Resolve backslash escapes of a non-raw literal body
fn unescape(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };

        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                match char::from_u32(value) {
                    Some(decoded) => out.push(decoded),
                    None => out.push(char::REPLACEMENT_CHARACTER),
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let well_formed =
                    digits.len() == width && digits.chars().all(|d| d.is_ascii_hexdigit());
                let decoded = if well_formed {
                    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            'N' => out.push(named_character(&mut chars)?),
            // Unknown escapes are kept as written
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

/// Resolve the `{NAME}` that follows a `\N` escape
fn named_character(chars: &mut impl Iterator<Item = char>) -> Result<char, LiteralError> {
    if chars.next() != Some('{') {
        return Err(LiteralError::MalformedName);
    }

    let mut name = String::new();
    while let Some(c) = chars.next() {
        if c == '}' {
            if name.is_empty() {
                return Err(LiteralError::MalformedName);
            }
            return unicode_names2::character(&name).ok_or(LiteralError::UnknownName(name));
        }
        name.push(c);
    }

    Err(LiteralError::MalformedName)
}

/// Expand tabs to the next multiple of `TAB_SIZE`, column resets on line breaks
fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;

    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = TAB_SIZE - (column % TAB_SIZE);
                out.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }

    out
}

/// Normalize docstring indentation.
///
/// The first line is left-stripped, the common indentation of the
/// remaining non-blank lines is removed, and empty lines at both ends are
/// dropped.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = expand_tabs(raw);
    let mut lines: Vec<String> = expanded.split('\n').map(str::to_string).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            if content.is_empty() {
                None
            } else {
                Some(line.chars().count() - content.chars().count())
            }
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines.drain(..leading);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_quote_styles() {
        assert_eq!(decode_string_literal("'single'").as_deref(), Some("single"));
        assert_eq!(decode_string_literal("\"double\"").as_deref(), Some("double"));
        assert_eq!(
            decode_string_literal("'''tri\nple'''").as_deref(),
            Some("tri\nple")
        );
        assert_eq!(
            decode_string_literal("\"\"\"say 'hi'\"\"\"").as_deref(),
            Some("say 'hi'")
        );
        assert_eq!(decode_string_literal("''").as_deref(), Some(""));
    }

    #[test]
    fn test_decode_prefixes() {
        assert_eq!(decode_string_literal("u'text'").as_deref(), Some("text"));
        assert_eq!(decode_string_literal(r"R'a\nb'").as_deref(), Some(r"a\nb"));
        assert_eq!(decode_string_literal("b'bytes'"), None);
        assert_eq!(decode_string_literal("f'{x}'"), None);
        assert_eq!(decode_string_literal("rb'raw bytes'"), None);
        assert_eq!(decode_string_literal("ur'mixed'"), None);
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(
            decode_string_literal(r"'tab\there\nline'").as_deref(),
            Some("tab\there\nline")
        );
        assert_eq!(decode_string_literal(r"'\x41\101é'").as_deref(), Some("AAé"));
        assert_eq!(decode_string_literal(r"'keep \d'").as_deref(), Some(r"keep \d"));
        assert_eq!(decode_string_literal("'joined \\\nline'").as_deref(), Some("joined line"));
        assert_eq!(decode_string_literal(r"'bad \xZZ'").as_deref(), Some(r"bad \xZZ"));
    }

    #[test]
    fn test_decode_named_escapes() {
        assert_eq!(
            decode_string_literal(r"'''caf\N{LATIN SMALL LETTER E WITH ACUTE}'''").as_deref(),
            Some("café")
        );
        assert_eq!(decode_string_literal(r"'\N{EM DASH}'").as_deref(), Some("\u{2014}"));
        assert_eq!(
            decode_string_literal(r"r'\N{EM DASH}'").as_deref(),
            Some(r"\N{EM DASH}")
        );
        assert_eq!(decode_string_literal(r"'\\N{x}'").as_deref(), Some(r"\N{x}"));
        assert_eq!(decode_string_literal(r"'\N{NOT A REAL NAME}'"), None);
    }

    #[test]
    fn test_check_literal() {
        assert_eq!(check_literal("'plain'"), Ok(()));
        assert_eq!(check_literal(r"Rb'\N{bogus}'"), Ok(()));
        assert_eq!(check_literal(r"b'\N{bogus}'"), Ok(()));
        assert_eq!(check_literal(r"r'\N{bogus}'"), Ok(()));
        assert_eq!(check_literal(r"f'{x}\N{EM DASH}'"), Ok(()));
        assert_eq!(
            check_literal("ur'''x'''"),
            Err(LiteralError::InvalidPrefix("ur".to_string()))
        );
        assert_eq!(
            check_literal(r"'\N{NO SUCH CHARACTER}'"),
            Err(LiteralError::UnknownName("NO SUCH CHARACTER".to_string()))
        );
        assert_eq!(check_literal(r"'\N'"), Err(LiteralError::MalformedName));
        assert_eq!(check_literal(r"'\N{}'"), Err(LiteralError::MalformedName));
    }

    #[test]
    fn test_clean_docstring_removes_margin() {
        let raw = "\n    Summary line.\n\n        Indented detail.\n    Back.\n    ";
        assert_eq!(
            clean_docstring(raw),
            "Summary line.\n\n    Indented detail.\nBack."
        );
    }

    #[test]
    fn test_clean_docstring_first_line_content() {
        let raw = "First line.\n    Second line.\n";
        assert_eq!(clean_docstring(raw), "First line.\nSecond line.");
    }

    #[test]
    fn test_clean_docstring_expands_tabs() {
        let raw = "Title\n\tbody\n\t    deeper";
        assert_eq!(clean_docstring(raw), "Title\nbody\n    deeper");
    }

    #[test]
    fn test_clean_docstring_whitespace_only() {
        assert_eq!(clean_docstring("\n\n"), "");
        assert_eq!(clean_docstring("one line"), "one line");
    }
}
