//! CSV record parsing: one logical row → one [`Quote`].
//!
//! Rows look like `"Quote text", Speaker`. The quote field may be wrapped in
//! double quotes to carry commas, line breaks and `""`-escaped quotes; the
//! speaker is optional.
//!
//! ```text
//! "Hello, world", Alice     → Quote { text: "Hello, world", speaker: Some("Alice") }
//! "Just a quote"            → Quote { text: "Just a quote", speaker: None }
//! Be brief, be bold, Bob    → Quote { text: "Be brief, be bold", speaker: Some("Bob") }
//! , Bob                     → MalformedRecord
//! ```
//!
//! Unquoted rows split on their *last* comma, so a bare quote may contain commas
//! as long as a speaker column follows.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// One parsed input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Quote text, trimmed and never empty.
    pub text: String,
    /// Attribution, absent when omitted, empty, or `NULL`.
    pub speaker: Option<String>,
}

impl Quote {
    /// Build a quote from raw field values, applying the same rules as CSV input.
    pub fn new(text: &str, speaker: Option<&str>) -> Result<Self, RecordError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RecordError::Malformed("quote field is empty".into()));
        }
        Ok(Self {
            text: text.to_string(),
            speaker: speaker.and_then(normalize_speaker),
        })
    }

    /// Text as drawn: wrapped in double quotes when attributed, unless it already is.
    pub fn display_text(&self) -> String {
        if self.speaker.is_some() && !self.text.starts_with('"') {
            format!("\"{}\"", self.text)
        } else {
            self.text.clone()
        }
    }
}

fn normalize_speaker(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse one logical row into a [`Quote`].
pub fn parse_record(row: &str) -> Result<Quote, RecordError> {
    let fields = split_fields(row);
    match fields.as_slice() {
        [] => Err(RecordError::Malformed("empty record".into())),
        [quote] => Quote::new(&quote.value, None),
        [quote, speaker] => Quote::new(&quote.value, Some(&speaker.value)),
        [first, .., last] if !first.quoted => {
            let text = fields[..fields.len() - 1]
                .iter()
                .map(|f| f.value.as_str())
                .collect::<Vec<_>>()
                .join(",");
            Quote::new(&text, Some(&last.value))
        }
        [quote, rest @ ..] => {
            let speaker = rest
                .iter()
                .map(|f| f.value.as_str())
                .collect::<Vec<_>>()
                .join(",");
            Quote::new(&quote.value, Some(&speaker))
        }
    }
}

#[derive(Debug, PartialEq)]
struct Field {
    value: String,
    quoted: bool,
}

/// Split a row into fields with standard CSV quoting.
///
/// Unquoted fields keep their inner whitespace (trimmed later); text after the
/// closing quote of a quoted field and before the next comma is dropped with a
/// warning. An unterminated quoted field runs to the end of the row.
fn split_fields(row: &str) -> Vec<Field> {
    if row.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut chars = row.chars().peekable();

    loop {
        let mut value = String::new();
        while let Some(c) = chars.next_if(|c| *c == ' ' || *c == '\t') {
            value.push(c);
        }

        let quoted = chars.next_if_eq(&'"').is_some();
        if quoted {
            value.clear();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.next_if_eq(&'"').is_some() {
                        value.push('"');
                    } else {
                        break;
                    }
                } else {
                    value.push(c);
                }
            }
            let mut trailing = String::new();
            while let Some(c) = chars.next_if(|c| *c != ',') {
                trailing.push(c);
            }
            if !trailing.trim().is_empty() {
                log::warn!(
                    "dropping text after closing quote: {:?} (in {:?})",
                    trailing.trim(),
                    value
                );
            }
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                value.push(c);
            }
        }

        fields.push(Field { value, quoted });

        if chars.next().is_none() {
            break;
        }
    }

    fields
}

/// Iterator over the logical rows of CSV content.
///
/// Line breaks inside quoted fields do not end a row. Blank rows are skipped.
/// Yields the 1-based line number where each row starts.
pub struct RecordReader<'a> {
    rest: &'a str,
    line: usize,
}

/// Split CSV content into logical rows.
pub fn records(content: &str) -> RecordReader<'_> {
    RecordReader {
        rest: content,
        line: 1,
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }

            let (end, next_start) = row_bounds(self.rest);

            let row = self.rest[..end].trim_end_matches('\r');
            let start_line = self.line;
            self.line += self.rest[..next_start].matches('\n').count();
            self.rest = &self.rest[next_start..];

            if !row.trim().is_empty() {
                return Some((start_line, row));
            }
        }
    }
}

/// Byte offsets `(end, next_start)` of the first logical row in `s`.
///
/// A `"` opens a quoted field only at the start of a field, optionally after
/// spaces or tabs. Inside a quoted field `""` is an escaped quote and line
/// breaks belong to the field. Anywhere else `"` is a literal character.
fn row_bounds(s: &str) -> (usize, usize) {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_quotes {
            if c == '"' && chars.next_if(|&(_, c)| c == '"').is_none() {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '\n' => return (i, i + 1),
            ',' => at_field_start = true,
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ' ' | '\t' => {}
            _ => at_field_start = false,
        }
    }

    (s.len(), s.len())
}

/// A row's parse outcome together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub line: usize,
    pub result: Result<Quote, RecordError>,
}

/// Parse all rows of CSV content, skipping the first row when `has_header`.
pub fn parse_csv(content: &str, has_header: bool) -> Vec<ParsedRow> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    records(content)
        .skip(usize::from(has_header))
        .map(|(line, row)| ParsedRow {
            line,
            result: parse_record(row),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(text: &str, speaker: Option<&str>) -> Quote {
        Quote {
            text: text.to_string(),
            speaker: speaker.map(str::to_string),
        }
    }

    // =========================================================================
    // parse_record
    // =========================================================================

    #[test]
    fn quoted_text_with_comma_and_speaker() {
        assert_eq!(
            parse_record(r#""Hello, world", Alice"#).unwrap(),
            quote("Hello, world", Some("Alice"))
        );
    }

    #[test]
    fn quoted_text_without_speaker() {
        assert_eq!(
            parse_record(r#""Just a quote""#).unwrap(),
            quote("Just a quote", None)
        );
    }

    #[test]
    fn trailing_comma_means_no_speaker() {
        assert_eq!(
            parse_record(r#""Just a quote","#).unwrap(),
            quote("Just a quote", None)
        );
    }

    #[test]
    fn empty_row_is_malformed() {
        assert!(matches!(parse_record(""), Err(RecordError::Malformed(_))));
        assert!(matches!(parse_record("   "), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn empty_quote_field_is_malformed() {
        assert!(matches!(
            parse_record(r#""", Alice"#),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            parse_record(",Alice"),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            parse_record(r#""   ", Alice"#),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn escaped_quotes_inside_quoted_field() {
        assert_eq!(
            parse_record(r#""She said ""no"".", Bob"#).unwrap(),
            quote(r#"She said "no"."#, Some("Bob"))
        );
    }

    #[test]
    fn embedded_line_break_kept() {
        assert_eq!(
            parse_record("\"Line one\nLine two\", Carol").unwrap(),
            quote("Line one\nLine two", Some("Carol"))
        );
    }

    #[test]
    fn unquoted_row_splits_on_last_comma() {
        assert_eq!(
            parse_record("Be brief, be bold, Bob").unwrap(),
            quote("Be brief, be bold", Some("Bob"))
        );
    }

    #[test]
    fn unquoted_row_without_comma_is_bare_quote() {
        assert_eq!(
            parse_record("Stay hungry").unwrap(),
            quote("Stay hungry", None)
        );
    }

    #[test]
    fn null_speaker_is_absent() {
        assert_eq!(
            parse_record(r#""Anonymous wisdom", NULL"#).unwrap(),
            quote("Anonymous wisdom", None)
        );
        assert_eq!(
            parse_record(r#""Anonymous wisdom", null"#).unwrap().speaker,
            None
        );
    }

    #[test]
    fn quoted_speaker_unwrapped() {
        assert_eq!(
            parse_record(r#""Text","Smith, J.""#).unwrap(),
            quote("Text", Some("Smith, J."))
        );
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(
            parse_record(r#""Never closed, Dave"#).unwrap(),
            quote("Never closed, Dave", None)
        );
    }

    #[test]
    fn text_after_closing_quote_is_dropped() {
        assert_eq!(
            parse_record(r#""Hello" world, Bob"#).unwrap(),
            quote("Hello", Some("Bob"))
        );
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(
            parse_record("  \"  padded  \"  ,   Eve  ").unwrap(),
            quote("padded", Some("Eve"))
        );
    }

    // =========================================================================
    // Quote helpers
    // =========================================================================

    #[test]
    fn display_text_wraps_attributed_quotes() {
        assert_eq!(
            quote("Hello", Some("Alice")).display_text(),
            "\"Hello\""
        );
        assert_eq!(quote("Hello", None).display_text(), "Hello");
        assert_eq!(
            quote("\"Already\"", Some("Alice")).display_text(),
            "\"Already\""
        );
    }

    #[test]
    fn quote_new_rejects_blank_text() {
        assert!(Quote::new("  \n ", Some("Alice")).is_err());
    }

    // =========================================================================
    // records / parse_csv
    // =========================================================================

    #[test]
    fn records_join_quoted_line_breaks() {
        let content = "quote,speaker\n\"First\nsecond\", Ann\n\"Next\", Ben\n";
        let rows: Vec<_> = records(content).collect();
        assert_eq!(
            rows,
            vec![
                (1, "quote,speaker"),
                (2, "\"First\nsecond\", Ann"),
                (4, "\"Next\", Ben"),
            ]
        );
    }

    #[test]
    fn records_skip_blank_lines_and_strip_cr() {
        let content = "a\r\n\r\n\nb\r\n";
        let rows: Vec<_> = records(content).collect();
        assert_eq!(rows, vec![(1, "a"), (4, "b")]);
    }

    #[test]
    fn records_without_trailing_newline() {
        let rows: Vec<_> = records("only").collect();
        assert_eq!(rows, vec![(1, "only")]);
    }

    #[test]
    fn parse_csv_skips_header() {
        let content = "quote,speaker\n\"Hello, world\", Alice\n";
        let rows = parse_csv(content, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(
            rows[0].result,
            Ok(quote("Hello, world", Some("Alice")))
        );
    }

    #[test]
    fn parse_csv_without_header_keeps_first_row() {
        let rows = parse_csv("\"Hello\", Alice\n", false);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].result.is_ok());
    }

    #[test]
    fn parse_csv_reports_malformed_rows_in_place() {
        let content = "quote,speaker\n\"Good one\", Ann\n\"\", Ben\n";
        let rows = parse_csv(content, true);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].result.is_ok());
        assert_eq!(rows[1].line, 3);
        assert!(matches!(rows[1].result, Err(RecordError::Malformed(_))));
    }

    #[test]
    fn stray_quote_in_unquoted_field_does_not_swallow_rows() {
        let content = "quote,speaker\nA 5\" screen is enough, Bob\n\"Next one\", Ann\n\"Third\", Cy\n";
        let rows = parse_csv(content, true);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].result,
            Ok(quote("A 5\" screen is enough", Some("Bob")))
        );
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].result, Ok(quote("Next one", Some("Ann"))));
        assert_eq!(rows[2].result, Ok(quote("Third", Some("Cy"))));
    }

    #[test]
    fn records_treat_doubled_quotes_as_escapes() {
        let content = "\"Say \"\"hi\"\"\nthere\", Ann\nnext, Ben\n";
        let rows: Vec<_> = records(content).collect();
        assert_eq!(
            rows,
            vec![(1, "\"Say \"\"hi\"\"\nthere\", Ann"), (3, "next, Ben")]
        );
    }

    #[test]
    fn records_open_quotes_after_comma_and_spaces() {
        let content = "Ann,  \"two\nlines\"\nBen, one\n";
        let rows: Vec<_> = records(content).collect();
        assert_eq!(rows, vec![(1, "Ann,  \"two\nlines\""), (3, "Ben, one")]);
    }

    #[test]
    fn parse_csv_strips_bom() {
        let rows = parse_csv("\u{feff}\"Hi\", Zoe\n", false);
        assert_eq!(rows[0].result, Ok(quote("Hi", Some("Zoe"))));
    }
}
