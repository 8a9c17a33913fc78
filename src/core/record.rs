//! The on-disk annotation record format.
//!
//! Records are line-oriented and fixed-arity: three `TAG value` lines per
//! record, appended back-to-back with no separator. A writer never has to
//! read a log to append to it validly, and a record cut off by a truncated
//! write is detected simply by running out of lines mid-record.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::core::error::AntError;
use crate::core::location::FileLocation;

const TAG_TEXT: &str = "ANNOTATION";
// The anchor line keeps the HASH tag written by earlier releases so old and
// new logs stay mutually readable.
const TAG_ANCHOR: &str = "HASH";
const TAG_ROW: &str = "ROW";

/// One annotation: user text, the location it targets, and the literal
/// content of the annotated source line at creation time.
///
/// The anchor is captured once, when the annotation is added, and never
/// recomputed. When the source line later drifts away from it a reader can
/// see the note has gone stale. Logs written before the anchor line existed
/// deserialize with an empty anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    text: String,
    anchor: String,
    location: FileLocation,
}

impl Annotation {
    /// Build a record from already-captured parts.
    ///
    /// Text and anchor must be single lines; the format has no escaping
    /// layer, so a record always occupies a fixed number of physical lines.
    pub fn new(text: &str, anchor: &str, location: FileLocation) -> Result<Self, AntError> {
        if text.contains(['\n', '\r']) {
            return Err(AntError::InvalidAnnotation(text.to_string()));
        }
        if anchor.contains(['\n', '\r']) {
            return Err(AntError::InvalidAnnotation(anchor.to_string()));
        }
        Ok(Self {
            text: text.to_string(),
            anchor: anchor.to_string(),
            location,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn location(&self) -> &FileLocation {
        &self.location
    }

    pub fn row(&self) -> u32 {
        self.location.row()
    }

    /// Write the record in the current three-line shape.
    pub fn serialize(&self, out: &mut impl Write) -> Result<(), AntError> {
        writeln!(out, "{TAG_TEXT} {}", self.text).map_err(AntError::IoError)?;
        writeln!(out, "{TAG_ANCHOR} {}", self.anchor).map_err(AntError::IoError)?;
        writeln!(out, "{TAG_ROW} {}", self.location.row()).map_err(AntError::IoError)?;
        Ok(())
    }

    /// Read the next record from a log, or `None` at clean end of stream.
    ///
    /// Accepts the current three-line shape and the legacy two-line shape
    /// with no anchor line. A record truncated mid-write is discarded (end
    /// of stream inside a record is not an error); a line that is present
    /// but carries the wrong tag for its position is corruption.
    pub fn deserialize(input: &mut impl BufRead, path: &Path) -> Result<Option<Self>, AntError> {
        let Some(text_line) = read_line(input)? else {
            return Ok(None);
        };
        let text = tag_value(&text_line, TAG_TEXT)?;

        let Some(second_line) = read_line(input)? else {
            return Ok(None);
        };

        let (anchor, row_line) = if second_line.starts_with(TAG_ROW) {
            // Legacy two-line record: the row follows the text directly.
            (String::new(), second_line)
        } else {
            let anchor = tag_value(&second_line, TAG_ANCHOR)?;
            let Some(third_line) = read_line(input)? else {
                return Ok(None);
            };
            (anchor, third_line)
        };

        let row: u32 = tag_value(&row_line, TAG_ROW)?
            .parse()
            .map_err(|_| AntError::CorruptRecord(row_line))?;

        Ok(Some(Self {
            text,
            anchor,
            location: FileLocation::new(path, row),
        }))
    }
}

/// Split `TAG value` and return the value, or `CorruptRecord` when the line
/// does not start with the expected tag token and a space.
fn tag_value(line: &str, tag: &str) -> Result<String, AntError> {
    line.strip_prefix(tag)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::to_string)
        .ok_or_else(|| AntError::CorruptRecord(line.to_string()))
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>, AntError> {
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(AntError::IoError)?;
    if read == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn record(text: &str, anchor: &str, row: u32) -> Annotation {
        Annotation::new(text, anchor, FileLocation::new("file.txt", row)).unwrap()
    }

    fn parse_all(log: &str) -> Result<Vec<Annotation>, AntError> {
        let mut input = Cursor::new(log);
        let path = PathBuf::from("file.txt");
        let mut records = Vec::new();
        while let Some(record) = Annotation::deserialize(&mut input, &path)? {
            records.push(record);
        }
        Ok(records)
    }

    #[test]
    fn serialize_emits_three_tagged_lines() {
        let mut out = Vec::new();
        record("check this", "let x = 1;", 2).serialize(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ANNOTATION check this\nHASH let x = 1;\nROW 2\n"
        );
    }

    #[test]
    fn serialize_deserialize_round_trip() {
        let original = record("note", "source line", 14);
        let mut out = Vec::new();
        original.serialize(&mut out).unwrap();
        let parsed = parse_all(std::str::from_utf8(&out).unwrap()).unwrap();
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn empty_anchor_round_trips() {
        let original = record("note", "", 3);
        let mut out = Vec::new();
        original.serialize(&mut out).unwrap();
        let parsed = parse_all(std::str::from_utf8(&out).unwrap()).unwrap();
        assert_eq!(parsed[0].anchor(), "");
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn reads_back_to_back_records() {
        let log = "ANNOTATION first\nHASH a\nROW 1\nANNOTATION second\nHASH b\nROW 9\n";
        let parsed = parse_all(log).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text(), "first");
        assert_eq!(parsed[1].row(), 9);
    }

    #[test]
    fn reads_legacy_two_line_records() {
        let log = "ANNOTATION old note\nROW 5\n";
        let parsed = parse_all(log).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text(), "old note");
        assert_eq!(parsed[0].anchor(), "");
        assert_eq!(parsed[0].row(), 5);
    }

    #[test]
    fn reads_mixed_legacy_and_current_records() {
        let log = "ANNOTATION old\nROW 1\nANNOTATION new\nHASH line two\nROW 2\n";
        let parsed = parse_all(log).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].anchor(), "");
        assert_eq!(parsed[1].anchor(), "line two");
    }

    #[test]
    fn dangling_partial_record_is_discarded() {
        // Truncated after the text line: not an error, just end of records.
        let parsed = parse_all("ANNOTATION full\nHASH a\nROW 1\nANNOTATION cut off\n").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text(), "full");
    }

    #[test]
    fn partial_record_missing_row_line_is_discarded() {
        let parsed = parse_all("ANNOTATION cut\nHASH anchor\n").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn wrong_leading_tag_is_corruption() {
        let err = parse_all("NOTE hello\nROW 1\n").unwrap_err();
        assert!(matches!(err, AntError::CorruptRecord(_)));
    }

    #[test]
    fn wrong_row_tag_is_corruption() {
        let err = parse_all("ANNOTATION hello\nHASH a\nLINE 1\n").unwrap_err();
        assert!(matches!(err, AntError::CorruptRecord(_)));
    }

    #[test]
    fn non_numeric_row_is_corruption() {
        let err = parse_all("ANNOTATION hello\nHASH a\nROW x\n").unwrap_err();
        assert!(matches!(err, AntError::CorruptRecord(_)));
    }

    #[test]
    fn row_zero_is_accepted_from_storage() {
        let parsed = parse_all("ANNOTATION whole file note\nHASH \nROW 0\n").unwrap();
        assert_eq!(parsed[0].row(), 0);
    }

    #[test]
    fn rejects_newlines_in_text() {
        let err = Annotation::new("two\nlines", "", FileLocation::new("f", 1)).unwrap_err();
        assert!(matches!(err, AntError::InvalidAnnotation(_)));
    }

    #[test]
    fn rejects_newlines_in_anchor() {
        let err = Annotation::new("ok", "bad\ranchor", FileLocation::new("f", 1)).unwrap_err();
        assert!(matches!(err, AntError::InvalidAnnotation(_)));
    }
}
