//! Bulk-upload parsing for membership lists.
//!
//! Three equivalent input forms are accepted: a newline-delimited plain
//! list, a JSON object with an `ids` array, and a CSV with an `its_id`
//! header column. All three normalize to the same sorted ID set. Invalid
//! entries are rejected individually with the remainder still applied;
//! only a malformed container (bad JSON, missing CSV header) fails the
//! upload as a whole.

use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;

use its_model::ItsId;

/// CSV column carrying the registry ID.
const CSV_ID_HEADER: &str = "its_id";

/// Errors for uploads that cannot be parsed at all.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The upload container itself is malformed.
    #[error("malformed upload: {0}")]
    Malformed(String),

    /// The CSV header row lacks the required column.
    #[error("missing required CSV column: {0}")]
    MissingColumn(&'static str),
}

/// Supported upload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// One ID per line; blank lines and `#` comments are skipped.
    Plain,
    /// `{"ids": ["12345678", ...]}`.
    Json,
    /// Two-column CSV with an `its_id` header.
    Csv,
}

impl UploadFormat {
    /// Guesses the format from a file name, defaulting to plain text.
    #[must_use]
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".csv") {
            Self::Csv
        } else {
            Self::Plain
        }
    }
}

/// One rejected upload entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// 1-based position in the upload (line or array index).
    pub position: usize,
    /// The raw value as submitted.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Outcome of parsing one upload: the accepted set plus per-entry
/// rejects. Duplicates collapse silently (set semantics).
#[derive(Debug, Default, Clone)]
pub struct UploadReport {
    /// Valid, deduplicated IDs.
    pub accepted: BTreeSet<ItsId>,
    /// Entries skipped with their reasons.
    pub rejected: Vec<RejectedEntry>,
}

impl UploadReport {
    fn take(&mut self, position: usize, raw: &str) {
        match ItsId::new(raw) {
            Ok(id) => {
                self.accepted.insert(id);
            }
            Err(err) => self.rejected.push(RejectedEntry {
                position,
                value: raw.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Total entries considered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// Parses an upload in the given format.
///
/// ## Errors
///
/// Returns [`RosterError`] only when the container is malformed;
/// individually invalid IDs land in [`UploadReport::rejected`].
pub fn parse(input: &str, format: UploadFormat) -> Result<UploadReport, RosterError> {
    match format {
        UploadFormat::Plain => Ok(parse_plain(input)),
        UploadFormat::Json => parse_json(input),
        UploadFormat::Csv => parse_csv(input),
    }
}

fn parse_plain(input: &str) -> UploadReport {
    let mut report = UploadReport::default();
    for (line_no, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        report.take(line_no + 1, trimmed);
    }
    report
}

#[derive(Debug, Deserialize)]
struct JsonUpload {
    ids: Vec<String>,
}

fn parse_json(input: &str) -> Result<UploadReport, RosterError> {
    let doc: JsonUpload =
        serde_json::from_str(input).map_err(|e| RosterError::Malformed(e.to_string()))?;

    let mut report = UploadReport::default();
    for (index, raw) in doc.ids.iter().enumerate() {
        report.take(index + 1, raw.trim());
    }
    Ok(report)
}

fn parse_csv(input: &str) -> Result<UploadReport, RosterError> {
    let mut lines = input.lines();
    let header = lines
        .next()
        .ok_or_else(|| RosterError::Malformed("empty CSV upload".to_string()))?;

    let id_column = header
        .split(',')
        .position(|col| col.trim().trim_matches('"').eq_ignore_ascii_case(CSV_ID_HEADER))
        .ok_or(RosterError::MissingColumn(CSV_ID_HEADER))?;

    let mut report = UploadReport::default();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cell = line
            .split(',')
            .nth(id_column)
            .unwrap_or("")
            .trim()
            .trim_matches('"');
        // Header is line 1, so data rows start at 2.
        report.take(line_no + 2, cell);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ItsId {
        ItsId::new(raw).unwrap()
    }

    #[test]
    fn plain_skips_blanks_and_comments() {
        let report = parse("11111111\n\n# staff\n22222222\n", UploadFormat::Plain).unwrap();
        assert_eq!(
            report.accepted.iter().cloned().collect::<Vec<_>>(),
            vec![id("11111111"), id("22222222")]
        );
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn invalid_entries_reject_individually() {
        let report = parse("11111111\nbogus\n222\n22222222\n", UploadFormat::Plain).unwrap();
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].position, 2);
        assert_eq!(report.rejected[0].value, "bogus");
        assert_eq!(report.rejected[1].value, "222");
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn duplicates_collapse_silently() {
        let report = parse("11111111\n11111111\n", UploadFormat::Plain).unwrap();
        assert_eq!(report.accepted.len(), 1);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn json_form_normalizes_to_the_same_set() {
        let report = parse(
            r#"{"ids": ["11111111", " 22222222 ", "nope"]}"#,
            UploadFormat::Json,
        )
        .unwrap();
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].value, "nope");
    }

    #[test]
    fn malformed_json_is_a_hard_error() {
        assert!(matches!(
            parse("{not json", UploadFormat::Json),
            Err(RosterError::Malformed(_))
        ));
        assert!(matches!(
            parse(r#"{"members": []}"#, UploadFormat::Json),
            Err(RosterError::Malformed(_))
        ));
    }

    #[test]
    fn csv_form_uses_the_its_id_column() {
        let input = "name,its_id\nAisha,11111111\nBilal,\"22222222\"\nCarim,bad\n";
        let report = parse(input, UploadFormat::Csv).unwrap();
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].position, 4);
    }

    #[test]
    fn csv_without_the_header_is_rejected() {
        assert!(matches!(
            parse("name,id\nAisha,11111111\n", UploadFormat::Csv),
            Err(RosterError::MissingColumn(_))
        ));
    }

    #[test]
    fn all_three_forms_agree() {
        let plain = parse("11111111\n22222222\n", UploadFormat::Plain).unwrap();
        let json = parse(r#"{"ids":["11111111","22222222"]}"#, UploadFormat::Json).unwrap();
        let csv = parse("its_id,name\n11111111,A\n22222222,B\n", UploadFormat::Csv).unwrap();

        assert_eq!(plain.accepted, json.accepted);
        assert_eq!(json.accepted, csv.accepted);
    }

    #[test]
    fn format_detection_by_extension() {
        assert_eq!(UploadFormat::detect("learners.json"), UploadFormat::Json);
        assert_eq!(UploadFormat::detect("LEARNERS.CSV"), UploadFormat::Csv);
        assert_eq!(UploadFormat::detect("learners.txt"), UploadFormat::Plain);
    }
}
