//! Commit message format rules.

use crate::error::FormatError;

/// Maximum length of the summary line, in characters.
// TODO: read from a `summary_max_chars` config key.
pub const SUMMARY_MAX_CHARS: usize = 50;

/// Check that `message` is usable as a commit message.
///
/// The message must be non-empty and its first line must be non-blank and at
/// most [`SUMMARY_MAX_CHARS`] characters long. Length is counted in Unicode
/// scalar values, not bytes.
pub fn check_message(message: &str) -> Result<(), FormatError> {
    if message.is_empty() {
        return Err(FormatError::Empty);
    }

    let summary = message.lines().next().unwrap_or_default();
    if summary.trim().is_empty() {
        return Err(FormatError::EmptySummary);
    }

    let len = summary.chars().count();
    if len > SUMMARY_MAX_CHARS {
        return Err(FormatError::SummaryTooLong {
            len,
            limit: SUMMARY_MAX_CHARS,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid(message: &str) -> bool {
        check_message(message).is_ok()
    }

    #[test]
    fn test_short_summary_is_valid() {
        assert!(is_valid("Add config loader"));
        assert!(is_valid("Add config loader\n\nLoads TOML from the user dir."));
    }

    #[test]
    fn test_summary_at_limit_is_valid() {
        let summary = "a".repeat(SUMMARY_MAX_CHARS);
        assert!(is_valid(&summary));
    }

    #[test]
    fn test_summary_over_limit_is_rejected() {
        let summary = "a".repeat(SUMMARY_MAX_CHARS + 1);
        assert_eq!(
            check_message(&summary),
            Err(FormatError::SummaryTooLong {
                len: 51,
                limit: SUMMARY_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_long_body_does_not_matter() {
        let message = format!("Short summary\n\n{}", "b".repeat(500));
        assert!(is_valid(&message));
    }

    #[test]
    fn test_empty_message_is_rejected() {
        assert_eq!(check_message(""), Err(FormatError::Empty));
    }

    #[test]
    fn test_blank_first_line_is_rejected() {
        assert_eq!(check_message("\nBody only"), Err(FormatError::EmptySummary));
        assert_eq!(check_message("   \nBody"), Err(FormatError::EmptySummary));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 50 multi-byte characters, well over 50 bytes.
        let summary = "é".repeat(SUMMARY_MAX_CHARS);
        assert!(summary.len() > SUMMARY_MAX_CHARS);
        assert!(is_valid(&summary));
    }

    #[test]
    fn test_crlf_summary_is_measured_without_line_ending() {
        let summary = format!("{}\r\nbody", "a".repeat(SUMMARY_MAX_CHARS));
        assert!(is_valid(&summary));
    }
}
