//! Bulk import parsing
//! Turns pasted or uploaded text into keys awaiting confirmation

use crate::core::models::{mask, ImportCandidate, ImportPreview, SkipReason, SkippedLine};

const MIN_KEY_LEN: usize = 5;
const DEFAULT_WEIGHT: i64 = 1;
const DEFAULT_RATE_LIMIT: i64 = 60;

/// Rows shown before the "N more" line
pub const PREVIEW_ROWS: usize = 10;

/// Parse import text, one key per line.
///
/// Accepted forms are a bare key, or `name,key[,weight[,rate_limit]]`.
/// Lines that cannot yield a key are left out of the candidates and listed
/// in `skipped`.
pub fn parse_import(text: &str, enabled: bool) -> ImportPreview {
    let mut preview = ImportPreview::default();

    // Generated names count non-blank lines; skip reports use the line in the file
    let lines = text
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    for (index, (physical, line)) in lines.enumerate() {
        match parse_line(line, index + 1, enabled) {
            Ok(candidate) => preview.candidates.push(candidate),
            Err(reason) => {
                let line_no = physical + 1;
                tracing::debug!("Skipping import line {}: {}", line_no, reason);
                preview.skipped.push(SkippedLine {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        "Import preview: {} keys, {} lines skipped",
        preview.candidates.len(),
        preview.skipped.len()
    );
    preview
}

fn parse_line(line: &str, line_no: usize, enabled: bool) -> Result<ImportCandidate, SkipReason> {
    if !line.contains(',') {
        let key = line.trim();
        if key.chars().count() < MIN_KEY_LEN {
            return Err(SkipReason::KeyTooShort);
        }
        return Ok(ImportCandidate {
            name: format!("Key_{}", key.chars().take(MIN_KEY_LEN).collect::<String>()),
            key: key.to_string(),
            weight: DEFAULT_WEIGHT,
            rate_limit: DEFAULT_RATE_LIMIT,
            enabled,
        });
    }

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(SkipReason::TooFewFields);
    }

    let name = if parts[0].is_empty() {
        format!("Key_Untitled_{}", line_no)
    } else {
        parts[0].to_string()
    };
    let key = parts[1];
    if key.chars().count() < MIN_KEY_LEN {
        return Err(SkipReason::KeyTooShort);
    }

    Ok(ImportCandidate {
        name,
        key: key.to_string(),
        weight: parse_field(parts.get(2).copied(), DEFAULT_WEIGHT),
        rate_limit: parse_field(parts.get(3).copied(), DEFAULT_RATE_LIMIT),
        enabled,
    })
}

/// Leading integer of a field; missing, unparsable or zero falls back
fn parse_field(field: Option<&str>, fallback: i64) -> i64 {
    field
        .and_then(leading_int)
        .filter(|v| *v != 0)
        .unwrap_or(fallback)
}

/// `"12abc"` -> 12, `"-3"` -> -3, `"x1"` -> None
fn leading_int(field: &str) -> Option<i64> {
    let field = field.trim_start();
    let (sign, digits) = match field.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, field.strip_prefix('+').unwrap_or(field)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

impl ImportPreview {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates shown in the preview table
    pub fn visible(&self) -> &[ImportCandidate] {
        let end = self.candidates.len().min(PREVIEW_ROWS);
        &self.candidates[..end]
    }

    /// Candidates beyond the preview table
    pub fn hidden_count(&self) -> usize {
        self.candidates.len().saturating_sub(PREVIEW_ROWS)
    }

    pub fn summary(&self) -> String {
        if self.skipped.is_empty() {
            format!("{} keys ready to import", self.candidates.len())
        } else {
            format!(
                "{} keys ready to import, {} lines skipped",
                self.candidates.len(),
                self.skipped.len()
            )
        }
    }
}

/// First 5 and last 4 characters of a key
pub fn mask_key(key: &str) -> String {
    mask(key, 5, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_keys_get_generated_names() {
        let preview = parse_import("sk-abcdef123456\n\n   \nsk-zyxwvu987654\n", true);
        assert!(preview.skipped.is_empty());
        assert_eq!(preview.candidates.len(), 2);

        let first = &preview.candidates[0];
        assert_eq!(first.name, "Key_sk-ab");
        assert_eq!(first.key, "sk-abcdef123456");
        assert_eq!(first.weight, 1);
        assert_eq!(first.rate_limit, 60);
        assert!(first.enabled);
    }

    #[test]
    fn test_comma_separated_fields() {
        let preview = parse_import("primary, sk-111111 , 3, 120\n,sk-222222\nthird,sk-333333,abc", false);
        assert_eq!(preview.candidates.len(), 3);

        assert_eq!(preview.candidates[0].name, "primary");
        assert_eq!(preview.candidates[0].key, "sk-111111");
        assert_eq!(preview.candidates[0].weight, 3);
        assert_eq!(preview.candidates[0].rate_limit, 120);
        assert!(!preview.candidates[0].enabled);

        assert_eq!(preview.candidates[1].name, "Key_Untitled_2");
        assert_eq!(preview.candidates[2].weight, 1);
    }

    #[test]
    fn test_zero_and_prefixed_numbers() {
        let preview = parse_import("a,sk-123456,0,0\nb,sk-654321,7x,30rpm", true);
        assert_eq!(preview.candidates[0].weight, 1);
        assert_eq!(preview.candidates[0].rate_limit, 60);
        assert_eq!(preview.candidates[1].weight, 7);
        assert_eq!(preview.candidates[1].rate_limit, 30);
    }

    #[test]
    fn test_short_keys_are_reported() {
        let preview = parse_import("abc\nname,abcd\ngood,sk-999999\nname,", true);
        assert_eq!(preview.candidates.len(), 1);
        assert_eq!(
            preview.skipped,
            vec![
                SkippedLine { line: 1, reason: SkipReason::KeyTooShort },
                SkippedLine { line: 2, reason: SkipReason::KeyTooShort },
                SkippedLine { line: 4, reason: SkipReason::KeyTooShort },
            ]
        );
        assert_eq!(preview.summary(), "1 keys ready to import, 3 lines skipped");
    }

    #[test]
    fn test_skipped_lines_keep_file_position() {
        let preview = parse_import("sk-abcdef\n\n\nabc\n,sk-123456", true);
        assert_eq!(
            preview.skipped,
            vec![SkippedLine { line: 4, reason: SkipReason::KeyTooShort }]
        );
        assert_eq!(preview.candidates[1].name, "Key_Untitled_3");
    }

    #[test]
    fn test_crlf_input() {
        let preview = parse_import("sk-abcdef\r\nname,sk-ghijkl\r\n", true);
        assert_eq!(preview.candidates.len(), 2);
        assert_eq!(preview.candidates[0].key, "sk-abcdef");
        assert_eq!(preview.candidates[1].key, "sk-ghijkl");
    }

    #[test]
    fn test_preview_window() {
        let text: String = (0..13).map(|i| format!("sk-key-{:04}\n", i)).collect();
        let preview = parse_import(&text, true);
        assert_eq!(preview.visible().len(), PREVIEW_ROWS);
        assert_eq!(preview.hidden_count(), 3);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42"), Some(42));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("+8"), Some(8));
        assert_eq!(leading_int("9lives"), Some(9));
        assert_eq!(leading_int("x1"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdef123456"), "sk-ab...3456");
    }
}
