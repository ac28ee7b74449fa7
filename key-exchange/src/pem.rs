//! PEM-style text envelope: Base64 folded at 64 columns between
//! `-----BEGIN <label>-----` and `-----END <label>-----` lines.
//!
//! The decoder locates both markers by searching for their full text, so
//! it does not depend on marker lengths and tolerates CRLF line endings
//! and surrounding text.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::error::{KexError, Result};

/// Base64 characters per payload line
pub const LINE_WIDTH: usize = 64;

pub fn begin_marker(label: &str) -> String {
    format!("-----BEGIN {label}-----")
}

pub fn end_marker(label: &str) -> String {
    format!("-----END {label}-----")
}

/// Wraps `data` in a labelled envelope.
///
/// Every payload line ends in `\n`; nothing follows the END marker.
pub fn encode(label: &str, data: &[u8]) -> String {
    let encoded = BASE64.encode(data);

    let mut out = begin_marker(label);
    out.push('\n');
    // Base64 output is ASCII, so byte chunks are valid UTF-8
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(&end_marker(label));
    out
}

/// Extracts and decodes the payload of the first `label` envelope in `text`.
pub fn decode(label: &str, text: &str) -> Result<Vec<u8>> {
    let begin = begin_marker(label);
    let end = end_marker(label);

    let start = text
        .find(&begin)
        .map(|idx| idx + begin.len())
        .ok_or_else(|| KexError::format(format!("missing '{begin}' marker")))?;
    let stop = text[start..]
        .find(&end)
        .map(|idx| start + idx)
        .ok_or_else(|| KexError::format(format!("missing '{end}' marker")))?;

    let payload: String = text[start..stop]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    BASE64
        .decode(payload.as_bytes())
        .map_err(|e| KexError::format(format!("invalid base64 payload in {label}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_lengths() {
        for len in [0usize, 1, 63, 64, 65, 1000] {
            let data: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let text = encode("TEST DATA", &data);
            assert_eq!(decode("TEST DATA", &text).unwrap(), data, "length {len}");
        }
    }

    #[test]
    fn test_layout() {
        let text = encode("DH PARAMETERS", &[0u8; 100]);
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines[0], "-----BEGIN DH PARAMETERS-----");
        // 100 bytes -> 136 base64 characters
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 64);
        assert_eq!(lines[3].len(), 8);
        assert_eq!(lines[4], "-----END DH PARAMETERS-----");
        assert_eq!(lines.len(), 5);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_empty_payload_layout() {
        assert_eq!(encode("X", &[]), "-----BEGIN X-----\n-----END X-----");
    }

    #[test]
    fn test_missing_markers() {
        let text = encode("PUBLIC KEY", b"abc");
        assert!(matches!(decode("PRIVATE KEY", &text), Err(KexError::Format(_))));

        let truncated = text.replace("-----END PUBLIC KEY-----", "");
        assert!(matches!(decode("PUBLIC KEY", &truncated), Err(KexError::Format(_))));

        // END before BEGIN does not count
        let swapped = "-----END A-----\nQUJD\n-----BEGIN A-----\n";
        assert!(decode("A", swapped).is_err());
    }

    #[test]
    fn test_invalid_base64() {
        let text = "-----BEGIN EC PARAMETERS-----\nnot*base64!\n-----END EC PARAMETERS-----\n";
        assert!(matches!(decode("EC PARAMETERS", text), Err(KexError::Format(_))));

        let short = "-----BEGIN EC PARAMETERS-----\nQUJ\n-----END EC PARAMETERS-----\n";
        assert!(matches!(decode("EC PARAMETERS", short), Err(KexError::Format(_))));
    }

    #[test]
    fn test_tolerates_crlf_and_surroundings() {
        let text = "garbage\r\n-----BEGIN K-----\r\nQUJD\r\nREVG\r\n-----END K-----\r\ntrailer";
        assert_eq!(decode("K", text).unwrap(), b"ABCDEF");
    }

    #[test]
    fn test_label_prefix_is_not_confused() {
        let ec = encode("EC PRIVATE KEY", b"secret");
        assert!(decode("PRIVATE KEY", &ec).is_err());
        assert_eq!(decode("EC PRIVATE KEY", &ec).unwrap(), b"secret");
    }
}
