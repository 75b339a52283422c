//! Repair of double-encoded UTF-8 ("mojibake").
//!
//! Model output occasionally arrives with UTF-8 sequences that were decoded as
//! a single-byte encoding and re-encoded, so `ó` shows up as `Ã³`. Detection
//! is a marker heuristic: only text containing `Ã` or `Â` is re-decoded.

use unicode_normalization::UnicodeNormalization;

/// Lead characters of two-byte UTF-8 sequences read as Latin-1.
const MOJIBAKE_MARKERS: [char; 2] = ['Ã', 'Â'];

/// NFC-normalize `text` and undo one level of UTF-8 double encoding.
///
/// Never fails. If the re-decode pass still leaves markers behind, the
/// normalized input is returned untouched, which keeps the function
/// idempotent.
pub fn repair_mojibake(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    if !has_markers(&normalized) {
        return normalized;
    }

    match redecode(&normalized) {
        Some(repaired) => {
            tracing::debug!("Repaired double-encoded UTF-8 in generated text");
            repaired
        }
        None => {
            tracing::debug!("Mojibake markers found but re-decoding did not clear them");
            normalized
        }
    }
}

fn has_markers(text: &str) -> bool {
    text.chars().any(|c| MOJIBAKE_MARKERS.contains(&c))
}

fn redecode(text: &str) -> Option<String> {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| single_byte(c).unwrap_or(b'?'))
        .collect();
    let repaired: String = String::from_utf8_lossy(&bytes).nfc().collect();

    if has_markers(&repaired) {
        None
    } else {
        Some(repaired)
    }
}

/// Byte a character had before it was mis-decoded, if it fits either
/// single-byte table.
fn single_byte(c: char) -> Option<u8> {
    u8::try_from(u32::from(c))
        .ok()
        .or_else(|| windows_1252_byte(c))
}

/// Windows-1252 assigns printable characters to most of 0x80-0x9F, so text
/// mis-decoded with it carries these instead of C1 control codes.
fn windows_1252_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
