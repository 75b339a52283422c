//! Pulls the `report` field out of noisy model output.
//!
//! Providers that ignore the requested response shape tend to hand back a
//! debug rendering of their response object, something like
//! `Part(text='{"report":"..."}')`. This module digs the payload out of that
//! wrapper. It is best effort and never fails: when nothing recognizable is
//! found the caller gets the best text available.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TEXT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"text=(['"])"#).expect("valid regex"));

static SINGLE_QUOTED_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)text='((?:[^'\\]|\\.)*)'").expect("valid regex"));

static DOUBLE_QUOTED_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)text="((?:[^"\\]|\\.)*)""#).expect("valid regex"));

static REPORT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"report"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});

/// Extract the value of the `report` field from a wrapped model response.
///
/// Input without a `text=` wrapper is returned unchanged.
pub fn extract_report_text(noisy: &str) -> String {
    if noisy.is_empty() {
        return String::new();
    }

    let Some(inner) = find_wrapped_span(noisy) else {
        tracing::debug!("No text= wrapper in model output, keeping it as is");
        return noisy.to_string();
    };

    let decoded = decode_escapes(inner);

    if let Some(report) = report_from_json(&decoded).or_else(|| report_from_json(inner)) {
        return report;
    }

    if let Some(caps) = REPORT_FIELD.captures(&decoded) {
        tracing::debug!("Wrapped payload is not valid JSON, matched report field directly");
        return decode_escapes(&caps[1]).trim().to_string();
    }

    tracing::debug!("No report field in wrapped payload, returning wrapped text");
    inner.trim().to_string()
}

/// Locate the quoted span after `text=`.
///
/// Brace-delimited payloads are preferred. Every `}` immediately followed by
/// the opening quote is a possible end; the shortest span that parses as JSON
/// wins, so quotes or braces inside the payload do not end it early.
fn find_wrapped_span(noisy: &str) -> Option<&str> {
    for caps in TEXT_MARKER.captures_iter(noisy) {
        let quote = caps[1].chars().next()?;
        let body_start = caps.get(0)?.end();
        let body = &noisy[body_start..];
        if !body.starts_with('{') {
            continue;
        }

        let candidates = brace_candidates(body, quote);
        let chosen = candidates
            .iter()
            .copied()
            .find(|span| parses_as_json(&decode_escapes(span)) || parses_as_json(span))
            .or_else(|| candidates.first().copied());
        if chosen.is_some() {
            return chosen;
        }
    }

    let single = SINGLE_QUOTED_TEXT.captures(noisy);
    let double = DOUBLE_QUOTED_TEXT.captures(noisy);
    let caps = match (single, double) {
        (Some(s), Some(d)) => {
            if s.get(0)?.start() <= d.get(0)?.start() {
                s
            } else {
                d
            }
        }
        (Some(s), None) => s,
        (None, Some(d)) => d,
        (None, None) => return None,
    };
    caps.get(1).map(|m| m.as_str())
}

fn brace_candidates(body: &str, quote: char) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut chars = body.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c == '}' && matches!(chars.peek(), Some(&(_, next)) if next == quote) {
            candidates.push(&body[..=offset]);
        }
    }
    candidates
}

fn parses_as_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

fn report_from_json(text: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let report = parsed.as_object()?.get("report")?;
    let report = match report {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    Some(report)
}

/// Resolve backslash escapes left over from string-literal renderings.
///
/// Handles the JSON escapes plus `\'` and `\xHH`. Unknown or malformed
/// escapes are kept literally.
fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some(c @ ('"' | '\'' | '\\' | '/')) => out.push(c),
            Some('u') => match read_hex(&mut chars, 4) {
                Some(unit) => push_utf16_unit(&mut out, &mut chars, unit),
                None => out.push_str("\\u"),
            },
            Some('x') => match read_hex(&mut chars, 2).and_then(char::from_u32) {
                Some(decoded) => out.push(decoded),
                None => out.push_str("\\x"),
            },
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

fn read_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, digits: usize) -> Option<u32> {
    let lookahead: String = chars.clone().take(digits).collect();
    if lookahead.len() != digits || !lookahead.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    for _ in 0..digits {
        chars.next();
    }
    u32::from_str_radix(&lookahead, 16).ok()
}

fn push_utf16_unit(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    unit: u32,
) {
    if (0xD800..0xDC00).contains(&unit) {
        let mut rest = chars.clone();
        if rest.next() == Some('\\') && rest.next() == Some('u') {
            if let Some(low) = read_hex(&mut rest, 4).filter(|u| (0xDC00..0xE000).contains(u)) {
                let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    out.push(c);
                    *chars = rest;
                    return;
                }
            }
        }
    }
    out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_report_from_wrapper() {
        let noisy = r#"text='{"report":"Hola ó mundo"}'"#;
        assert_eq!(extract_report_text(noisy), "Hola ó mundo");
    }

    #[test]
    fn test_extracts_from_debug_rendering() {
        let noisy = r#"GenerateResponse(message=Message(role='model', content=[Part(text='{"report": "  Revisé el código.  "}')]), finish_reason='stop', usage=Usage(input_tokens=42))"#;
        assert_eq!(extract_report_text(noisy), "Revisé el código.");
    }

    #[test]
    fn test_double_quoted_wrapper() {
        let noisy = r#"Part(text="{"report":"hola"}", custom=None)"#;
        assert_eq!(extract_report_text(noisy), "hola");
    }

    #[test]
    fn test_decodes_unicode_escapes() {
        let noisy = r#"text='{\"report\":\"Revis\u00e9 c\u00f3digo\\nlisto\"}'"#;
        assert_eq!(extract_report_text(noisy), "Revisé código\nlisto");
    }

    #[test]
    fn test_inner_quote_and_brace_do_not_end_span() {
        let noisy = r#"Part(text='{"report":"ver {x}' en texto"}')"#;
        assert_eq!(extract_report_text(noisy), "ver {x}' en texto");
    }

    #[test]
    fn test_raw_json_with_escaped_quotes() {
        let noisy = r#"text='{"report":"dijo \"hola\" y se fue"}'"#;
        assert_eq!(extract_report_text(noisy), r#"dijo "hola" y se fue"#);
    }

    #[test]
    fn test_regex_fallback_for_broken_json() {
        let noisy = r#"text='{"report":"dijo \\"hola\\" y", roto}'"#;
        assert_eq!(extract_report_text(noisy), r#"dijo "hola" y"#);
    }

    #[test]
    fn test_plain_wrapped_text_returned_when_no_report_field() {
        assert_eq!(extract_report_text("Part(text='  solo texto  ')"), "solo texto");
        assert_eq!(
            extract_report_text(r#"Part(text='{"summary":"x"}')"#),
            r#"{"summary":"x"}"#
        );
    }

    #[test]
    fn test_input_without_marker_unchanged() {
        let text = "Reporte sin envoltorio alguno.";
        assert_eq!(extract_report_text(text), text);
        assert_eq!(extract_report_text(""), "");
    }

    #[test]
    fn test_non_string_report_rendered_as_json() {
        assert_eq!(extract_report_text(r#"text='{"report":42}'"#), "42");
    }

    #[test]
    fn test_decode_surrogate_pairs() {
        assert_eq!(decode_escapes(r"\ud83d\ude80!"), "🚀!");
        assert_eq!(decode_escapes(r"\ud83d x"), "\u{FFFD} x");
        // a high surrogate followed by a non-surrogate escape stays unpaired
        assert_eq!(decode_escapes(r"\ud83d\u0041"), "\u{FFFD}A");
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_escapes(r"a\tb\\c\/d\'e"), "a\tb\\c/d'e");
        assert_eq!(decode_escapes(r"\xf3"), "ó");
        assert_eq!(decode_escapes(r"\q \u12"), r"\q \u12");
        assert_eq!(decode_escapes("fin\\"), "fin\\");
    }
}
