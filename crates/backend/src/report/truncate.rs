//! Character-budget enforcement with boundary-aware cuts.

/// Punctuation a cut may end on, in order of preference.
const CUT_BOUNDARIES: [char; 3] = ['.', ';', ','];

/// A punctuation cut must land past this fraction of the budget.
const MIN_CUT_RATIO: f64 = 0.9;

/// Truncate `text` to at most `max_chars` characters.
///
/// Text within the budget is returned as is. Otherwise the first `max_chars`
/// characters form a window, cut after the last period, semicolon or comma
/// (in that order of preference) when it falls in the final 10% of the
/// window, else at the last whitespace, else at the window edge.
pub fn enforce_char_budget(text: &str, max_chars: usize) -> String {
    let window_end = match text.char_indices().nth(max_chars) {
        Some((offset, _)) => offset,
        None => return text.to_string(),
    };
    let window = &text[..window_end];
    let chars: Vec<(usize, char)> = window.char_indices().collect();
    let min_cut = (max_chars as f64 * MIN_CUT_RATIO) as usize;

    for boundary in CUT_BOUNDARIES {
        if let Some(pos) = chars.iter().rposition(|&(_, c)| c == boundary) {
            if pos > min_cut {
                let (offset, c) = chars[pos];
                return window[..offset + c.len_utf8()].to_string();
            }
        }
    }

    if let Some(pos) = chars.iter().rposition(|&(_, c)| c.is_whitespace()) {
        if pos > 0 {
            return window[..chars[pos].0].trim_end().to_string();
        }
    }

    window.to_string()
}
