//! Report generation: provider boundary, output normalization and
//! length enforcement.
//!
//! Provider output goes through a single pass:
//! - unwrap the `report` field from noisy text ([`extract_report_text`])
//! - repair double-encoded UTF-8 ([`repair_mojibake`])
//! - cut to the character budget ([`enforce_char_budget`])

mod encoding;
mod extract;
mod fallback;
mod gemini;
mod generator;
mod service;
mod truncate;

pub use encoding::repair_mojibake;
pub use extract::extract_report_text;
pub use fallback::{compose_local_report, LOCAL_REPORT_INTRO};
pub use gemini::{GeminiGenerator, DEFAULT_GEMINI_MODEL};
pub use generator::{GeneratedText, GenerationError, TextGenerator};
pub use service::{
    build_prompt, ReportService, ReportSettings, DEFAULT_GENERATION_TIMEOUT, DEFAULT_MAX_CHARS,
};
pub use truncate::enforce_char_budget;

/// Turn provider output into a finished report of at most `max_chars`
/// characters. May return an empty string.
pub fn normalize_report(generated: &GeneratedText, max_chars: usize) -> String {
    let extracted = match generated {
        GeneratedText::Structured { report } => report.clone(),
        GeneratedText::Text(raw) => extract_report_text(raw),
    };
    let repaired = repair_mojibake(&extracted);
    enforce_char_budget(repaired.trim(), max_chars)
}
