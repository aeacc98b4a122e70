//! crates/notebook_core/src/limits.rs
//!
//! Hard numeric contracts shared between the dispatcher, the extractor and
//! the metadata generator.

/// Inline source content is truncated to this many characters before it is
/// handed to a generator backend.
pub const INLINE_CONTENT_MAX_CHARS: usize = 5000;

/// Extracted text is truncated to this many characters before the model
/// prompt is built (cost/latency bound).
pub const MODEL_INPUT_MAX_CHARS: usize = 50_000;

/// `example_questions` is clamped to this many entries regardless of how
/// many the model returns.
pub const MAX_EXAMPLE_QUESTIONS: usize = 5;

/// A decoded PDF yielding fewer usable characters than this is treated as
/// image-only or encrypted.
pub const MIN_PDF_TEXT_CHARS: usize = 100;

/// Validity of the short-lived signed URL used to download an uploaded
/// source file.
pub const DOWNLOAD_URL_TTL_SECS: u64 = 60;

/// Validity of a (re)issued audio overview URL.
pub const AUDIO_URL_TTL_SECS: u64 = 86_400;

/// Hours added to `now` for `audio_url_expires_at` whenever an audio URL is
/// issued or refreshed. Must always agree with [`AUDIO_URL_TTL_SECS`].
pub const AUDIO_URL_TTL_HOURS: i64 = 24;

/// Note text is truncated to this many characters before the title prompt
/// is built.
pub const NOTE_TITLE_INPUT_MAX_CHARS: usize = 1000;

/// Segmented note content contributes at most this many leading segments
/// to the title prompt.
pub const NOTE_TITLE_SEGMENTS: usize = 3;

/// Truncates `text` to at most `max_chars` characters, respecting UTF-8
/// boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
