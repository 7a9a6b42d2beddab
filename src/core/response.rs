//! Discord text limits and truncation helpers
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Character-counted truncation for component labels and titles
//! - 1.0.0: Message content truncation for interaction replies

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord custom_id limit
pub const CUSTOM_ID_LIMIT: usize = 100;
/// Button label limit
pub const BUTTON_LABEL_LIMIT: usize = 80;
/// Select menu placeholder limit
pub const PLACEHOLDER_LIMIT: usize = 150;
/// Select option label/value/description limit
pub const OPTION_TEXT_LIMIT: usize = 100;
/// Modal title and text input label limit
pub const MODAL_TEXT_LIMIT: usize = 45;

/// Truncate text to fit message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.len() <= MESSAGE_LIMIT {
        text.to_string()
    } else {
        // Find a safe UTF-8 boundary
        let mut end = MESSAGE_LIMIT - 3; // Room for "..."
        while !text.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

/// Truncate text to at most `max_chars` characters, ending in "..." when cut
///
/// Component limits are counted in characters, not bytes, so this never splits a
/// multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{kept}...")
}
