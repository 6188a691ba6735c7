//! Prompt templates for meeting analysis.

pub mod meeting_analysis;

pub use meeting_analysis::{
    meeting_analysis_prompt, meeting_content, task_anchor, MAX_TRANSCRIPT_CHARS,
    MEETING_ANALYSIS_TEMPLATE, NO_CONTENT_PLACEHOLDER, TRANSCRIPT_TRUNCATED_MARKER,
};

/// Split `text` after `max` characters. Returns the kept prefix and whether anything was cut.
pub(crate) fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), ("hé", true));
        assert_eq!(truncate_chars("héllo", 5), ("héllo", false));
        assert_eq!(truncate_chars("", 3), ("", false));
    }
}
