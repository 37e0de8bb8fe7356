//! Symptom text buffer
//!
//! Both writers (manual edits and finalized dictation) go through
//! [`SymptomText::apply`]. Writes are last-writer-wins.

/// A write to the symptom buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferWrite {
    /// Manual edit replacing the whole buffer
    Replace(String),
    /// Finalized dictation segment
    AppendSegment(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomText(String);

impl SymptomText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty after trimming
    pub fn is_submittable(&self) -> bool {
        !self.0.trim().is_empty()
    }

    /// Apply a write. Returns whether the contents changed.
    pub fn apply(&mut self, write: BufferWrite) -> bool {
        match write {
            BufferWrite::Replace(text) => {
                if self.0 == text {
                    return false;
                }
                self.0 = text;
                true
            }
            BufferWrite::AppendSegment(segment) => {
                let segment = segment.trim();
                if segment.is_empty() {
                    return false;
                }
                if !self.0.is_empty() && !self.0.ends_with(char::is_whitespace) {
                    self.0.push(' ');
                }
                self.0.push_str(segment);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_empty_has_no_leading_space() {
        let mut text = SymptomText::default();
        assert!(text.apply(BufferWrite::AppendSegment("headache".to_string())));
        assert_eq!(text.as_str(), "headache");
    }

    #[test]
    fn test_segments_separated_by_single_space() {
        let mut text = SymptomText::default();
        text.apply(BufferWrite::Replace("since monday".to_string()));
        text.apply(BufferWrite::AppendSegment("headache".to_string()));
        text.apply(BufferWrite::AppendSegment(" and nausea".to_string()));
        assert_eq!(text.as_str(), "since monday headache and nausea");
    }

    #[test]
    fn test_trailing_whitespace_is_not_doubled() {
        let mut text = SymptomText::default();
        text.apply(BufferWrite::Replace("fever ".to_string()));
        text.apply(BufferWrite::AppendSegment("chills".to_string()));
        assert_eq!(text.as_str(), "fever chills");
    }

    #[test]
    fn test_blank_segment_is_ignored() {
        let mut text = SymptomText::default();
        text.apply(BufferWrite::Replace("fever".to_string()));
        assert!(!text.apply(BufferWrite::AppendSegment("   ".to_string())));
        assert_eq!(text.as_str(), "fever");
    }

    #[test]
    fn test_replace_overwrites_dictation() {
        let mut text = SymptomText::default();
        text.apply(BufferWrite::AppendSegment("fever".to_string()));
        text.apply(BufferWrite::Replace("rash".to_string()));
        assert_eq!(text.as_str(), "rash");
    }

    #[test]
    fn test_whitespace_only_is_not_submittable() {
        let mut text = SymptomText::default();
        assert!(!text.is_submittable());
        text.apply(BufferWrite::Replace(" \n\t".to_string()));
        assert!(!text.is_submittable());
        text.apply(BufferWrite::Replace(" cough ".to_string()));
        assert!(text.is_submittable());
    }
}
