use core_text::{Buffer, motion};
use proptest::prelude::*;

proptest! {
    // A normalized caret is already normal and never leaves the buffer.
    #[test]
    fn normalize_caret_is_idempotent(text in "[ab \n]{0,30}", offset in 0usize..40) {
        let buf = Buffer::from_str("p", &text);
        let once = motion::normalize_caret(&buf, offset);
        prop_assert!(once <= buf.len());
        prop_assert_eq!(motion::normalize_caret(&buf, once), once);
    }

    // Deleting one line's span removes exactly one content line.
    #[test]
    fn linewise_span_removes_one_line(text in "[ab\n]{1,30}", pick in 0usize..30) {
        let mut buf = Buffer::from_str("p", &text);
        let before = buf.content_line_count();
        prop_assume!(before > 1);
        let line = pick % before;
        let (start, end) = motion::linewise_span(&buf, line, line);
        buf.remove(start, end);
        prop_assert_eq!(buf.content_line_count(), before - 1);
    }

    // Both whitespace probes treat a blank line as having nothing on it.
    #[test]
    fn blank_lines_have_no_non_blank_neighbours(indent in 0usize..6, tail in 0usize..6) {
        let text = format!("{}\n{}", " ".repeat(indent), " ".repeat(tail));
        let buf = Buffer::from_str("p", &text);
        for offset in 0..=buf.len() {
            prop_assert!(!motion::non_blank_before(&buf, offset));
            prop_assert!(!motion::non_blank_after(&buf, offset));
        }
    }
}
