//! Display width of grapheme clusters and visual columns.
//!
//! Indentation is measured in visual columns: tabs advance to the next tab
//! stop, everything else advances by its grapheme cluster width.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal column width of one extended grapheme cluster.
pub fn egc_width(egc: &str) -> usize {
    if egc.is_empty() {
        return 0;
    }
    // Zero width for lone combining sequences would collapse columns.
    UnicodeWidthStr::width(egc).max(1)
}

/// Visual column reached after laying out `prefix` from column 0 with
/// `tab_width`-wide tab stops.
pub fn visual_col(prefix: &str, tab_width: usize) -> usize {
    let tab = tab_width.max(1);
    prefix.graphemes(true).fold(0, |col, g| {
        if g == "\t" {
            col + tab - col % tab
        } else {
            col + egc_width(g)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(visual_col("\t", 4), 4);
        assert_eq!(visual_col("  \t", 4), 4);
        assert_eq!(visual_col("    \t", 4), 8);
        assert_eq!(visual_col("\t\t", 8), 16);
    }

    #[test]
    fn clusters_use_display_width() {
        assert_eq!(visual_col("ab", 4), 2);
        assert_eq!(visual_col("e\u{0301}", 4), 1);
        assert_eq!(visual_col("漢", 4), 2);
        assert_eq!(egc_width(""), 0);
    }
}
