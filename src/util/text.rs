//! Text wrapping for annotation blocks
//!
//! Widths are display columns: wide (e.g. CJK) characters take two.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns taken by `ch`; control characters take none
pub fn char_columns(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Longest prefix of `text` that fits in `cols` display columns, and its width
pub fn take_columns(text: &str, cols: usize) -> (&str, usize) {
    let mut width = 0;
    for (i, ch) in text.char_indices() {
        let w = char_columns(ch);
        if width + w > cols {
            return (&text[..i], width);
        }
        width += w;
    }
    (text, width)
}

/// Word-wrap `text` into lines of at most `cols` display columns.
///
/// Explicit newlines start a new line. Words wider than `cols` are split.
/// Lines before `from_line` are skipped and at most `max_lines` lines are
/// returned.
pub fn format_text(text: &str, cols: usize, from_line: usize, max_lines: usize) -> Vec<String> {
    let cols = cols.max(1);
    let mut lines = Vec::new();
    if max_lines == 0 {
        return lines;
    }
    let mut produced = 0usize;

    let mut emit = |line: String, lines: &mut Vec<String>| -> bool {
        if produced >= from_line {
            lines.push(line);
        }
        produced += 1;
        lines.len() < max_lines
    };

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_width = 0usize;

        for word in paragraph.split(' ') {
            let mut word = word;
            let mut word_width = word.width();

            // Break words that can never fit on one line
            while word_width > cols {
                if current_width > 0 {
                    if !emit(std::mem::take(&mut current), &mut lines) {
                        return lines;
                    }
                    current_width = 0;
                }
                let (head, _) = take_columns(word, cols);
                // A single character wider than the line still has to go somewhere
                let head = if head.is_empty() {
                    word.chars().next().map_or(word, |c| &word[..c.len_utf8()])
                } else {
                    head
                };
                if !emit(head.to_string(), &mut lines) {
                    return lines;
                }
                word = &word[head.len()..];
                word_width = word.width();
            }

            let needed = if current_width == 0 {
                word_width
            } else {
                current_width + 1 + word_width
            };

            if needed > cols {
                if !emit(std::mem::take(&mut current), &mut lines) {
                    return lines;
                }
                current_width = 0;
            }

            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }

        if !emit(current, &mut lines) {
            return lines;
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(format_text("hello world", 20, 0, usize::MAX), vec!["hello world"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        assert_eq!(
            format_text("the quick brown fox", 10, 0, usize::MAX),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_long_words_are_split() {
        assert_eq!(
            format_text("abcdefghij xy", 4, 0, usize::MAX),
            vec!["abcd", "efgh", "ij", "xy"]
        );
    }

    #[test]
    fn test_newlines_and_empty_paragraphs() {
        assert_eq!(format_text("a\n\nb", 10, 0, usize::MAX), vec!["a", "", "b"]);
        assert_eq!(format_text("", 10, 0, usize::MAX), vec![""]);
    }

    #[test]
    fn test_wide_characters_take_two_columns() {
        let lines = format_text("日本語日本語日本語日本語", 10, 0, usize::MAX);
        assert_eq!(lines, vec!["日本語日本", "語日本語日", "本語"]);
        assert!(lines.iter().all(|l| l.width() <= 10));

        assert_eq!(format_text("ab 日本", 5, 0, usize::MAX), vec!["ab", "日本"]);
    }

    #[test]
    fn test_take_columns_stops_before_wide_overflow() {
        assert_eq!(take_columns("a日b", 2), ("a", 1));
        assert_eq!(take_columns("a日b", 3), ("a日", 3));
        assert_eq!(take_columns("abc", 10), ("abc", 3));
    }

    #[test]
    fn test_from_line_and_max_lines() {
        let text = "one two three four five";
        assert_eq!(format_text(text, 5, 1, 2), vec!["two", "three"]);
        assert_eq!(format_text(text, 5, 0, 1), vec!["one"]);
    }
}
