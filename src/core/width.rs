/// CJK full-width punctuation that terminals draw across two columns.
/// Western marks such as `·`, `—`, `…` and curly quotes stay narrow.
const WIDE_PUNCTUATION: &[char] = &[
    '\u{3000}', '，', '。', '！', '？', '；', '：', '（', '）', '【', '】', '《', '》', '、',
];

/// Column width of a single character: 2 for CJK ideographs and full-width
/// punctuation, 1 for everything else (including control characters).
pub fn char_width(c: char) -> usize {
    if ('\u{4E00}'..='\u{9FFF}').contains(&c) || WIDE_PUNCTUATION.contains(&c) {
        2
    } else {
        1
    }
}

/// Terminal column width of `text`.
pub fn width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Pad `text` with trailing spaces until it occupies `columns` columns.
/// Text that is already wider is returned unchanged, never truncated.
pub fn pad_right(text: &str, columns: usize) -> String {
    let fill = columns.saturating_sub(width(text));
    format!("{}{}", text, " ".repeat(fill))
}
