//! Removal of invisible and control characters from fragments.

/// Characters that render as nothing and are dropped outright.
const ZERO_WIDTH: &[char] = &[
    '\u{200B}', // zero-width space
    '\u{200C}', // zero-width non-joiner
    '\u{200D}', // zero-width joiner
    '\u{FEFF}', // byte order mark
    '\u{2060}', // word joiner
];

/// Strip control and zero-width characters, normalizing no-break spaces.
///
/// Whitespace controls (`\n`, `\r`, `\t`) are kept; the re-spacer folds them
/// into plain spaces itself.
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{202F}' => Some(' '),
            '\u{00AD}' => None,
            c if ZERO_WIDTH.contains(&c) => None,
            c if c.is_control() && !c.is_whitespace() => None,
            c => Some(c),
        })
        .collect()
}
