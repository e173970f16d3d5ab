//! Text direction detection.

use core::fmt;

/// Base direction of a block's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Value of the `dir` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }

    /// Direction of the first strongly-directional character in `text`, or
    /// `None` when the text has none (digits, punctuation, whitespace).
    pub fn detect(text: &str) -> Option<Self> {
        text.chars().find_map(Self::of_char)
    }

    fn of_char(c: char) -> Option<Self> {
        if is_rtl(c) {
            Some(TextDirection::Rtl)
        } else if is_ltr(c) {
            Some(TextDirection::Ltr)
        } else {
            None
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Hebrew, Arabic, Syriac, Thaana, NKo, Samaritan, and the presentation forms.
fn is_rtl(c: char) -> bool {
    matches!(c,
        '\u{0591}'..='\u{07FF}'
        | '\u{FB1D}'..='\u{FDFD}'
        | '\u{FE70}'..='\u{FEFC}')
}

// Everything outside the BMP counts as left-to-right.
fn is_ltr(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02B8}'
        | '\u{0300}'..='\u{0590}'
        | '\u{0800}'..='\u{1FFF}'
        | '\u{200E}'
        | '\u{2C00}'..='\u{FB1C}'
        | '\u{FE00}'..='\u{FE6F}'
        | '\u{FEFD}'..='\u{FFFF}'
        | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_is_ltr() {
        assert_eq!(TextDirection::detect("Hello"), Some(TextDirection::Ltr));
        assert_eq!(TextDirection::detect("Éclair"), Some(TextDirection::Ltr));
    }

    #[test]
    fn test_hebrew_and_arabic_are_rtl() {
        assert_eq!(TextDirection::detect("שלום"), Some(TextDirection::Rtl));
        assert_eq!(TextDirection::detect("مرحبا"), Some(TextDirection::Rtl));
    }

    #[test]
    fn test_first_strong_character_wins() {
        assert_eq!(TextDirection::detect("123 שלום abc"), Some(TextDirection::Rtl));
        assert_eq!(TextDirection::detect("  abc שלום"), Some(TextDirection::Ltr));
    }

    #[test]
    fn test_neutral_text_has_no_direction() {
        assert_eq!(TextDirection::detect(""), None);
        assert_eq!(TextDirection::detect("123 -- !?"), None);
    }

    #[test]
    fn test_astral_characters_are_ltr() {
        assert_eq!(TextDirection::detect("😀"), Some(TextDirection::Ltr));
    }
}
