use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Width of `s` in terminal columns (CJK and emoji count double).
///
/// ```
/// use marquee::util::display_width;
///
/// assert_eq!(display_width("Alien"), 5);
/// assert_eq!(display_width("千と千尋"), 8);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` so it occupies at most `max_width` columns, ending in "..." when
/// anything was dropped. Widths of three or less leave no room for the
/// ellipsis and simply keep the characters that fit.
///
/// ```
/// use marquee::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("The Godfather", 20), "The Godfather");
/// assert_eq!(truncate_to_width("The Godfather Part II", 12), "The Godfa...");
/// assert_eq!(truncate_to_width("Heat", 2), "He");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    let budget = if max_width > ELLIPSIS_WIDTH {
        max_width - ELLIPSIS_WIDTH
    } else {
        max_width
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width > ELLIPSIS_WIDTH {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

fn is_stripped(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Remove control characters and ANSI escape sequences from text the
/// backend sends (titles, descriptions, company names) before it reaches
/// the terminal. Tabs and line breaks survive.
///
/// Returns the input unchanged (borrowed) when there is nothing to strip.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_stripped(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            // CSI: parameters up to a final byte in 0x40..=0x7e
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: up to BEL or ESC \
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert!(matches!(truncate_to_width("Heat", 10), Cow::Borrowed(_)));
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        assert_eq!(truncate_to_width("千と千尋の神隠し", 7), "千と...");
        assert_eq!(truncate_to_width("千と千尋", 3), "千");
        assert_eq!(truncate_to_width("千と", 1), "");
    }

    #[test]
    fn test_truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Tests", 3), "Tes");
    }

    #[test]
    fn test_strip_clean_text_borrowed() {
        let input = "Line one\n\tLine two\r\n";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_controls_and_del() {
        assert_eq!(strip_control_chars("Ali\x00en\x07\x7f"), "Alien");
    }

    #[test]
    fn test_strip_csi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m Dawn"), "Red Dawn");
        assert_eq!(strip_control_chars("up\x1b[2Adown"), "updown");
    }

    #[test]
    fn test_strip_osc_sequences() {
        assert_eq!(strip_control_chars("\x1b]0;title\x07Heat"), "Heat");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\Heat"), "Heat");
    }

    #[test]
    fn test_strip_bare_escape() {
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
        assert_eq!(strip_control_chars("trailing\x1b"), "trailing");
    }
}
