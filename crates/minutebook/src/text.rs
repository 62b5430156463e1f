//! Text normalization for free-text fields.
//!
//! Every text leaf of a minutes record passes through [`normalize`] before it
//! is laid out or sent to the text-improvement service. The transformation is
//! idempotent: `normalize(&normalize(x)) == normalize(x)`.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of whitespace, collapsed to a single space.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// One spacing punctuation mark with any surrounding whitespace.
///
/// Covers comma, colon, semicolon, period and their Arabic forms
/// (U+060C ARABIC COMMA, U+061B ARABIC SEMICOLON).
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*([,:;.\x{060C}\x{061B}])\s*").expect("punctuation pattern is valid")
});

/// Normalize a piece of free text.
///
/// Collapses whitespace runs to one space, removes space before each mark
/// of the punctuation set and puts exactly one space after it, then trims.
/// Every mark is spaced on its own, so `10:30` becomes `10: 30` and `...`
/// becomes `. . .`.
///
/// # Examples
///
/// ```
/// use minutebook::text::normalize;
///
/// assert_eq!(normalize("  budget ,approved  .next  "), "budget, approved. next");
/// assert_eq!(normalize("starts at 10:30"), "starts at 10: 30");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let spaced = PUNCTUATION.replace_all(&collapsed, "$1 ");
    spaced.trim().to_string()
}

/// Normalize an optional value; absent values become an empty string.
#[must_use]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("a   b\t\nc"), "a b c");
    }

    #[test]
    fn test_trims() {
        assert_eq!(normalize("   hello   "), "hello");
    }

    #[test]
    fn test_space_after_punctuation() {
        assert_eq!(normalize("one,two:three;four.five"), "one, two: three; four. five");
    }

    #[test]
    fn test_removes_space_before_punctuation() {
        assert_eq!(normalize("item , next"), "item, next");
    }

    #[test]
    fn test_arabic_comma_and_semicolon() {
        assert_eq!(normalize("أولا،ثانيا؛ثالثا"), "أولا، ثانيا؛ ثالثا");
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed_clean() {
        assert_eq!(normalize("done ."), "done.");
    }

    #[test]
    fn test_times_and_numbers_are_spaced() {
        assert_eq!(normalize("10:30"), "10: 30");
        assert_eq!(normalize("budget 1,500.75 units"), "budget 1, 500. 75 units");
    }

    #[test]
    fn test_spaced_number_punctuation_is_spaced() {
        assert_eq!(normalize("1 . 5"), "1. 5");
    }

    #[test]
    fn test_each_mark_in_a_run_is_spaced() {
        assert_eq!(normalize("wait...then"), "wait. . . then");
        assert_eq!(normalize("x.,y"), "x. , y");
    }

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" x ")), "x");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "  plain text ",
            "a,b,c",
            "a , b , c .",
            "wait...then , ok",
            "10:30 , room 2.5",
            "1 . 5",
            "x.,y",
            "مناقشة المشروع،تقرير المبيعات .",
            "\t tabs\nand\r\nnewlines ;semi",
            ". leading",
            "9,",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
