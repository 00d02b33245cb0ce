//! Cell text to signed number.
//!
//! Malformed cells resolve to `None` ("no data"); they never raise, so one bad
//! cell cannot abort extraction of the rest of a table.

const NOT_AVAILABLE_MARKERS: [&str; 3] = ["n.a.", "n.a", "na"];

/// Leading characters accepted as a minus sign: ASCII hyphen plus the
/// Unicode minus and dash variants publishers substitute for it.
const MINUS_SIGNS: [char; 7] = [
    '-', '\u{2212}', '\u{2010}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{FE63}',
];

/// Parses `[sign]digits[,digits]*[.digits]`.
///
/// Non-breaking spaces are removed before parsing, so `+&nbsp;2,044` reads
/// as `+2,044`; commas are thousands separators. Any other character between
/// the sign and the first digit makes the cell no data.
pub fn parse_cell(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|ch| *ch != '\u{a0}').collect();
    let text = cleaned.trim();
    if text.is_empty() {
        return None;
    }
    if NOT_AVAILABLE_MARKERS
        .iter()
        .any(|marker| text.eq_ignore_ascii_case(marker))
    {
        return None;
    }

    let mut chars = text.chars();
    let (negative, unsigned) = match chars.next() {
        Some('+') => (false, chars.as_str()),
        Some(ch) if MINUS_SIGNS.contains(&ch) => (true, chars.as_str()),
        _ => (false, text),
    };

    if !is_grouped_decimal(unsigned) {
        return None;
    }

    let digits: String = unsigned.chars().filter(|ch| *ch != ',').collect();
    let magnitude = digits.parse::<f64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn is_grouped_decimal(text: &str) -> bool {
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };

    let integer_ok = !integer.is_empty()
        && integer
            .split(',')
            .all(|group| !group.is_empty() && group.chars().all(|ch| ch.is_ascii_digit()));
    let fraction_ok = fraction
        .map(|fraction| !fraction.is_empty() && fraction.chars().all(|ch| ch.is_ascii_digit()))
        .unwrap_or(true);

    integer_ok && fraction_ok
}

/// Formats with thousands separators and an explicit sign for negatives,
/// the inverse of [`parse_cell`] on well-formed input.
pub fn format_with_separators(value: f64) -> String {
    let negative = value < 0.0;
    let magnitude = value.abs();
    let rendered = if magnitude.fract() == 0.0 {
        format!("{magnitude:.0}")
    } else {
        magnitude.to_string()
    };
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer.to_owned(), Some(fraction.to_owned())),
        None => (rendered, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (position, ch) in integer.chars().enumerate() {
        if position > 0 && (integer.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_thousands_separated_values() {
        assert_eq!(parse_cell("6,500,000"), Some(6_500_000.0));
        assert_eq!(parse_cell("  12,345.5 "), Some(12_345.5));
        assert_eq!(parse_cell("+2,044"), Some(2_044.0));
        assert_eq!(parse_cell("0"), Some(0.0));
    }

    #[test]
    fn unicode_minus_marks_negative_values() {
        assert_eq!(parse_cell("\u{2212}1,234"), Some(-1_234.0));
        assert_eq!(parse_cell("\u{2013}17"), Some(-17.0));
    }

    #[test]
    fn sign_must_touch_the_first_digit() {
        for raw in ["- 5,012", "+ 250", "\u{2212} 12", "-\t7", "+ +3"] {
            assert_eq!(parse_cell(raw), None, "raw={raw:?}");
        }
    }

    #[test]
    fn non_breaking_spaces_are_removed() {
        assert_eq!(parse_cell("\u{a0}1,000\u{a0}"), Some(1_000.0));
        assert_eq!(parse_cell("+\u{a0}250"), Some(250.0));
        assert_eq!(parse_cell("\u{2212}\u{a0}244,321"), Some(-244_321.0));
    }

    #[test]
    fn placeholders_and_malformed_cells_are_no_data() {
        for raw in ["", "   ", "n.a.", "NA", "na", "12a", "1.2.3", "1,,000", ",100", "100.", "-", "(1,000)"] {
            assert_eq!(parse_cell(raw), None, "raw={raw:?}");
        }
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_with_separators(6_500_000.0), "6,500,000");
        assert_eq!(format_with_separators(-1_234.0), "-1,234");
        assert_eq!(format_with_separators(999.0), "999");
        assert_eq!(format_with_separators(1_234.25), "1,234.25");
    }

    proptest! {
        #[test]
        fn grouped_integers_round_trip(value in -9_999_999_999i64..9_999_999_999i64) {
            let rendered = format_with_separators(value as f64);
            prop_assert_eq!(parse_cell(&rendered), Some(value as f64));
        }

        #[test]
        fn explicit_plus_sign_round_trips(value in 0i64..99_999_999i64) {
            let rendered = format!("+{}", format_with_separators(value as f64));
            prop_assert_eq!(parse_cell(&rendered), Some(value as f64));
        }
    }
}
