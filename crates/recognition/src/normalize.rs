//! Text cleanup between decoding and validation.

/// Uppercase the input and drop everything outside the plate alphabet
/// (ASCII letters and digits). The decoder's separator classes (`-` and
/// space) are removed here. Idempotent.
pub fn clean(text: &str) -> String {
    text.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Cosmetic display spacing: `LLDDDD` gets a space after the letters,
/// `LLLDDD` after the third character. Reversible by stripping whitespace.
/// Anything else is returned unchanged.
pub fn format_plate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != 6 {
        return text.to_string();
    }

    let split = if chars[..2].iter().all(|c| c.is_ascii_alphabetic())
        && chars[2..].iter().all(|c| c.is_ascii_digit())
    {
        Some(2)
    } else if chars[..3].iter().all(|c| c.is_ascii_alphabetic())
        && chars[3..].iter().all(|c| c.is_ascii_digit())
    {
        Some(3)
    } else {
        None
    };

    match split {
        Some(at) => format!("{} {}", &text[..at], &text[at..]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_uppercases_and_strips_separators() {
        assert_eq!(clean("ab-12 34"), "AB1234");
        assert_eq!(clean("  xy·12_34!"), "XY1234");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn clean_is_idempotent() {
        for input in ["ab-12 34", "ABCD12", "···", "a b c 1 2 3", "ñXY12"] {
            let once = clean(input);
            assert_eq!(clean(&once), once);
        }
    }

    #[test]
    fn format_inserts_space_per_shape() {
        assert_eq!(format_plate("XY1234"), "XY 1234");
        assert_eq!(format_plate("ABC123"), "ABC 123");
        // LLLLDD and other shapes are left alone.
        assert_eq!(format_plate("ABCD12"), "ABCD12");
        assert_eq!(format_plate("AB12CD"), "AB12CD");
        assert_eq!(format_plate("ABC1234"), "ABC1234");
    }

    #[test]
    fn formatting_is_reversible() {
        for plate in ["XY1234", "ABC123", "ABCD12"] {
            let formatted = format_plate(plate);
            assert_eq!(clean(&formatted), plate);
        }
    }
}
