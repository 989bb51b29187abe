//! Country-specific plate grammar matching, deny-list screening, the
//! Chilean check-digit rule, and confidence scoring.

use common::{CountryCode, PlateFormat, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Three-letter sequences that are never issued on a plate.
const FORBIDDEN: [&str; 7] = ["SEX", "GAY", "ASS", "FUK", "SHT", "DMN", "HLL"];

/// Alphabet used by the check-digit computation. A character's value is
/// its index here, so digits map to 0-9 and letters to 10-35. This is the
/// same position-to-index mapping the decoder charset starts with.
const CHECK_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Cyclic weights applied to plate characters during checksum computation.
const CHECK_WEIGHTS: [u32; 10] = [3, 2, 4, 1, 5, 9, 8, 6, 7, 0];

static CL_PATTERNS: Lazy<Vec<(Regex, PlateFormat)>> = Lazy::new(|| {
    vec![
        (re(r"^[A-Z]{4}[0-9]{2}$"), PlateFormat::ClNew),
        (re(r"^[A-Z]{2}[0-9]{4}$"), PlateFormat::ClOld),
        (re(r"^[A-Z]{3}[0-9]{3}$"), PlateFormat::ClSpecial),
        (re(r"^[A-Z]{2}[0-9]{2}[A-Z]{2}$"), PlateFormat::ClDiplomatic),
        (re(r"^[A-Z]{2}[0-9]{3}[A-Z]$"), PlateFormat::ClMotorcycle),
    ]
});

static AR_PATTERN: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z]{3}[0-9]{3}$"));
static US_PATTERN: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z0-9]{1,8}$"));
static EU_PATTERN: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z0-9]{1,12}$"));
static MX_PATTERN: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z]{3}[0-9]{3}[0-9]{2}$"));
static BR_PATTERN: Lazy<Regex> = Lazy::new(|| re(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$"));

/// Shapes with the lowest historical misread rate; they earn a scoring bonus.
static HIGH_CONFIDENCE_SHAPES: Lazy<Regex> =
    Lazy::new(|| re(r"^[A-Z]{4}[0-9]{2}$|^[A-Z]{2}[0-9]{3}[A-Z]$"));

fn re(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Patterns are source literals; a failure here is a programming
        // error caught by the tests below.
        Err(e) => panic!("invalid plate grammar pattern {pattern}: {e}"),
    }
}

/// Grammar and checksum validation for one jurisdiction.
///
/// Both entry points are total: `validate` always returns a result and
/// `score` always returns a finite number in `[0, 100]`.
#[derive(Debug, Clone, Copy)]
pub struct PlateValidator {
    country: CountryCode,
}

impl PlateValidator {
    pub fn new(country: CountryCode) -> Self {
        Self { country }
    }

    pub fn country(&self) -> CountryCode {
        self.country
    }

    /// Validate candidate text against the configured country's grammars.
    ///
    /// The `confidence` field reports structural confidence, i.e. the score
    /// of the text starting from a perfect OCR read.
    pub fn validate(&self, text: &str) -> ValidationResult {
        let stripped = strip_separators(text);
        let format = self.match_format(&stripped);
        let is_valid = format != PlateFormat::Unknown && self.passes_shared_rules(&stripped);

        ValidationResult {
            is_valid,
            format: if is_valid { format } else { PlateFormat::Unknown },
            confidence: self.score(text, 100.0),
        }
    }

    /// Whether the text is a valid plate for the configured country.
    pub fn is_valid(&self, text: &str) -> bool {
        self.validate(text).is_valid
    }

    /// Confidence score on a 0-100 scale, starting from the OCR confidence.
    ///
    /// Invalid text halves the score, high-confidence shapes earn a 1.1x
    /// bonus, and every easily-confused character (`0`, `O`, `1`, `I`)
    /// costs a 0.9x factor. Never panics; non-finite input maps to 0.
    pub fn score(&self, text: &str, ocr_confidence: f32) -> f32 {
        if !ocr_confidence.is_finite() {
            return 0.0;
        }

        let stripped = strip_separators(text);
        let mut confidence = ocr_confidence;

        if !(self.match_format(&stripped) != PlateFormat::Unknown
            && self.passes_shared_rules(&stripped))
        {
            confidence *= 0.5;
        }
        if HIGH_CONFIDENCE_SHAPES.is_match(&stripped) {
            confidence *= 1.1;
        }

        let ambiguous = stripped
            .chars()
            .filter(|c| matches!(c, '0' | 'O' | '1' | 'I'))
            .count();
        confidence *= 0.9f32.powi(ambiguous as i32);

        confidence.clamp(0.0, 100.0)
    }

    /// Match against the country's grammar table; separators must already
    /// be stripped. The Chilean rule set carries its own length window and
    /// the new-format check digit.
    fn match_format(&self, stripped: &str) -> PlateFormat {
        match self.country {
            CountryCode::Cl => {
                let len = stripped.chars().count();
                if !(5..=7).contains(&len) {
                    return PlateFormat::Unknown;
                }
                let format = CL_PATTERNS
                    .iter()
                    .find(|(pattern, _)| pattern.is_match(stripped))
                    .map(|(_, format)| *format)
                    .unwrap_or(PlateFormat::Unknown);
                if format == PlateFormat::ClNew && !check_digit_holds(stripped) {
                    return PlateFormat::Unknown;
                }
                format
            }
            CountryCode::Ar => matched(&AR_PATTERN, stripped, PlateFormat::Ar),
            CountryCode::Us => matched(&US_PATTERN, stripped, PlateFormat::Us),
            CountryCode::Eu => matched(&EU_PATTERN, stripped, PlateFormat::Eu),
            CountryCode::Mx => matched(&MX_PATTERN, stripped, PlateFormat::Mx),
            CountryCode::Br => matched(&BR_PATTERN, stripped, PlateFormat::Br),
        }
    }

    /// Rules shared by every jurisdiction: no forbidden substring, no
    /// leading digit, no run of 4+ identical characters.
    fn passes_shared_rules(&self, stripped: &str) -> bool {
        if FORBIDDEN.iter().any(|f| stripped.contains(f)) {
            return false;
        }
        if stripped.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }
        !has_long_run(stripped)
    }
}

fn matched(pattern: &Regex, stripped: &str, format: PlateFormat) -> PlateFormat {
    if pattern.is_match(stripped) {
        format
    } else {
        PlateFormat::Unknown
    }
}

fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

fn has_long_run(text: &str) -> bool {
    let mut run = 0usize;
    let mut last: Option<char> = None;
    for c in text.chars() {
        if last == Some(c) {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 1;
            last = Some(c);
        }
    }
    false
}

fn char_value(c: char) -> Option<u32> {
    CHECK_ALPHABET.find(c).map(|i| i as u32)
}

/// Chilean new-format check digit: the first five characters, valued by
/// their index in the 36-character alphabet and weighted cyclically, must
/// predict the sixth character via `(11 - sum mod 11) mod 10`.
fn check_digit_holds(plate: &str) -> bool {
    let chars: Vec<char> = plate.chars().collect();
    if chars.len() != 6 {
        return false;
    }

    let mut sum = 0u32;
    for (i, c) in chars[..5].iter().enumerate() {
        match char_value(*c) {
            Some(value) => sum += value * CHECK_WEIGHTS[i % CHECK_WEIGHTS.len()],
            None => return false,
        }
    }

    let expected = (11 - sum % 11) % 10;
    char_value(chars[5]) == Some(expected)
}
