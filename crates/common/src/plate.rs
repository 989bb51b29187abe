use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Jurisdictions with a supported plate grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    #[serde(rename = "CL")]
    Cl,
    #[serde(rename = "AR")]
    Ar,
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "BR")]
    Br,
}

impl Default for CountryCode {
    fn default() -> Self {
        Self::Cl
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Cl => "CL",
            Self::Ar => "AR",
            Self::Us => "US",
            Self::Eu => "EU",
            Self::Mx => "MX",
            Self::Br => "BR",
        };
        f.write_str(code)
    }
}

impl FromStr for CountryCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CL" => Ok(Self::Cl),
            "AR" => Ok(Self::Ar),
            "US" => Ok(Self::Us),
            "EU" => Ok(Self::Eu),
            "MX" => Ok(Self::Mx),
            "BR" => Ok(Self::Br),
            other => Err(format!("unknown country code: {other}")),
        }
    }
}

/// The plate shape a candidate text matched, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateFormat {
    /// Chilean LLLLDD (current issue, carries a check digit).
    ClNew,
    /// Chilean LLDDDD (pre-2007 issue).
    ClOld,
    /// Chilean LLLDDD (special series).
    ClSpecial,
    /// Chilean LLDDLL (diplomatic corps).
    ClDiplomatic,
    /// Chilean LLDDDL (motorcycles).
    ClMotorcycle,
    Ar,
    Us,
    Eu,
    Mx,
    Br,
    /// No grammar of the configured country matched.
    Unknown,
}

/// Outcome of grammar and checksum validation for a candidate plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub format: PlateFormat,
    /// Structural confidence on a 0-100 scale, always clamped.
    pub confidence: f32,
}

/// A plate that passed the full recognition pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPlate {
    /// Cleaned text, ASCII alphanumerics only.
    pub text: String,
    /// Display form with format-aware spacing.
    pub display_text: String,
    pub format: PlateFormat,
    /// Mean per-character decode score, 0-1.
    pub decode_confidence: f32,
    /// Final scored confidence, 0-100.
    pub score: f32,
    /// Unix timestamp (seconds) of the detection.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_round_trip() {
        for code in ["CL", "AR", "US", "EU", "MX", "BR"] {
            let parsed: CountryCode = code.parse().unwrap();
            assert_eq!(parsed.to_string(), code);
        }
        assert!("XX".parse::<CountryCode>().is_err());
    }

    #[test]
    fn country_code_parse_is_case_insensitive() {
        assert_eq!("cl".parse::<CountryCode>().unwrap(), CountryCode::Cl);
    }

    #[test]
    fn country_code_serde_uses_two_letter_codes() {
        let json = serde_json::to_string(&CountryCode::Mx).unwrap();
        assert_eq!(json, "\"MX\"");
        let back: CountryCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CountryCode::Mx);
    }
}
