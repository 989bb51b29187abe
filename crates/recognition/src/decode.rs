//! Greedy best-path decoding of the model's `[T,1,C]` score matrix.

use crate::error::DecodeError;
use common::CollapseMode;
use ndarray::Array3;

/// Collapsed text with the mean score of its accepted characters.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    /// Mean per-accepted-character score, 0 when nothing was accepted.
    pub mean_confidence: f32,
}

impl DecodedText {
    fn empty(mean_confidence: f32) -> Self {
        Self {
            text: String::new(),
            mean_confidence,
        }
    }
}

/// Decode a score matrix into provisional plate text.
///
/// Per timestep, the argmax class is accepted when its score clears
/// `threshold` and it is not a repeat under the configured collapse mode.
/// A result whose mean accepted score falls below `threshold * 0.8` is
/// discarded wholesale: a low average means the read as a whole is
/// untrustworthy even if individual characters cleared the bar.
///
/// `T == 0` decodes to empty text. A class count that differs from the
/// charset is a contract violation and fails with [`DecodeError`].
pub fn decode(
    scores: &Array3<f32>,
    charset: &str,
    threshold: f32,
    mode: CollapseMode,
) -> Result<DecodedText, DecodeError> {
    let chars: Vec<char> = charset.chars().collect();
    let (timesteps, batch, classes) = scores.dim();

    if batch != 1 {
        return Err(DecodeError::BatchWidth(batch));
    }
    if classes != chars.len() {
        return Err(DecodeError::ClassCountMismatch {
            classes,
            charset: chars.len(),
        });
    }

    let mut text = String::new();
    let mut score_sum = 0.0f32;
    let mut accepted = 0usize;
    let mut last_accepted: Option<char> = None;
    let mut last_class: Option<usize> = None;

    for t in 0..timesteps {
        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for c in 0..classes {
            let score = scores[[t, 0, c]];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }

        let ch = chars[best_class];
        let repeat = match mode {
            CollapseMode::Accepted => last_accepted == Some(ch),
            CollapseMode::RawClass => last_class == Some(best_class),
        };

        if best_score > threshold && !repeat {
            text.push(ch);
            score_sum += best_score;
            accepted += 1;
            last_accepted = Some(ch);
        }
        last_class = Some(best_class);
    }

    let mean_confidence = if accepted > 0 {
        score_sum / accepted as f32
    } else {
        0.0
    };

    if mean_confidence < threshold * 0.8 {
        if !text.is_empty() {
            tracing::debug!(
                mean_confidence,
                threshold,
                discarded = %text,
                "decode result discarded, mean confidence below floor"
            );
        }
        return Ok(DecodedText::empty(mean_confidence));
    }

    Ok(DecodedText {
        text,
        mean_confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::DEFAULT_CHARSET;

    /// Score matrix with one dominant class per timestep and all other
    /// classes at a small floor value.
    fn dominant_matrix(classes: usize, picks: &[usize], peak: f32) -> Array3<f32> {
        let mut scores = Array3::from_elem((picks.len(), 1, classes), 0.01);
        for (t, &c) in picks.iter().enumerate() {
            scores[[t, 0, c]] = peak;
        }
        scores
    }

    #[test]
    fn dominant_sequence_collapses_repeats() {
        // Classes A,A,B,1,2 in the default charset.
        let scores = dominant_matrix(DEFAULT_CHARSET.len(), &[10, 10, 11, 1, 2], 0.95);
        let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        assert_eq!(decoded.text, "AB12");
        assert!((decoded.mean_confidence - 0.95).abs() < 1e-5);
    }

    #[test]
    fn no_identical_adjacent_characters() {
        let scores = dominant_matrix(
            DEFAULT_CHARSET.len(),
            &[10, 10, 10, 11, 11, 10, 2, 2, 2],
            0.9,
        );
        let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        let chars: Vec<char> = decoded.text.chars().collect();
        assert!(chars.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(decoded.text, "ABA2");
    }

    #[test]
    fn all_below_threshold_yields_empty() {
        let scores = dominant_matrix(DEFAULT_CHARSET.len(), &[10, 11, 12], 0.5);
        let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        assert_eq!(decoded.text, "");
        assert_eq!(decoded.mean_confidence, 0.0);
    }

    #[test]
    fn mean_floor_clears_for_accepted_reads() {
        // Every accepted score exceeds the threshold, so the mean always
        // clears the threshold * 0.8 floor for non-empty reads.
        let scores = dominant_matrix(DEFAULT_CHARSET.len(), &[10, 11, 12], 0.71);
        let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        assert_eq!(decoded.text, "ABC");
        assert!(decoded.mean_confidence >= 0.7 * 0.8);
    }

    #[test]
    fn empty_matrix_decodes_to_empty_text() {
        let scores = Array3::from_elem((0, 1, DEFAULT_CHARSET.len()), 0.0);
        let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        assert_eq!(decoded.text, "");
        assert_eq!(decoded.mean_confidence, 0.0);
    }

    #[test]
    fn class_count_mismatch_fails() {
        let scores = Array3::from_elem((4, 1, 10), 0.1);
        let err = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ClassCountMismatch {
                classes: 10,
                charset: 38
            }
        ));
    }

    #[test]
    fn batch_width_other_than_one_fails() {
        let scores = Array3::from_elem((4, 2, DEFAULT_CHARSET.len()), 0.1);
        let err = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap_err();
        assert!(matches!(err, DecodeError::BatchWidth(2)));
    }

    #[test]
    fn raw_class_mode_allows_repeats_across_gaps() {
        // Raw sequence A, B(below threshold), A: raw-class collapsing
        // accepts the second A because the raw argmax changed in between.
        let mut scores = Array3::from_elem((3, 1, DEFAULT_CHARSET.len()), 0.01);
        scores[[0, 0, 10]] = 0.95;
        scores[[1, 0, 11]] = 0.3;
        scores[[2, 0, 10]] = 0.95;

        let raw = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::RawClass).unwrap();
        assert_eq!(raw.text, "AA");

        let accepted = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        assert_eq!(accepted.text, "A");
    }

    #[test]
    fn decoding_is_deterministic() {
        let scores = dominant_matrix(DEFAULT_CHARSET.len(), &[33, 34, 1, 2, 3, 4], 0.9);
        let first = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        let second = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
        assert_eq!(first, second);
    }
}
