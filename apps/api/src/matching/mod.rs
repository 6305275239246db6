// Matching engine: text normalization, JD requirement extraction, skill detection,
// hard (literal) and soft (embedding) matching, score combination and feedback.
// Everything here except the encoder is a pure function over text.

#[cfg(feature = "bert")]
pub mod bert;
pub mod encoder;
pub mod feedback;
pub mod handlers;
pub mod hard_match;
pub mod jd_parser;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod semantic;
pub mod skills;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
