use super::UnitDivisor;
use crate::data::tokens::first_number;

/// Packs of small parts: the first number in the spec is the piece count.
pub struct PieceCountDivisor;

impl UnitDivisor for PieceCountDivisor {
    fn name(&self) -> &str {
        "piece_count"
    }

    fn raw_divisor(&self, spec: &str) -> Option<f64> {
        first_number(spec)
    }
}
