// Two-dimensional goods (nets): the spec lists width and height, the unit is their product.
use super::UnitDivisor;
use crate::data::tokens::numeric_tokens;

pub struct AreaDivisor;

impl UnitDivisor for AreaDivisor {
    fn name(&self) -> &str {
        "area"
    }

    fn raw_divisor(&self, spec: &str) -> Option<f64> {
        let tokens = numeric_tokens(spec);
        if tokens.is_empty() {
            return None;
        }
        Some(tokens.iter().product())
    }
}
