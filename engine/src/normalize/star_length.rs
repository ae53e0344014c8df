// Rope sold by the roll: "PE * 50" means a 50 m roll.
use super::UnitDivisor;
use crate::data::tokens::number_after_star;

pub struct StarLengthDivisor;

impl UnitDivisor for StarLengthDivisor {
    fn name(&self) -> &str {
        "length_after_star"
    }

    fn raw_divisor(&self, spec: &str) -> Option<f64> {
        number_after_star(spec)
    }
}
