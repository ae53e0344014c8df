use shared::models::{ComparisonKey, QuoteLine};
use std::collections::BTreeSet;

use crate::error::EngineError;

/// One user's quote builder state.
///
/// Passed explicitly to the operations that need it; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct QuoteSession {
    lines: Vec<QuoteLine>,
    hidden: BTreeSet<ComparisonKey>,
}

impl QuoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    /// Adds `quantity` of `key`. An existing line for the same key has its quantity
    /// increased instead of a second line being created.
    pub fn add(&mut self, key: ComparisonKey, quantity: u32) -> Result<&QuoteLine, EngineError> {
        if quantity == 0 {
            return Err(EngineError::InvalidRequest("Quantity must be a positive integer".to_string()));
        }
        let idx = match self.lines.iter().position(|l| l.key == key) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(quantity);
                idx
            }
            None => {
                self.lines.push(QuoteLine { key, quantity });
                self.lines.len() - 1
            }
        };
        Ok(&self.lines[idx])
    }

    pub fn set_quantity(&mut self, key: &ComparisonKey, quantity: u32) -> Result<(), EngineError> {
        if quantity == 0 {
            return Err(EngineError::InvalidRequest("Quantity must be a positive integer".to_string()));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.key == key)
            .ok_or_else(|| EngineError::NotFound(format!("{} is not in the quote list", key)))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, key: &ComparisonKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key != key);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn hide(&mut self, key: ComparisonKey) -> bool {
        self.hidden.insert(key)
    }

    pub fn unhide(&mut self, key: &ComparisonKey) -> bool {
        self.hidden.remove(key)
    }

    pub fn clear_hidden(&mut self) {
        self.hidden.clear();
    }

    pub fn is_hidden(&self, key: &ComparisonKey) -> bool {
        self.hidden.contains(key)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}
