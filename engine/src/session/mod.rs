// Per-user interactive state: the manual quote list and rows hidden from view.
pub mod comparison;
pub mod quote;
pub mod store;

pub use comparison::{compare_quote, QuoteComparison, VendorTotal};
pub use quote::QuoteSession;
pub use store::SessionStore;
