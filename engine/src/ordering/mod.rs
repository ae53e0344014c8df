// Display ordering for rows (natural order) and vendor columns (by a reference row's price).
pub mod columns;
pub mod natural;

pub use columns::{sort_vendors_by_row, SortDirection};
pub use natural::NaturalSorter;
