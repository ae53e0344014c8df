// Sheet loading and the long-to-wide pivot.
pub mod column_resolver;
pub mod csv_parser;
pub mod price_book;
pub mod price_table;
pub mod spec_combiner;
pub mod tokens;
