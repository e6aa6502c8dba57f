//! Symbol dictionary
//!
//! Append-only mapping between a low-cardinality text column's string
//! values and integer keys.

mod table;

pub use table::{SymbolKey, SymbolLookup, SymbolTable};
