//! Result rendering: the table model and its presentations.
//!
//! [`ResultTable`] is the single shared view state. It is replaced
//! wholesale on every successful search; detail containers are the only
//! part mutated in place.

pub mod detail;
pub mod table;
pub mod text;

pub use detail::pretty_payload;
pub use table::ResultTable;
pub use text::render_table;
