//! CSV-backed record sources for the datagen engine.
//!
//! A [`RecordTable`] is an immutable parsed CSV dataset: an ordered list of
//! rows, each a sequence of string fields addressed by header name (or a
//! synthetic `column_N` name when the file has no header row). Tables are
//! shared behind `Arc` and never copied.
//!
//! A [`RecordReader`] selects rows from a shared table according to one of
//! four policies:
//!
//! - `sequential` - rows in file order, hard failure once exhausted
//! - `circular` - rows in file order, wrapping back to row 0
//! - `random` - a uniformly random row each call, repeats allowed
//! - `weighted` - a random row with probability proportional to a numeric
//!   column's value
//!
//! Only the cursor state is per-reader; cloning a reader duplicates its
//! cursor over the same table.

mod reader;
mod settings;
mod table;

pub use reader::RecordReader;
pub use settings::CsvSettings;
pub use table::{RecordTable, SourceError};
