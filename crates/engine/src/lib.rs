//! Repairs bank-exported QBO statement files so QuickBooks can import and
//! categorize transactions reliably.
//!
//! Banks put verbose, redundant text in `<MEMO>` and the most useful
//! identifying text in the wrong field. The engine segments a statement into
//! transaction blocks, strips boilerplate noise out of the memo, and rewrites
//! `<NAME>`/`<MEMO>` so the concise identifier lands in the field QuickBooks
//! matches on.

pub mod filter;
pub mod record;
pub mod statement;
pub mod transform;

pub use filter::{FilterConfig, FilterError, NoiseFilter, NoiseRule};
pub use record::TaggedRecord;
pub use statement::{repair_statement, FileHeader, RepairError, RepairedStatement};
