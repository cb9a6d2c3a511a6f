//! Converts CSV bank exports into the tagged QBO statement format the
//! repair engine emits, so both download styles end up importable the same
//! way. Currently understands Schwab checking exports.

pub mod qbo;
pub mod schwab;

pub use qbo::BankProfile;
pub use schwab::{convert_csv, ConvertError, ConvertedStatement};
