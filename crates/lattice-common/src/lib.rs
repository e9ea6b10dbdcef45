pub mod address;
pub mod error;
pub mod value;

pub use address::{fqk, AddressError, CellId};
pub use error::ErrorKind;
pub use value::{classify_literal, Value};
