#![deny(missing_docs)]
#![doc = "Tabular data model and error surface shared by the pacstat merge and gain tooling."]

pub mod cell;
pub mod errors;
pub mod table;

pub use cell::{Cell, NOT_APPLICABLE};
pub use errors::{ErrorInfo, PacError};
pub use table::{union_headers, Record, Table};
