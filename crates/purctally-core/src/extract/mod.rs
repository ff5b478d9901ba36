//! Invoice field extraction.

mod cleaning;
mod extractor;
mod scanner;

pub use cleaning::{clean_value, first_line, truncate_chars};
pub use extractor::FieldExtractor;
pub use scanner::{InvoiceScanner, UNREADABLE_IMAGE};
