//! Result classification and formatting
//!
//! Backend payloads are partitioned into [`ResultCategory`] blocks by the
//! [`ResultClassifier`] and rendered by the [`ResponseFormatter`].

mod classifier;
mod formatter;
mod types;

pub use classifier::ResultClassifier;
pub use formatter::ResponseFormatter;
pub use types::*;
