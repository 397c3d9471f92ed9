//! Edits: step maps that track how positions move, and the transaction
//! value that threads a document and selection through a chain of edits.

mod step_map;
mod transaction;

pub use step_map::{Assoc, Mapping, StepMap};
pub use transaction::Transaction;
