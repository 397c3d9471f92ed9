//! # docgrid-model
//!
//! The document model the docgrid engine works on: a schema-checked,
//! persistent node tree addressed by integer positions.
//!
//! ## Positions
//!
//! Every node and every gap between nodes has a position. Entering or
//! leaving a non-leaf node costs one position, each character of text one
//! position and each leaf node one position:
//!
//! ```text
//! doc(table(table_row(table_cell(paragraph("1")))))
//!
//!  0 table 1 row 2 cell 3 paragraph 4 "1" 5 /paragraph 6 /cell 7 /row 8 /table 9
//! ```
//!
//! [`Node::resolve`] turns a position into a [`ResolvedPos`], the chain of
//! ancestors around it with the child index at every depth.
//!
//! ## Module Structure
//!
//! ```text
//! docgrid-model/
//! ├── lib.rs           # This file - public API
//! ├── error.rs         # ModelError
//! ├── attrs.rs         # Attribute values
//! ├── mark.rs          # Inline marks
//! ├── schema/          # SchemaSpec, Schema, NodeType, content expressions
//! ├── node.rs          # Node
//! ├── fragment.rs      # Fragment
//! ├── resolved.rs      # ResolvedPos
//! ├── selection.rs     # Text, node and cell selections
//! ├── transform/       # StepMap, Mapping, Transaction
//! └── builder.rs       # Tagged fixture builders (feature `test-fixtures`)
//! ```
//!
//! ## Edits
//!
//! Nodes are immutable and shared through `Arc`. A [`Transaction`] edit
//! rebuilds only the path from the changed node to the root; every other
//! subtree is shared with the previous document.

pub mod attrs;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod builder;
pub mod error;
pub mod fragment;
pub mod mark;
pub mod node;
pub mod resolved;
pub mod schema;
pub mod selection;
pub mod transform;

pub use attrs::{AttrValue, Attrs, attrs};
pub use error::{ModelError, Result};
pub use fragment::Fragment;
pub use mark::Mark;
pub use node::Node;
pub use resolved::ResolvedPos;
pub use schema::{AttrSpec, NodeSpec, NodeType, Schema, SchemaSpec, TableRole};
pub use selection::{CellSelection, NodeSelection, Selection, TextSelection};
pub use transform::{Assoc, Mapping, StepMap, Transaction};
