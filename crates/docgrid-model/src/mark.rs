use std::fmt;

use crate::attrs::Attrs;

/// An inline annotation carried by a node (emphasis, links, ...).
///
/// Marks are compared by type name and attributes; the schema checks the
/// name when a mark is created through [`crate::Schema::mark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    type_name: String,
    attrs: Attrs,
}

impl Mark {
    pub(crate) fn new(type_name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}
