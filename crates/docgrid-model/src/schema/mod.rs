//! Schema: the node types a document may use and how they nest.
//!
//! A [`Schema`] is compiled from a serialisable [`SchemaSpec`] (usually read
//! from configuration, or [`SchemaSpec::basic`]). Every [`Node`] carries a
//! [`NodeType`] handle back into its schema, so validity checks never need
//! the schema passed around separately.

mod basic;
mod content;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::attrs::{AttrValue, Attrs};
use crate::error::{ModelError, Result};
use crate::fragment::Fragment;
use crate::mark::Mark;
use crate::node::Node;
use content::ContentExpr;

fn default_top_node() -> String {
    "doc".to_string()
}

/// Serialisable description of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Name of the node type at the root of every document.
    #[serde(default = "default_top_node")]
    pub top_node: String,
    /// Mark type names.
    #[serde(default)]
    pub marks: Vec<String>,
    /// Node types in priority order: when several types could fill a slot,
    /// the earliest one wins.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// Serialisable description of one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Content expression; empty for leaf nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Space separated group names this type belongs to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_role: Option<TableRole>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, AttrSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
            group: String::new(),
            inline: false,
            table_role: None,
            attrs: BTreeMap::new(),
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    pub fn table_role(mut self, role: TableRole) -> Self {
        self.table_role = Some(role);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, default: Option<AttrValue>) -> Self {
        self.attrs.insert(name.into(), AttrSpec { default });
        self
    }
}

/// Attribute declaration. A missing default means `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
}

/// Part a node type plays in table structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Table,
    Row,
    Cell,
    HeaderCell,
}

impl TableRole {
    pub fn is_cell(self) -> bool {
        matches!(self, TableRole::Cell | TableRole::HeaderCell)
    }
}

#[derive(Debug)]
struct TypeData {
    name: String,
    groups: Vec<String>,
    inline: bool,
    content: ContentExpr,
    default_attrs: Attrs,
    table_role: Option<TableRole>,
}

#[derive(Debug)]
struct SchemaData {
    spec: SchemaSpec,
    types: Vec<TypeData>,
    by_name: HashMap<String, usize>,
    top: usize,
    text: usize,
}

/// A compiled schema. Cheap to clone.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaData>,
}

impl Schema {
    /// Compile a schema from its description.
    pub fn new(spec: SchemaSpec) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (index, node) in spec.nodes.iter().enumerate() {
            by_name.entry(node.name.clone()).or_insert(index);
        }
        let top = *by_name
            .get(&spec.top_node)
            .ok_or_else(|| ModelError::MissingNodeType(spec.top_node.clone()))?;
        let text = *by_name
            .get("text")
            .ok_or_else(|| ModelError::MissingNodeType("text".to_string()))?;

        let groups: Vec<Vec<String>> = spec
            .nodes
            .iter()
            .map(|node| node.group.split_whitespace().map(str::to_string).collect())
            .collect();

        let resolve = |name: &str| -> Option<Vec<usize>> {
            if let Some(index) = by_name.get(name) {
                return Some(vec![*index]);
            }
            let members: Vec<usize> = groups
                .iter()
                .enumerate()
                .filter(|(_, node_groups)| node_groups.iter().any(|group| group == name))
                .map(|(index, _)| index)
                .collect();
            (!members.is_empty()).then_some(members)
        };

        let mut types = Vec::with_capacity(spec.nodes.len());
        for (node, node_groups) in spec.nodes.iter().zip(&groups) {
            let content = ContentExpr::parse(&node.content, &resolve)?;
            let default_attrs = node
                .attrs
                .iter()
                .map(|(name, attr)| {
                    (name.clone(), attr.default.clone().unwrap_or(AttrValue::Null))
                })
                .collect();
            types.push(TypeData {
                name: node.name.clone(),
                groups: node_groups.clone(),
                inline: node.inline,
                content,
                default_attrs,
                table_role: node.table_role,
            });
        }

        log::debug!("compiled schema with {} node types", types.len());

        Ok(Self {
            inner: Arc::new(SchemaData {
                spec,
                types,
                by_name,
                top,
                text,
            }),
        })
    }

    /// The built-in schema with paragraphs, headings, blockquotes and tables.
    pub fn basic() -> Self {
        Self::new(SchemaSpec::basic()).expect("Invalid built-in schema")
    }

    pub fn spec(&self) -> &SchemaSpec {
        &self.inner.spec
    }

    pub fn ptr_eq(a: &Schema, b: &Schema) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn node_type(&self, name: &str) -> Result<NodeType> {
        self.inner
            .by_name
            .get(name)
            .map(|index| self.type_at(*index))
            .ok_or_else(|| ModelError::UnknownNodeType(name.to_string()))
    }

    pub fn top_node_type(&self) -> NodeType {
        self.type_at(self.inner.top)
    }

    pub fn node_types(&self) -> impl Iterator<Item = NodeType> + '_ {
        (0..self.inner.types.len()).map(|index| self.type_at(index))
    }

    /// Create a checked node of the named type.
    pub fn node(
        &self,
        name: &str,
        attrs: Attrs,
        content: impl Into<Fragment>,
        marks: Vec<Mark>,
    ) -> Result<Node> {
        self.node_type(name)?.create(attrs, content.into(), marks)
    }

    /// Create a text node. Empty text is rejected.
    pub fn text(&self, text: impl Into<String>, marks: Vec<Mark>) -> Result<Node> {
        let text = text.into();
        if text.is_empty() {
            return Err(ModelError::EmptyText);
        }
        Ok(Node::new_text(self.type_at(self.inner.text), text, marks))
    }

    pub fn mark(&self, name: &str, attrs: Attrs) -> Result<Mark> {
        if self.inner.spec.marks.iter().any(|mark| mark == name) {
            Ok(Mark::new(name, attrs))
        } else {
            Err(ModelError::UnknownMarkType(name.to_string()))
        }
    }

    fn type_at(&self, index: usize) -> NodeType {
        NodeType {
            schema: self.clone(),
            index,
        }
    }

    /// Index of a node type inside this schema, matching foreign types by name.
    fn index_of(&self, node_type: &NodeType) -> Option<usize> {
        if Schema::ptr_eq(self, &node_type.schema) {
            Some(node_type.index)
        } else {
            self.inner.by_name.get(node_type.name()).copied()
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.inner.types.iter().map(|t| t.name.as_str()).collect();
        f.debug_struct("Schema")
            .field("top_node", &self.inner.spec.top_node)
            .field("nodes", &names)
            .finish()
    }
}

/// Handle to one node type of a [`Schema`].
#[derive(Clone)]
pub struct NodeType {
    schema: Schema,
    index: usize,
}

impl NodeType {
    fn data(&self) -> &TypeData {
        &self.schema.inner.types[self.index]
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn table_role(&self) -> Option<TableRole> {
        self.data().table_role
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.data().groups.iter().any(|g| g == group)
    }

    pub fn is_text(&self) -> bool {
        self.index == self.schema.inner.text
    }

    pub fn is_inline(&self) -> bool {
        self.is_text() || self.data().inline
    }

    pub fn is_leaf(&self) -> bool {
        self.data().content.is_empty()
    }

    /// Whether this type holds inline content (text and inline nodes).
    pub fn inline_content(&self) -> bool {
        self.data()
            .content
            .first_choice()
            .is_some_and(|index| self.schema.type_at(index).is_inline())
    }

    /// A block whose content is inline: the only place a cursor can rest.
    pub fn is_textblock(&self) -> bool {
        !self.is_inline() && self.inline_content()
    }

    pub fn default_attrs(&self) -> &Attrs {
        &self.data().default_attrs
    }

    /// Defaults overlaid with the given values. Unknown names are dropped.
    pub fn compute_attrs(&self, given: &Attrs) -> Attrs {
        let mut attrs = self.default_attrs().clone();
        for (name, value) in given {
            if let Some(slot) = attrs.get_mut(name) {
                *slot = value.clone();
            }
        }
        attrs
    }

    fn child_indices<'a>(&self, nodes: impl Iterator<Item = &'a Node>) -> Vec<Option<usize>> {
        nodes
            .map(|node| self.schema.index_of(node.node_type()))
            .collect()
    }

    /// Whether `content` satisfies this type's content expression.
    pub fn valid_content(&self, content: &Fragment) -> bool {
        self.data().content.matches(&self.child_indices(content.iter()))
    }

    /// Whether replacing children `from..to` of `content` with one node of
    /// `node_type` leaves valid content.
    pub fn can_replace_with(
        &self,
        content: &Fragment,
        from: usize,
        to: usize,
        node_type: &NodeType,
    ) -> bool {
        if from > to || to > content.child_count() {
            return false;
        }
        let mut children = self.child_indices(content.iter().take(from));
        children.push(self.schema.index_of(node_type));
        children.extend(self.child_indices(content.iter().skip(to)));
        self.data().content.matches(&children)
    }

    /// Whether replacing children `from..to` of `content` with `replacement`
    /// leaves valid content.
    pub fn can_replace(
        &self,
        content: &Fragment,
        from: usize,
        to: usize,
        replacement: &Fragment,
    ) -> bool {
        if from > to || to > content.child_count() {
            return false;
        }
        let children = self.child_indices(
            content
                .iter()
                .take(from)
                .chain(replacement.iter())
                .chain(content.iter().skip(to)),
        );
        self.data().content.matches(&children)
    }

    /// Minimal content this type accepts, built from the first fillable
    /// choice of every required term. `None` when the type can only be
    /// satisfied by text or by itself.
    pub fn fill_content(&self) -> Option<Fragment> {
        self.fill_content_inner(&mut vec![self.index])
    }

    fn fill_content_inner(&self, visiting: &mut Vec<usize>) -> Option<Fragment> {
        let mut nodes = Vec::new();
        for term in &self.data().content.terms {
            for _ in 0..term.min {
                let node = term.choices.iter().find_map(|&index| {
                    let candidate = self.schema.type_at(index);
                    if candidate.is_text() || visiting.contains(&index) {
                        return None;
                    }
                    visiting.push(index);
                    let filled = candidate.fill_content_inner(visiting);
                    visiting.pop();
                    filled.map(|content| {
                        Node::new_element(
                            candidate.clone(),
                            candidate.default_attrs().clone(),
                            content,
                            Vec::new(),
                        )
                    })
                })?;
                nodes.push(node);
            }
        }
        Some(Fragment::from_nodes(nodes))
    }

    /// Create a node with default attributes and minimal valid content.
    pub fn create_and_fill(&self) -> Option<Node> {
        let content = self.fill_content()?;
        Some(Node::new_element(
            self.clone(),
            self.default_attrs().clone(),
            content,
            Vec::new(),
        ))
    }

    /// Create a node, rejecting content the type does not accept.
    pub fn create(&self, attrs: Attrs, content: Fragment, marks: Vec<Mark>) -> Result<Node> {
        if self.is_text() || !self.valid_content(&content) {
            return Err(ModelError::InvalidContent {
                node_type: self.name().to_string(),
            });
        }
        Ok(self.create_unchecked(attrs, content, marks))
    }

    /// Create a node without checking its content.
    pub fn create_unchecked(&self, attrs: Attrs, content: Fragment, marks: Vec<Mark>) -> Node {
        Node::new_element(self.clone(), self.compute_attrs(&attrs), content, marks)
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && Schema::ptr_eq(&self.schema, &other.schema)
    }
}

impl Eq for NodeType {}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({})", self.name())
    }
}
