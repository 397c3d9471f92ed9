use super::{NodeSpec, SchemaSpec, TableRole};
use crate::attrs::AttrValue;

impl SchemaSpec {
    /// Paragraphs, headings, blockquotes, rules, hard breaks and tables.
    ///
    /// `paragraph` comes first in group `block`, so filling any block slot
    /// produces an empty paragraph.
    pub fn basic() -> Self {
        let cell = |name: &str, role: TableRole| {
            NodeSpec::new(name)
                .content("block+")
                .table_role(role)
                .attr("colspan", Some(AttrValue::Int(1)))
                .attr("rowspan", Some(AttrValue::Int(1)))
                .attr("colwidth", None)
        };

        Self {
            top_node: "doc".to_string(),
            marks: vec!["strong".to_string(), "em".to_string()],
            nodes: vec![
                NodeSpec::new("doc").content("block+"),
                NodeSpec::new("paragraph").content("inline*").group("block"),
                NodeSpec::new("blockquote").content("block+").group("block"),
                NodeSpec::new("heading")
                    .content("inline*")
                    .group("block")
                    .attr("level", Some(AttrValue::Int(1))),
                NodeSpec::new("horizontal_rule").group("block"),
                NodeSpec::new("table")
                    .content("table_row+")
                    .group("block")
                    .table_role(TableRole::Table),
                NodeSpec::new("table_row")
                    .content("(table_cell | table_header)*")
                    .table_role(TableRole::Row),
                cell("table_cell", TableRole::Cell),
                cell("table_header", TableRole::HeaderCell),
                NodeSpec::new("text").group("inline").inline(),
                NodeSpec::new("hard_break").group("inline").inline(),
            ],
        }
    }
}
