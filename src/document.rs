//! In-memory host document model
//!
//! A [`Document`] owns an ordered list of [`Page`]s, each holding a tree of
//! [`Node`]s. The JSON shape mirrors what design tools export: nodes carry a
//! `type`, an optional `children` array and optional `width`/`height`.

use crate::tree::{Geometry, NodeTree};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Ownership root: an ordered sequence of pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Parse a document from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::decode(&mut serde_json::Deserializer::from_str(s))
    }

    /// Parse a document from any reader producing JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::decode(&mut serde_json::Deserializer::from_reader(reader))
    }

    // Node trees nest two JSON levels per node, so serde_json's default
    // limit of 128 is lifted and the stack grows on demand instead.
    fn decode<'de, R: serde_json::de::Read<'de>>(
        de: &mut serde_json::Deserializer<R>,
    ) -> Result<Self> {
        de.disable_recursion_limit();
        let doc = Document::deserialize(serde_stacker::Deserializer::new(&mut *de))?;
        de.end()?;
        Ok(doc)
    }

    /// A document whose pages are those of `a` followed by those of `b`.
    pub fn concat(a: &Document, b: &Document) -> Document {
        Document {
            pages: a.pages.iter().chain(b.pages.iter()).cloned().collect(),
        }
    }

    pub fn page_names(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.name.clone()).collect()
    }
}

/// A named top-level container of nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Page {
    pub fn new(name: &str, children: Vec<Node>) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            children,
        }
    }
}

/// Kind of a node. The aggregation never looks at it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Frame,
    Group,
    Component,
    Instance,
    Section,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Vector,
    Line,
    Text,
    BooleanOperation,
    Slice,
    #[default]
    #[serde(other)]
    Other,
}

/// A tree element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Non-numeric dimensions decode as absent; the node then has no geometry.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

impl Node {
    /// A node with no children attribute and no geometry
    pub fn new(id: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children);
        self
    }
}

impl NodeTree for Node {
    fn children(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }

    fn geometry(&self) -> Option<Geometry> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Geometry::new(w, h)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_json() {
        let json = r#"{
            "pages": [
                {"id": "0:1", "name": "Cover", "children": [
                    {"id": "1:2", "type": "FRAME", "width": 100, "height": 50, "children": [
                        {"id": "1:3", "type": "RECTANGLE", "width": 20, "height": 10}
                    ]},
                    {"id": "1:4", "type": "STICKY"}
                ]}
            ]
        }"#;
        let doc = Document::from_json_str(json).unwrap();
        assert_eq!(doc.page_names(), vec!["Cover".to_string()]);
        let frame = &doc.pages[0].children[0];
        assert_eq!(frame.kind, NodeKind::Frame);
        assert_eq!(frame.children.as_ref().unwrap()[0].geometry(), Some(Geometry::new(20.0, 10.0)));
        assert_eq!(doc.pages[0].children[1].kind, NodeKind::Other);
    }

    #[test]
    fn half_geometry_is_absent() {
        let mut n = Node::new("1", NodeKind::Rectangle);
        n.width = Some(4.0);
        assert!(n.geometry().is_none());
    }

    #[test]
    fn malformed_json_is_a_document_error() {
        let err = Document::from_json_str("{\"pages\": 3}").unwrap_err();
        assert!(matches!(err, crate::Error::Document(_)));
    }

    #[test]
    fn non_numeric_dimension_drops_geometry() {
        let json = r#"{"pages": [{"name": "P", "children": [
            {"type": "RECTANGLE", "width": "wide", "height": 5},
            {"type": "RECTANGLE", "width": null, "height": {"px": 5}},
            {"type": "RECTANGLE", "width": 2, "height": 3}
        ]}]}"#;
        let doc = Document::from_json_str(json).unwrap();
        let nodes = &doc.pages[0].children;
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].width, None);
        assert_eq!(nodes[0].height, Some(5.0));
        assert!(nodes[0].geometry().is_none());
        assert!(nodes[1].geometry().is_none());
        assert_eq!(crate::tree::leaf_area(nodes), 6.0);
    }

    #[test]
    fn deeply_nested_document_decodes() {
        let depth = 500;
        let mut json = String::from(r#"{"type": "RECTANGLE", "width": 4, "height": 3}"#);
        for _ in 0..depth {
            json = format!(r#"{{"type": "FRAME", "children": [{}]}}"#, json);
        }
        let json = format!(r#"{{"pages": [{{"name": "Deep", "children": [{}]}}]}}"#, json);

        let doc = Document::from_json_str(&json).unwrap();
        assert_eq!(crate::tree::leaf_area(&doc.pages[0].children), 12.0);

        let doc = Document::from_reader(json.as_bytes()).unwrap();
        assert_eq!(crate::tree::leaves(&doc.pages[0].children).count(), 1);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = Document::from_json_str(r#"{"pages": []} x"#).unwrap_err();
        assert!(matches!(err, crate::Error::Document(_)));
    }

    #[test]
    fn absent_children_stays_absent_on_roundtrip() {
        let n = Node::new("1", NodeKind::Text);
        let s = serde_json::to_string(&n).unwrap();
        assert!(!s.contains("children"));
        let empty = Node::new("2", NodeKind::Group).with_children(vec![]);
        let s = serde_json::to_string(&empty).unwrap();
        assert!(s.contains("\"children\":[]"));
    }
}
