//! Declarative description of the element's visual structure.

use std::fmt::{self, Write as _};

pub const MAP_ID: &str = "map";
pub const INPUT_FIELDS_SLOT: &str = "input-fields";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element {
        tag: &'static str,
        id: Option<&'static str>,
        class: &'static str,
        children: Vec<Node>,
    },
    Text(String),
    Slot(&'static str),
}

impl Node {
    pub fn div(class: &'static str, children: Vec<Node>) -> Self {
        Node::Element {
            tag: "div",
            id: None,
            class,
            children,
        }
    }

    pub fn with_id(mut self, new_id: &'static str) -> Self {
        if let Node::Element { id, .. } = &mut self {
            *id = Some(new_id);
        }
        self
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn find_by_id(&self, wanted: &str) -> Option<&Node> {
        match self {
            Node::Element { id, children, .. } => {
                if *id == Some(wanted) {
                    Some(self)
                } else {
                    children.iter().find_map(|c| c.find_by_id(wanted))
                }
            }
            _ => None,
        }
    }

    pub fn find_by_class(&self, wanted: &str) -> Option<&Node> {
        match self {
            Node::Element {
                class, children, ..
            } => {
                if *class == wanted {
                    Some(self)
                } else {
                    children.iter().find_map(|c| c.find_by_class(wanted))
                }
            }
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Element { children, .. } => children.iter().map(Node::text_content).collect(),
            Node::Text(t) => t.clone(),
            Node::Slot(_) => String::new(),
        }
    }
}

/// Renders as compact HTML.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element {
                tag,
                id,
                class,
                children,
            } => {
                write!(f, "<{tag}")?;
                if let Some(id) = id {
                    write!(f, " id=\"{id}\"")?;
                }
                write!(f, " class=\"{class}\">")?;
                for child in children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{tag}>")
            }
            Node::Text(text) => {
                for c in text.chars() {
                    match c {
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '&' => f.write_str("&amp;")?,
                        c => f.write_char(c)?,
                    }
                }
                Ok(())
            }
            Node::Slot(name) => write!(f, "<slot name=\"{name}\"></slot>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_escapes_text() {
        let node = Node::div("a", vec![Node::text("1 < 2 & 3"), Node::Slot("s")]).with_id("x");
        assert_eq!(
            node.to_string(),
            r#"<div id="x" class="a">1 &lt; 2 &amp; 3<slot name="s"></slot></div>"#
        );
    }

    #[test]
    fn find_nested() {
        let node = Node::div(
            "outer",
            vec![Node::div("inner", vec![Node::text("hi")]).with_id("target")],
        );
        assert_eq!(node.find_by_id("target").unwrap().text_content(), "hi");
        assert!(node.find_by_class("inner").is_some());
        assert!(node.find_by_id("missing").is_none());
    }
}
