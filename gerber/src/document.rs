//! Holds the parsed node sequence and offers the typed accessors and
//! round-trip operations the rest of the crate is built around.

use crate::error::GerberError;
use crate::node::{ApertureDefinition, Attribute, FormatSpecification, Node, Operation, UnitMode};
use crate::parser;
use crate::tokenizer;

/// Something that can be appended to a [`Document`]: either an already
/// built [`Node`], or Gerber source text to parse and splice in.
pub enum Addable {
    Node(Node),
    Source(String),
}

impl From<Node> for Addable {
    fn from(node: Node) -> Self {
        Addable::Node(node)
    }
}

impl From<&str> for Addable {
    fn from(source: &str) -> Self {
        Addable::Source(source.to_string())
    }
}

impl From<String> for Addable {
    fn from(source: String) -> Self {
        Addable::Source(source)
    }
}

/// An ordered sequence of [`Node`]s. A `Document` owns its nodes
/// exclusively; nothing else holds a reference into it, and nodes are
/// otherwise immutable once parsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` into a `Document`. Never fails: unrecognized or
    /// malformed input becomes [`Node::UnknownCommand`] or a best-effort
    /// node rather than an error.
    pub fn parse(source: &str) -> Self {
        let tokens = tokenizer::tokenize(source);
        let nodes = parser::parse(&tokens);
        Document { nodes }
    }

    /// Parse `source` and require it to yield exactly one node. The one
    /// fallible surface in the crate.
    pub fn parse_single(source: &str) -> Result<Node, GerberError> {
        let doc = Self::parse(source);
        let mut nodes = doc.nodes;
        if nodes.len() == 1 {
            Ok(nodes.pop().unwrap())
        } else {
            Err(GerberError::ExpectedSingleCommand(nodes.len()))
        }
    }

    /// Append a node, or parse and append the nodes from a source
    /// fragment.
    pub fn add_command(&mut self, input: impl Into<Addable>) {
        match input.into() {
            Addable::Node(node) => self.nodes.push(node),
            Addable::Source(source) => {
                let tokens = tokenizer::tokenize(&source);
                self.nodes.extend(parser::parse(&tokens));
            }
        }
    }

    /// Append an [`Node::EndOfFile`] if the document doesn't already end
    /// with one.
    pub fn ensure_end_of_file(&mut self) {
        if !matches!(self.nodes.last(), Some(Node::EndOfFile)) {
            self.nodes.push(Node::EndOfFile);
        }
    }

    /// The node sequence, in parse order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Re-emit the document as Gerber source text: each node's
    /// serialization, one per line, with a trailing newline.
    pub fn get_string(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&node.to_gerber());
            out.push('\n');
        }
        out
    }

    pub fn format_specification(&self) -> Option<&FormatSpecification> {
        self.nodes.iter().find_map(|n| match n {
            Node::FormatSpecification(fs) => Some(fs),
            _ => None,
        })
    }

    pub fn unit_mode(&self) -> Option<UnitMode> {
        self.nodes.iter().find_map(|n| match n {
            Node::UnitMode(u) => Some(*u),
            _ => None,
        })
    }

    pub fn aperture_definitions(&self) -> impl Iterator<Item = &ApertureDefinition> {
        self.nodes.iter().filter_map(|n| match n {
            Node::ApertureDefinition(ad) => Some(ad),
            _ => None,
        })
    }

    pub fn file_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.nodes.iter().filter_map(|n| match n {
            Node::FileAttribute(attr) => Some(attr),
            _ => None,
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Operation(op) => Some(op),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ApertureId, DCode};
    use indoc::indoc;

    #[test]
    fn minimal_move_and_draw() {
        let doc = Document::parse(indoc! {"
            %FSLAX26Y26*%
            %MOMM*%
            %ADD10C,0.1*%
            D10*
            X0Y0D02*
            X1000000Y1000000D01*
            M02*
        "});

        assert_eq!(doc.nodes().len(), 7);
        assert_eq!(doc.unit_mode(), Some(UnitMode::Millimetres));
        assert_eq!(doc.aperture_definitions().count(), 1);
        assert_eq!(doc.operations().count(), 2);
        assert_eq!(
            doc.nodes()[3],
            Node::SelectAperture(ApertureId::new(10).unwrap())
        );
        assert_eq!(doc.operations().last().unwrap().d_code, DCode::Interpolate);
    }

    #[test]
    fn parse_single_requires_exactly_one_node() {
        assert!(Document::parse_single("M02*").is_ok());
        assert!(Document::parse_single("M02*M02*").is_err());
        assert!(Document::parse_single("").is_err());
    }

    #[test]
    fn ensure_end_of_file_is_idempotent() {
        let mut doc = Document::parse("M02*");
        doc.ensure_end_of_file();
        assert_eq!(doc.nodes().len(), 1);

        let mut doc = Document::parse("G04 hi*");
        doc.ensure_end_of_file();
        assert_eq!(doc.nodes().len(), 2);
        assert_eq!(doc.nodes()[1], Node::EndOfFile);
    }

    #[test]
    fn add_command_accepts_source_or_node() {
        let mut doc = Document::new();
        doc.add_command("G04 hello*");
        doc.add_command(Node::EndOfFile);
        assert_eq!(doc.nodes().len(), 2);
        assert_eq!(doc.comments().collect::<Vec<_>>(), vec!["hello"]);
    }

    #[test]
    fn get_string_round_trips_recognized_constructs() {
        let source = "%FSLAX26Y26*%\n%MOMM*%\nM02*\n";
        let doc = Document::parse(source);
        assert_eq!(doc.get_string(), source);
    }
}
