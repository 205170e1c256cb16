//! Parse, round-trip, and render Gerber (RS-274X/X2) PCB layer files.
//!
//! ## Current Limitations
//!
//! * Arcs are approximated as straight-line segments when rendered.
//! * Aperture macro bodies are carried structurally but never evaluated.
//! * Step-and-repeat blocks are preserved but never expanded.
//!
//! ## Implementation Notes
//!
//! The official grammar[^1] is a PEG, and an earlier revision of this
//! crate tried converting it directly into a `nom` parser-combinator
//! pipeline. That stalled: the grammar is mode-sensitive (a `D01` means
//! something different inside a region than outside one, `X`/`Y` fields
//! are modal across commands), which doesn't fit a combinator built to
//! consume a fixed grammar top to bottom. What's here instead is a
//! two-stage pipeline: a delimiter-only [`tokenizer`] followed by a
//! [`parser`] that dispatches on each token's recognized prefix and
//! tracks mode as it goes, with `nom` kept for what it's good at,
//! parsing the numeric and name primitives in [`primitive`].
//!
//! [^1]: "Gerber Layer Format Specification - Revision 2024.05" from
//!   [Ucamco Downloads](https://www.ucamco.com/en/gerber/downloads)

pub mod attribute;
pub mod document;
pub mod error;
pub mod node;
pub mod parser;
pub mod primitive;
pub mod render;
pub mod tokenizer;

pub use document::Document;
pub use error::GerberError;
pub use node::Node;
pub use render::{render_gerber_to_svg, RenderOptions};

/// Parse a complete Gerber source file into a [`Document`]. Never fails;
/// see [`Document::parse`] for how malformed input is handled.
pub fn parse_gerber_file(source: &str) -> Document {
    Document::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_and_renders_a_small_file() {
        let doc = parse_gerber_file(indoc! {"
            G04 Different command styles*
            %FSLAX26Y26*%
            %MOMM*%
            %ADD10C,0.1*%
            D10*
            X0Y0D02*
            X2000000Y0D01*
            M02*
        "});

        assert_eq!(doc.comments().collect::<Vec<_>>(), vec!["Different command styles"]);
        assert_eq!(doc.aperture_definitions().count(), 1);
        assert_eq!(doc.operations().count(), 2);

        let svg = render_gerber_to_svg(&doc, &RenderOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<line"));
    }
}
