//! AST replay to SVG. A single forward pass over the document's node
//! sequence drives a small graphics-state machine. The state machine's
//! shape follows Gerber's modal semantics rather than a general
//! vector-graphics model, since region mode changes what D01/D02 even
//! mean.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::document::Document;
use crate::node::{ApertureDefinition, DCode, InterpolationMode, Node, Operation, Polarity, UnitMode};

/// Options accepted by [`render_gerber_to_svg`]. The defaults give a
/// visible stroke and fill on a transparent canvas with a small margin.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub scale: f64,
    pub stroke_color: String,
    pub fill_color: String,
    pub background_color: String,
    pub padding: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            scale: 1.0,
            stroke_color: "#000".to_string(),
            fill_color: "#000".to_string(),
            background_color: "none".to_string(),
            padding: 0.1,
        }
    }
}

/// The default decimal-digit count used for coordinate conversion when no
/// [`crate::node::FormatSpecification`] has been seen yet.
const DEFAULT_DECIMAL_DIGITS: u32 = 4;

fn to_real(value: i64, decimal_digits: u32) -> f64 {
    value as f64 / 10f64.powi(decimal_digits as i32)
}

#[derive(Clone, Copy, Debug)]
struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    has_data: bool,
}

impl BoundingBox {
    fn empty() -> Self {
        BoundingBox {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            has_data: false,
        }
    }

    fn update_point(&mut self, x: f64, y: f64) {
        if !self.has_data {
            self.min_x = x;
            self.max_x = x;
            self.min_y = y;
            self.max_y = y;
            self.has_data = true;
        } else {
            self.min_x = self.min_x.min(x);
            self.max_x = self.max_x.max(x);
            self.min_y = self.min_y.min(y);
            self.max_y = self.max_y.max(y);
        }
    }

    fn update_disk(&mut self, cx: f64, cy: f64, r: f64) {
        self.update_point(cx - r, cy - r);
        self.update_point(cx + r, cy + r);
    }

    fn update_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64) {
        self.update_point(cx - w / 2.0, cy - h / 2.0);
        self.update_point(cx + w / 2.0, cy + h / 2.0);
    }
}

/// The transient state a single replay pass owns: current point, modal
/// settings, the aperture table built up as `ApertureDefinition` nodes
/// are encountered, and the three output accumulators. Not reused across
/// documents; build a fresh one per [`render_gerber_to_svg`] call.
struct RenderState {
    current_x: f64,
    current_y: f64,
    selected_aperture: Option<i32>,
    interpolation_mode: InterpolationMode,
    region_mode: bool,
    #[allow(dead_code)] // preserved for fidelity; dark/clear compositing is a non-goal
    polarity: Polarity,
    #[allow(dead_code)]
    unit: UnitMode,
    format: Option<crate::node::FormatSpecification>,
    bbox: BoundingBox,
    aperture_table: HashMap<i32, ApertureDefinition>,
    region_paths: Vec<String>,
    traces: Vec<String>,
    flashes: Vec<String>,
    current_region_path: Option<String>,
}

impl RenderState {
    fn new() -> Self {
        RenderState {
            current_x: 0.0,
            current_y: 0.0,
            selected_aperture: None,
            interpolation_mode: InterpolationMode::Linear,
            region_mode: false,
            polarity: Polarity::Dark,
            unit: UnitMode::Inches,
            format: None,
            bbox: BoundingBox::empty(),
            aperture_table: HashMap::new(),
            region_paths: Vec::new(),
            traces: Vec::new(),
            flashes: Vec::new(),
            current_region_path: None,
        }
    }

    /// Each axis gets its own decimal-digit count from the format
    /// specification, rather than reusing the X count for Y. See
    /// DESIGN.md for the reasoning.
    fn decimal_digits(&self) -> (u32, u32) {
        match &self.format {
            Some(fs) => (fs.x_decimal_digits, fs.y_decimal_digits),
            None => {
                log::debug!(
                    "operation before format specification, defaulting decimal digits to {DEFAULT_DECIMAL_DIGITS}"
                );
                (DEFAULT_DECIMAL_DIGITS, DEFAULT_DECIMAL_DIGITS)
            }
        }
    }

    fn apply(&mut self, node: &Node, options: &RenderOptions) {
        match node {
            Node::FormatSpecification(fs) => self.format = Some(*fs),
            Node::UnitMode(u) => self.unit = *u,
            Node::ApertureDefinition(ad) => {
                self.aperture_table.insert(ad.code, ad.clone());
            }
            Node::SelectAperture(id) => self.selected_aperture = Some(id.code()),
            Node::SetInterpolationMode(mode) => self.set_interpolation_mode(*mode),
            Node::LoadPolarity(p) => self.polarity = *p,
            Node::RegionStart => {
                self.region_mode = true;
                self.current_region_path = None;
            }
            Node::RegionEnd => self.close_region(),
            Node::Operation(op) => self.apply_operation(op, options),
            _ => {}
        }
    }

    fn set_interpolation_mode(&mut self, mode: InterpolationMode) {
        // SingleQuadrant/MultiQuadrant govern arc semantics this core
        // doesn't implement; Linear/CW/CCW are the only modes rendering
        // cares about.
        if matches!(
            mode,
            InterpolationMode::Linear | InterpolationMode::CircularCW | InterpolationMode::CircularCCW
        ) {
            self.interpolation_mode = mode;
        }
    }

    fn close_region(&mut self) {
        if let Some(mut path) = self.current_region_path.take() {
            path.push_str(" Z");
            self.region_paths.push(path);
        }
        self.region_mode = false;
    }

    fn apply_operation(&mut self, op: &Operation, options: &RenderOptions) {
        if let Some(mode) = op.leading_mode {
            self.set_interpolation_mode(mode);
        }

        let (x_decimals, y_decimals) = self.decimal_digits();
        let new_x = op
            .x
            .map(|v| to_real(v, x_decimals))
            .unwrap_or(self.current_x);
        let new_y = op
            .y
            .map(|v| to_real(v, y_decimals))
            .unwrap_or(self.current_y);

        self.bbox.update_point(new_x, new_y);

        match op.d_code {
            DCode::Interpolate => self.interpolate(new_x, new_y, options),
            DCode::Move => self.move_to(new_x, new_y),
            DCode::Flash => self.flash(new_x, new_y, options),
        }

        self.current_x = new_x;
        self.current_y = new_y;
    }

    fn interpolate(&mut self, new_x: f64, new_y: f64, options: &RenderOptions) {
        if self.region_mode {
            let path = self
                .current_region_path
                .get_or_insert_with(|| format!("M {} {}", self.current_x, self.current_y));
            let _ = write!(path, " L {new_x} {new_y}");
            return;
        }

        let Some(code) = self.selected_aperture else {
            return;
        };
        let Some(aperture) = self.aperture_table.get(&code) else {
            log::warn!("interpolate with unselected or undefined aperture D{code}");
            return;
        };

        // First parameter used as stroke width regardless of template.
        // See DESIGN.md.
        let width = aperture.parameters.first().copied().unwrap_or(0.0);
        self.traces.push(format!(
            r#"<line x1="{}" y1="{}" x2="{new_x}" y2="{new_y}" stroke="{}" stroke-width="{width}" stroke-linecap="round"/>"#,
            self.current_x, self.current_y, options.stroke_color
        ));
    }

    fn move_to(&mut self, new_x: f64, new_y: f64) {
        if self.region_mode {
            if let Some(path) = self.current_region_path.as_mut() {
                let _ = write!(path, " M {new_x} {new_y}");
            }
        }
    }

    fn flash(&mut self, new_x: f64, new_y: f64, options: &RenderOptions) {
        let Some(code) = self.selected_aperture else {
            return;
        };
        let Some(aperture) = self.aperture_table.get(&code).cloned() else {
            log::warn!("flash with unselected or undefined aperture D{code}");
            return;
        };

        match aperture.template.as_str() {
            "C" => {
                let diameter = aperture.parameters.first().copied().unwrap_or(0.0);
                let r = diameter / 2.0;
                self.bbox.update_disk(new_x, new_y, r);
                self.flashes.push(format!(
                    r#"<circle cx="{new_x}" cy="{new_y}" r="{r}" fill="{}"/>"#,
                    options.fill_color
                ));
            }
            "R" => {
                let width = aperture.parameters.first().copied().unwrap_or(0.0);
                let height = aperture.parameters.get(1).copied().unwrap_or(width);
                self.bbox.update_rect(new_x, new_y, width, height);
                self.flashes.push(format!(
                    r#"<rect x="{}" y="{}" width="{width}" height="{height}" fill="{}"/>"#,
                    new_x - width / 2.0,
                    new_y - height / 2.0,
                    options.fill_color
                ));
            }
            "O" => {
                let width = aperture.parameters.first().copied().unwrap_or(0.0);
                let height = aperture.parameters.get(1).copied().unwrap_or(width);
                let r = width.min(height) / 2.0;
                self.bbox.update_rect(new_x, new_y, width, height);
                self.flashes.push(format!(
                    r#"<rect x="{}" y="{}" width="{width}" height="{height}" rx="{r}" ry="{r}" fill="{}"/>"#,
                    new_x - width / 2.0,
                    new_y - height / 2.0,
                    options.fill_color
                ));
            }
            _ => {
                let r = 0.005;
                self.bbox.update_disk(new_x, new_y, r);
                self.flashes.push(format!(
                    r#"<circle cx="{new_x}" cy="{new_y}" r="{r}" fill="{}"/>"#,
                    options.fill_color
                ));
            }
        }
    }

    fn to_svg(&self, options: &RenderOptions) -> String {
        let bbox = if self.bbox.has_data {
            self.bbox
        } else {
            BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 0.0,
                has_data: true,
            }
        };

        let view_min_x = bbox.min_x - options.padding;
        let view_min_y = bbox.min_y - options.padding;
        let width = (bbox.max_x - bbox.min_x) + 2.0 * options.padding;
        let height = (bbox.max_y - bbox.min_y) + 2.0 * options.padding;

        let mut body = String::new();
        if options.background_color != "none" {
            let _ = write!(
                body,
                r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{}"/>"#,
                options.background_color
            );
        }
        let _ = write!(
            body,
            r#"<g transform="translate(0, {height}) scale(1, -1) translate({}, {})">"#,
            -view_min_x, -view_min_y
        );
        for path in &self.region_paths {
            let _ = write!(
                body,
                r#"<path d="{path}" fill="{}" fill-rule="evenodd"/>"#,
                options.fill_color
            );
        }
        for trace in &self.traces {
            body.push_str(trace);
        }
        for flash in &self.flashes {
            body.push_str(flash);
        }
        body.push_str("</g>");

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {width} {height}">{body}</svg>"#,
            width * options.scale,
            height * options.scale,
        )
    }
}

/// Replay `doc`'s nodes in order and render them to an SVG document.
/// Every node either has a rendering effect or is structurally ignored;
/// no input can make this function panic.
pub fn render_gerber_to_svg(doc: &Document, options: &RenderOptions) -> String {
    let mut state = RenderState::new();
    for node in doc.nodes() {
        state.apply(node, options);
    }
    // An unmatched RegionStart is implicitly closed rather than left
    // dangling or treated as an error.
    if state.region_mode {
        log::debug!("closing region left open at end of file");
        state.close_region();
    }
    state.to_svg(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn render(source: &str) -> String {
        let doc = Document::parse(source);
        render_gerber_to_svg(&doc, &RenderOptions::default())
    }

    #[test]
    fn move_and_draw_produces_one_line() {
        let svg = render(indoc! {"
            %FSLAX26Y26*%
            %MOMM*%
            %ADD10C,0.1*%
            D10*
            X0Y0D02*
            X1000000Y1000000D01*
            M02*
        "});
        assert!(svg.contains(r#"x1="0" y1="0" x2="1" y2="1""#));
        assert!(svg.contains(r#"stroke-width="0.1""#));
    }

    #[test]
    fn circular_flash() {
        let svg = render(indoc! {"
            %FSLAX26Y26*%
            %MOMM*%
            %ADD10C,0.5*%
            D10*
            X500000Y500000D03*
            M02*
        "});
        assert!(svg.contains(r#"<circle cx="0.5" cy="0.5" r="0.25""#));
    }

    #[test]
    fn rectangular_flash() {
        let svg = render(indoc! {"
            %FSLAX26Y26*%
            %MOMM*%
            %ADD11R,1.0X0.5*%
            D11*
            X500000Y500000D03*
            M02*
        "});
        assert!(svg.contains(r#"width="1" height="0.5""#));
    }

    #[test]
    fn missing_aperture_is_skipped_not_panicking() {
        let svg = render("X0Y0D03*\nM02*");
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn unmatched_region_is_closed_at_eof() {
        let svg = render(indoc! {"
            %FSLAX26Y26*%
            G36*
            X0Y0D02*
            X1000000Y0D01*
            X1000000Y1000000D01*
            M02*
        "});
        assert!(svg.contains(" Z\""));
    }
}
