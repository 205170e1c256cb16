//! The AST. `Node` is a closed tagged variant: every case carries enough
//! data to re-emit the original command, and the renderer matches on the
//! tag instead of the base-class-plus-`instanceof` style the format's
//! reference tooling tends to use.

use std::fmt;

use crate::attribute::AttributeName;
use crate::error::GerberError;

/// One command or block in a Gerber source file, in source order.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    FormatSpecification(FormatSpecification),
    UnitMode(UnitMode),
    ApertureDefinition(ApertureDefinition),
    ApertureMacro(ApertureMacro),
    LoadPolarity(Polarity),
    LoadMirroring(Mirroring),
    LoadRotation(f64),
    LoadScaling(f64),
    StepRepeat(StepRepeat),
    FileAttribute(Attribute),
    ApertureAttribute(Attribute),
    ObjectAttribute(Attribute),
    DeleteAttribute(Option<String>),
    SetInterpolationMode(InterpolationMode),
    Comment(String),
    RegionStart,
    RegionEnd,
    Operation(Operation),
    SelectAperture(ApertureId),
    EndOfFile,
    /// `IP*` — legacy image polarity, preserved verbatim.
    SetImagePolarity(String),
    /// `OF*` — legacy axis offset, preserved verbatim.
    SetOffset(String),
    /// Anything the dispatcher doesn't recognize. Carries the raw source
    /// text, delimiters included, so serialization is always lossless.
    UnknownCommand(String),
}

impl Node {
    /// Re-emit this node as Gerber source text, without a trailing
    /// separator. [`crate::document::Document::get_string`] joins these
    /// with newlines.
    pub fn to_gerber(&self) -> String {
        match self {
            Node::FormatSpecification(fs) => fs.to_gerber(),
            Node::UnitMode(u) => format!("%MO{}*%", u.code()),
            Node::ApertureDefinition(ad) => ad.to_gerber(),
            Node::ApertureMacro(am) => am.to_gerber(),
            Node::LoadPolarity(p) => format!("%LP{}*%", p.code()),
            Node::LoadMirroring(m) => format!("%LM{}*%", m.code()),
            Node::LoadRotation(v) => format!("%LR{v}*%"),
            Node::LoadScaling(v) => format!("%LS{v}*%"),
            Node::StepRepeat(sr) => sr.to_gerber(),
            Node::FileAttribute(a) => a.to_gerber("TF"),
            Node::ApertureAttribute(a) => a.to_gerber("TA"),
            Node::ObjectAttribute(a) => a.to_gerber("TO"),
            Node::DeleteAttribute(name) => match name {
                Some(name) => format!("%TD.{name}*%"),
                None => "%TD*%".to_string(),
            },
            Node::SetInterpolationMode(mode) => mode.to_gerber(),
            Node::Comment(text) => {
                if text.is_empty() {
                    "G04*".to_string()
                } else {
                    format!("G04 {text}*")
                }
            }
            Node::RegionStart => "G36*".to_string(),
            Node::RegionEnd => "G37*".to_string(),
            Node::Operation(op) => op.to_gerber(),
            Node::SelectAperture(id) => format!("D{}*", id.0),
            Node::EndOfFile => "M02*".to_string(),
            Node::SetImagePolarity(v) => format!("%IP{v}*%"),
            Node::SetOffset(v) => format!("%OF{v}*%"),
            Node::UnknownCommand(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_gerber())
    }
}

/// Whether a zero-suppressed digit is dropped from the front or back of a
/// coordinate literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroOmission {
    Leading,
    Trailing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateMode {
    Absolute,
    Incremental,
}

/// `FS` — fixes the interpretation of every coordinate literal that
/// follows, until (if ever) another `FormatSpecification` is parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpecification {
    pub zero_omission: ZeroOmission,
    pub coordinate_mode: CoordinateMode,
    pub x_integer_digits: u32,
    pub x_decimal_digits: u32,
    pub y_integer_digits: u32,
    pub y_decimal_digits: u32,
}

impl FormatSpecification {
    fn to_gerber(self) -> String {
        let zero = match self.zero_omission {
            ZeroOmission::Leading => 'L',
            ZeroOmission::Trailing => 'T',
        };
        let mode = match self.coordinate_mode {
            CoordinateMode::Absolute => 'A',
            CoordinateMode::Incremental => 'I',
        };
        format!(
            "%FS{zero}{mode}X{}{}Y{}{}*%",
            self.x_integer_digits, self.x_decimal_digits, self.y_integer_digits, self.y_decimal_digits
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitMode {
    Millimetres,
    Inches,
}

impl UnitMode {
    fn code(self) -> &'static str {
        match self {
            UnitMode::Millimetres => "MM",
            UnitMode::Inches => "IN",
        }
    }
}

/// `AD` — defines a template-based or macro aperture under `code`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApertureDefinition {
    pub code: i32,
    pub template: String,
    pub parameters: Vec<f64>,
}

impl ApertureDefinition {
    fn to_gerber(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("X");
        if params.is_empty() {
            format!("%ADD{}{}*%", self.code, self.template)
        } else {
            format!("%ADD{}{},{}*%", self.code, self.template, params)
        }
    }
}

/// `AM` — a macro aperture template body. The body is never evaluated by
/// this crate; it's carried structurally so it can round-trip.
#[derive(Clone, Debug, PartialEq)]
pub struct ApertureMacro {
    pub name: String,
    pub body: String,
}

impl ApertureMacro {
    fn to_gerber(&self) -> String {
        if self.body.is_empty() {
            format!("%AM{}*%", self.name)
        } else {
            format!("%AM{}*{}*%", self.name, self.body)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Dark,
    Clear,
}

impl Polarity {
    fn code(self) -> char {
        match self {
            Polarity::Dark => 'D',
            Polarity::Clear => 'C',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mirroring {
    None,
    X,
    Y,
    XY,
}

impl Mirroring {
    fn code(self) -> &'static str {
        match self {
            Mirroring::None => "N",
            Mirroring::X => "X",
            Mirroring::Y => "Y",
            Mirroring::XY => "XY",
        }
    }
}

/// `SR` — opens or closes a step-and-repeat block. Never expanded by this
/// crate's renderer; preserved structurally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepRepeat {
    pub x_count: i32,
    pub y_count: i32,
    pub i_step: f64,
    pub j_step: f64,
}

impl StepRepeat {
    fn to_gerber(self) -> String {
        format!(
            "%SRX{}Y{}I{}J{}*%",
            self.x_count, self.y_count, self.i_step, self.j_step
        )
    }
}

/// Shared shape for `TF`/`TA`/`TO`: a name plus its comma-separated values.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: AttributeName,
    pub values: Vec<String>,
}

impl Attribute {
    fn to_gerber(&self, prefix: &str) -> String {
        if self.values.is_empty() {
            format!("%{prefix}{}*%", self.name)
        } else {
            format!("%{prefix}{},{}*%", self.name, self.values.join(","))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    CircularCW,
    CircularCCW,
    SingleQuadrant,
    MultiQuadrant,
}

impl InterpolationMode {
    fn to_gerber(self) -> String {
        match self {
            InterpolationMode::Linear => "G01*".to_string(),
            InterpolationMode::CircularCW => "G02*".to_string(),
            InterpolationMode::CircularCCW => "G03*".to_string(),
            InterpolationMode::SingleQuadrant => "G74*".to_string(),
            InterpolationMode::MultiQuadrant => "G75*".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DCode {
    Interpolate,
    Move,
    Flash,
}

impl DCode {
    fn code(self) -> &'static str {
        match self {
            DCode::Interpolate => "D01",
            DCode::Move => "D02",
            DCode::Flash => "D03",
        }
    }
}

/// `D01`/`D02`/`D03` — a draw, move, or flash. Any axis left `None` keeps
/// the modal value carried forward from the previous `Operation`.
///
/// `leading_mode` captures the `G01`/`G02`/`G03` prefix some files fold
/// into the same command as the operation (e.g. `G01X1000Y1000D01*`); it
/// isn't part of the modal coordinate state, just a record of the
/// interpolation-mode change implicit in that form, kept so the command
/// re-emits byte-for-byte instead of splitting into two lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operation {
    pub d_code: DCode,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub i: Option<i64>,
    pub j: Option<i64>,
    pub leading_mode: Option<InterpolationMode>,
}

impl Operation {
    fn to_gerber(self) -> String {
        let mut s = String::new();
        if let Some(mode) = self.leading_mode {
            let g = match mode {
                InterpolationMode::Linear => "G01",
                InterpolationMode::CircularCW => "G02",
                InterpolationMode::CircularCCW => "G03",
                InterpolationMode::SingleQuadrant => "G74",
                InterpolationMode::MultiQuadrant => "G75",
            };
            s.push_str(g);
        }
        if let Some(x) = self.x {
            s.push_str(&format!("X{x}"));
        }
        if let Some(y) = self.y {
            s.push_str(&format!("Y{y}"));
        }
        if let Some(i) = self.i {
            s.push_str(&format!("I{i}"));
        }
        if let Some(j) = self.j {
            s.push_str(&format!("J{j}"));
        }
        s.push_str(self.d_code.code());
        s.push('*');
        s
    }
}

/// A `Dnn` (nn >= 10) aperture selector. Construction enforces the
/// invariant at the boundary instead of deferring to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApertureId(i32);

impl ApertureId {
    pub fn new(code: i32) -> Result<Self, GerberError> {
        if code < 10 {
            Err(GerberError::ApertureCodeTooLow(code))
        } else {
            Ok(Self(code))
        }
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aperture_id_rejects_low_codes() {
        assert!(ApertureId::new(5).is_err());
        assert!(ApertureId::new(10).is_ok());
    }

    #[test]
    fn format_specification_round_trip() {
        let fs = FormatSpecification {
            zero_omission: ZeroOmission::Leading,
            coordinate_mode: CoordinateMode::Absolute,
            x_integer_digits: 2,
            x_decimal_digits: 6,
            y_integer_digits: 2,
            y_decimal_digits: 6,
        };
        assert_eq!(Node::FormatSpecification(fs).to_gerber(), "%FSLAX26Y26*%");
    }

    #[test]
    fn operation_with_leading_mode_round_trips_on_one_line() {
        let op = Operation {
            d_code: DCode::Interpolate,
            x: Some(1_000_000),
            y: Some(1_000_000),
            i: None,
            j: None,
            leading_mode: Some(InterpolationMode::Linear),
        };
        assert_eq!(
            Node::Operation(op).to_gerber(),
            "G01X1000000Y1000000D01*"
        );
    }
}
