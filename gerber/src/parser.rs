//! Token stream → [`Node`] list.
//!
//! Extended blocks are dispatched on a short literal prefix (`FS`, `MO`,
//! `AD`, ...); first match wins, and anything left over is an
//! [`Node::UnknownCommand`]. Ordinary commands are dispatched the same
//! way for the fixed-shape cases (`G04`, `G36`/`G37`, `M00`/`M02`) and
//! otherwise run through [`scan_fields`], a small byte-scanner that reads
//! the `G`/`X`/`Y`/`I`/`J`/`D` letter-prefixed fields a coordinate
//! command is built from. This replaces the regex-style extraction the
//! format's reference tooling tends to use with something that can't
//! backtrack its way into quadratic behavior on pathological input.

use crate::attribute::AttributeName;
use crate::node::{
    Attribute, CoordinateMode, DCode, FormatSpecification, InterpolationMode, Mirroring,
    Operation, Polarity, StepRepeat, UnitMode, ZeroOmission,
};
use crate::node::{ApertureDefinition, ApertureId, ApertureMacro, Node};
use crate::primitive;
use crate::tokenizer::{Token, TokenKind};

/// Parse a complete token stream into an ordered node list.
pub fn parse(tokens: &[Token]) -> Vec<Node> {
    tokens.iter().map(parse_token).collect()
}

fn parse_token(token: &Token) -> Node {
    match token.kind {
        TokenKind::ExtendedBlock => parse_extended_block(token),
        TokenKind::Command => parse_command(token),
    }
}

fn parse_extended_block(token: &Token) -> Node {
    if !token.terminated {
        return Node::UnknownCommand(format!("%{}", token.value));
    }

    let value = token.value.as_str();
    let body = value.strip_suffix('*').unwrap_or(value);
    let raw = || Node::UnknownCommand(format!("%{value}%"));

    if let Some(rest) = body.strip_prefix("FS") {
        return Node::FormatSpecification(parse_format_specification(rest));
    }
    if let Some(rest) = body.strip_prefix("MO") {
        return Node::UnitMode(match rest {
            "IN" => UnitMode::Inches,
            _ => UnitMode::Millimetres,
        });
    }
    if let Some(rest) = body.strip_prefix("AD") {
        return Node::ApertureDefinition(parse_aperture_definition(rest));
    }
    if let Some(rest) = body.strip_prefix("AM") {
        return Node::ApertureMacro(parse_aperture_macro(rest));
    }
    if let Some(rest) = body.strip_prefix("LP") {
        return Node::LoadPolarity(match rest {
            "C" => Polarity::Clear,
            _ => Polarity::Dark,
        });
    }
    if let Some(rest) = body.strip_prefix("LM") {
        return Node::LoadMirroring(match rest {
            "X" => Mirroring::X,
            "Y" => Mirroring::Y,
            "XY" => Mirroring::XY,
            _ => Mirroring::None,
        });
    }
    if let Some(rest) = body.strip_prefix("LR") {
        let value = primitive::decimal(rest).map(|(_, v)| v).unwrap_or(0.0);
        return Node::LoadRotation(value);
    }
    if let Some(rest) = body.strip_prefix("LS") {
        let value = primitive::decimal(rest).map(|(_, v)| v).unwrap_or(1.0);
        return Node::LoadScaling(value);
    }
    if let Some(rest) = body.strip_prefix("SR") {
        return Node::StepRepeat(parse_step_repeat(rest));
    }
    if let Some(rest) = body.strip_prefix("TF") {
        return Node::FileAttribute(parse_attribute(rest));
    }
    if let Some(rest) = body.strip_prefix("TA") {
        return Node::ApertureAttribute(parse_attribute(rest));
    }
    if let Some(rest) = body.strip_prefix("TO") {
        return Node::ObjectAttribute(parse_attribute(rest));
    }
    if let Some(rest) = body.strip_prefix("TD") {
        let name = rest.strip_prefix('.').map(|s| s.to_string());
        return Node::DeleteAttribute(name.filter(|s| !s.is_empty()));
    }
    if let Some(rest) = body.strip_prefix("IP") {
        return Node::SetImagePolarity(rest.to_string());
    }
    if let Some(rest) = body.strip_prefix("OF") {
        return Node::SetOffset(rest.to_string());
    }

    raw()
}

fn parse_format_specification(rest: &str) -> FormatSpecification {
    let default = FormatSpecification {
        zero_omission: ZeroOmission::Leading,
        coordinate_mode: CoordinateMode::Absolute,
        x_integer_digits: 2,
        x_decimal_digits: 6,
        y_integer_digits: 2,
        y_decimal_digits: 6,
    };
    let bytes = rest.as_bytes();
    if bytes.len() < 8 || bytes[2] != b'X' || bytes[5] != b'Y' {
        return default;
    }
    let digit = |b: u8| (b as char).to_digit(10).unwrap_or(0);
    FormatSpecification {
        zero_omission: if bytes[0] == b'T' {
            ZeroOmission::Trailing
        } else {
            ZeroOmission::Leading
        },
        coordinate_mode: if bytes[1] == b'I' {
            CoordinateMode::Incremental
        } else {
            CoordinateMode::Absolute
        },
        x_integer_digits: digit(bytes[3]),
        x_decimal_digits: digit(bytes[4]),
        y_integer_digits: digit(bytes[6]),
        y_decimal_digits: digit(bytes[7]),
    }
}

fn parse_aperture_definition(rest: &str) -> ApertureDefinition {
    let default = ApertureDefinition {
        code: 10,
        template: "C".to_string(),
        parameters: Vec::new(),
    };
    let Some(after_d) = rest.strip_prefix('D') else {
        return default;
    };
    let digit_end = after_d
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_d.len());
    if digit_end == 0 {
        return default;
    }
    let code: i32 = after_d[..digit_end].parse().unwrap_or(10);
    let remainder = &after_d[digit_end..];
    let (template_part, params_part) = match remainder.find(',') {
        Some(idx) => (&remainder[..idx], &remainder[idx + 1..]),
        None => (remainder, ""),
    };
    let template = if template_part.is_empty() {
        "C".to_string()
    } else {
        template_part.to_string()
    };
    let parameters = if params_part.is_empty() {
        Vec::new()
    } else {
        params_part
            .split('X')
            .map(|p| p.parse().unwrap_or(0.0))
            .collect()
    };
    ApertureDefinition {
        code,
        template,
        parameters,
    }
}

fn parse_aperture_macro(rest: &str) -> ApertureMacro {
    match rest.find('*') {
        Some(idx) => {
            let name = rest[..idx].trim().to_string();
            let mut body = rest[idx + 1..].to_string();
            if body.ends_with('*') {
                body.pop();
            }
            ApertureMacro { name, body }
        }
        None => ApertureMacro {
            name: rest.trim().to_string(),
            body: String::new(),
        },
    }
}

fn parse_step_repeat(rest: &str) -> StepRepeat {
    let mut x_count = 1i32;
    let mut y_count = 1i32;
    let mut i_step = 0.0f64;
    let mut j_step = 0.0f64;
    let mut s = rest;
    while let Some(c) = s.chars().next() {
        let tail = &s[1..];
        match c {
            'X' => {
                let (rem, v) = primitive::positive_integer(tail).unwrap_or((tail, 1));
                x_count = v as i32;
                s = rem;
            }
            'Y' => {
                let (rem, v) = primitive::positive_integer(tail).unwrap_or((tail, 1));
                y_count = v as i32;
                s = rem;
            }
            'I' => {
                let (rem, v) = primitive::decimal(tail).unwrap_or((tail, 0.0));
                i_step = v;
                s = rem;
            }
            'J' => {
                let (rem, v) = primitive::decimal(tail).unwrap_or((tail, 0.0));
                j_step = v;
                s = rem;
            }
            _ => break,
        }
    }
    StepRepeat {
        x_count,
        y_count,
        i_step,
        j_step,
    }
}

fn parse_attribute(rest: &str) -> Attribute {
    match AttributeName::parse(rest) {
        Ok((remainder, name)) => {
            let values = remainder
                .strip_prefix(',')
                .map(|v| v.split(',').map(|s| s.to_string()).collect())
                .unwrap_or_default();
            Attribute { name, values }
        }
        Err(_) => Attribute {
            name: AttributeName::UserDefined(rest.to_string()),
            values: Vec::new(),
        },
    }
}

/// The `G`/`X`/`Y`/`I`/`J`/`D` letter-prefixed fields parsed out of one
/// ordinary command, in whatever order they appeared.
#[derive(Default)]
struct Fields {
    g: Option<i64>,
    x: Option<i64>,
    y: Option<i64>,
    i: Option<i64>,
    j: Option<i64>,
    d: Option<i64>,
}

/// Scan `value` as a sequence of letter + signed-integer fields. Returns
/// `None` if any character doesn't fit that shape (an unrecognized
/// letter, a letter with no digits following, or a repeated letter) —
/// the caller then falls back to [`Node::UnknownCommand`].
fn scan_fields(value: &str) -> Option<Fields> {
    if value.is_empty() {
        return None;
    }
    let mut fields = Fields::default();
    let bytes = value.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        let letter = bytes[idx] as char;
        if !matches!(letter, 'G' | 'X' | 'Y' | 'I' | 'J' | 'D') {
            return None;
        }
        idx += 1;
        let sign_start = idx;
        if idx < bytes.len() && matches!(bytes[idx], b'+' | b'-') {
            idx += 1;
        }
        let digit_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == digit_start {
            return None;
        }
        let parsed: i64 = value[sign_start..idx].parse().ok()?;
        let slot = match letter {
            'G' => &mut fields.g,
            'X' => &mut fields.x,
            'Y' => &mut fields.y,
            'I' => &mut fields.i,
            'J' => &mut fields.j,
            'D' => &mut fields.d,
            _ => unreachable!(),
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(parsed);
    }
    Some(fields)
}

fn mode_from_g(g: i64) -> Option<InterpolationMode> {
    match g {
        1 => Some(InterpolationMode::Linear),
        2 => Some(InterpolationMode::CircularCW),
        3 => Some(InterpolationMode::CircularCCW),
        74 => Some(InterpolationMode::SingleQuadrant),
        75 => Some(InterpolationMode::MultiQuadrant),
        _ => None,
    }
}

fn parse_command(token: &Token) -> Node {
    let value = token.value.as_str();

    if !token.terminated {
        return Node::UnknownCommand(value.to_string());
    }

    if let Some(text) = value.strip_prefix("G04") {
        return Node::Comment(text.trim().to_string());
    }
    match value {
        "G36" => return Node::RegionStart,
        "G37" => return Node::RegionEnd,
        "M00" | "M02" | "M0" | "M2" => return Node::EndOfFile,
        _ => {}
    }

    if let Some(fields) = scan_fields(value) {
        if let Some(d) = fields.d {
            if (1..=3).contains(&d) {
                let d_code = match d {
                    1 => DCode::Interpolate,
                    2 => DCode::Move,
                    _ => DCode::Flash,
                };
                return Node::Operation(Operation {
                    d_code,
                    x: fields.x,
                    y: fields.y,
                    i: fields.i,
                    j: fields.j,
                    leading_mode: fields.g.and_then(mode_from_g),
                });
            } else if d >= 10
                && fields.g.is_none()
                && fields.x.is_none()
                && fields.y.is_none()
                && fields.i.is_none()
                && fields.j.is_none()
            {
                return match ApertureId::new(d as i32) {
                    Ok(id) => Node::SelectAperture(id),
                    Err(_) => Node::UnknownCommand(format!("{value}*")),
                };
            }
        } else if let Some(g) = fields.g {
            let only_g = fields.x.is_none() && fields.y.is_none() && fields.i.is_none() && fields.j.is_none();
            if only_g {
                if let Some(mode) = mode_from_g(g) {
                    return Node::SetInterpolationMode(mode);
                }
            }
        }
    }

    Node::UnknownCommand(format!("{value}*"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Mirroring as M, Polarity as P};
    use crate::tokenizer::tokenize;

    fn parse_one(text: &str) -> Node {
        let tokens = tokenize(text);
        assert_eq!(tokens.len(), 1, "expected exactly one token from {text:?}");
        parse_token(&tokens[0])
    }

    #[test]
    fn comment_trims_text() {
        assert_eq!(
            parse_one("G04 hello world*"),
            Node::Comment("hello world".to_string())
        );
        assert_eq!(parse_one("G04*"), Node::Comment(String::new()));
    }

    #[test]
    fn format_specification() {
        let node = parse_one("%FSLAX26Y26*%");
        match node {
            Node::FormatSpecification(fs) => {
                assert_eq!(fs.x_integer_digits, 2);
                assert_eq!(fs.x_decimal_digits, 6);
                assert_eq!(fs.y_integer_digits, 2);
                assert_eq!(fs.y_decimal_digits, 6);
            }
            other => panic!("expected FormatSpecification, got {other:?}"),
        }
    }

    #[test]
    fn aperture_definition_circle() {
        let node = parse_one("%ADD10C,0.1*%");
        match node {
            Node::ApertureDefinition(ad) => {
                assert_eq!(ad.code, 10);
                assert_eq!(ad.template, "C");
                assert_eq!(ad.parameters, vec![0.1]);
            }
            other => panic!("expected ApertureDefinition, got {other:?}"),
        }
    }

    #[test]
    fn malformed_aperture_definition_gets_defaults() {
        let node = parse_one("%ADDxyz*%");
        assert_eq!(
            node,
            Node::ApertureDefinition(ApertureDefinition {
                code: 10,
                template: "C".to_string(),
                parameters: Vec::new(),
            })
        );
    }

    #[test]
    fn select_aperture() {
        assert_eq!(
            parse_one("D10*"),
            Node::SelectAperture(ApertureId::new(10).unwrap())
        );
    }

    #[test]
    fn operation_move_then_draw() {
        assert_eq!(
            parse_one("X0Y0D02*"),
            Node::Operation(Operation {
                d_code: DCode::Move,
                x: Some(0),
                y: Some(0),
                i: None,
                j: None,
                leading_mode: None,
            })
        );
        assert_eq!(
            parse_one("X1000000Y1000000D01*"),
            Node::Operation(Operation {
                d_code: DCode::Interpolate,
                x: Some(1_000_000),
                y: Some(1_000_000),
                i: None,
                j: None,
                leading_mode: None,
            })
        );
    }

    #[test]
    fn operation_with_leading_mode() {
        assert_eq!(
            parse_one("G01X1000Y1000D01*"),
            Node::Operation(Operation {
                d_code: DCode::Interpolate,
                x: Some(1000),
                y: Some(1000),
                i: None,
                j: None,
                leading_mode: Some(InterpolationMode::Linear),
            })
        );
    }

    #[test]
    fn bare_g_code_sets_mode() {
        assert_eq!(parse_one("G01*"), Node::SetInterpolationMode(InterpolationMode::Linear));
        assert_eq!(parse_one("G03*"), Node::SetInterpolationMode(InterpolationMode::CircularCCW));
    }

    #[test]
    fn region_brackets() {
        assert_eq!(parse_one("G36*"), Node::RegionStart);
        assert_eq!(parse_one("G37*"), Node::RegionEnd);
    }

    #[test]
    fn end_of_file() {
        assert_eq!(parse_one("M02*"), Node::EndOfFile);
    }

    #[test]
    fn load_polarity_and_mirroring() {
        assert_eq!(parse_one("%LPC*%"), Node::LoadPolarity(P::Clear));
        assert_eq!(parse_one("%LMXY*%"), Node::LoadMirroring(M::XY));
    }

    #[test]
    fn file_attribute_values() {
        let node = parse_one("%TF.GenerationSoftware,gerberts,1.0.0*%");
        match node {
            Node::FileAttribute(attr) => {
                assert_eq!(attr.name, AttributeName::GenerationSoftware);
                assert_eq!(attr.values, vec!["gerberts".to_string(), "1.0.0".to_string()]);
            }
            other => panic!("expected FileAttribute, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_round_trips_raw_text() {
        assert_eq!(parse_one("%ZZfoo*%"), Node::UnknownCommand("%ZZfoo*%".to_string()));
        assert_eq!(parse_one("ZZfoo*"), Node::UnknownCommand("ZZfoo*".to_string()));
    }

    #[test]
    fn unterminated_block_becomes_unknown() {
        let tokens = tokenize("%FSLAX26Y26");
        assert_eq!(
            parse_token(&tokens[0]),
            Node::UnknownCommand("%FSLAX26Y26".to_string())
        );
    }
}
