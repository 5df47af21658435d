use crate::node::{AttrValue, KindTag, Node, NodeKind};
use crate::rules::{NumericType, RuleSet, ValueConstraint, ABSOLUTE_LAYOUT_KINDS};
use crate::violation::{Violation, ViolationKind};

const AXES: [&str; 2] = ["x", "y"];

/// Validate the values of every constrained attribute on one node
pub fn check_attributes(
    node: &Node,
    kind: &KindTag,
    path: &str,
    rules: &RuleSet,
    out: &mut Vec<Violation>,
) {
    let tag = kind;
    let kind = tag.known();
    let absolute = node.is_absolute();

    for &name in coordinate_attributes(kind) {
        if let Some(value) = node.get(name) {
            check_coordinate(value, &format!("{}.{}", path, name), absolute, rules, out);
        }
    }

    for (name, constraint) in rules.constraints() {
        if let Some(value) = node.get(name) {
            let attr_path = format!("{}.{}", path, name);
            match constraint {
                ValueConstraint::OneOf(allowed) => check_enum(value, allowed, &attr_path, out),
                ValueConstraint::Range { numeric, min, max } => {
                    check_range(value, *numeric, *min, *max, &attr_path, out)
                }
                ValueConstraint::CanvasWidth => check_range(
                    value,
                    NumericType::Integer,
                    0.0,
                    Some(rules.canvas.width as f64),
                    &attr_path,
                    out,
                ),
                ValueConstraint::Boolean => {
                    if !matches!(value, AttrValue::Bool(_)) {
                        out.push(Violation::new(
                            attr_path,
                            ViolationKind::WrongType {
                                expected: "boolean".to_string(),
                                found: value.type_name().to_string(),
                            },
                        ));
                    }
                }
                ValueConstraint::FontSize { min, max } => {
                    check_font_size(value, *min, *max, &attr_path, rules, out)
                }
            }
        }
    }

    // an untyped node is already reported as missing `type`
    let scoped = !matches!(tag, KindTag::Missing);
    if scoped && node.contains("is_absolute") && !rules.allows_absolute(kind) {
        out.push(Violation::new(
            format!("{}.is_absolute", path),
            ViolationKind::AbsoluteLayoutNotAllowed {
                allowed: ABSOLUTE_LAYOUT_KINDS
                    .iter()
                    .map(NodeKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            },
        ));
    }
}

/// Which attributes hold `[x, y]` coordinates for a kind
pub fn coordinate_attributes(kind: Option<NodeKind>) -> &'static [&'static str] {
    match kind {
        Some(NodeKind::Line) => &["start", "end"],
        Some(NodeKind::Container | NodeKind::Text | NodeKind::Icon) => &["position"],
        None => &[],
    }
}

fn check_coordinate(
    value: &AttrValue,
    path: &str,
    absolute: bool,
    rules: &RuleSet,
    out: &mut Vec<Violation>,
) {
    let items = match value {
        AttrValue::List(items) => items,
        other => {
            out.push(Violation::new(
                path,
                ViolationKind::WrongType {
                    expected: "[x, y] array".to_string(),
                    found: other.type_name().to_string(),
                },
            ));
            return;
        }
    };

    if items.len() != 2 {
        out.push(Violation::new(
            path,
            ViolationKind::WrongType {
                expected: "2-element [x, y] array".to_string(),
                found: format!("{}-element array", items.len()),
            },
        ));
    }

    for (item, axis) in items.iter().zip(AXES) {
        match item.as_number() {
            None => out.push(Violation::new(
                format!("{}.{}", path, axis),
                ViolationKind::WrongType {
                    expected: "number".to_string(),
                    found: item.type_name().to_string(),
                },
            )),
            Some(n) if !(n.as_f64() >= 0.0) => out.push(Violation::new(
                format!("{}.{}", path, axis),
                ViolationKind::OutOfRange {
                    value: n.to_string(),
                    range: ">= 0".to_string(),
                },
            )),
            Some(_) => {}
        }
    }

    if absolute && items.len() == 2 {
        let bounds = [rules.canvas.width, rules.canvas.height];
        for ((item, axis), max) in items.iter().zip(AXES).zip(bounds) {
            if let Some(n) = item.as_number() {
                let v = n.as_f64();
                if !(v >= 0.0 && v <= max as f64) {
                    out.push(Violation::new(
                        format!("{}.{}", path, axis),
                        ViolationKind::CoordinateOutOfCanvas {
                            axis,
                            value: n.to_string(),
                            min: 0,
                            max,
                        },
                    ));
                }
            }
        }
    }
}

fn check_enum(value: &AttrValue, allowed: &[&str], path: &str, out: &mut Vec<Violation>) {
    let ok = value.as_str().is_some_and(|s| allowed.contains(&s));
    if !ok {
        out.push(Violation::new(
            path,
            ViolationKind::InvalidEnumValue {
                value: value.to_string(),
                expected: allowed.join(", "),
            },
        ));
    }
}

fn check_range(
    value: &AttrValue,
    numeric: NumericType,
    min: f64,
    max: Option<f64>,
    path: &str,
    out: &mut Vec<Violation>,
) {
    let n = match value.as_number() {
        Some(n) if numeric.accepts(n) => n,
        _ => {
            out.push(Violation::new(
                path,
                ViolationKind::WrongType {
                    expected: numeric.name().to_string(),
                    found: value.type_name().to_string(),
                },
            ));
            return;
        }
    };

    let v = n.as_f64();
    let (in_range, range) = match max {
        Some(max) => (v >= min && v <= max, format!("{} to {}", min, max)),
        None => (v >= min, format!(">= {}", min)),
    };
    if !in_range {
        out.push(Violation::new(
            path,
            ViolationKind::OutOfRange {
                value: n.to_string(),
                range,
            },
        ));
    }
}

/// Resolve a `font_size` value to pixels: a number, `"<n>px"` or an alias
pub fn resolve_font_size(value: &AttrValue, rules: &RuleSet) -> Option<f64> {
    match value {
        AttrValue::Number(n) => Some(n.as_f64()),
        AttrValue::Text(s) => match s.strip_suffix("px") {
            Some(prefix) => prefix.trim().parse::<f64>().ok().filter(|px| px.is_finite()),
            None => rules.font_size_alias(s),
        },
        _ => None,
    }
}

fn check_font_size(
    value: &AttrValue,
    min: f64,
    max: f64,
    path: &str,
    rules: &RuleSet,
    out: &mut Vec<Violation>,
) {
    match resolve_font_size(value, rules) {
        None => out.push(Violation::new(
            path,
            ViolationKind::UnparsableFontSize {
                value: value.to_string(),
                aliases: rules.font_size_aliases().collect::<Vec<_>>().join(", "),
            },
        )),
        Some(px) if px < min || px > max || px.is_nan() => out.push(Violation::new(
            path,
            ViolationKind::FontSizeOutOfRange {
                value: px.to_string(),
                min,
                max,
            },
        )),
        Some(_) => {}
    }
}
