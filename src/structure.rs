use crate::node::{AttrValue, KindTag, Node, NodeKind};
use crate::rules::RuleSet;
use crate::violation::{Violation, ViolationKind};

/// Report a `type` outside the known kinds
pub fn check_kind(kind: &KindTag, path: &str, out: &mut Vec<Violation>) {
    if let KindTag::Unknown(found) = kind {
        out.push(Violation::new(
            path,
            ViolationKind::UnknownNodeKind {
                found: found.clone(),
                expected: NodeKind::names(),
            },
        ));
    }
}

pub fn check_field_lengths(node: &Node, path: &str, rules: &RuleSet, out: &mut Vec<Violation>) {
    for (field, max) in rules.max_lengths() {
        if let Some(value) = node.get(field) {
            let length = value.to_string().chars().count();
            if length > max {
                out.push(Violation::new(
                    format!("{}.{}", path, field),
                    ViolationKind::FieldTooLong { length, max },
                ));
            }
        }
    }
}

/// Required and forbidden attributes for the node's kind.
///
/// A node without `type` only gets the missing-`type` finding; a node with
/// an unknown `type` gets nothing here.
pub fn check_required_forbidden(
    node: &Node,
    kind: &KindTag,
    path: &str,
    rules: &RuleSet,
    out: &mut Vec<Violation>,
) {
    let kind = match kind {
        KindTag::Known(kind) => *kind,
        KindTag::Missing => {
            out.push(Violation::new(
                path,
                ViolationKind::MissingRequiredAttribute {
                    attribute: "type".to_string(),
                    kind: "untyped".to_string(),
                },
            ));
            return;
        }
        KindTag::Unknown(_) => return,
    };

    for &attr in rules.required(kind) {
        if !node.contains(attr) {
            out.push(Violation::new(
                path,
                ViolationKind::MissingRequiredAttribute {
                    attribute: attr.to_string(),
                    kind: kind.to_string(),
                },
            ));
        }
    }

    let forbidden = rules.forbidden(kind);
    for (name, _) in node.attributes() {
        if forbidden.contains(&name) {
            out.push(Violation::new(
                path,
                ViolationKind::ForbiddenAttributePresent {
                    attribute: name.to_string(),
                    kind: kind.to_string(),
                },
            ));
        }
    }
}

/// `weight` needs a `container` parent that sets `direction`
pub fn check_weight_usage(node: &Node, parent: Option<&Node>, path: &str, out: &mut Vec<Violation>) {
    if !node.contains("weight") {
        return;
    }
    let parent_ok = parent.is_some_and(|p| {
        p.kind_tag() == KindTag::Known(NodeKind::Container) && p.contains("direction")
    });
    if !parent_ok {
        out.push(Violation::new(
            format!("{}.weight", path),
            ViolationKind::InvalidWeightUsage,
        ));
    }
}

pub fn check_nesting(
    node: &Node,
    depth: usize,
    path: &str,
    rules: &RuleSet,
    out: &mut Vec<Violation>,
) {
    let max_depth = rules.limits.max_node_depth;
    if depth > max_depth {
        out.push(Violation::new(
            path,
            ViolationKind::NestingTooDeep {
                depth,
                max: max_depth,
            },
        ));
    }

    match node.get("children") {
        None | Some(AttrValue::Null) => {}
        Some(AttrValue::Children(children)) => {
            let max = rules.limits.max_children;
            if children.len() > max {
                out.push(Violation::new(
                    format!("{}.children", path),
                    ViolationKind::TooManyChildren {
                        count: children.len(),
                        max,
                    },
                ));
            }
        }
        Some(other) => out.push(Violation::new(
            format!("{}.children", path),
            ViolationKind::WrongType {
                expected: "array of child nodes".to_string(),
                found: other.type_name().to_string(),
            },
        )),
    }
}
