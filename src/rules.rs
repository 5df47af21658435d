//! The layout grammar as data.
//!
//! Everything the checkers know about node kinds, attribute constraints and
//! structural limits lives here. A [`RuleSet`] is never mutated once built;
//! the built-in one is shared process-wide through [`RuleSet::builtin`].

use crate::node::{NodeKind, Number};
use std::sync::OnceLock;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 480;
pub const MAX_NODE_DEPTH: usize = 10;
pub const MAX_CHILDREN: usize = 20;
pub const MAX_EXPRESSION_DEPTH: usize = 2;
pub const FONT_SIZE_MIN: f64 = 8.0;
pub const FONT_SIZE_MAX: f64 = 64.0;

/// Operators that may not appear inside `{...}`
pub const FORBIDDEN_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '?'];

/// Fields holding embedded expressions, in check order
pub const EXPRESSION_FIELDS: &[&str] = &["content", "icon_id", "condition"];

/// Expression fields that must not be blank when present
pub const NON_EMPTY_EXPRESSION_FIELDS: &[&str] = &["content", "icon_id"];

pub const ICON_FIELD: &str = "icon_id";

/// Kinds on which `is_absolute` may be used
pub const ABSOLUTE_LAYOUT_KINDS: &[NodeKind] = &[NodeKind::Text, NodeKind::Icon, NodeKind::Line];

/// Attribute classification for one node kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindRules {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub forbidden: &'static [&'static str],
}

const CONTAINER_RULES: KindRules = KindRules {
    required: &["id", "type", "position", "anchor"],
    optional: &[
        "direction",
        "alignment",
        "vertical_alignment",
        "children",
        "weight",
        "condition",
        "width",
        "height",
    ],
    forbidden: &[
        "start",
        "end",
        "thickness",
        "is_absolute",
        "icon_id",
        "content",
        "font_size",
        "max_width",
        "max_lines",
    ],
};

const TEXT_RULES: KindRules = KindRules {
    required: &["id", "type", "position", "anchor", "content"],
    optional: &[
        "font_size",
        "alignment",
        "vertical_alignment",
        "max_width",
        "max_lines",
        "weight",
        "is_absolute",
        "condition",
        "width",
        "height",
    ],
    forbidden: &["start", "end", "thickness", "icon_id"],
};

const ICON_RULES: KindRules = KindRules {
    required: &["id", "type", "position", "anchor", "icon_id"],
    optional: &[
        "alignment",
        "vertical_alignment",
        "weight",
        "is_absolute",
        "condition",
        "width",
        "height",
    ],
    forbidden: &[
        "start",
        "end",
        "thickness",
        "content",
        "font_size",
        "max_width",
        "max_lines",
    ],
};

const LINE_RULES: KindRules = KindRules {
    required: &["id", "type", "start", "end", "thickness"],
    optional: &["is_absolute", "condition"],
    forbidden: &[
        "position",
        "anchor",
        "width",
        "height",
        "icon_id",
        "content",
        "font_size",
        "max_width",
        "max_lines",
        "weight",
        "direction",
        "alignment",
        "vertical_alignment",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    Integer,
    /// Integer or float
    Number,
}

impl NumericType {
    pub fn accepts(&self, n: Number) -> bool {
        match self {
            NumericType::Integer => matches!(n, Number::Int(_)),
            NumericType::Number => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NumericType::Integer => "integer",
            NumericType::Number => "number",
        }
    }
}

/// Constraint on the value of one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum ValueConstraint {
    OneOf(&'static [&'static str]),
    Range {
        numeric: NumericType,
        min: f64,
        max: Option<f64>,
    },
    Boolean,
    /// Integer from 0 up to the canvas width of the active rule set
    CanvasWidth,
    /// Number, `"<n>px"` or a named alias, resolved then range-checked
    FontSize { min: f64, max: f64 },
}

const ANCHORS: &[&str] = &[
    "top-left",
    "top-center",
    "top-right",
    "center-left",
    "center",
    "center-right",
    "bottom-left",
    "bottom-center",
    "bottom-right",
];

/// Value constraints in check order
const CONSTRAINTS: &[(&str, ValueConstraint)] = &[
    ("anchor", ValueConstraint::OneOf(ANCHORS)),
    ("alignment", ValueConstraint::OneOf(&["center", "left", "right"])),
    ("vertical_alignment", ValueConstraint::OneOf(&["center", "top", "bottom"])),
    ("direction", ValueConstraint::OneOf(&["horizontal", "vertical"])),
    (
        "font_size",
        ValueConstraint::FontSize {
            min: FONT_SIZE_MIN,
            max: FONT_SIZE_MAX,
        },
    ),
    ("max_width", ValueConstraint::CanvasWidth),
    (
        "max_lines",
        ValueConstraint::Range {
            numeric: NumericType::Integer,
            min: 1.0,
            max: Some(5.0),
        },
    ),
    (
        "weight",
        ValueConstraint::Range {
            numeric: NumericType::Number,
            min: 0.0001,
            max: Some(10.0),
        },
    ),
    (
        "thickness",
        ValueConstraint::Range {
            numeric: NumericType::Integer,
            min: 1.0,
            max: Some(3.0),
        },
    ),
    (
        "width",
        ValueConstraint::Range {
            numeric: NumericType::Number,
            min: 0.0,
            max: None,
        },
    ),
    (
        "height",
        ValueConstraint::Range {
            numeric: NumericType::Number,
            min: 0.0,
            max: None,
        },
    ),
    ("is_absolute", ValueConstraint::Boolean),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_node_depth: usize,
    pub max_children: usize,
    pub max_expression_depth: usize,
}

/// The complete rule registry used by one validation call
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub canvas: Canvas,
    pub limits: Limits,
    pub(crate) max_lengths: Vec<(String, usize)>,
    pub(crate) font_sizes: Vec<(String, f64)>,
    pub(crate) icon_modules: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
            },
            limits: Limits {
                max_node_depth: MAX_NODE_DEPTH,
                max_children: MAX_CHILDREN,
                max_expression_depth: MAX_EXPRESSION_DEPTH,
            },
            max_lengths: vec![
                ("id".to_string(), 32),
                ("content".to_string(), 128),
                ("condition".to_string(), 128),
                ("icon_id".to_string(), 64),
            ],
            font_sizes: vec![
                ("Small".to_string(), 16.0),
                ("Medium".to_string(), 24.0),
                ("Large".to_string(), 40.0),
            ],
            icon_modules: vec![
                "digit_icon".to_string(),
                "weather_icon".to_string(),
                "system_icon".to_string(),
            ],
        }
    }
}

impl RuleSet {
    /// The built-in rules, built on first use and shared afterwards
    pub fn builtin() -> &'static RuleSet {
        static BUILTIN: OnceLock<RuleSet> = OnceLock::new();
        BUILTIN.get_or_init(RuleSet::default)
    }

    pub fn kind_rules(&self, kind: NodeKind) -> &'static KindRules {
        match kind {
            NodeKind::Container => &CONTAINER_RULES,
            NodeKind::Text => &TEXT_RULES,
            NodeKind::Icon => &ICON_RULES,
            NodeKind::Line => &LINE_RULES,
        }
    }

    pub fn required(&self, kind: NodeKind) -> &'static [&'static str] {
        self.kind_rules(kind).required
    }

    pub fn optional(&self, kind: NodeKind) -> &'static [&'static str] {
        self.kind_rules(kind).optional
    }

    pub fn forbidden(&self, kind: NodeKind) -> &'static [&'static str] {
        self.kind_rules(kind).forbidden
    }

    pub fn constraint(&self, attribute: &str) -> Option<&'static ValueConstraint> {
        CONSTRAINTS
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, c)| c)
    }

    /// All value constraints, in check order
    pub fn constraints(&self) -> impl Iterator<Item = (&'static str, &'static ValueConstraint)> {
        CONSTRAINTS.iter().map(|(name, c)| (*name, c))
    }

    /// Length-limited fields, in check order
    pub fn max_lengths(&self) -> impl Iterator<Item = (&str, usize)> {
        self.max_lengths.iter().map(|(name, max)| (name.as_str(), *max))
    }

    pub fn max_length(&self, field: &str) -> Option<usize> {
        self.max_lengths
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, max)| *max)
    }

    pub fn font_size_alias(&self, name: &str) -> Option<f64> {
        self.font_sizes
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, px)| *px)
    }

    pub fn font_size_aliases(&self) -> impl Iterator<Item = &str> {
        self.font_sizes.iter().map(|(alias, _)| alias.as_str())
    }

    pub fn icon_modules(&self) -> &[String] {
        &self.icon_modules
    }

    pub fn is_icon_module(&self, module: &str) -> bool {
        self.icon_modules.iter().any(|m| m == module)
    }

    pub fn forbidden_operators(&self) -> &'static [char] {
        FORBIDDEN_OPERATORS
    }

    /// `None` stands for a node whose kind could not be resolved
    pub fn allows_absolute(&self, kind: Option<NodeKind>) -> bool {
        kind.is_some_and(|k| ABSOLUTE_LAYOUT_KINDS.contains(&k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables_are_disjoint() {
        let rules = RuleSet::builtin();
        for kind in NodeKind::ALL {
            for attr in rules.required(kind) {
                assert!(!rules.forbidden(kind).contains(attr), "{kind}: {attr}");
                assert!(!rules.optional(kind).contains(attr), "{kind}: {attr}");
            }
            for attr in rules.optional(kind) {
                assert!(!rules.forbidden(kind).contains(attr), "{kind}: {attr}");
            }
        }
    }

    #[test]
    fn test_children_only_on_container() {
        let rules = RuleSet::builtin();
        assert!(rules.optional(NodeKind::Container).contains(&"children"));
        assert!(!rules.optional(NodeKind::Text).contains(&"children"));
    }

    #[test]
    fn test_constraint_lookup() {
        let rules = RuleSet::builtin();
        assert_eq!(
            rules.constraint("thickness"),
            Some(&ValueConstraint::Range {
                numeric: NumericType::Integer,
                min: 1.0,
                max: Some(3.0),
            })
        );
        assert_eq!(rules.constraint("is_absolute"), Some(&ValueConstraint::Boolean));
        assert!(rules.constraint("content").is_none());
    }

    #[test]
    fn test_font_size_alias() {
        let rules = RuleSet::builtin();
        assert_eq!(rules.font_size_alias("Small"), Some(16.0));
        assert_eq!(rules.font_size_alias("Large"), Some(40.0));
        assert_eq!(rules.font_size_alias("XLarge"), None);
    }

    #[test]
    fn test_absolute_layout_kinds() {
        let rules = RuleSet::builtin();
        assert!(rules.allows_absolute(Some(NodeKind::Text)));
        assert!(rules.allows_absolute(Some(NodeKind::Line)));
        assert!(!rules.allows_absolute(Some(NodeKind::Container)));
        assert!(!rules.allows_absolute(None));
    }

    #[test]
    fn test_numeric_type_accepts() {
        assert!(NumericType::Integer.accepts(Number::Int(3)));
        assert!(!NumericType::Integer.accepts(Number::Float(3.0)));
        assert!(NumericType::Number.accepts(Number::Float(0.5)));
    }
}
