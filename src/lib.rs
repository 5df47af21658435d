//! # EPD Layout Validator
//!
//! Checks declarative layout documents for a fixed-resolution e-paper panel
//! against a closed rule set before they reach the renderer.
//!
//! A document is a YAML tree of nodes (`container`, `text`, `icon`, `line`).
//! Validation never stops at the first problem: every finding is returned as
//! a path-qualified [`Violation`], in depth-first document order.
//!
//! ## Features
//! - Per-kind required/optional/forbidden attributes
//! - Value constraints: enums, numeric ranges, font sizes, canvas bounds
//! - Brace-expression checks for `content`, `icon_id` and `condition`
//! - Structural limits: nesting depth, children per container, field lengths
//! - Rule overrides loaded from YAML (canvas, font aliases, icon modules, limits)
//!
//! ## Example
//! ```ignore
//! use epd_layout::validate_yaml;
//!
//! let yaml = r#"
//! id: main
//! type: container
//! position: [0, 0]
//! anchor: top-left
//! children:
//!   - node:
//!       id: clock
//!       type: text
//!       position: [400, 240]
//!       anchor: center
//!       content: "{time}"
//! "#;
//!
//! let violations = validate_yaml(yaml);
//! assert!(violations.is_empty());
//! ```

pub mod attributes;
pub mod config;
pub mod error;
pub mod expression;
pub mod node;
pub mod rules;
pub mod structure;
pub mod validator;
pub mod violation;

// --- Core types ---
pub use config::RuleOverrides;
pub use error::{LayoutError, LayoutResult};
pub use node::{AttrValue, Child, KindTag, Node, NodeKind, Number};
pub use rules::RuleSet;
pub use validator::Validator;
pub use violation::{Violation, ViolationKind};

/// Validate a parsed layout tree against the built-in rules
pub fn validate(root: &Node) -> Vec<Violation> {
    Validator::default().validate(root)
}

/// Parse and validate a YAML layout document against the built-in rules
pub fn validate_yaml(yaml: &str) -> Vec<Violation> {
    Validator::default().validate_yaml(yaml)
}

/// Parse and validate a YAML layout document against custom rules
pub fn validate_yaml_with_rules(yaml: &str, rules: &RuleSet) -> Vec<Violation> {
    Validator::new(rules).validate_yaml(yaml)
}
