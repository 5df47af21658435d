use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use thiserror::Error;

/// Every finding the validator can produce.
///
/// The `Display` text of a variant is the human-readable message attached to
/// a [`Violation`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViolationKind {
    #[error("YAML syntax error: {reason}")]
    UnparsableDocument { reason: String },

    #[error("Unknown node type '{found}'. Expected one of: {expected}")]
    UnknownNodeKind { found: String, expected: String },

    #[error("Missing required attribute '{attribute}' for {kind} node")]
    MissingRequiredAttribute { attribute: String, kind: String },

    #[error("Attribute '{attribute}' is not allowed on {kind} node")]
    ForbiddenAttributePresent { attribute: String, kind: String },

    #[error("Field is {length} characters long, maximum is {max}")]
    FieldTooLong { length: usize, max: usize },

    #[error("Invalid type: expected {expected}, found {found}")]
    WrongType { expected: String, found: String },

    #[error("Value {value} out of range. Expected {range}")]
    OutOfRange { value: String, range: String },

    #[error("Invalid value '{value}'. Expected one of: {expected}")]
    InvalidEnumValue { value: String, expected: String },

    #[error("Unsupported font size '{value}': use a number, a 'px' value or one of: {aliases}")]
    UnparsableFontSize { value: String, aliases: String },

    #[error("Font size {value}px out of range. Expected {min}px to {max}px")]
    FontSizeOutOfRange { value: String, min: f64, max: f64 },

    #[error("Absolute layout is only allowed on: {allowed}")]
    AbsoluteLayoutNotAllowed { allowed: String },

    #[error("Absolute coordinate {axis}={value} outside the canvas. Expected {min} <= {axis} <= {max}")]
    CoordinateOutOfCanvas {
        axis: &'static str,
        value: String,
        min: u32,
        max: u32,
    },

    #[error("'weight' requires a parent container with 'direction' set")]
    InvalidWeightUsage,

    #[error("Expression nesting depth {depth} exceeds maximum of {max}")]
    ExpressionTooDeep { depth: usize, max: usize },

    #[error("Operator '{operator}' is not allowed inside braces: {segment}")]
    ForbiddenOperatorInExpression { operator: char, segment: String },

    #[error("Unknown icon module '{module}'. Expected one of: {allowed}")]
    UnknownIconModule { module: String, allowed: String },

    #[error("Expression must not be empty")]
    EmptyRequiredExpression,

    #[error("Node nesting depth {depth} exceeds maximum of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Container has {count} children, maximum is {max}")]
    TooManyChildren { count: usize, max: usize },

    #[error("Child entry must be a mapping with a 'node' mapping")]
    MalformedChildEntry,
}

impl ViolationKind {
    /// Stable identifier for the variant, used in machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::UnparsableDocument { .. } => "UnparsableDocument",
            ViolationKind::UnknownNodeKind { .. } => "UnknownNodeKind",
            ViolationKind::MissingRequiredAttribute { .. } => "MissingRequiredAttribute",
            ViolationKind::ForbiddenAttributePresent { .. } => "ForbiddenAttributePresent",
            ViolationKind::FieldTooLong { .. } => "FieldTooLong",
            ViolationKind::WrongType { .. } => "WrongType",
            ViolationKind::OutOfRange { .. } => "OutOfRange",
            ViolationKind::InvalidEnumValue { .. } => "InvalidEnumValue",
            ViolationKind::UnparsableFontSize { .. } => "UnparsableFontSize",
            ViolationKind::FontSizeOutOfRange { .. } => "FontSizeOutOfRange",
            ViolationKind::AbsoluteLayoutNotAllowed { .. } => "AbsoluteLayoutNotAllowed",
            ViolationKind::CoordinateOutOfCanvas { .. } => "CoordinateOutOfCanvas",
            ViolationKind::InvalidWeightUsage => "InvalidWeightUsage",
            ViolationKind::ExpressionTooDeep { .. } => "ExpressionTooDeep",
            ViolationKind::ForbiddenOperatorInExpression { .. } => "ForbiddenOperatorInExpression",
            ViolationKind::UnknownIconModule { .. } => "UnknownIconModule",
            ViolationKind::EmptyRequiredExpression => "EmptyRequiredExpression",
            ViolationKind::NestingTooDeep { .. } => "NestingTooDeep",
            ViolationKind::TooManyChildren { .. } => "TooManyChildren",
            ViolationKind::MalformedChildEntry => "MalformedChildEntry",
        }
    }
}

/// A single path-qualified finding
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Dotted/indexed location, e.g. `root.children[2].font_size`.
    /// Empty when the document could not be parsed at all.
    pub path: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "[{}] {}", self.path, self.kind)
        }
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Violation", 3)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("kind", self.kind.code())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let v = Violation::new("root.children[0]", ViolationKind::InvalidWeightUsage);
        assert_eq!(
            v.to_string(),
            "[root.children[0]] 'weight' requires a parent container with 'direction' set"
        );
    }

    #[test]
    fn test_display_without_path() {
        let v = Violation::new(
            "",
            ViolationKind::UnparsableDocument {
                reason: "bad indent".to_string(),
            },
        );
        assert_eq!(v.to_string(), "YAML syntax error: bad indent");
    }

    #[test]
    fn test_serialize_as_path_kind_message() {
        let v = Violation::new(
            "root.font_size",
            ViolationKind::FontSizeOutOfRange {
                value: "72".to_string(),
                min: 8.0,
                max: 64.0,
            },
        );
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["path"], "root.font_size");
        assert_eq!(json["kind"], "FontSizeOutOfRange");
        assert_eq!(json["message"], "Font size 72px out of range. Expected 8px to 64px");
    }
}
