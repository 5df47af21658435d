//! Checks for the brace-expression syntax embedded in `content`, `icon_id`
//! and `condition`.
//!
//! A `{` or `}` directly preceded by a backslash is literal text. Nesting
//! depth and segment extraction are measured by two separate passes with
//! slightly different escape rules:
//!
//! - depth: a backslash escapes whatever character follows it;
//! - segments: a brace is literal when the character before it is a
//!   backslash, and backslash-escaped operators inside a segment are
//!   unescaped before the operator scan (so `{a\+b}` still reports `+`).

use regex::Regex;
use std::sync::OnceLock;

use crate::node::{AttrValue, Node};
use crate::rules::{RuleSet, EXPRESSION_FIELDS, ICON_FIELD, NON_EMPTY_EXPRESSION_FIELDS};
use crate::violation::{Violation, ViolationKind};

/// Maximum `{}` nesting depth of `expr`, ignoring escaped characters
pub fn nesting_depth(expr: &str) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    let mut escaped = false;

    for c in expr.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}

/// Text of every outermost `{...}` segment, with escaped operators unescaped.
///
/// Nested braces stay part of the enclosing segment. A segment that is never
/// closed is not returned.
pub fn brace_segments(expr: &str) -> Vec<String> {
    let chars: Vec<char> = expr.chars().collect();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        let literal = i > 0 && chars[i - 1] == '\\';
        match c {
            '{' if !literal => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            '}' if !literal && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let raw: String = chars[start..i].iter().collect();
                    segments.push(unescape_operators(&raw));
                }
            }
            _ => {}
        }
    }
    segments
}

fn unescape_operators(segment: &str) -> String {
    static ESCAPED_OPERATOR: OnceLock<Regex> = OnceLock::new();
    let re = ESCAPED_OPERATOR.get_or_init(|| Regex::new(r"\\([\-+\\*/%?])").unwrap());
    re.replace_all(segment, "$1").into_owned()
}

/// Module names referenced as `{module:...}`, skipping escaped braces
pub fn icon_module_refs(expr: &str) -> Vec<&str> {
    static MODULE_REF: OnceLock<Regex> = OnceLock::new();
    let re = MODULE_REF.get_or_init(|| Regex::new(r"\{([a-zA-Z_]+):").unwrap());

    re.captures_iter(expr)
        .filter(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            !expr[..start].ends_with('\\')
        })
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Check every expression field present on `node`
pub fn check_node_expressions(node: &Node, path: &str, rules: &RuleSet, out: &mut Vec<Violation>) {
    for &field in EXPRESSION_FIELDS {
        if let Some(value) = node.get(field) {
            check_expression(field, value, &format!("{}.{}", path, field), rules, out);
        }
    }
}

/// Check a single expression value; `path` already names the field
pub fn check_expression(
    field: &str,
    value: &AttrValue,
    path: &str,
    rules: &RuleSet,
    out: &mut Vec<Violation>,
) {
    let raw = value.to_string();

    if NON_EMPTY_EXPRESSION_FIELDS.contains(&field) && raw.trim().is_empty() {
        out.push(Violation::new(path, ViolationKind::EmptyRequiredExpression));
    }

    let depth = nesting_depth(&raw);
    let max = rules.limits.max_expression_depth;
    if depth > max {
        out.push(Violation::new(
            path,
            ViolationKind::ExpressionTooDeep { depth, max },
        ));
    }

    for segment in brace_segments(&raw) {
        for &operator in rules.forbidden_operators() {
            if segment.contains(operator) {
                out.push(Violation::new(
                    path,
                    ViolationKind::ForbiddenOperatorInExpression {
                        operator,
                        segment: segment.clone(),
                    },
                ));
            }
        }
    }

    if field == ICON_FIELD {
        for module in icon_module_refs(&raw) {
            if !rules.is_icon_module(module) {
                out.push(Violation::new(
                    path,
                    ViolationKind::UnknownIconModule {
                        module: module.to_string(),
                        allowed: rules.icon_modules().join(", "),
                    },
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(field: &str, text: &str) -> Vec<ViolationKind> {
        let mut out = Vec::new();
        check_expression(
            field,
            &AttrValue::Text(text.to_string()),
            "root.x",
            RuleSet::builtin(),
            &mut out,
        );
        out.into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(nesting_depth("plain"), 0);
        assert_eq!(nesting_depth("{a} {b}"), 1);
        assert_eq!(nesting_depth("{a {b}}"), 2);
        assert_eq!(nesting_depth("{a {b {c}}}"), 3);
        assert_eq!(nesting_depth(r"\{a {b}\}"), 1);
        assert_eq!(nesting_depth("}}{"), 1);
    }

    #[test]
    fn test_brace_segments() {
        assert_eq!(brace_segments("a {b} c {d}"), vec!["b", "d"]);
        assert_eq!(brace_segments("{x {y} z}"), vec!["x {y} z"]);
        assert_eq!(brace_segments(r"\{literal\} {real}"), vec!["real"]);
        assert_eq!(brace_segments("{never closed"), Vec::<String>::new());
        assert_eq!(brace_segments(r"{a\+b}"), vec!["a+b"]);
    }

    #[test]
    fn test_icon_module_refs() {
        assert_eq!(
            icon_module_refs("{weather_icon:sunny} {digit_icon:3}"),
            vec!["weather_icon", "digit_icon"]
        );
        assert!(icon_module_refs(r"\{weather_icon:sunny}").is_empty());
        assert!(icon_module_refs("{no_colon}").is_empty());
    }

    #[test]
    fn test_operator_inside_braces() {
        let found = check("content", "{weather_icon:sunny + 1}");
        assert_eq!(
            found,
            vec![ViolationKind::ForbiddenOperatorInExpression {
                operator: '+',
                segment: "weather_icon:sunny + 1".to_string(),
            }]
        );
    }

    #[test]
    fn test_operators_outside_braces_are_text() {
        assert!(check("content", "a {b} c").is_empty());
        assert!(check("content", "50% - {temp}").is_empty());
        assert!(check("content", r"\{a+b\}").is_empty());
    }

    #[test]
    fn test_each_operator_reported_once_per_segment() {
        let found = check("condition", "{a - b - c ? d}");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_too_deep() {
        let found = check("condition", "{a {b {c}}}");
        assert_eq!(found, vec![ViolationKind::ExpressionTooDeep { depth: 3, max: 2 }]);
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(check("content", "   "), vec![ViolationKind::EmptyRequiredExpression]);
        assert_eq!(check("icon_id", ""), vec![ViolationKind::EmptyRequiredExpression]);
        assert!(check("condition", "").is_empty());
    }

    #[test]
    fn test_unknown_icon_module() {
        let found = check("icon_id", "{moon_icon:full}");
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0],
            ViolationKind::UnknownIconModule { module, .. } if module == "moon_icon"
        ));
        assert!(check("icon_id", "{system_icon:wifi}").is_empty());
        // only icon_id is checked for modules
        assert!(check("content", "{moon_icon:full}").is_empty());
    }
}
