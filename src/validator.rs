use tracing::{debug, trace, warn};

use crate::attributes::check_attributes;
use crate::expression::check_node_expressions;
use crate::node::{Child, Node};
use crate::rules::RuleSet;
use crate::structure::{
    check_field_lengths, check_kind, check_nesting, check_required_forbidden, check_weight_usage,
};
use crate::violation::{Violation, ViolationKind};

/// Path of the document's root node
pub const ROOT_PATH: &str = "root";

/// Walks a layout tree and collects every violation, depth-first.
///
/// Holds nothing but a borrowed [`RuleSet`], so one validator can be shared
/// between threads and reused for any number of documents.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    rules: &'r RuleSet,
}

impl Default for Validator<'static> {
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}

impl<'r> Validator<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r RuleSet {
        self.rules
    }

    /// Validate a parsed tree. An empty result means the layout is valid.
    pub fn validate(&self, root: &Node) -> Vec<Violation> {
        let mut out = Vec::new();
        self.validate_node(root, ROOT_PATH, None, 1, &mut out);
        debug!(violations = out.len(), "layout validated");
        out
    }

    /// Parse YAML text and validate it.
    ///
    /// Text that is not YAML, or whose root is not a mapping, produces a
    /// single `UnparsableDocument` violation with an empty path.
    pub fn validate_yaml(&self, yaml: &str) -> Vec<Violation> {
        let value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "layout document is not valid YAML");
                return vec![unparsable(e.to_string())];
            }
        };

        match Node::from_yaml(&value) {
            Some(root) => self.validate(&root),
            None => {
                warn!("layout document root is not a mapping");
                vec![unparsable("document root must be a mapping".to_string())]
            }
        }
    }

    fn validate_node(
        &self,
        node: &Node,
        path: &str,
        parent: Option<&Node>,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        trace!(path, depth, "validating node");
        let kind = node.kind_tag();

        check_kind(&kind, path, out);
        check_field_lengths(node, path, self.rules, out);
        check_required_forbidden(node, &kind, path, self.rules, out);
        check_attributes(node, &kind, path, self.rules, out);
        check_weight_usage(node, parent, path, out);
        check_node_expressions(node, path, self.rules, out);
        check_nesting(node, depth, path, self.rules, out);

        if let Some(children) = node.children() {
            self.validate_children(children, node, path, depth, out);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn validate_children(
        &self,
        children: &[Child],
        parent: &Node,
        path: &str,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        for (index, child) in children.iter().enumerate() {
            self.validate_child(child, index, parent, path, depth, out);
        }
    }

    // Per-child results are merged in index order.
    #[cfg(feature = "parallel")]
    fn validate_children(
        &self,
        children: &[Child],
        parent: &Node,
        path: &str,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        use rayon::prelude::*;

        let per_child: Vec<Vec<Violation>> = children
            .par_iter()
            .enumerate()
            .map(|(index, child)| {
                let mut local = Vec::new();
                self.validate_child(child, index, parent, path, depth, &mut local);
                local
            })
            .collect();
        out.extend(per_child.into_iter().flatten());
    }

    fn validate_child(
        &self,
        child: &Child,
        index: usize,
        parent: &Node,
        path: &str,
        depth: usize,
        out: &mut Vec<Violation>,
    ) {
        let child_path = format!("{}.children[{}]", path, index);
        match child {
            Child::Node(node) => {
                self.validate_node(node, &child_path, Some(parent), depth + 1, out)
            }
            Child::Malformed => {
                out.push(Violation::new(child_path, ViolationKind::MalformedChildEntry))
            }
        }
    }
}

fn unparsable(reason: String) -> Violation {
    Violation::new("", ViolationKind::UnparsableDocument { reason })
}
