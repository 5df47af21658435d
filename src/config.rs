use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{LayoutError, LayoutResult};
use crate::rules::RuleSet;

/// Project-level adjustments to the built-in rules, loaded from YAML.
///
/// ```yaml
/// canvas: { width: 400, height: 300 }
/// font_sizes: { XLarge: 48 }
/// icon_modules: [digit_icon, weather_icon, system_icon, battery_icon]
/// limits: { max_children: 10 }
/// max_lengths: { id: 16 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasOverride>,
    /// Extra font-size aliases; an existing alias is replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_sizes: Option<BTreeMap<String, f64>>,
    /// Replaces the icon module whitelist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_modules: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lengths: Option<BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasOverride {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitOverrides {
    pub max_node_depth: Option<usize>,
    pub max_children: Option<usize>,
    pub max_expression_depth: Option<usize>,
}

impl RuleOverrides {
    pub fn from_yaml_str(yaml: &str) -> LayoutResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> LayoutResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build a new rule set from `base` with these overrides applied.
    /// `base` itself is left untouched.
    pub fn apply(&self, base: &RuleSet) -> LayoutResult<RuleSet> {
        let mut rules = base.clone();

        if let Some(canvas) = self.canvas {
            if canvas.width == 0 || canvas.height == 0 {
                return Err(invalid("canvas", "width and height must be positive"));
            }
            rules.canvas.width = canvas.width;
            rules.canvas.height = canvas.height;
        }

        if let Some(ref font_sizes) = self.font_sizes {
            for (alias, &px) in font_sizes {
                if alias.trim().is_empty() {
                    return Err(invalid("font_sizes", "alias names must be non-empty"));
                }
                if !px.is_finite() || px <= 0.0 {
                    return Err(invalid(
                        &format!("font_sizes.{}", alias),
                        "size must be a positive number",
                    ));
                }
                match rules.font_sizes.iter_mut().find(|(a, _)| a == alias) {
                    Some((_, existing)) => *existing = px,
                    None => rules.font_sizes.push((alias.clone(), px)),
                }
            }
        }

        if let Some(ref modules) = self.icon_modules {
            if modules.is_empty() {
                return Err(invalid("icon_modules", "must list at least one module"));
            }
            if let Some(bad) = modules.iter().find(|m| !is_module_name(m)) {
                return Err(invalid(
                    "icon_modules",
                    &format!("'{}' is not a valid module name (letters and '_' only)", bad),
                ));
            }
            rules.icon_modules = modules.clone();
        }

        if let Some(limits) = self.limits {
            if let Some(depth) = limits.max_node_depth {
                rules.limits.max_node_depth = positive("limits.max_node_depth", depth)?;
            }
            if let Some(children) = limits.max_children {
                rules.limits.max_children = positive("limits.max_children", children)?;
            }
            if let Some(depth) = limits.max_expression_depth {
                rules.limits.max_expression_depth = depth;
            }
        }

        if let Some(ref max_lengths) = self.max_lengths {
            for (field, &max) in max_lengths {
                match rules.max_lengths.iter_mut().find(|(f, _)| f == field) {
                    Some((_, existing)) => {
                        *existing = positive(&format!("max_lengths.{}", field), max)?
                    }
                    None => {
                        return Err(invalid(
                            &format!("max_lengths.{}", field),
                            "not a length-limited field",
                        ))
                    }
                }
            }
        }

        Ok(rules)
    }
}

impl RuleSet {
    pub fn with_overrides(&self, overrides: &RuleOverrides) -> LayoutResult<RuleSet> {
        overrides.apply(self)
    }
}

fn is_module_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

fn positive(key: &str, value: usize) -> LayoutResult<usize> {
    if value == 0 {
        Err(invalid(key, "must be greater than 0"))
    } else {
        Ok(value)
    }
}

fn invalid(key: &str, reason: &str) -> LayoutError {
    LayoutError::InvalidOverride {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_keep_builtin() {
        let overrides = RuleOverrides::from_yaml_str("{}").unwrap();
        let rules = overrides.apply(RuleSet::builtin()).unwrap();
        assert_eq!(&rules, RuleSet::builtin());
    }

    #[test]
    fn test_font_size_aliases_extend() {
        let overrides = RuleOverrides::from_yaml_str("font_sizes:\n  XLarge: 48\n  Small: 14\n").unwrap();
        let rules = RuleSet::builtin().with_overrides(&overrides).unwrap();
        assert_eq!(rules.font_size_alias("XLarge"), Some(48.0));
        assert_eq!(rules.font_size_alias("Small"), Some(14.0));
        assert_eq!(rules.font_size_alias("Medium"), Some(24.0));
        // the shared registry is not touched
        assert_eq!(RuleSet::builtin().font_size_alias("XLarge"), None);
    }

    #[test]
    fn test_canvas_and_limits() {
        let yaml = "canvas: { width: 400, height: 300 }\nlimits: { max_children: 4 }\n";
        let rules = RuleOverrides::from_yaml_str(yaml)
            .unwrap()
            .apply(RuleSet::builtin())
            .unwrap();
        assert_eq!(rules.canvas.width, 400);
        assert_eq!(rules.canvas.height, 300);
        assert_eq!(rules.limits.max_children, 4);
        assert_eq!(rules.limits.max_node_depth, 10);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let overrides = RuleOverrides::from_yaml_str("limits: { max_node_depth: 0 }").unwrap();
        assert!(matches!(
            overrides.apply(RuleSet::builtin()),
            Err(LayoutError::InvalidOverride { .. })
        ));
    }

    #[test]
    fn test_non_finite_font_size_rejected() {
        for px in [".inf", ".nan", "-4"] {
            let yaml = format!("font_sizes: {{ XLarge: {} }}", px);
            let overrides = RuleOverrides::from_yaml_str(&yaml).unwrap();
            assert!(
                matches!(
                    overrides.apply(RuleSet::builtin()),
                    Err(LayoutError::InvalidOverride { .. })
                ),
                "{} was accepted",
                px
            );
        }
    }

    #[test]
    fn test_unknown_length_field_rejected() {
        let overrides = RuleOverrides::from_yaml_str("max_lengths: { anchor: 4 }").unwrap();
        assert!(overrides.apply(RuleSet::builtin()).is_err());
    }

    #[test]
    fn test_bad_module_name_rejected() {
        let overrides = RuleOverrides::from_yaml_str("icon_modules: [\"bad-name\"]").unwrap();
        assert!(overrides.apply(RuleSet::builtin()).is_err());
    }

    #[test]
    fn test_unknown_key_is_yaml_error() {
        assert!(matches!(
            RuleOverrides::from_yaml_str("colours: {}"),
            Err(LayoutError::YamlError(_))
        ));
    }
}
