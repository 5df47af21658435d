use serde_yaml::Value as YamlValue;
use std::fmt;

/// The closed set of layout node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    Text,
    Icon,
    Line,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Container,
        NodeKind::Text,
        NodeKind::Icon,
        NodeKind::Line,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "container" => Some(NodeKind::Container),
            "text" => Some(NodeKind::Text),
            "icon" => Some(NodeKind::Icon),
            "line" => Some(NodeKind::Line),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Text => "text",
            NodeKind::Icon => "icon",
            NodeKind::Line => "line",
        }
    }

    /// Comma-separated list of every kind name
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(NodeKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a node's `type` attribute resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum KindTag {
    Missing,
    Known(NodeKind),
    Unknown(String),
}

impl KindTag {
    pub fn known(&self) -> Option<NodeKind> {
        match self {
            KindTag::Known(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One entry of a container's `children` sequence.
///
/// Documents wrap every child as `- node: {...}`; anything else is kept as
/// `Malformed` so the walker can report it at the right index.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(Node),
    Malformed,
}

/// A dynamically-typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<AttrValue>),
    Map(Node),
    /// Only produced for a sequence-valued `children` attribute
    Children(Vec<Child>),
}

impl AttrValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "boolean",
            AttrValue::Number(Number::Int(_)) => "integer",
            AttrValue::Number(Number::Float(_)) => "float",
            AttrValue::Text(_) => "string",
            AttrValue::List(_) | AttrValue::Children(_) => "array",
            AttrValue::Map(_) => "mapping",
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn from_yaml(value: &YamlValue) -> Self {
        match value {
            YamlValue::Null => AttrValue::Null,
            YamlValue::Bool(b) => AttrValue::Bool(*b),
            YamlValue::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Number(Number::Int(i)),
                None => AttrValue::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            YamlValue::String(s) => AttrValue::Text(s.clone()),
            YamlValue::Sequence(items) => {
                AttrValue::List(items.iter().map(AttrValue::from_yaml).collect())
            }
            YamlValue::Mapping(_) => match Node::from_yaml(value) {
                Some(node) => AttrValue::Map(node),
                None => AttrValue::Null,
            },
            YamlValue::Tagged(tagged) => AttrValue::from_yaml(&tagged.value),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => Ok(()),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            AttrValue::Map(node) => write!(f, "{}", node),
            AttrValue::Children(children) => write!(f, "[{} children]", children.len()),
        }
    }
}

/// A layout node: attribute names to values, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    attrs: Vec<(String, AttrValue)>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful in tests
    pub fn with(mut self, name: &str, value: AttrValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: AttrValue) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn kind_tag(&self) -> KindTag {
        match self.get("type") {
            None => KindTag::Missing,
            Some(AttrValue::Text(name)) => match NodeKind::parse(name) {
                Some(kind) => KindTag::Known(kind),
                None => KindTag::Unknown(name.clone()),
            },
            Some(other) => KindTag::Unknown(other.to_string()),
        }
    }

    pub fn children(&self) -> Option<&[Child]> {
        match self.get("children") {
            Some(AttrValue::Children(children)) => Some(children),
            _ => None,
        }
    }

    /// True only for an explicit `is_absolute: true`
    pub fn is_absolute(&self) -> bool {
        matches!(self.get("is_absolute"), Some(AttrValue::Bool(true)))
    }

    /// Convert a generic YAML tree into a node. Returns `None` unless `value`
    /// is a mapping.
    pub fn from_yaml(value: &YamlValue) -> Option<Node> {
        let mapping = match value {
            YamlValue::Mapping(m) => m,
            YamlValue::Tagged(tagged) => return Node::from_yaml(&tagged.value),
            _ => return None,
        };

        let mut node = Node::new();
        for (key, value) in mapping {
            let name = key_text(key);
            let attr = match (name.as_str(), value) {
                ("children", YamlValue::Sequence(entries)) => {
                    AttrValue::Children(entries.iter().map(child_from_yaml).collect())
                }
                _ => AttrValue::from_yaml(value),
            };
            node.insert(&name, attr);
        }
        Some(node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.attrs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}")
    }
}

fn child_from_yaml(entry: &YamlValue) -> Child {
    entry
        .get("node")
        .and_then(Node::from_yaml)
        .map(Child::Node)
        .unwrap_or(Child::Malformed)
}

fn key_text(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        other => AttrValue::from_yaml(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Node {
        let value: YamlValue = serde_yaml::from_str(yaml).unwrap();
        Node::from_yaml(&value).unwrap()
    }

    #[test]
    fn test_node_kind_parse() {
        assert_eq!(NodeKind::parse("container"), Some(NodeKind::Container));
        assert_eq!(NodeKind::parse("line"), Some(NodeKind::Line));
        assert_eq!(NodeKind::parse("Container"), None);
        assert_eq!(NodeKind::names(), "container, text, icon, line");
    }

    #[test]
    fn test_from_yaml_keeps_document_order() {
        let node = parse("id: a\ntype: text\nposition: [1, 2.5]\n");
        let names: Vec<&str> = node.attributes().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["id", "type", "position"]);
        assert_eq!(
            node.get("position"),
            Some(&AttrValue::List(vec![
                AttrValue::Number(Number::Int(1)),
                AttrValue::Number(Number::Float(2.5)),
            ]))
        );
    }

    #[test]
    fn test_children_wrappers() {
        let node = parse(
            r#"
type: container
children:
  - node:
      type: text
  - type: text
  - 42
"#,
        );
        let children = node.children().unwrap();
        assert_eq!(children.len(), 3);
        assert!(matches!(children[0], Child::Node(_)));
        assert_eq!(children[1], Child::Malformed);
        assert_eq!(children[2], Child::Malformed);
    }

    #[test]
    fn test_kind_tag() {
        assert_eq!(parse("type: icon").kind_tag(), KindTag::Known(NodeKind::Icon));
        assert_eq!(
            parse("type: button").kind_tag(),
            KindTag::Unknown("button".to_string())
        );
        assert_eq!(parse("type: 3").kind_tag(), KindTag::Unknown("3".to_string()));
        assert_eq!(parse("id: x").kind_tag(), KindTag::Missing);
    }

    #[test]
    fn test_non_mapping_is_not_a_node() {
        let value: YamlValue = serde_yaml::from_str("- a\n- b").unwrap();
        assert!(Node::from_yaml(&value).is_none());
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(AttrValue::Bool(true).to_string(), "true");
        assert_eq!(AttrValue::Number(Number::Float(1.5)).to_string(), "1.5");
        assert_eq!(AttrValue::Null.to_string(), "");
        assert_eq!(
            AttrValue::List(vec![
                AttrValue::Number(Number::Int(850)),
                AttrValue::Text("x".to_string())
            ])
            .to_string(),
            "[850, x]"
        );
    }

    #[test]
    fn test_is_absolute_requires_true() {
        assert!(parse("is_absolute: true").is_absolute());
        assert!(!parse("is_absolute: false").is_absolute());
        assert!(!parse("is_absolute: \"yes\"").is_absolute());
        assert!(!parse("id: a").is_absolute());
    }
}
