//! Backend instances and routing targets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Annotation value meaning "the only available instance".
pub const ANY_INSTANCE: &str = "true";

/// Namespace assumed when none is set.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A named tracing backend that sidecars report to.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendInstance {
    /// Unique within its scope.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Full agent image reference; overrides the configured image when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Options passed to the agent as `--key=value` flags.
    pub options: Options,
}

impl BackendInstance {
    /// Create an instance with no options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Namespace, or `default` when unset or empty.
    pub fn namespace_or_default(&self) -> &str {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => DEFAULT_NAMESPACE,
        }
    }
}

/// A single option value.
///
/// Scalars render as-is, lists join with commas, maps nest under dotted keys.
/// Lists hold scalars only; anything else is rejected when deserializing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<OptionScalar>),
    Map(BTreeMap<String, OptionValue>),
}

/// A list element.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionScalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for OptionScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionScalar::Bool(b) => write!(f, "{b}"),
            OptionScalar::Integer(i) => write!(f, "{i}"),
            OptionScalar::Float(x) => write!(f, "{x}"),
            OptionScalar::String(s) => f.write_str(s),
        }
    }
}

/// A flattened entry and how many map levels produced it.
struct Flat {
    value: String,
    depth: usize,
}

impl OptionValue {
    fn flatten_into(&self, key: String, depth: usize, out: &mut BTreeMap<String, Flat>) {
        match self {
            OptionValue::Map(entries) => {
                for (child, value) in entries {
                    value.flatten_into(format!("{key}.{child}"), depth + 1, out);
                }
            }
            other => {
                let value = other.to_string();
                if let Some(existing) = out.get(&key).filter(|e| e.depth <= depth) {
                    tracing::warn!(
                        option = %key,
                        kept = %existing.value,
                        dropped = %value,
                        "Conflicting option spellings, keeping the less nested one"
                    );
                    return;
                }
                out.insert(key, Flat { value, depth });
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Integer(i) => write!(f, "{i}"),
            OptionValue::Float(x) => write!(f, "{x}"),
            OptionValue::String(s) => f.write_str(s),
            OptionValue::List(items) => {
                let joined = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
                f.write_str(&joined)
            }
            OptionValue::Map(entries) => {
                let joined = entries
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
        }
    }
}

/// Unordered option set of a backend instance.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Options(HashMap<String, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten nested maps into dotted keys with rendered values, sorted by key.
    ///
    /// When a literal dotted key and a nested map spell the same option, the
    /// less nested spelling wins (`"reporter.type"` beats
    /// `{"reporter": {"type": ..}}`). Equal nesting keeps the first in key order.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut sorted: Vec<(&String, &OptionValue)> = self.0.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = BTreeMap::new();
        for (key, value) in sorted {
            value.flatten_into(key.clone(), 0, &mut out);
        }
        out.into_iter().map(|(key, flat)| (key, flat.value)).collect()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Where a workload wants its sidecar to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Whichever instance is the only one available.
    Any,
    /// The instance with exactly this name.
    Specific(String),
}

impl Routing {
    /// Interpret a routing annotation value.
    pub fn parse(value: &str) -> Self {
        if value == ANY_INSTANCE {
            Routing::Any
        } else {
            Routing::Specific(value.to_string())
        }
    }
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Routing::Any => f.write_str("any"),
            Routing::Specific(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_parse() {
        assert_eq!(Routing::parse("true"), Routing::Any);
        assert_eq!(Routing::parse("TRUE"), Routing::Specific("TRUE".into()));
        assert_eq!(Routing::parse("prod"), Routing::Specific("prod".into()));
    }

    #[test]
    fn test_flatten_nested_options() {
        let options: Options = serde_json::from_str(
            r#"{
                "log-level": "debug",
                "reporter": {"grpc": {"retry": {"max": 5}}, "type": "grpc"},
                "processor.jaeger-compact.workers": 10,
                "metrics.enabled": true,
                "tags": ["a", "b"]
            }"#,
        )
        .unwrap();

        let flat = options.flatten();
        assert_eq!(flat.len(), 6);
        assert_eq!(flat["log-level"], "debug");
        assert_eq!(flat["reporter.grpc.retry.max"], "5");
        assert_eq!(flat["reporter.type"], "grpc");
        assert_eq!(flat["processor.jaeger-compact.workers"], "10");
        assert_eq!(flat["metrics.enabled"], "true");
        assert_eq!(flat["tags"], "a,b");
    }

    #[test]
    fn test_conflicting_spellings_resolve_the_same_way() {
        let json = r#"{
            "reporter": {"type": "grpc"},
            "reporter.type": "thrift",
            "a": {"b.c": "nested-first"},
            "a.b": {"c": "nested-second"},
            "x1": 1, "x2": 2, "x3": 3, "x4": 4
        }"#;

        for _ in 0..200 {
            let options: Options = serde_json::from_str(json).unwrap();
            let flat = options.flatten();
            assert_eq!(flat["reporter.type"], "thrift");
            assert_eq!(flat["a.b.c"], "nested-first");
            assert_eq!(flat.len(), 6);
        }
    }

    #[test]
    fn test_list_of_maps_rejected() {
        let err = serde_json::from_str::<Options>(r#"{"tags": [{"k": "v"}]}"#);
        assert!(err.is_err());

        let options: Options = serde_json::from_str(r#"{"tags": ["a", 1, true]}"#).unwrap();
        assert_eq!(options.flatten()["tags"], "a,1,true");
    }

    #[test]
    fn test_namespace_default() {
        assert_eq!(BackendInstance::new("a").namespace_or_default(), "default");
        assert_eq!(
            BackendInstance::new("a").with_namespace("obs").namespace_or_default(),
            "obs"
        );
        assert_eq!(
            BackendInstance::new("a").with_namespace("").namespace_or_default(),
            "default"
        );
    }
}
