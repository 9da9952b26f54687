//! Metadata repository access.
//!
//! The validation engine reads plugin metadata through the
//! [`MetadataRepository`] trait: typed lookups of objects by
//! subject/predicate over a graph of descriptor facts. [`FactGraph`] is the
//! in-memory implementation shipped with this crate, loaded from JSON fact
//! documents.
//!
//! # Fact documents
//!
//! ```json
//! {
//!   "prefixes": { "lv2": "http://lv2plug.in/ns/lv2core#" },
//!   "bundles": { "file:///usr/lib/lv2/amp.lv2/": ["urn:example:amp"] },
//!   "facts": [
//!     { "s": "urn:example:amp", "p": "a", "o": { "uri": "lv2:Plugin" } },
//!     { "s": "urn:example:amp", "p": "lv2:minorVersion", "o": { "integer": 2 } }
//!   ]
//! }
//! ```
//!
//! Subjects, predicates, URI objects and literal datatypes may use compact
//! `prefix:local` names. The predicate `a` is shorthand for `rdf:type`.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RepositoryError;
use crate::ns;

/// XSD datatypes whose lexical values are integers.
const XSD_INTEGER_TYPES: &[&str] = &[
    "integer",
    "int",
    "long",
    "short",
    "byte",
    "nonNegativeInteger",
    "nonPositiveInteger",
    "positiveInteger",
    "negativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
];

/// XSD datatypes whose lexical values are real numbers.
const XSD_REAL_TYPES: &[&str] = &["decimal", "float", "double"];

/// A number that remembers whether it was written as an integer or as a
/// real value.
///
/// Serializes as a bare JSON number: `Integer(3)` as `3`, `Real(3.0)` as
/// `3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub fn is_integer(self) -> bool {
        matches!(self, Number::Integer(_))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(value) => value as f64,
            Number::Real(value) => value,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{}", value),
            Number::Real(value) => write!(f, "{:.6}", value),
        }
    }
}

/// An object stored in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Uri(String),
    Literal(String),
    TypedLiteral { value: String, datatype: String },
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn uri(uri: impl Into<String>) -> Self {
        Value::Uri(uri.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Value::Literal(text.into())
    }

    /// Returns the URI when this value is a resource.
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Value::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    /// Lexical form of the value: the URI, the literal text, or the number
    /// as written.
    pub fn lexical(&self) -> Cow<'_, str> {
        match self {
            Value::Uri(text) | Value::Literal(text) => Cow::Borrowed(text),
            Value::TypedLiteral { value, .. } => Cow::Borrowed(value),
            Value::Integer(value) => Cow::Owned(value.to_string()),
            Value::Float(value) => Cow::Owned(value.to_string()),
        }
    }

    /// Interprets the value as a number, keeping its integer or real
    /// representation. Returns `None` for resources, non-numeric text and
    /// non-finite reals (`NaN`, `inf`).
    pub fn as_number(&self) -> Option<Number> {
        let number = match self {
            Value::Integer(value) => Some(Number::Integer(*value)),
            Value::Float(value) => Some(Number::Real(*value)),
            Value::Uri(_) => None,
            Value::Literal(text) => parse_number(text),
            Value::TypedLiteral { value, datatype } => {
                let text = value.trim();
                match datatype.strip_prefix(ns::XSD) {
                    Some(local) if XSD_INTEGER_TYPES.contains(&local) => text
                        .parse::<i64>()
                        .map(Number::Integer)
                        .ok()
                        .or_else(|| text.parse::<f64>().ok().map(Number::Real)),
                    Some(local) if XSD_REAL_TYPES.contains(&local) => {
                        text.parse::<f64>().ok().map(Number::Real)
                    }
                    _ => parse_number(text),
                }
            }
        };
        number.filter(|number| number.as_f64().is_finite())
    }

    /// True when the value is written as an integer (as opposed to a real
    /// number that happens to have no fractional part).
    pub fn is_integer_representation(&self) -> bool {
        matches!(self.as_number(), Some(Number::Integer(_)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical())
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    text.parse::<i64>()
        .map(Number::Integer)
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(Number::Real))
}

/// Read access to a graph of plugin metadata facts.
///
/// Implementations must be safe for concurrent reads when used with
/// [`crate::registry::describe_all`].
pub trait MetadataRepository {
    /// Objects of all facts with the given subject and predicate, in
    /// declaration order.
    fn lookup_facts(&self, subject: &str, predicate: &str) -> Vec<Value>;

    /// Subjects of all facts with the given predicate and object, in
    /// declaration order.
    fn find_subjects(&self, predicate: &str, object: &Value) -> Vec<String>;

    /// URIs of every subject declared as an `lv2:Plugin`, sorted.
    fn plugin_uris(&self) -> Vec<String>;

    /// URI of the bundle directory the plugin was declared in.
    fn bundle_uri(&self, plugin: &str) -> Option<String>;

    /// First object for subject/predicate.
    fn first_fact(&self, subject: &str, predicate: &str) -> Option<Value> {
        self.lookup_facts(subject, predicate).into_iter().next()
    }

    /// Lexical form of the first object, with surrounding whitespace removed.
    fn first_string(&self, subject: &str, predicate: &str) -> Option<String> {
        self.first_fact(subject, predicate)
            .map(|value| value.lexical().trim().to_string())
    }

    /// True when the exact fact is present.
    fn has_fact(&self, subject: &str, predicate: &str, object: &Value) -> bool {
        self.lookup_facts(subject, predicate)
            .iter()
            .any(|value| value == object)
    }
}

/// One fact in a JSON fact document.
#[derive(Debug, Clone, Deserialize)]
struct FactRecord {
    s: String,
    p: String,
    o: Value,
}

/// Top-level layout of a JSON fact document.
#[derive(Debug, Clone, Default, Deserialize)]
struct FactDocument {
    #[serde(default)]
    prefixes: BTreeMap<String, String>,
    #[serde(default)]
    bundles: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    facts: Vec<FactRecord>,
}

/// In-memory fact graph.
///
/// Facts form a set: inserting a fact that is already present is a no-op.
#[derive(Debug, Clone, Default)]
pub struct FactGraph {
    triples: Vec<(String, String, Value)>,
    by_subject: HashMap<(String, String), Vec<usize>>,
    by_predicate: HashMap<String, Vec<usize>>,
    bundles: HashMap<String, String>,
}

impl FactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single JSON fact document.
    pub fn from_json_str(json: &str) -> Result<Self, RepositoryError> {
        let mut graph = Self::new();
        graph.merge_json_str(json, "<string>")?;
        Ok(graph)
    }

    /// Loads and merges every document in `paths`, in order.
    pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, RepositoryError> {
        let mut graph = Self::new();
        for path in paths {
            graph.merge_file(path.as_ref())?;
        }
        Ok(graph)
    }

    /// Reads a JSON fact document from disk and merges it into the graph.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), RepositoryError> {
        let content = fs::read_to_string(path).map_err(|source| RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_json_str(&content, &path.display().to_string())
    }

    /// Parses a JSON fact document and merges it into the graph.
    /// `origin` names the document in error messages.
    pub fn merge_json_str(&mut self, json: &str, origin: &str) -> Result<(), RepositoryError> {
        let document: FactDocument =
            serde_json::from_str(json).map_err(|source| RepositoryError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        let prefixes = &document.prefixes;
        let before = self.triples.len();

        for record in document.facts {
            let subject = expand(prefixes, &record.s);
            let predicate = if record.p == "a" {
                ns::term(ns::RDF, "type")
            } else {
                expand(prefixes, &record.p)
            };
            let object = match record.o {
                Value::Uri(uri) => Value::Uri(expand(prefixes, &uri)),
                Value::TypedLiteral { value, datatype } => Value::TypedLiteral {
                    value,
                    datatype: expand(prefixes, &datatype),
                },
                other => other,
            };
            self.insert(subject, predicate, object);
        }

        for (bundle, plugins) in document.bundles {
            let bundle = expand(prefixes, &bundle);
            for plugin in plugins {
                self.set_bundle(expand(prefixes, &plugin), bundle.clone());
            }
        }

        debug!(
            origin,
            added = self.triples.len() - before,
            "merged fact document"
        );
        Ok(())
    }

    /// Adds a fact unless it is already present.
    pub fn insert(&mut self, subject: impl Into<String>, predicate: impl Into<String>, object: Value) {
        let key = (subject.into(), predicate.into());
        let indices = self.by_subject.entry(key.clone()).or_default();
        if indices.iter().any(|&i| self.triples[i].2 == object) {
            return;
        }
        let index = self.triples.len();
        indices.push(index);
        self.by_predicate.entry(key.1.clone()).or_default().push(index);
        self.triples.push((key.0, key.1, object));
    }

    /// Records the bundle directory a plugin was declared in.
    pub fn set_bundle(&mut self, plugin: impl Into<String>, bundle: impl Into<String>) {
        self.bundles.insert(plugin.into(), bundle.into());
    }

    /// Number of facts in the graph.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl MetadataRepository for FactGraph {
    fn lookup_facts(&self, subject: &str, predicate: &str) -> Vec<Value> {
        self.by_subject
            .get(&(subject.to_string(), predicate.to_string()))
            .map(|indices| indices.iter().map(|&i| self.triples[i].2.clone()).collect())
            .unwrap_or_default()
    }

    fn find_subjects(&self, predicate: &str, object: &Value) -> Vec<String> {
        self.by_predicate
            .get(predicate)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &self.triples[i])
                    .filter(|(_, _, o)| o == object)
                    .map(|(s, _, _)| s.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn plugin_uris(&self) -> Vec<String> {
        let plugin_class = Value::Uri(ns::term(ns::LV2, "Plugin"));
        self.find_subjects(&ns::term(ns::RDF, "type"), &plugin_class)
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn bundle_uri(&self, plugin: &str) -> Option<String> {
        self.bundles.get(plugin).cloned()
    }
}

/// Expands a compact `prefix:local` name. Full URIs, blank nodes and names
/// with an undeclared prefix are returned unchanged.
fn expand(prefixes: &BTreeMap<String, String>, term: &str) -> String {
    if term.contains("://") || term.starts_with("_:") {
        return term.to_string();
    }
    match term.split_once(':') {
        Some((prefix, local)) => match prefixes.get(prefix) {
            Some(namespace) => format!("{}{}", namespace, local),
            None => term.to_string(),
        },
        None => term.to_string(),
    }
}
