//! Namespace URIs used when looking up plugin metadata.
//!
//! Every constant is a full URI. Predicates and classes are built by
//! concatenating a namespace with a local name, see [`term`].

pub const LV2: &str = "http://lv2plug.in/ns/lv2core#";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const ATOM: &str = "http://lv2plug.in/ns/ext/atom#";
pub const MIDI: &str = "http://lv2plug.in/ns/ext/midi#";
pub const UNITS: &str = "http://lv2plug.in/ns/extensions/units#";
pub const PATCH: &str = "http://lv2plug.in/ns/ext/patch#";
pub const PRESETS: &str = "http://lv2plug.in/ns/ext/presets#";
pub const PORT_PROPS: &str = "http://lv2plug.in/ns/ext/port-props#";
pub const MOD: &str = "http://moddevices.com/ns/mod#";
pub const DOAP: &str = "http://usefulinc.com/ns/doap#";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Joins a namespace and a local name into a full URI.
pub fn term(namespace: &str, local: &str) -> String {
    format!("{}{}", namespace, local)
}

/// Returns the fragment of a URI (the part after the last `#`), or the
/// whole string when it has no fragment.
pub fn local_name(uri: &str) -> &str {
    uri.rsplit_once('#').map_or(uri, |(_, local)| local)
}
