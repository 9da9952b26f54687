//! Dynamically patchable plugin properties (`patch:readable` /
//! `patch:writable`).

use std::collections::BTreeMap;

use crate::diagnostics::Diagnostics;
use crate::ns;
use crate::plugin::PropertySpec;
use crate::repository::{MetadataRepository, Value};

/// Collects the readable and writable properties of a plugin, keyed by
/// property URI.
///
/// Writable relations are processed after readable ones, so a property
/// listed under both ends up with `writable = true`. Properties that are not
/// declared as `lv2:Parameter` are reported and skipped.
pub fn resolve_properties<R>(
    repo: &R,
    plugin: &str,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, PropertySpec>
where
    R: MetadataRepository + ?Sized,
{
    let parameter = Value::Uri(ns::term(ns::LV2, "Parameter"));
    let rdf_type = ns::term(ns::RDF, "type");

    let readable = repo
        .lookup_facts(plugin, &ns::term(ns::PATCH, "readable"))
        .into_iter()
        .map(|node| (node, false));
    let writable = repo
        .lookup_facts(plugin, &ns::term(ns::PATCH, "writable"))
        .into_iter()
        .map(|node| (node, true));

    let mut properties = BTreeMap::new();
    for (node, is_writable) in readable.chain(writable) {
        let uri = node.lexical().trim().to_string();

        if !repo.has_fact(&uri, &rdf_type, &parameter) {
            diagnostics.error(format!("Could not find definition of property '{}'.", uri));
            continue;
        }

        let spec = PropertySpec {
            uri: uri.clone(),
            label: repo.first_string(&uri, &ns::term(ns::RDFS, "label")),
            value_type: repo.first_string(&uri, &ns::term(ns::RDFS, "range")),
            writable: is_writable,
        };
        properties.insert(uri, spec);
    }

    properties
}
