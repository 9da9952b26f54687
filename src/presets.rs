//! Presets related to a plugin.

use crate::diagnostics::Diagnostics;
use crate::ns;
use crate::plugin::PresetRef;
use crate::repository::{MetadataRepository, Value};

/// Lists the presets that apply to `plugin`, sorted by label with unlabeled
/// presets first.
pub fn list_presets<R>(repo: &R, plugin: &str) -> Vec<PresetRef>
where
    R: MetadataRepository + ?Sized,
{
    let preset_class = Value::Uri(ns::term(ns::PRESETS, "Preset"));
    let rdf_type = ns::term(ns::RDF, "type");
    let label = ns::term(ns::RDFS, "label");

    let mut presets: Vec<PresetRef> = repo
        .find_subjects(&ns::term(ns::LV2, "appliesTo"), &Value::Uri(plugin.to_string()))
        .into_iter()
        .filter(|preset| repo.has_fact(preset, &rdf_type, &preset_class))
        .map(|preset| PresetRef {
            label: repo.first_string(&preset, &label),
            uri: preset,
        })
        .collect();

    presets.sort_by(|a, b| {
        a.label
            .as_deref()
            .unwrap_or("")
            .cmp(b.label.as_deref().unwrap_or(""))
    });
    presets
}

/// Like [`list_presets`], recording an error for every preset without a
/// label.
pub fn resolve_presets<R>(repo: &R, plugin: &str, diagnostics: &mut Diagnostics) -> Vec<PresetRef>
where
    R: MetadataRepository + ?Sized,
{
    let presets = list_presets(repo, plugin);
    for preset in presets.iter().filter(|preset| preset.label.is_none()) {
        diagnostics.error(format!("Preset '{}' has no rdfs:label", preset.uri));
    }
    presets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::FactGraph;

    const PLUGIN: &str = "urn:example:synth";

    fn preset(graph: &mut FactGraph, uri: &str, label: Option<&str>) {
        graph.insert(uri, ns::term(ns::RDF, "type"), Value::uri(ns::term(ns::PRESETS, "Preset")));
        graph.insert(uri, ns::term(ns::LV2, "appliesTo"), Value::uri(PLUGIN));
        if let Some(label) = label {
            graph.insert(uri, ns::term(ns::RDFS, "label"), Value::literal(label));
        }
    }

    #[test]
    fn presets_are_sorted_with_unlabeled_first() {
        let mut graph = FactGraph::new();
        preset(&mut graph, "urn:example:synth:pad", Some("Pad"));
        preset(&mut graph, "urn:example:synth:bass", Some("Bass"));
        preset(&mut graph, "urn:example:synth:unnamed", None);

        let mut diagnostics = Diagnostics::new();
        let presets = resolve_presets(&graph, PLUGIN, &mut diagnostics);

        let labels: Vec<_> = presets.iter().map(|p| p.label.as_deref()).collect();
        assert_eq!(labels, vec![None, Some("Bass"), Some("Pad")]);
        assert_eq!(
            diagnostics.finish().errors,
            vec!["Preset 'urn:example:synth:unnamed' has no rdfs:label"]
        );
    }

    #[test]
    fn resources_that_are_not_presets_are_ignored() {
        let mut graph = FactGraph::new();
        graph.insert("urn:example:synth:ui", ns::term(ns::LV2, "appliesTo"), Value::uri(PLUGIN));

        assert!(list_presets(&graph, PLUGIN).is_empty());
    }
}
