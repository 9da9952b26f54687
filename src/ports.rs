//! Port extraction.
//!
//! Builds one [`PortDescriptor`] per `lv2:port` of a plugin, in index
//! order, then files each port under every class it belongs to.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::ns;
use crate::plugin::{Direction, PortDescriptor, PortGroup, STANDARD_PORT_CLASSES};
use crate::range::{normalize_port, RangeFacts, RawScalePoint};
use crate::repository::{MetadataRepository, Number, Value};
use crate::units::resolve_unit;

/// Longest short name a port may declare.
pub const MAX_SHORT_NAME_CHARS: usize = 16;

/// Names and symbols already used by earlier ports of the same plugin.
#[derive(Debug, Default)]
struct SeenIdentifiers {
    names: HashSet<String>,
    symbols: HashSet<String>,
}

/// Extracts every port of `plugin` and groups them by class and direction.
///
/// The returned map always holds the `audio`, `control` and `midi` groups.
/// A port declaring no direction cannot be filed and is left out after an
/// error is recorded.
pub fn extract_ports<R>(
    repo: &R,
    plugin: &str,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, PortGroup>
where
    R: MetadataRepository + ?Sized,
{
    let mut groups: BTreeMap<String, PortGroup> = STANDARD_PORT_CLASSES
        .iter()
        .map(|class| (class.to_string(), PortGroup::default()))
        .collect();
    let mut seen = SeenIdentifiers::default();

    for (index, node) in ordered_port_nodes(repo, plugin, diagnostics).into_iter().enumerate() {
        let port = extract_port(repo, &node, index, &mut seen, diagnostics);
        debug!(index, symbol = %port.symbol, classes = ?port.classes, "extracted port");

        let Some(direction) = port.direction else {
            diagnostics.error(format!("port {} declares no direction", index));
            continue;
        };

        for class in &port.classes {
            let group = groups.entry(class.to_lowercase()).or_default();
            match direction {
                Direction::Input => group.input.push(port.clone()),
                Direction::Output => group.output.push(port.clone()),
            }
        }
    }

    groups
}

/// Port resources of a plugin ordered by their declared `lv2:index`.
/// Ports without a usable index follow in declaration order.
fn ordered_port_nodes<R>(repo: &R, plugin: &str, diagnostics: &mut Diagnostics) -> Vec<String>
where
    R: MetadataRepository + ?Sized,
{
    let index_predicate = ns::term(ns::LV2, "index");
    let mut indexed: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    let mut unindexed = Vec::new();

    for node in repo.lookup_facts(plugin, &ns::term(ns::LV2, "port")) {
        let node = node.lexical().into_owned();
        match repo.first_fact(&node, &index_predicate).and_then(|v| v.as_number()) {
            Some(Number::Integer(index)) if index >= 0 => {
                indexed.entry(index).or_default().push(node)
            }
            _ => {
                diagnostics.error(format!("port '{}' has no valid index", node));
                unindexed.push(node);
            }
        }
    }

    for (index, nodes) in &indexed {
        if nodes.len() > 1 {
            diagnostics.error(format!("port index {} is declared more than once", index));
        }
    }

    indexed.into_values().flatten().chain(unindexed).collect()
}

fn extract_port<R>(
    repo: &R,
    node: &str,
    index: usize,
    seen: &mut SeenIdentifiers,
    diagnostics: &mut Diagnostics,
) -> PortDescriptor
where
    R: MetadataRepository + ?Sized,
{
    let lv2 = |local: &str| ns::term(ns::LV2, local);
    let text = |predicate: String| repo.first_string(node, &predicate).filter(|s| !s.is_empty());

    // base data
    let name = text(lv2("name")).unwrap_or_else(|| {
        diagnostics.error(format!("port with index {} has no name", index));
        format!("_{}", index)
    });
    let symbol = text(lv2("symbol")).unwrap_or_else(|| {
        diagnostics.error(format!("port with index {} has no symbol", index));
        format!("_{}", index)
    });

    if !seen.names.insert(name.clone()) {
        diagnostics.warning(format!("port name '{}' is not unique", name));
    }
    if !seen.symbols.insert(symbol.clone()) {
        diagnostics.error(format!("port symbol '{}' is not unique", symbol));
    }

    let short_name = match text(lv2("shortName")) {
        Some(short_name) => {
            if short_name.chars().count() > MAX_SHORT_NAME_CHARS {
                diagnostics.error(format!(
                    "port '{}' short name has more than {} characters",
                    name, MAX_SHORT_NAME_CHARS
                ));
            }
            short_name
        }
        None => name.chars().take(MAX_SHORT_NAME_CHARS).collect(),
    };

    if repo.first_fact(node, &lv2("shortname")).is_some() {
        diagnostics.error(format!(
            "port '{}' short name is using old style 'shortname' instead of 'shortName'",
            name
        ));
    }

    let (direction, classes) = port_classes(repo, node, index, diagnostics);

    let range_steps = [ns::term(ns::MOD, "rangeSteps"), ns::term(ns::PORT_PROPS, "rangeSteps")]
        .into_iter()
        .find_map(|predicate| repo.first_fact(node, &predicate))
        .and_then(|value| match value.as_number() {
            Some(Number::Integer(steps)) => Some(steps),
            _ => {
                diagnostics.error(format!("port '{}' rangeSteps is not an integer", name));
                None
            }
        });

    let properties: BTreeSet<String> = repo
        .lookup_facts(node, &lv2("portProperty"))
        .iter()
        .map(|value| ns::local_name(&value.lexical()).to_string())
        .collect();

    let mut port = PortDescriptor {
        index,
        symbol,
        short_name,
        comment: text(ns::term(ns::RDFS, "comment")),
        designation: text(lv2("designation")),
        direction,
        classes,
        properties,
        range_steps,
        range: None,
        units: None,
        scale_points: Vec::new(),
        name,
    };

    if port.has_class("Control") || port.has_class("CV") {
        let facts = range_facts(repo, node, &port.name, diagnostics);
        normalize_port(&mut port, facts, diagnostics);
    }

    if port.has_class("Control") {
        port.units = resolve_unit(repo, node, &port.name, diagnostics);
    }

    port
}

/// Resolves the direction and the remaining class tags from the port's
/// `rdf:type`s, stripping the `Port` suffix (`lv2:ControlPort` → `Control`).
fn port_classes<R>(
    repo: &R,
    node: &str,
    index: usize,
    diagnostics: &mut Diagnostics,
) -> (Option<Direction>, BTreeSet<String>)
where
    R: MetadataRepository + ?Sized,
{
    let mut classes: BTreeSet<String> = repo
        .lookup_facts(node, &ns::term(ns::RDF, "type"))
        .iter()
        .map(|value| {
            let local = ns::local_name(&value.lexical()).to_string();
            match local.strip_suffix("Port") {
                Some(stripped) if !stripped.is_empty() => stripped.to_string(),
                _ => local,
            }
        })
        .collect();

    let is_input = classes.remove("Input");
    let is_output = classes.remove("Output");
    let direction = match (is_input, is_output) {
        (true, false) => Some(Direction::Input),
        (false, true) => Some(Direction::Output),
        (true, true) => {
            diagnostics.error(format!("port {} declares both input and output", index));
            Some(Direction::Input)
        }
        (false, false) => None,
    };

    let supports_midi = repo.has_fact(
        node,
        &ns::term(ns::ATOM, "supports"),
        &Value::Uri(ns::term(ns::MIDI, "MidiEvent")),
    );
    let is_sequence = repo
        .first_fact(node, &ns::term(ns::ATOM, "bufferType"))
        .and_then(|value| value.as_uri().map(str::to_string))
        .is_some_and(|buffer| buffer == ns::term(ns::ATOM, "Sequence"));
    if classes.contains("Atom") && supports_midi && is_sequence {
        classes.insert("MIDI".to_string());
    }

    (direction, classes)
}

fn range_facts<R>(repo: &R, node: &str, port_name: &str, diagnostics: &mut Diagnostics) -> RangeFacts
where
    R: MetadataRepository + ?Sized,
{
    let mut number = |local: &str, field: &str| {
        let value = repo.first_fact(node, &ns::term(ns::LV2, local))?;
        let number = value.as_number();
        if number.is_none() {
            diagnostics.error(format!("port '{}' {} value is not a number", port_name, field));
        }
        number
    };

    let minimum = number("minimum", "minimum");
    let maximum = number("maximum", "maximum");
    let default = number("default", "default");

    let scale_points = repo
        .lookup_facts(node, &ns::term(ns::LV2, "scalePoint"))
        .iter()
        .map(|point| {
            let point = point.lexical();
            RawScalePoint {
                label: repo.first_string(&point, &ns::term(ns::RDFS, "label")),
                value: repo
                    .first_fact(&point, &ns::term(ns::RDF, "value"))
                    .and_then(|value| value.as_number()),
            }
        })
        .collect();

    RangeFacts {
        minimum,
        maximum,
        default,
        scale_points,
    }
}
