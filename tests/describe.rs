use plugininfo_core::{describe_all, describe_plugin, DescribeError, FactGraph, Number, Stability};
use serde_json::{json, Value as Json};

const AMP: &str = "http://example.org/plugins/amp";
const BROKEN: &str = "http://example.org/plugins/broken";

fn prefixes() -> Json {
    json!({
        "lv2": "http://lv2plug.in/ns/lv2core#",
        "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
        "doap": "http://usefulinc.com/ns/doap#",
        "foaf": "http://xmlns.com/foaf/0.1/",
        "units": "http://lv2plug.in/ns/extensions/units#",
        "mod": "http://moddevices.com/ns/mod#",
        "pset": "http://lv2plug.in/ns/ext/presets#",
        "ex": "http://example.org/plugins/"
    })
}

fn fact(s: &str, p: &str, o: Json) -> Json {
    json!({"s": s, "p": p, "o": o})
}

fn uri(value: &str) -> Json {
    json!({"uri": value})
}

fn text(value: &str) -> Json {
    json!({"literal": value})
}

fn amp_document() -> Json {
    let facts = vec![
        fact("ex:amp", "a", uri("lv2:Plugin")),
        fact("ex:amp", "a", uri("lv2:AmplifierPlugin")),
        fact("ex:amp", "doap:name", text("  Simple Amp  ")),
        fact("ex:amp", "mod:label", text("Amp")),
        fact("ex:amp", "mod:brand", text("Example")),
        fact("ex:amp", "doap:license", uri("http://opensource.org/licenses/isc")),
        fact("ex:amp", "rdfs:comment", text("A gain stage.")),
        fact("ex:amp", "lv2:binary", uri("file:///usr/lib/lv2/amp.lv2/amp.so")),
        fact("ex:amp", "lv2:minorVersion", json!({"integer": 2})),
        fact("ex:amp", "lv2:microVersion", json!({"integer": 4})),
        fact("ex:amp", "doap:maintainer", uri("_:dev")),
        fact("_:dev", "foaf:name", text("Jo Example")),
        fact("_:dev", "foaf:homepage", uri("http://example.org/")),
        fact("ex:amp", "lv2:port", uri("_:out")),
        fact("ex:amp", "lv2:port", uri("_:in")),
        fact("ex:amp", "lv2:port", uri("_:gain")),
        fact("_:in", "a", uri("lv2:AudioPort")),
        fact("_:in", "a", uri("lv2:InputPort")),
        fact("_:in", "lv2:index", json!({"integer": 0})),
        fact("_:in", "lv2:symbol", text("in")),
        fact("_:in", "lv2:name", text("In")),
        fact("_:out", "a", uri("lv2:AudioPort")),
        fact("_:out", "a", uri("lv2:OutputPort")),
        fact("_:out", "lv2:index", json!({"integer": 1})),
        fact("_:out", "lv2:symbol", text("out")),
        fact("_:out", "lv2:name", text("Out")),
        fact("_:gain", "a", uri("lv2:ControlPort")),
        fact("_:gain", "a", uri("lv2:InputPort")),
        fact("_:gain", "lv2:index", json!({"integer": 2})),
        fact("_:gain", "lv2:symbol", text("gain")),
        fact("_:gain", "lv2:name", text("Gain")),
        fact("_:gain", "lv2:minimum", json!({"float": -20.0})),
        fact("_:gain", "lv2:maximum", json!({"float": 20.0})),
        fact("_:gain", "lv2:default", json!({"typed_literal": {"value": "0.0", "datatype": "http://www.w3.org/2001/XMLSchema#float"}})),
        fact("_:gain", "units:unit", uri("units:db")),
        fact("ex:amp#loud", "a", uri("pset:Preset")),
        fact("ex:amp#loud", "lv2:appliesTo", uri("ex:amp")),
        fact("ex:amp#loud", "rdfs:label", text("Loud")),
    ];
    json!({
        "prefixes": prefixes(),
        "bundles": {"file:///usr/lib/lv2/amp.lv2/": ["ex:amp"]},
        "facts": facts,
    })
}

fn broken_document() -> Json {
    json!({
        "prefixes": prefixes(),
        "facts": [
            fact("ex:broken", "a", uri("lv2:Plugin")),
            fact("ex:broken", "lv2:port", uri("_:level")),
            fact("_:level", "a", uri("lv2:ControlPort")),
            fact("_:level", "a", uri("lv2:InputPort")),
            fact("_:level", "lv2:index", json!({"integer": 0})),
            fact("_:level", "lv2:symbol", text("level")),
            fact("_:level", "lv2:name", text("Level")),
            fact("_:level", "lv2:portProperty", uri("lv2:integer")),
            fact("_:level", "lv2:minimum", json!({"integer": 10})),
            fact("_:level", "lv2:maximum", json!({"integer": 5})),
            fact("_:level", "lv2:default", json!({"integer": 7})),
        ]
    })
}

fn graph() -> FactGraph {
    let mut graph = FactGraph::new();
    graph
        .merge_json_str(&amp_document().to_string(), "amp.json")
        .expect("amp document");
    graph
        .merge_json_str(&broken_document().to_string(), "broken.json")
        .expect("broken document");
    graph
}

#[test]
fn complete_plugin_is_compliant() {
    let descriptor = describe_plugin(&graph(), AMP).expect("descriptor");

    assert!(descriptor.is_compliant(), "errors: {:?}", descriptor.diagnostics.errors);
    assert!(descriptor.diagnostics.warnings.is_empty());
    assert_eq!(descriptor.name.as_deref(), Some("Simple Amp"));
    assert_eq!(descriptor.version, "2.4");
    assert_eq!(descriptor.stability, Stability::Stable);
    assert_eq!(descriptor.author.name.as_deref(), Some("Jo Example"));
    assert_eq!(
        descriptor.category.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Amplifier", "Dynamics"]
    );
    assert_eq!(descriptor.presets.len(), 1);
    assert_eq!(descriptor.presets[0].label.as_deref(), Some("Loud"));

    let gain = descriptor.port("gain").expect("gain port");
    assert_eq!(gain.index, 2);
    let range = gain.range.expect("range");
    assert_eq!(range.minimum, Number::Real(-20.0));
    assert_eq!(range.default, Number::Real(0.0));
    assert_eq!(gain.units.as_ref().map(|u| u.symbol.as_str()), Some("dB"));
}

#[cfg(unix)]
#[test]
fn library_and_bundle_paths_are_file_system_paths() {
    let descriptor = describe_plugin(&graph(), AMP).expect("descriptor");
    assert_eq!(descriptor.binary.as_deref(), Some("/usr/lib/lv2/amp.lv2/amp.so"));
    assert!(descriptor.bundles.contains("/usr/lib/lv2/amp.lv2"));
}

#[test]
fn ports_are_ordered_by_declared_index() {
    let descriptor = describe_plugin(&graph(), AMP).expect("descriptor");
    let symbols: Vec<_> = descriptor
        .all_ports()
        .iter()
        .map(|port| port.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["in", "out", "gain"]);
}

#[test]
fn serialized_layout_matches_reports() {
    let descriptor = describe_plugin(&graph(), AMP).expect("descriptor");
    let json = serde_json::to_value(&descriptor).expect("json");

    assert_eq!(json["minorVersion"], 2);
    assert_eq!(json["stability"], "stable");
    assert_eq!(json["errors"], json!([]));
    assert_eq!(json["ports"]["midi"], json!({"input": [], "output": []}));

    let audio_in = &json["ports"]["audio"]["input"][0];
    assert_eq!(audio_in["symbol"], "in");
    assert_eq!(audio_in["ranges"], json!({}));
    assert_eq!(audio_in["units"], json!({}));

    let gain = &json["ports"]["control"]["input"][0];
    assert_eq!(gain["shortName"], "Gain");
    assert_eq!(gain["ranges"]["maximum"].as_f64(), Some(20.0));
    assert_eq!(gain["units"]["render"], "%f dB");
    assert_eq!(gain["scalePoints"], json!([]));
}

#[test]
fn broken_plugin_collects_every_defect() {
    let descriptor = describe_plugin(&graph(), BROKEN).expect("descriptor");
    let errors = &descriptor.diagnostics.errors;

    for expected in [
        "plugin name is missing",
        "plugin binary is missing",
        "plugin license is missing",
        "plugin is missing version information",
        "port 'Level' minimum value is equal or higher than its maximum",
        "port 'Level' default value is out of bounds",
    ] {
        assert!(errors.contains(&expected.to_string()), "missing {:?} in {:?}", expected, errors);
    }
    assert_eq!(descriptor.stability, Stability::Experimental);

    let level = descriptor.port("level").expect("level port");
    let range = level.range.expect("range");
    assert_eq!(range.minimum, Number::Integer(10));
    assert_eq!(range.maximum, Number::Integer(11));
    assert_eq!(range.default, Number::Integer(10));
}

#[test]
fn diagnostics_are_sorted_and_unique() {
    let descriptor = describe_plugin(&graph(), BROKEN).expect("descriptor");
    let mut sorted = descriptor.diagnostics.errors.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(descriptor.diagnostics.errors, sorted);
}

#[test]
fn unknown_plugin_is_not_found() {
    let result = describe_plugin(&graph(), "http://example.org/plugins/none");
    assert!(matches!(result, Err(DescribeError::NotFound { .. })));
}

#[test]
fn describing_all_plugins_matches_single_descriptions() {
    let graph = graph();
    let all = describe_all(&graph, Some(2)).expect("descriptors");

    assert_eq!(
        all.iter().map(|d| d.uri.as_str()).collect::<Vec<_>>(),
        vec![AMP, BROKEN]
    );
    assert_eq!(all[0], describe_plugin(&graph, AMP).expect("amp"));
    assert_eq!(all[1], describe_plugin(&graph, BROKEN).expect("broken"));
}

#[test]
fn describing_is_deterministic() {
    let first = serde_json::to_string(&describe_plugin(&graph(), AMP).expect("first")).expect("json");
    let second = serde_json::to_string(&describe_plugin(&graph(), AMP).expect("second")).expect("json");
    assert_eq!(first, second);
}
