use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::diagnostics::DiagnosticReport;
use crate::repository::Number;

/// Port classes every descriptor lists, even when empty.
pub const STANDARD_PORT_CLASSES: &[&str] = &["audio", "control", "midi"];

/// Coarse quality classification derived from the version number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    #[default]
    Experimental,
    Testing,
    Stable,
}

impl Stability {
    /// Applies the release-parity rule: a zero minor version is
    /// experimental, an odd minor or micro version is testing, anything
    /// else is stable.
    pub fn from_version(minor: u32, micro: u32) -> Self {
        if minor == 0 {
            Stability::Experimental
        } else if minor % 2 != 0 || micro % 2 != 0 {
            Stability::Testing
        } else {
            Stability::Stable
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
}

/// Whether a port carries data into or out of the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// Normalized value range of a control or CV port.
///
/// All three values share one domain: integers when the port has the
/// `integer` property, reals otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeSpec {
    pub minimum: Number,
    pub maximum: Number,
    pub default: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalePoint {
    pub value: Number,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSpec {
    pub label: String,
    pub render: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortDescriptor {
    pub index: usize,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "shortName")]
    pub short_name: String,
    pub comment: Option<String>,
    pub designation: Option<String>,
    #[serde(skip)]
    pub direction: Option<Direction>,
    /// Capability classes without the direction marker, e.g. `Control`.
    #[serde(skip)]
    pub classes: BTreeSet<String>,
    pub properties: BTreeSet<String>,
    #[serde(rename = "rangeSteps")]
    pub range_steps: Option<i64>,
    #[serde(rename = "ranges", serialize_with = "option_or_empty_object")]
    pub range: Option<RangeSpec>,
    #[serde(serialize_with = "option_or_empty_object")]
    pub units: Option<UnitSpec>,
    #[serde(rename = "scalePoints")]
    pub scale_points: Vec<ScalePoint>,
}

impl PortDescriptor {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.contains(property)
    }

    pub fn is_input(&self) -> bool {
        self.direction == Some(Direction::Input)
    }
}

/// Ports of one class, split by direction and ordered by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortGroup {
    pub input: Vec<PortDescriptor>,
    pub output: Vec<PortDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    pub uri: String,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
    pub writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetRef {
    /// `None` when the preset declares no label.
    pub label: Option<String>,
    pub uri: String,
}

/// Normalized description of one plugin plus everything found wrong with
/// its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PluginDescriptor {
    pub uri: String,
    pub name: Option<String>,
    pub binary: Option<String>,
    pub brand: Option<String>,
    pub label: Option<String>,
    pub license: Option<String>,
    pub comment: Option<String>,
    pub category: BTreeSet<String>,
    #[serde(rename = "minorVersion")]
    pub minor_version: u32,
    #[serde(rename = "microVersion")]
    pub micro_version: u32,
    pub version: String,
    pub stability: Stability,
    pub author: Author,
    pub bundles: BTreeSet<String>,
    pub ports: BTreeMap<String, PortGroup>,
    pub presets: Vec<PresetRef>,
    pub properties: BTreeMap<String, PropertySpec>,
    #[serde(flatten)]
    pub diagnostics: DiagnosticReport,
}

impl PluginDescriptor {
    /// True when validation recorded no errors.
    pub fn is_compliant(&self) -> bool {
        self.diagnostics.is_compliant()
    }

    /// Every port once, ordered by index. Ports listed under several
    /// classes are not repeated.
    pub fn all_ports(&self) -> Vec<&PortDescriptor> {
        let mut seen = BTreeMap::new();
        for group in self.ports.values() {
            for port in group.input.iter().chain(group.output.iter()) {
                seen.entry(port.index).or_insert(port);
            }
        }
        seen.into_values().collect()
    }

    /// Looks up a port by symbol.
    pub fn port(&self, symbol: &str) -> Option<&PortDescriptor> {
        self.all_ports().into_iter().find(|port| port.symbol == symbol)
    }
}

/// Serializes `None` as an empty JSON object, keeping the layout consumers
/// of earlier reports expect.
fn option_or_empty_object<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
