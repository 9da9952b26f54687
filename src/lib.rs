//! PluginInfo Core Library
//!
//! Validation and normalization engine for LV2 plugin metadata.
//!
//! Plugin metadata arrives as loosely typed facts (subject, predicate,
//! object). This library checks those facts against the LV2 conventions,
//! repairs what it can (out-of-order ranges, float/integer mismatches,
//! unsorted scale points) and produces one [`PluginDescriptor`] per plugin
//! carrying the normalized data plus every error and warning found.
//!
//! # Architecture
//!
//! This library is consumed three ways:
//! - **Rust**: the `registry` entry points over any [`MetadataRepository`]
//! - **CLI**: the `plugininfo` binary
//! - **Native frontends**: the C ABI in `ffi` (static lib or DLL)
//!
//! # Core Features Implemented
//!
//! ## Metadata Access (`repository` module)
//! - `MetadataRepository` - Read-only fact lookups the engine depends on
//! - `FactGraph` - In-memory repository loaded from JSON fact documents
//!
//! ## Validation (`ports`, `range`, `units`, `properties`, `presets`, `descriptor` modules)
//! - `build_descriptor()` - Validate and normalize one plugin
//! - Port ordering, naming and classification
//! - Range and scale point coercion with sample-rate scaling
//! - Built-in and custom units, patch properties, presets
//!
//! ## Plugin Discovery (`registry` module)
//! - `describe_plugin()` / `describe_all()` - Describe one or every plugin
//! - `grep_plugins()` - Search plugins by URI pattern
//! - `related_uris()` - Bundle, library, data files and related resources
//!
//! ## Reports (`operations` module)
//! - `export_reports()` - Write descriptors and a run manifest to disk

pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod ffi;
pub mod ns;
pub mod operations;
pub mod plugin;
pub mod ports;
pub mod presets;
pub mod properties;
pub mod range;
pub mod registry;
pub mod repository;
pub mod tables;
pub mod telemetry;
pub mod units;

pub use config::{Config, LogFormat};
pub use descriptor::build_descriptor;
pub use diagnostics::{DiagnosticReport, Diagnostics, Severity};
pub use error::{DescribeError, RepositoryError};
pub use plugin::{
    Author, PluginDescriptor, PortDescriptor, PortGroup, PresetRef, PropertySpec, RangeSpec,
    ScalePoint, Stability, UnitSpec,
};
pub use registry::{describe_all, describe_plugin, grep_plugins, plugin_uris, related_uris};
pub use repository::{FactGraph, MetadataRepository, Number, Value};
