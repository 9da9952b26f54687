//! Descriptor aggregation.
//!
//! [`build_descriptor`] validates the identity facts of one plugin and
//! composes ports, presets and properties into a [`PluginDescriptor`]. It
//! never fails: every defect is recorded as a diagnostic and a best-effort
//! descriptor is always returned.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::diagnostics::Diagnostics;
use crate::ns;
use crate::plugin::{Author, PluginDescriptor, Stability};
use crate::ports::extract_ports;
use crate::presets::resolve_presets;
use crate::properties::resolve_properties;
use crate::repository::{MetadataRepository, Number, Value};
use crate::tables::categories_for;

/// Longest plugin label or brand accepted without a warning.
pub const MAX_LABEL_CHARS: usize = 16;

/// Builds the descriptor of the plugin identified by `uri`.
pub fn build_descriptor<R>(repo: &R, uri: &str) -> PluginDescriptor
where
    R: MetadataRepository + ?Sized,
{
    let mut diagnostics = Diagnostics::new();
    let d = &mut diagnostics;
    let uri = uri.trim();
    let text = |local: &str, namespace: &str| {
        repo.first_string(uri, &ns::term(namespace, local))
            .filter(|value| !value.is_empty())
    };

    if uri.is_empty() || uri.starts_with("_:") {
        d.error("plugin uri is missing or invalid");
    } else if uri.starts_with("file:") {
        d.error("plugin uri is local, and thus not suitable for redistribution");
    }

    let name = text("name", ns::DOAP);
    if name.is_none() {
        d.error("plugin name is missing");
    }

    let label = match text("label", ns::MOD) {
        Some(label) => {
            if label.chars().count() > MAX_LABEL_CHARS {
                d.warning(format!("plugin label has more than {} characters", MAX_LABEL_CHARS));
            }
            Some(label)
        }
        None => {
            d.warning("plugin label is missing");
            name.as_ref()
                .map(|name| name.chars().take(MAX_LABEL_CHARS).collect())
        }
    };

    let binary = repo
        .first_fact(uri, &ns::term(ns::LV2, "binary"))
        .map(|value| {
            let binary = value.lexical().trim().to_string();
            file_uri_to_path(&binary)
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or(binary)
        });
    if binary.is_none() {
        d.error("plugin binary is missing");
    }

    let brand = text("brand", ns::MOD);
    match &brand {
        None => d.warning("plugin brand is missing"),
        Some(brand) if brand.chars().count() > MAX_LABEL_CHARS => {
            d.warning(format!("plugin brand has more than {} characters", MAX_LABEL_CHARS))
        }
        Some(_) => {}
    }

    let license = text("license", ns::DOAP);
    if license.is_none() {
        d.error("plugin license is missing");
    }

    let comment = text("comment", ns::RDFS);
    if comment.is_none() {
        d.error("plugin comment is missing");
    }

    let (minor_version, micro_version) = resolve_version(repo, uri, d);

    let category = repo
        .lookup_facts(uri, &ns::term(ns::RDF, "type"))
        .iter()
        .flat_map(|class| categories_for(ns::local_name(&class.lexical())).iter())
        .map(|tag| tag.to_string())
        .collect();

    let ports = extract_ports(repo, uri, d);
    let presets = resolve_presets(repo, uri, d);
    let properties = resolve_properties(repo, uri, d);

    debug!(
        uri,
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "described plugin"
    );

    PluginDescriptor {
        uri: uri.to_string(),
        name,
        binary,
        brand,
        label,
        license,
        comment,
        category,
        minor_version,
        micro_version,
        version: format!("{}.{}", minor_version, micro_version),
        stability: Stability::from_version(minor_version, micro_version),
        author: resolve_author(repo, uri),
        bundles: bundle_directories(repo, uri),
        ports,
        presets,
        properties,
        diagnostics: diagnostics.finish(),
    }
}

fn resolve_version<R>(repo: &R, uri: &str, diagnostics: &mut Diagnostics) -> (u32, u32)
where
    R: MetadataRepository + ?Sized,
{
    let minor = repo.first_fact(uri, &ns::term(ns::LV2, "minorVersion"));
    let micro = repo.first_fact(uri, &ns::term(ns::LV2, "microVersion"));

    if minor.is_none() && micro.is_none() {
        diagnostics.error("plugin is missing version information");
        return (0, 0);
    }

    (
        version_number(minor, "minorVersion", diagnostics),
        version_number(micro, "microVersion", diagnostics),
    )
}

fn version_number(value: Option<Value>, field: &str, diagnostics: &mut Diagnostics) -> u32 {
    let Some(value) = value else {
        diagnostics.error(format!("plugin is missing {}", field));
        return 0;
    };
    match value.as_number() {
        Some(Number::Integer(number)) => u32::try_from(number).unwrap_or_else(|_| {
            diagnostics.error(format!("plugin {} '{}' is not a valid version number", field, number));
            0
        }),
        _ => {
            diagnostics.error(format!("plugin {} '{}' is not a valid version number", field, value));
            0
        }
    }
}

/// Reads the maintainer of the plugin, falling back to the maintainer of
/// its project.
fn resolve_author<R>(repo: &R, uri: &str) -> Author
where
    R: MetadataRepository + ?Sized,
{
    let maintainer_predicate = ns::term(ns::DOAP, "maintainer");
    let maintainer = repo.first_fact(uri, &maintainer_predicate).or_else(|| {
        repo.first_fact(uri, &ns::term(ns::LV2, "project"))
            .and_then(|project| repo.first_fact(&project.lexical(), &maintainer_predicate))
    });

    let Some(maintainer) = maintainer else {
        return Author::default();
    };
    let maintainer = maintainer.lexical();
    let field = |local: &str| {
        repo.first_string(&maintainer, &ns::term(ns::FOAF, local))
            .filter(|value| !value.is_empty())
    };

    Author {
        name: field("name"),
        email: field("mbox"),
        homepage: field("homepage"),
    }
}

/// URIs of the files the plugin's data was read from: the bundle manifest
/// and every `rdfs:seeAlso` document.
pub fn data_uris<R>(repo: &R, uri: &str) -> Vec<String>
where
    R: MetadataRepository + ?Sized,
{
    let mut uris: Vec<String> = repo
        .bundle_uri(uri)
        .map(|bundle| format!("{}/manifest.ttl", bundle.trim_end_matches('/')))
        .into_iter()
        .collect();
    for see_also in repo.lookup_facts(uri, &ns::term(ns::RDFS, "seeAlso")) {
        let see_also = see_also.lexical().into_owned();
        if !uris.contains(&see_also) {
            uris.push(see_also);
        }
    }
    uris
}

/// Directories holding the plugin's data files plus its own bundle
/// directory, without trailing separators.
pub fn bundle_directories<R>(repo: &R, uri: &str) -> BTreeSet<String>
where
    R: MetadataRepository + ?Sized,
{
    let mut bundles: BTreeSet<String> = data_uris(repo, uri)
        .iter()
        .filter_map(|data| file_uri_to_path(data))
        .filter_map(|path| strip_trailing_separator(&path).parent().map(Path::to_path_buf))
        .map(|dir| dir.to_string_lossy().into_owned())
        .collect();

    if let Some(bundle) = repo.bundle_uri(uri).and_then(|bundle| file_uri_to_path(&bundle)) {
        bundles.insert(strip_trailing_separator(&bundle).to_string_lossy().into_owned());
    }

    bundles
}

/// Converts a `file:` URI to a local path. Other schemes yield `None`.
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let url = Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

fn strip_trailing_separator(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(std::path::MAIN_SEPARATOR);
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
