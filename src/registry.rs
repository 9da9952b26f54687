//! Plugin registry entry points.
//!
//! Everything a frontend asks of a loaded [`MetadataRepository`] goes through
//! here: describing one plugin or all of them, listing plugin URIs, searching
//! by URI pattern and resolving the files and resources related to a plugin.
//!
//! Descriptions are independent of each other, so [`describe_all`] fans them
//! out over a `rayon` pool and only sorts the results at the end.

use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::RegexBuilder;
use serde::Serialize;
use tracing::{info, warn};

use crate::descriptor::{build_descriptor, data_uris};
use crate::error::DescribeError;
use crate::ns;
use crate::plugin::{PluginDescriptor, PresetRef};
use crate::repository::{MetadataRepository, Value};

/// Short listing entry returned by [`grep_plugins`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub uri: String,
    pub name: Option<String>,
    /// Local names of the plugin's classes other than `lv2:Plugin`.
    pub categories: Vec<String>,
}

/// URIs of everything associated with a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedUris {
    pub name: Option<String>,
    pub uri: String,
    pub bundle: Option<String>,
    pub library: Option<String>,
    /// Manifest and `rdfs:seeAlso` documents.
    pub data: Vec<String>,
    /// Resources declared with `lv2:appliesTo` the plugin, presets included.
    pub resources: Vec<String>,
}

/// Sorted URIs of every plugin in the repository.
pub fn plugin_uris<R>(repo: &R) -> Vec<String>
where
    R: MetadataRepository + ?Sized,
{
    let mut uris = repo.plugin_uris();
    uris.sort();
    uris.dedup();
    uris
}

fn ensure_known<R>(repo: &R, uri: &str) -> Result<(), DescribeError>
where
    R: MetadataRepository + ?Sized,
{
    let uri = uri.trim();
    if repo.plugin_uris().iter().any(|known| known == uri) {
        Ok(())
    } else {
        Err(DescribeError::NotFound { uri: uri.to_string() })
    }
}

/// Describes a single plugin.
///
/// Fails only when `uri` is not a plugin of the repository; every defect of
/// the plugin itself ends up in the descriptor's diagnostics.
pub fn describe_plugin<R>(repo: &R, uri: &str) -> Result<PluginDescriptor, DescribeError>
where
    R: MetadataRepository + ?Sized,
{
    ensure_known(repo, uri)?;
    Ok(build_descriptor(repo, uri))
}

/// Describes every plugin in the repository, sorted by URI.
///
/// `jobs` pins the number of worker threads; `None` uses the global rayon
/// pool.
pub fn describe_all<R>(repo: &R, jobs: Option<usize>) -> Result<Vec<PluginDescriptor>>
where
    R: MetadataRepository + Sync + ?Sized,
{
    let uris = plugin_uris(repo);
    let describe = || -> Vec<PluginDescriptor> {
        uris.par_iter()
            .map(|uri| build_descriptor(repo, uri))
            .collect()
    };

    let mut descriptors = match jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context(format!("Failed to start a pool of {} workers", jobs))?
            .install(describe),
        None => describe(),
    };
    descriptors.sort_by(|a, b| a.uri.cmp(&b.uri));

    let compliant = descriptors.iter().filter(|d| d.is_compliant()).count();
    info!(
        plugins = descriptors.len(),
        compliant,
        "described all plugins"
    );
    Ok(descriptors)
}

/// Lists plugins whose URI matches `pattern`.
pub fn grep_plugins<R>(repo: &R, pattern: &str, ignore_case: bool) -> Result<Vec<PluginSummary>>
where
    R: MetadataRepository + ?Sized,
{
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()
        .context(format!("Invalid plugin pattern: {}", pattern))?;

    let plugin_class = ns::term(ns::LV2, "Plugin");
    let rdf_type = ns::term(ns::RDF, "type");
    let name = ns::term(ns::DOAP, "name");

    let summaries: Vec<PluginSummary> = plugin_uris(repo)
        .into_iter()
        .filter(|uri| regex.is_match(uri))
        .map(|uri| {
            let categories = repo
                .lookup_facts(&uri, &rdf_type)
                .iter()
                .filter_map(Value::as_uri)
                .filter(|class| *class != plugin_class)
                .map(|class| ns::local_name(class).to_string())
                .collect();
            PluginSummary {
                name: repo.first_string(&uri, &name),
                categories,
                uri,
            }
        })
        .collect();

    if summaries.is_empty() {
        warn!(pattern, "no plugin matched");
    }
    Ok(summaries)
}

/// Resolves the bundle, library, data files and related resources of a
/// plugin.
pub fn related_uris<R>(repo: &R, uri: &str) -> Result<RelatedUris, DescribeError>
where
    R: MetadataRepository + ?Sized,
{
    ensure_known(repo, uri)?;
    let uri = uri.trim();

    let mut resources =
        repo.find_subjects(&ns::term(ns::LV2, "appliesTo"), &Value::Uri(uri.to_string()));
    resources.sort();
    resources.dedup();

    Ok(RelatedUris {
        name: repo.first_string(uri, &ns::term(ns::DOAP, "name")),
        uri: uri.to_string(),
        bundle: repo.bundle_uri(uri),
        library: repo
            .first_fact(uri, &ns::term(ns::LV2, "binary"))
            .map(|binary| binary.lexical().trim().to_string()),
        data: data_uris(repo, uri),
        resources,
    })
}

/// Presets of a known plugin, without diagnostics.
pub fn list_presets<R>(repo: &R, uri: &str) -> Result<Vec<PresetRef>, DescribeError>
where
    R: MetadataRepository + ?Sized,
{
    ensure_known(repo, uri)?;
    Ok(crate::presets::list_presets(repo, uri.trim()))
}
