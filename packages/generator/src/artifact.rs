use crate::error::GeneratorResult;
use crate::marker::{MarkerKind, MarkerUsage, SOURCE_EXTENSION};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use stencil_semantics::{SemanticModel, TypeId};

/// Source text produced for one accepted usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// `[<Marker>]_[<Target>]`, unique within a pass
    pub key: String,
    /// File name the host should register the text under
    pub hint_name: String,
    pub marker: MarkerKind,
    /// Display name of the target type
    pub target: String,
    pub text: String,
}

impl GeneratedArtifact {
    pub fn new(key: String, marker: MarkerKind, target: String, text: String) -> Self {
        Self {
            hint_name: format!("{}.g.{}", key, SOURCE_EXTENSION),
            key,
            marker,
            target,
            text,
        }
    }

    /// Write the artifact into `dir` under its hint name
    pub fn write_to(&self, dir: &Path) -> GeneratorResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.hint_name);
        std::fs::write(&path, &self.text)?;
        Ok(path)
    }
}

/// Artifact keys of every target in `usages`.
///
/// Keys use the target's simple name; when distinct targets share a simple
/// name, every one of them falls back to its qualified name so no key is
/// reused.
pub fn assign_keys(
    kind: &MarkerKind,
    usages: &[MarkerUsage],
    model: &SemanticModel,
) -> HashMap<TypeId, String> {
    let mut by_name: BTreeMap<&str, BTreeSet<TypeId>> = BTreeMap::new();
    for usage in usages {
        by_name
            .entry(usage.target_name.as_str())
            .or_default()
            .insert(usage.target);
    }

    let mut keys = HashMap::new();
    for targets in by_name.values() {
        let qualify = targets.len() > 1;
        for &target in targets {
            let symbol = model.symbol(target);
            let name = if qualify {
                symbol.full_name.as_str()
            } else {
                symbol.name.as_str()
            };
            keys.insert(target, artifact_key(kind, name, &symbol.type_params));
        }
    }
    keys
}

/// `[ObservableObjectAttribute]_[Box{T}]`
pub fn artifact_key(kind: &MarkerKind, target: &str, type_params: &[String]) -> String {
    if type_params.is_empty() {
        format!("[{}]_[{}]", kind.simple_name(), target)
    } else {
        format!("[{}]_[{}{{{}}}]", kind.simple_name(), target, type_params.join(","))
    }
}
