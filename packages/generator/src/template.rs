use crate::error::TemplateError;
use crate::marker::{MarkerKind, RESOURCE_PREFIX, SOURCE_EXTENSION};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;
use stencil_common::filesystem::FileSystem;
use stencil_parser::ast::{Member, NamespaceMember, TypeDecl, UsingDirective};
use stencil_parser::parse_with_path;
use stencil_semantics::{LookupScope, SemanticModel};
use tracing::{debug, instrument, warn};

/// Where template text comes from, keyed by conventional resource name
pub trait TemplateSource {
    fn load(&self, resource_name: &str) -> Option<String>;

    /// Every resource name this source can load, sorted
    fn resource_names(&self) -> Vec<String>;
}

const EMBEDDED: &[(&str, &str)] = &[
    (
        "Stencil.Generator.EmbeddedResources.INotifyPropertyChanged.cs",
        include_str!("embedded/INotifyPropertyChanged.cs"),
    ),
    (
        "Stencil.Generator.EmbeddedResources.ObservableObject.cs",
        include_str!("embedded/ObservableObject.cs"),
    ),
    (
        "Stencil.Generator.EmbeddedResources.ObservableRecipient.cs",
        include_str!("embedded/ObservableRecipient.cs"),
    ),
];

/// Templates of the built-in markers, compiled into the generator
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTemplates;

impl TemplateSource for EmbeddedTemplates {
    fn load(&self, resource_name: &str) -> Option<String> {
        EMBEDDED
            .iter()
            .find(|(name, _)| *name == resource_name)
            .map(|(_, text)| text.to_string())
    }

    fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = EMBEDDED.iter().map(|(name, _)| name.to_string()).collect();
        names.sort();
        names
    }
}

/// In-memory templates, for hosts that already hold the text
#[derive(Debug, Default, Clone)]
pub struct MemoryTemplates {
    templates: BTreeMap<String, String>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource_name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(resource_name.into(), text.into());
    }

    /// Register the template of `kind` under its conventional resource name
    pub fn with_template(mut self, kind: &MarkerKind, text: impl Into<String>) -> Self {
        self.insert(kind.resource_name(), text);
        self
    }
}

impl TemplateSource for MemoryTemplates {
    fn load(&self, resource_name: &str) -> Option<String> {
        self.templates.get(resource_name).cloned()
    }

    fn resource_names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

/// Templates stored as `<dir>/<TemplateName>.cs`
pub struct DirectoryTemplates<F: FileSystem> {
    fs: F,
    dir: PathBuf,
}

impl<F: FileSystem> DirectoryTemplates<F> {
    pub fn new(fs: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    fn path_for(&self, resource_name: &str) -> Option<PathBuf> {
        let file_name = resource_name
            .strip_prefix(RESOURCE_PREFIX)?
            .strip_prefix('.')?;
        Some(self.dir.join(file_name))
    }
}

impl<F: FileSystem> TemplateSource for DirectoryTemplates<F> {
    fn load(&self, resource_name: &str) -> Option<String> {
        let path = self.path_for(resource_name)?;
        if !self.fs.exists(&path) {
            return None;
        }
        match self.fs.read_to_string(&path) {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read template");
                None
            }
        }
    }

    fn resource_names(&self) -> Vec<String> {
        let files = match self.fs.list_files(&self.dir, SOURCE_EXTENSION) {
            Ok(files) => files,
            Err(error) => {
                debug!(dir = %self.dir.display(), %error, "template directory not readable");
                return Vec::new();
            }
        };

        files
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .map(|file_name| format!("{}.{}", RESOURCE_PREFIX, file_name))
            .collect()
    }
}

/// Several sources consulted in order; the first that has a resource wins
#[derive(Default)]
pub struct LayeredTemplates {
    layers: Vec<Box<dyn TemplateSource>>,
}

impl LayeredTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: Box<dyn TemplateSource>) {
        self.layers.push(source);
    }

    pub fn with(mut self, source: impl TemplateSource + 'static) -> Self {
        self.push(Box::new(source));
        self
    }
}

impl TemplateSource for LayeredTemplates {
    fn load(&self, resource_name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.load(resource_name))
    }

    fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.layers.iter().flat_map(|l| l.resource_names()).collect();
        names.sort();
        names.dedup();
        names
    }
}

impl std::fmt::Debug for LayeredTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredTemplates")
            .field("layers", &format!("{} layers", self.layers.len()))
            .finish()
    }
}

/// What a template base type turned out to be when resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseCapability {
    Interface,
    Class,
    Unknown,
}

/// One entry of a template's base list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBase {
    /// `global::`-qualified when resolved, as written otherwise
    pub name: String,
    pub capability: BaseCapability,
}

/// A parsed template, shared read-only by every usage of its marker kind
#[derive(Debug, Clone)]
pub struct TemplateDefinition {
    pub kind: MarkerKind,
    pub resource_name: String,
    /// The template type declaration, without members
    pub declaration: TypeDecl,
    pub bases: Vec<TemplateBase>,
    pub members: Vec<Member>,
    /// `using` directives in scope of the template declaration
    pub usings: Vec<UsingDirective>,
}

impl TemplateDefinition {
    /// Load and parse the template of `kind`, tagging its base types against `model`
    #[instrument(skip(source, model), fields(marker = %kind))]
    pub fn load(
        kind: &MarkerKind,
        source: &dyn TemplateSource,
        model: &SemanticModel,
    ) -> Result<Self, TemplateError> {
        let resource_name = kind.resource_name();

        let text = source.load(&resource_name).ok_or_else(|| TemplateError::Missing {
            resource_name: resource_name.clone(),
        })?;

        let unit = parse_with_path(&text, &resource_name).map_err(|error| TemplateError::Parse {
            resource_name: resource_name.clone(),
            source: error,
        })?;

        let mut usings = unit.usings.clone();
        let mut types = Vec::new();
        collect_top_level(&unit.members, &mut types, &mut usings);

        let declaration = match types.as_slice() {
            [] => return Err(TemplateError::Empty { resource_name }),
            [decl] => *decl,
            _ => {
                return Err(TemplateError::Ambiguous {
                    resource_name,
                    count: types.len(),
                })
            }
        };

        let scope = LookupScope::for_first_type(&unit);
        let bases = declaration
            .base_list
            .iter()
            .map(|base| classify_base(&base.name, &scope, model))
            .collect();

        debug!(
            resource = %resource_name,
            members = declaration.members.len(),
            "loaded template"
        );

        Ok(Self {
            kind: kind.clone(),
            resource_name,
            declaration: declaration.shell(),
            bases,
            members: declaration.members.clone(),
            usings,
        })
    }

    /// Base types that resolved to interfaces, in template order
    pub fn interfaces(&self) -> impl Iterator<Item = &TemplateBase> {
        self.bases
            .iter()
            .filter(|base| base.capability == BaseCapability::Interface)
    }
}

/// Type declarations directly inside namespaces (not nested in other types),
/// plus the usings of the namespaces that contain them
fn collect_top_level<'a>(
    members: &'a [NamespaceMember],
    types: &mut Vec<&'a TypeDecl>,
    usings: &mut Vec<UsingDirective>,
) {
    for member in members {
        match member {
            NamespaceMember::Namespace(ns) => {
                usings.extend(ns.usings.iter().cloned());
                collect_top_level(&ns.members, types, usings);
            }
            NamespaceMember::Type(decl) => types.push(decl),
            NamespaceMember::Delegate(_) => {}
        }
    }
}

fn classify_base(written: &str, scope: &LookupScope, model: &SemanticModel) -> TemplateBase {
    let Some(id) = model.resolve_type(scope, written) else {
        warn!(base = %written, "template base type did not resolve, it will not be merged");
        return TemplateBase {
            name: written.to_string(),
            capability: BaseCapability::Unknown,
        };
    };

    let symbol = model.symbol(id);
    let capability = if symbol.is_interface() {
        BaseCapability::Interface
    } else {
        BaseCapability::Class
    };

    TemplateBase {
        name: format!("global::{}{}", symbol.full_name, type_arguments(written)),
        capability,
    }
}

/// Trailing type argument list of a written type name, e.g. `<T>` for `IEquatable<T>`
fn type_arguments(written: &str) -> &str {
    if !written.ends_with('>') {
        return "";
    }

    let mut depth = 0usize;
    let mut open = None;
    for (i, c) in written.char_indices() {
        match c {
            '<' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    open.map(|i| &written[i..]).unwrap_or("")
}

/// Templates loaded during one generation pass.
///
/// Each marker kind's template is parsed at most once per cache; a new pass
/// creates a new cache.
pub struct TemplateCache<'a, 'c> {
    source: &'a dyn TemplateSource,
    model: &'a SemanticModel<'c>,
    loaded: BTreeMap<MarkerKind, TemplateDefinition>,
}

impl<'a, 'c> TemplateCache<'a, 'c> {
    pub fn new(source: &'a dyn TemplateSource, model: &'a SemanticModel<'c>) -> Self {
        Self {
            source,
            model,
            loaded: BTreeMap::new(),
        }
    }

    pub fn get_or_load(&mut self, kind: &MarkerKind) -> Result<&TemplateDefinition, TemplateError> {
        match self.loaded.entry(kind.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let template = TemplateDefinition::load(kind, self.source, self.model)?;
                Ok(entry.insert(template))
            }
        }
    }

    pub fn is_loaded(&self, kind: &MarkerKind) -> bool {
        self.loaded.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
