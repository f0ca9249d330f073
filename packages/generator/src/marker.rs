use crate::diagnostic::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use stencil_parser::ast::TypeDecl;
use stencil_semantics::TypeId;

/// Namespace of the built-in marker attributes and base classes
pub const COMPONENT_MODEL_NAMESPACE: &str = "Stencil.ComponentModel";

/// Prefix of every template resource name
pub const RESOURCE_PREFIX: &str = "Stencil.Generator.EmbeddedResources";

/// Extension of template resources and generated artifacts
pub const SOURCE_EXTENSION: &str = "cs";

/// Identity of a marker attribute: its namespace and type name.
///
/// Markers are matched by this key after name resolution, never by simple
/// name alone, so equally named attributes in other namespaces are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerKind {
    pub namespace: String,
    pub name: String,
}

impl MarkerKind {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn inotify_property_changed() -> Self {
        Self::new(COMPONENT_MODEL_NAMESPACE, "INotifyPropertyChangedAttribute")
    }

    pub fn observable_object() -> Self {
        Self::new(COMPONENT_MODEL_NAMESPACE, "ObservableObjectAttribute")
    }

    pub fn observable_recipient() -> Self {
        Self::new(COMPONENT_MODEL_NAMESPACE, "ObservableRecipientAttribute")
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Name of the template declaration: the marker name without `Attribute`
    pub fn template_name(&self) -> &str {
        match self.name.strip_suffix("Attribute") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => &self.name,
        }
    }

    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Conventional resource name of this marker's template,
    /// e.g. `Stencil.Generator.EmbeddedResources.ObservableObject.cs`
    pub fn resource_name(&self) -> String {
        format!("{}.{}.{}", RESOURCE_PREFIX, self.template_name(), SOURCE_EXTENSION)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// One argument written at a marker usage site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageArgument {
    pub name: Option<String>,
    pub value: String,
}

/// A marker annotation on a type declaration, resolved to its target type
#[derive(Debug, Clone)]
pub struct MarkerUsage<'c> {
    pub kind: MarkerKind,
    pub target: TypeId,
    /// Simple name of the target type
    pub target_name: String,
    /// Fully qualified display name of the target type
    pub target_display: String,
    /// The annotated declaration
    pub declaration: &'c TypeDecl,
    /// Enclosing type declarations, outermost first
    pub ancestors: Vec<&'c TypeDecl>,
    /// Full name of the enclosing namespace, `""` for the global namespace
    pub namespace: String,
    /// Location of the annotation
    pub location: Location,
    pub arguments: Vec<UsageArgument>,
}

impl<'c> MarkerUsage<'c> {
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|argument| argument.name.as_deref() == Some(name))
            .map(|argument| argument.value.as_str())
    }

    /// Value of a named boolean argument, if present and a literal
    pub fn named_bool(&self, name: &str) -> Option<bool> {
        match self.argument(name)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}
