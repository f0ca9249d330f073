mod inotify_property_changed;
mod observable_object;
mod observable_recipient;

use crate::descriptors;
use crate::diagnostic::{Diagnostic, DiagnosticDescriptor, Location};
use crate::marker::{MarkerKind, MarkerUsage};
use crate::template::TemplateDefinition;
use serde::{Deserialize, Serialize};
use stencil_parser::ast::Member;
use stencil_semantics::SemanticModel;

/// Result of checking one usage against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(&'static DiagnosticDescriptor),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

/// Per-kind validation and member selection.
///
/// One variant per built-in marker, plus `Custom` for markers registered by
/// the host, which accept every target and keep every template member. A
/// custom handler carries its registration slot, which picks its diagnostic
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerHandler {
    INotifyPropertyChanged,
    ObservableObject,
    ObservableRecipient,
    Custom(u16),
}

impl MarkerHandler {
    /// Marker code used in diagnostic identifiers: `01` to `03` for the
    /// built-in kinds, `90` upwards for custom kinds in registration order
    pub fn code(&self) -> String {
        match self {
            MarkerHandler::INotifyPropertyChanged => "01".to_string(),
            MarkerHandler::ObservableObject => "02".to_string(),
            MarkerHandler::ObservableRecipient => "03".to_string(),
            MarkerHandler::Custom(slot) => (90 + u32::from(*slot)).to_string(),
        }
    }

    /// `STN` + this handler's marker code + the descriptor's check number
    pub fn diagnostic_id(&self, descriptor: &DiagnosticDescriptor) -> String {
        format!("STN{}{}", self.code(), descriptor.check_number())
    }

    /// Bind `descriptor` to a usage site under this handler's marker code
    pub fn diagnostic(
        &self,
        descriptor: &DiagnosticDescriptor,
        location: Location,
        target: impl Into<String>,
    ) -> Diagnostic {
        let mut diagnostic = descriptor.create(location, target);
        diagnostic.id = self.diagnostic_id(descriptor);
        diagnostic
    }

    pub fn validate(&self, usage: &MarkerUsage, model: &SemanticModel) -> ValidationOutcome {
        match self {
            MarkerHandler::INotifyPropertyChanged => inotify_property_changed::validate(usage, model),
            MarkerHandler::ObservableObject => observable_object::validate(usage, model),
            MarkerHandler::ObservableRecipient => observable_recipient::validate(usage, model),
            MarkerHandler::Custom(_) => ValidationOutcome::Accepted,
        }
    }

    /// Template members to merge into the target, in template order
    pub fn select_members(
        &self,
        template: &TemplateDefinition,
        usage: &MarkerUsage,
        model: &SemanticModel,
    ) -> Vec<Member> {
        match self {
            MarkerHandler::INotifyPropertyChanged => {
                inotify_property_changed::select_members(template, usage)
            }
            MarkerHandler::ObservableRecipient => {
                observable_recipient::select_members(template, usage, model)
            }
            MarkerHandler::ObservableObject | MarkerHandler::Custom(_) => template.members.clone(),
        }
    }

    /// Descriptor reported when synthesis fails for an accepted usage
    pub fn failure_descriptor(&self) -> &'static DiagnosticDescriptor {
        match self {
            MarkerHandler::INotifyPropertyChanged => {
                &descriptors::INOTIFY_PROPERTY_CHANGED_GENERATION_FAILED
            }
            MarkerHandler::ObservableObject => &descriptors::OBSERVABLE_OBJECT_GENERATION_FAILED,
            MarkerHandler::ObservableRecipient => {
                &descriptors::OBSERVABLE_RECIPIENT_GENERATION_FAILED
            }
            MarkerHandler::Custom(_) => &descriptors::CUSTOM_MARKER_GENERATION_FAILED,
        }
    }

    /// Descriptor reported for the second and later usages on one target
    pub fn duplicate_descriptor(&self) -> &'static DiagnosticDescriptor {
        match self {
            MarkerHandler::INotifyPropertyChanged => {
                &descriptors::DUPLICATE_INOTIFY_PROPERTY_CHANGED_USAGE
            }
            MarkerHandler::ObservableObject => &descriptors::DUPLICATE_OBSERVABLE_OBJECT_USAGE,
            MarkerHandler::ObservableRecipient => {
                &descriptors::DUPLICATE_OBSERVABLE_RECIPIENT_USAGE
            }
            MarkerHandler::Custom(_) => &descriptors::DUPLICATE_CUSTOM_MARKER_USAGE,
        }
    }
}

/// Whether every declaration of the usage target is marked `partial`
fn is_partial(usage: &MarkerUsage, model: &SemanticModel) -> bool {
    model
        .declarations(usage.target)
        .all(|site| site.decl.has_modifier("partial"))
}

/// Strategy table mapping marker kinds to their handlers
pub struct HandlerRegistry {
    entries: Vec<(MarkerKind, MarkerHandler)>,
}

impl HandlerRegistry {
    /// Create a registry with the built-in marker kinds
    pub fn new() -> Self {
        Self {
            entries: vec![
                (
                    MarkerKind::inotify_property_changed(),
                    MarkerHandler::INotifyPropertyChanged,
                ),
                (MarkerKind::observable_object(), MarkerHandler::ObservableObject),
                (MarkerKind::observable_recipient(), MarkerHandler::ObservableRecipient),
            ],
        }
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a handler, replacing any previous handler of the same kind
    pub fn register(&mut self, kind: MarkerKind, handler: MarkerHandler) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == kind) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((kind, handler)),
        }
    }

    /// Register a user marker with default validation and member selection.
    /// Each custom kind gets the next free slot; registering a kind twice
    /// keeps its slot.
    pub fn register_custom(&mut self, kind: MarkerKind) {
        if let Some(MarkerHandler::Custom(_)) = self.get(&kind) {
            return;
        }
        let slots = self
            .entries
            .iter()
            .filter(|(_, handler)| matches!(handler, MarkerHandler::Custom(_)))
            .count();
        let slot = u16::try_from(slots).unwrap_or(u16::MAX);
        self.register(kind, MarkerHandler::Custom(slot));
    }

    pub fn get(&self, kind: &MarkerKind) -> Option<MarkerHandler> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == kind)
            .map(|(_, handler)| *handler)
    }

    /// Registered kinds in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&MarkerKind, MarkerHandler)> {
        self.entries.iter().map(|(kind, handler)| (kind, *handler))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &MarkerKind> {
        self.entries.iter().map(|(kind, _)| kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &format!("{} handlers", self.entries.len()))
            .finish()
    }
}
