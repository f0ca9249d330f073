//! Marker-driven declaration synthesis.
//!
//! A pass scans a [`stencil_semantics::Compilation`] for usages of one marker
//! attribute, checks each annotated type, and merges the members of the
//! marker's template into a new partial declaration of that type.

pub mod artifact;
pub mod descriptors;
pub mod diagnostic;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod marker;
pub mod reference;
pub mod scanner;
pub mod synthesizer;
pub mod template;

pub use artifact::GeneratedArtifact;
pub use diagnostic::{Diagnostic, DiagnosticDescriptor, DiagnosticLevel, DiagnosticSink, Location};
pub use error::{GeneratorError, GeneratorResult, SynthesisError, TemplateError};
pub use generator::{generate_all, GenerationReport, Generator, PassFailure, PassResult};
pub use handlers::{HandlerRegistry, MarkerHandler, ValidationOutcome};
pub use marker::{MarkerKind, MarkerUsage};
pub use reference::{add_references, reference_sources};
pub use scanner::scan;
pub use template::{
    BaseCapability, DirectoryTemplates, EmbeddedTemplates, LayeredTemplates, MemoryTemplates,
    TemplateCache, TemplateDefinition, TemplateSource,
};
