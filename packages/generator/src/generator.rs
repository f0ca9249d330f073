use crate::artifact::{assign_keys, GeneratedArtifact};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::error::GeneratorResult;
use crate::handlers::{HandlerRegistry, MarkerHandler, ValidationOutcome};
use crate::marker::MarkerKind;
use crate::scanner::scan;
use crate::synthesizer::synthesize;
use crate::template::{TemplateCache, TemplateSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use stencil_semantics::SemanticModel;
use tracing::{debug, info, instrument, warn};

/// Everything one pass produced for one marker kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    pub kind: MarkerKind,
    pub artifacts: Vec<GeneratedArtifact>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PassResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Generator for a single marker kind
pub struct Generator<'s> {
    kind: MarkerKind,
    handler: MarkerHandler,
    source: &'s dyn TemplateSource,
}

impl<'s> Generator<'s> {
    pub fn new(kind: MarkerKind, handler: MarkerHandler, source: &'s dyn TemplateSource) -> Self {
        Self {
            kind,
            handler,
            source,
        }
    }

    pub fn kind(&self) -> &MarkerKind {
        &self.kind
    }

    /// Run one pass over the model.
    ///
    /// Rejected usages and synthesis failures become diagnostics and never
    /// stop the pass. A template that cannot be loaded fails the whole pass.
    ///
    /// The template is loaded on the first accepted usage. A pass whose
    /// usages are all rejected never reads the template and returns their
    /// diagnostics even when the template is missing. Once one usage is
    /// accepted, a missing template fails the pass and the diagnostics
    /// gathered so far are dropped with it.
    #[instrument(skip_all, fields(marker = %self.kind))]
    pub fn run(&self, model: &SemanticModel) -> GeneratorResult<PassResult> {
        let usages = scan(model, &self.kind);
        debug!(usages = usages.len(), "scanned marker usages");

        let keys = assign_keys(&self.kind, &usages, model);
        let mut cache = TemplateCache::new(self.source, model);
        let mut sink = DiagnosticSink::new();
        let mut artifacts = Vec::new();
        let mut processed = HashSet::new();

        for usage in &usages {
            if !processed.insert(usage.target) {
                warn!(ty = %usage.target_display, "duplicate marker usage skipped");
                sink.push(self.handler.diagnostic(
                    self.handler.duplicate_descriptor(),
                    usage.location.clone(),
                    usage.target_display.clone(),
                ));
                continue;
            }

            if let ValidationOutcome::Rejected(descriptor) = self.handler.validate(usage, model) {
                debug!(ty = %usage.target_display, id = descriptor.id, "usage rejected");
                sink.push(self.handler.diagnostic(
                    descriptor,
                    usage.location.clone(),
                    usage.target_display.clone(),
                ));
                continue;
            }

            let template = cache.get_or_load(&self.kind)?;
            let members = self.handler.select_members(template, usage, model);

            match synthesize(usage, template, members) {
                Ok(text) => {
                    let key = keys
                        .get(&usage.target)
                        .cloned()
                        .unwrap_or_else(|| usage.target_display.clone());
                    debug!(ty = %usage.target_display, %key, "generated declaration");
                    artifacts.push(GeneratedArtifact::new(
                        key,
                        self.kind.clone(),
                        usage.target_display.clone(),
                        text,
                    ));
                }
                Err(error) => {
                    debug!(ty = %usage.target_display, %error, "synthesis failed");
                    let diagnostic = self
                        .handler
                        .diagnostic(
                            self.handler.failure_descriptor(),
                            usage.location.clone(),
                            usage.target_display.clone(),
                        )
                        .with_suggestion(error.to_string());
                    sink.push(diagnostic);
                }
            }
        }

        info!(
            usages = usages.len(),
            artifacts = artifacts.len(),
            diagnostics = sink.len(),
            "pass finished"
        );

        Ok(PassResult {
            kind: self.kind.clone(),
            artifacts,
            diagnostics: sink.into_diagnostics(),
        })
    }
}

/// A marker kind whose pass failed as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassFailure {
    pub kind: MarkerKind,
    pub error: String,
}

/// Results of running every registered marker kind over one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub passes: Vec<PassResult>,
    pub failures: Vec<PassFailure>,
}

impl GenerationReport {
    pub fn artifacts(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.passes.iter().flat_map(|pass| &pass.artifacts)
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.passes.iter().flat_map(|pass| &pass.diagnostics)
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.passes.iter().any(PassResult::has_errors)
    }
}

/// Run one pass per registered marker kind, in registration order
#[instrument(skip_all, fields(kinds = registry.len()))]
pub fn generate_all(
    registry: &HandlerRegistry,
    model: &SemanticModel,
    source: &dyn TemplateSource,
) -> GenerationReport {
    let mut report = GenerationReport::default();

    for (kind, handler) in registry.iter() {
        let generator = Generator::new(kind.clone(), handler, source);
        match generator.run(model) {
            Ok(pass) => report.passes.push(pass),
            Err(error) => {
                warn!(marker = %kind, %error, "pass failed");
                report.failures.push(PassFailure {
                    kind: kind.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    info!(
        artifacts = report.artifacts().count(),
        diagnostics = report.diagnostics().count(),
        failures = report.failures.len(),
        "generation finished"
    );
    report
}
