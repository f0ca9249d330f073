use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use stencil_generator::{HandlerRegistry, MarkerHandler, MarkerKind, TemplateSource};

#[derive(Debug, Args)]
pub struct MarkersArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: String,
}

/// One registered marker kind as shown by `stencil markers`
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub kind: MarkerKind,
    pub handler: MarkerHandler,
    pub resource_name: String,
    pub template_available: bool,
}

pub fn markers(args: MarkersArgs, cwd: &str) -> Result<()> {
    let root = PathBuf::from(cwd).join(&args.path);
    let config = Config::load(&root)?;
    let templates = config.template_source(&root);
    let entries = collect_entries(&config.registry(), &templates);

    println!("{}", "📌 Registered markers".bright_blue().bold());
    println!();

    for entry in &entries {
        let status = if entry.template_available {
            "✓".green()
        } else {
            "✗ template missing".red()
        };
        println!(
            "  {} {:?} (STN{}xx) {}",
            entry.kind.to_string().bold(),
            entry.handler,
            entry.handler.code(),
            status
        );
        println!("      {}", entry.resource_name.dimmed());
    }

    Ok(())
}

pub fn collect_entries(registry: &HandlerRegistry, templates: &dyn TemplateSource) -> Vec<MarkerEntry> {
    let available = templates.resource_names();
    registry
        .iter()
        .map(|(kind, handler)| {
            let resource_name = kind.resource_name();
            MarkerEntry {
                template_available: available.contains(&resource_name),
                kind: kind.clone(),
                handler,
                resource_name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_generator::{EmbeddedTemplates, LayeredTemplates, MemoryTemplates};

    #[test]
    fn test_builtin_markers_have_embedded_templates() {
        let entries = collect_entries(&HandlerRegistry::new(), &EmbeddedTemplates);

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.template_available));
        assert_eq!(entries[0].handler, MarkerHandler::INotifyPropertyChanged);
        assert_eq!(
            entries[1].resource_name,
            "Stencil.Generator.EmbeddedResources.ObservableObject.cs"
        );
    }

    #[test]
    fn test_custom_marker_without_template() {
        let audited = MarkerKind::new("App", "AuditedAttribute");
        let tracked = MarkerKind::new("App", "TrackedAttribute");
        let mut registry = HandlerRegistry::empty();
        registry.register_custom(audited.clone());
        registry.register_custom(tracked);

        let templates = LayeredTemplates::new()
            .with(MemoryTemplates::new().with_template(&audited, "namespace App { class Audited { } }"));
        let entries = collect_entries(&registry, &templates);

        assert_eq!(entries.len(), 2);
        assert!(entries[0].template_available);
        assert!(!entries[1].template_available);
        assert_eq!(entries[1].handler, MarkerHandler::Custom(1));
    }
}
