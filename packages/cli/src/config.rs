use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stencil_common::RealFileSystem;
use stencil_generator::{DirectoryTemplates, EmbeddedTemplates, HandlerRegistry, LayeredTemplates, MarkerKind};

pub const DEFAULT_CONFIG_NAME: &str = "stencil.config.json";

/// Stencil configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Source directory scanned for marker usages
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Directory generated declarations are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Project-specific marker attributes
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,

    /// Directories whose `.cs` files are resolved against but never scanned
    #[serde(default)]
    pub reference_dirs: Vec<String>,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_out_dir() -> String {
    "generated".to_string()
}

/// A user marker: `[<namespace>.<name>]`, template at `<templateDir>/<Name>.cs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerConfig {
    pub namespace: String,
    pub name: String,
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
}

fn default_template_dir() -> String {
    "templates".to_string()
}

impl MarkerConfig {
    pub fn kind(&self) -> MarkerKind {
        MarkerKind::new(&self.namespace, &self.name)
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn get_src_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.src_dir)
    }

    pub fn get_out_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.out_dir)
    }

    pub fn get_reference_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.reference_dirs.iter().map(|dir| root.join(dir)).collect()
    }

    /// Built-in handlers plus one default handler per configured marker
    pub fn registry(&self) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for marker in &self.markers {
            registry.register_custom(marker.kind());
        }
        registry
    }

    /// Embedded templates first, then each configured template directory
    pub fn template_source(&self, root: &Path) -> LayeredTemplates {
        let mut templates = LayeredTemplates::new().with(EmbeddedTemplates);
        let mut seen = Vec::new();
        for marker in &self.markers {
            if seen.contains(&&marker.template_dir) {
                continue;
            }
            seen.push(&marker.template_dir);
            templates.push(Box::new(DirectoryTemplates::new(
                RealFileSystem,
                root.join(&marker.template_dir),
            )));
        }
        templates
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            markers: vec![],
            reference_dirs: vec![],
        }
    }
}
