use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

const EXAMPLE_VIEW_MODEL: &str = r#"using Stencil.ComponentModel;

namespace MyApp.ViewModels
{
    [ObservableObject]
    public partial class MainViewModel
    {
        private string? title;

        public string? Title
        {
            get => title;
            set => SetProperty(ref title, value);
        }
    }
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory
    #[arg(short, long, default_value = "src")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Stencil project...".bright_blue().bold());

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("MainViewModel.cs");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_VIEW_MODEL)?;
        println!("  {} Created MainViewModel.cs", "✓".green());
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/MainViewModel.cs", args.src_dir);
    println!("  2. Run: stencil generate");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_example() {
        let dir = std::env::temp_dir().join("stencil_cli_init_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let cwd = dir.display().to_string();

        init(
            InitArgs {
                src_dir: "App".to_string(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&dir).unwrap();
        assert_eq!(config.src_dir, "App");
        assert!(dir.join("App/MainViewModel.cs").exists());

        let example = fs::read_to_string(dir.join("App/MainViewModel.cs")).unwrap();
        assert!(stencil_parser::parse(&example).is_ok());
    }
}
