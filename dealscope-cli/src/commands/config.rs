//! Inspect the merged configuration and where each layer comes from.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::config::{ConfigLayer, ConfigLoader};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration with the layers it was built from
    Show,
    /// Show config layer locations and the analysis data directory
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => show_paths(),
    }
}

/// Layers that contributed to the merged config, defaults always first.
fn applied_layers(layers: &[ConfigLayer]) -> Vec<String> {
    std::iter::once("defaults".to_string())
        .chain(
            layers
                .iter()
                .filter(|layer| layer.exists())
                .map(|layer| format!("{} ({})", layer.name, layer.path.display())),
        )
        .collect()
}

fn show_config() -> Result<()> {
    let config = ConfigLoader::load()?;
    for layer in applied_layers(&ConfigLoader::layers()) {
        println!("# layer: {layer}");
    }
    println!();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn show_paths() -> Result<()> {
    let config = ConfigLoader::load()?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Layer").fg(Color::Cyan),
        Cell::new("Path").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
    ]);

    for layer in ConfigLoader::layers() {
        let status = if layer.exists() {
            Cell::new("loaded").fg(Color::Green)
        } else {
            Cell::new("not found")
        };
        table.add_row(vec![
            Cell::new(layer.name),
            Cell::new(layer.path.display()),
            status,
        ]);
    }
    let data_dir = &config.storage.data_dir;
    table.add_row(vec![
        Cell::new("data"),
        Cell::new(data_dir.display()),
        Cell::new(if data_dir.is_dir() { "present" } else { "created on first use" }),
    ]);

    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_applied_layers_skips_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("config.toml");
        std::fs::write(&present, "").unwrap();

        let layers = vec![
            ConfigLayer {
                name: "user",
                path: temp_dir.path().join("missing.toml"),
            },
            ConfigLayer {
                name: "project",
                path: present.clone(),
            },
        ];

        let applied = applied_layers(&layers);
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0], "defaults");
        assert_eq!(applied[1], format!("project ({})", present.display()));
    }
}
