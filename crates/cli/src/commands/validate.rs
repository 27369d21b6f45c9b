//! Load an ability catalog and print what it contains.
//!
//! A file is validated on its own; a directory is validated as one batch, so
//! duplicate names across files are caught too.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use combat_content::AbilityLoader;
use combat_core::{Ability, AbilityCatalog, EffectKind};

use super::{OutputFormat, content_factory};

/// Load and validate an ability catalog
#[derive(Parser)]
pub struct Validate {
    /// Ability file (`.ron`) or directory of ability files.
    /// Defaults to `abilities/` under the data directory.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Content directory (defaults to the bundled data)
    #[arg(short, long, value_name = "DIR", env = "COMBAT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let path = match self.path {
            Some(path) => path,
            None => content_factory(self.data_dir).data_dir().join("abilities"),
        };
        if !path.exists() {
            anyhow::bail!("Content not found: {}", path.display());
        }

        let catalog = if path.is_dir() {
            AbilityLoader::load_dir(&path)?
        } else {
            AbilityLoader::load(&path)?
        };

        match self.format {
            OutputFormat::Summary => {
                println!("{} {}", style("Content:").bold().cyan(), path.display());
                println!("{} {}", style("Abilities:").bold().cyan(), catalog.len());
                println!();
                print_summary(&catalog);
                println!("{}", style("Catalog is valid").bold().green());
            }
            OutputFormat::Json => {
                let abilities: Vec<&Ability> = catalog.iter().collect();
                let json = serde_json::to_string_pretty(&abilities)
                    .context("Failed to serialize catalog to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Debug => println!("{:#?}", catalog),
        }
        Ok(())
    }
}

fn print_summary(catalog: &AbilityCatalog) {
    for ability in catalog.iter() {
        let summary = ability.summary();
        println!(
            "{} {}",
            style(format!("[{}]", ability.id)).dim(),
            style(&ability.name).bold().yellow()
        );
        println!(
            "  cost {}  cooldown {}ms  level {}",
            ability.resource_cost, ability.cooldown, ability.required_level
        );
        if let Some(requirement) = &ability.required_primary_stat {
            println!("  requires {} >= {}", requirement.stat, requirement.minimum);
        }
        if !summary.instant_damage.is_zero() {
            println!(
                "  instant damage {}-{}",
                summary.instant_damage.min, summary.instant_damage.max
            );
        }
        if !summary.instant_healing.is_zero() {
            println!(
                "  instant healing {}-{}",
                summary.instant_healing.min, summary.instant_healing.max
            );
        }
        if summary.periodic_damage > 0 {
            println!("  periodic damage {}", summary.periodic_damage);
        }
        if summary.periodic_healing > 0 {
            println!("  periodic healing {}", summary.periodic_healing);
        }
        if summary.longest_duration > 0 {
            println!("  lasts {}ms", summary.longest_duration);
        }

        for effect in ability.effects() {
            let chance = if effect.chance < 1.0 {
                format!(" ({:.0}%)", effect.chance * 100.0)
            } else {
                String::new()
            };
            let detail = match &effect.kind {
                EffectKind::Buff(shift) | EffectKind::Debuff(shift) => {
                    format!(" {}", shift.attribute)
                }
                _ => String::new(),
            };
            println!(
                "    #{} {}{} -> {}{}",
                effect.order,
                effect.kind.effect_type(),
                detail,
                effect.target,
                chance
            );
        }
        println!();
    }
}
