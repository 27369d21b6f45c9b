//! Read and inspect persisted snapshots
//!
//! Accepts either a single `effects_{sequence}.bin` file or a session
//! directory, in which case the latest (or requested) checkpoint is loaded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;

use combat_core::{Combatant, SchedulerSnapshot};
use combat_runtime::SnapshotService;

use super::OutputFormat;
use crate::dirs;

/// Print the active effects held in a persisted snapshot
#[derive(Parser)]
pub struct Inspect {
    /// Scheduler snapshot file or session directory.
    /// Defaults to the most recent session.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Checkpoint sequence to read from a session directory (defaults to the latest)
    #[arg(short, long, value_name = "SEQUENCE")]
    sequence: Option<u64>,

    /// Directory holding `session_*` directories
    #[arg(long, value_name = "DIR", env = "COMBAT_SESSIONS_DIR")]
    sessions_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

/// What a snapshot contains.
#[derive(Debug, Serialize)]
struct Inspection {
    source: PathBuf,
    sequence: Option<u64>,
    scheduler: SchedulerSnapshot,
    /// Only present when a whole checkpoint was read.
    combatants: Vec<Combatant>,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let path = match self.path {
            Some(path) => path,
            None => {
                let sessions = self.sessions_dir.unwrap_or_else(dirs::sessions_dir);
                dirs::latest_session(&sessions)?
            }
        };
        if !path.exists() {
            anyhow::bail!("Snapshot not found: {}", path.display());
        }

        let inspection = if path.is_dir() {
            read_checkpoint(&path, self.sequence)?
        } else {
            read_effects_file(&path)?
        };

        match self.format {
            OutputFormat::Summary => print_summary(&inspection),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&inspection)
                    .context("Failed to serialize snapshot to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Debug => println!("{:#?}", inspection),
        }
        Ok(())
    }
}

fn read_effects_file(path: &Path) -> Result<Inspection> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    let scheduler: SchedulerSnapshot = bincode::deserialize(&bytes)
        .with_context(|| format!("Failed to deserialize snapshot file: {}", path.display()))?;

    Ok(Inspection {
        source: path.to_path_buf(),
        sequence: sequence_from_file_name(path),
        scheduler,
        combatants: Vec::new(),
    })
}

fn read_checkpoint(session: &Path, sequence: Option<u64>) -> Result<Inspection> {
    let snapshots = SnapshotService::file_based(session)
        .with_context(|| format!("Failed to open session {}", session.display()))?;

    let (sequence, state) = match sequence {
        Some(sequence) => {
            let state = snapshots
                .load(sequence)?
                .with_context(|| format!("No checkpoint {} in {}", sequence, session.display()))?;
            (sequence, state)
        }
        None => {
            let checkpoint = snapshots
                .latest()?
                .with_context(|| format!("No checkpoints in {}", session.display()))?;
            (checkpoint.sequence, checkpoint.state)
        }
    };

    Ok(Inspection {
        source: session.to_path_buf(),
        sequence: Some(sequence),
        scheduler: state.scheduler.snapshot(),
        combatants: state.roster.iter().cloned().collect(),
    })
}

/// `effects_12.bin` -> 12
fn sequence_from_file_name(path: &Path) -> Option<u64> {
    path.file_stem()?
        .to_str()?
        .rsplit_once('_')?
        .1
        .parse()
        .ok()
}

fn print_summary(inspection: &Inspection) {
    println!(
        "{} {}",
        style("Snapshot:").bold().cyan(),
        inspection.source.display()
    );
    if let Some(sequence) = inspection.sequence {
        println!("{} {}", style("Sequence:").bold().cyan(), sequence);
    }
    println!(
        "{} {} (limit {} per target)",
        style("Active effects:").bold().cyan(),
        inspection.scheduler.effects.len(),
        inspection.scheduler.max_active_per_target
    );
    println!();

    if !inspection.combatants.is_empty() {
        println!("{}", style("Combatants:").bold().yellow());
        for combatant in &inspection.combatants {
            println!(
                "  {} - HP {}/{}, resource {}/{}, {} modifiers",
                combatant.id,
                combatant.health.current,
                combatant.health.maximum,
                combatant.resource.current,
                combatant.resource.maximum,
                combatant.modifiers().count()
            );
        }
        println!();
    }

    if inspection.scheduler.effects.is_empty() {
        println!("{}", style("No active effects").dim());
        return;
    }

    println!("{}", style("Effects:").bold().yellow());
    for effect in &inspection.scheduler.effects {
        println!(
            "  {} {} from {} ({} -> {})",
            style(effect.id).bold(),
            effect.kind,
            effect.source,
            effect.caster,
            effect.target
        );
        println!(
            "      {} per tick every {}ms, {} ticks left, next at {}, ends at {}",
            effect.tick_amount(),
            effect.tick_interval,
            effect.remaining_ticks,
            effect.next_tick_at,
            effect.ends_at()
        );
        if let Some(modifier) = &effect.modifier {
            println!(
                "      holds {} {:+}",
                modifier.attribute, modifier.amount
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_read_from_file_name() {
        assert_eq!(
            sequence_from_file_name(Path::new("/tmp/effects/effects_42.bin")),
            Some(42)
        );
        assert_eq!(sequence_from_file_name(Path::new("snapshot.bin")), None);
    }

    #[test]
    fn effects_file_round_trips_through_inspection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effects_3.bin");
        let snapshot = SchedulerSnapshot {
            max_active_per_target: 4,
            next_registration: 0,
            effects: Vec::new(),
        };
        std::fs::write(&path, bincode::serialize(&snapshot).unwrap()).unwrap();

        let inspection = read_effects_file(&path).unwrap();
        assert_eq!(inspection.sequence, Some(3));
        assert_eq!(inspection.scheduler, snapshot);
        assert!(inspection.combatants.is_empty());
    }

    #[test]
    fn session_without_checkpoints_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_checkpoint(dir.path(), None).is_err());
    }
}
