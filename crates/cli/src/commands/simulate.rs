//! Run a scripted fight through the runtime and print the combat log.
//!
//! A script lists casts by combatant and ability name at fixed game times.
//! Between casts the scheduler is ticked once per configured interval, the
//! same way a live tick driver would.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::{Deserialize, Serialize};

use combat_content::{AbilityLoader, RosterFile, RosterLoader};
use combat_core::{
    AbilityCatalog, AbilityId, ActiveEffect, CombatConfig, Combatant, CombatantId, Tick,
};
use combat_runtime::{CombatEvent, Runtime, RuntimeError, state_digest};

use super::{OutputFormat, content_factory};
use crate::dirs;

/// Run a scripted fight and print the combat log
#[derive(Parser)]
pub struct Simulate {
    /// Content directory (defaults to the bundled data)
    #[arg(short, long, value_name = "DIR", env = "COMBAT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Ability file or directory, overriding `abilities/` in the data directory
    #[arg(long, value_name = "PATH")]
    content: Option<PathBuf>,

    /// Roster name under `rosters/`, or a path to a roster file
    #[arg(short, long, value_name = "ROSTER", default_value = "duel")]
    roster: String,

    /// Script file (defaults to the built-in duel script)
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Session seed, overriding `combat.toml`
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Persist the event log and a final checkpoint.
    /// Without a directory, a new session is created under the platform data dir.
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    persist: Option<Option<PathBuf>>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

/// A scripted fight.
///
/// ```ron
/// (
///     until: 15000,
///     casts: [
///         (at: 0, caster: "Mage", target: "Brute", ability: "Fire Bolt"),
///     ],
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Script {
    /// Game time to keep ticking until after the last cast.
    #[serde(default)]
    pub until: u64,
    pub casts: Vec<ScriptedCast>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScriptedCast {
    pub at: u64,
    pub caster: String,
    pub target: String,
    pub ability: String,
}

impl Script {
    const BUILTIN_DUEL: &'static str = include_str!("../../scripts/duel.ron");

    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse script RON {}: {}", origin, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn builtin() -> Result<Self> {
        Self::parse(Self::BUILTIN_DUEL, "builtin duel script")
    }

    /// Resolves names to ids and orders casts by time, keeping script order
    /// for casts at the same time.
    fn resolve(&self, roster: &RosterFile, catalog: &AbilityCatalog) -> Result<Vec<PlannedCast>> {
        let combatant = |name: &str| {
            roster
                .id_of(name)
                .with_context(|| format!("Unknown combatant '{}' in script", name))
        };

        let mut planned = self
            .casts
            .iter()
            .map(|cast| {
                let ability = catalog
                    .find_by_name(&cast.ability)
                    .with_context(|| format!("Unknown ability '{}' in script", cast.ability))?;
                Ok(PlannedCast {
                    at: Tick(cast.at),
                    caster: combatant(&cast.caster)?,
                    target: combatant(&cast.target)?,
                    ability: ability.id,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        planned.sort_by_key(|cast| cast.at);
        Ok(planned)
    }
}

#[derive(Clone, Copy, Debug)]
struct PlannedCast {
    at: Tick,
    caster: CombatantId,
    target: CombatantId,
    ability: AbilityId,
}

/// Everything a simulation produced.
#[derive(Debug, Serialize)]
pub struct SimulationLog {
    pub seed: u64,
    pub events: Vec<CombatEvent>,
    pub combatants: Vec<Combatant>,
    pub active_effects: Vec<ActiveEffect>,
    pub digest: String,
    pub session_dir: Option<PathBuf>,
    /// Sequence of the final checkpoint when persisting.
    pub checkpoint: Option<u64>,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let factory = content_factory(self.data_dir);

        let catalog = match &self.content {
            Some(path) if path.is_dir() => AbilityLoader::load_dir(path)?,
            Some(path) => AbilityLoader::load(path)?,
            None => factory.load_abilities()?,
        };
        let roster_path = Path::new(&self.roster);
        let roster = if roster_path.extension().is_some_and(|ext| ext == "ron") {
            RosterLoader::load(roster_path)?
        } else {
            factory.load_roster(&self.roster)?
        };
        let script = match &self.script {
            Some(path) => Script::load(path)?,
            None => Script::builtin()?,
        };

        let mut config = factory.load_config()?;
        if let Some(seed) = self.seed {
            config.session_seed = seed;
        }

        let persist = self
            .persist
            .map(|dir| dir.unwrap_or_else(|| dirs::sessions_dir().join(dirs::new_session_id())));

        let catalog = Arc::new(catalog);
        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        let log = runtime.block_on(run_script(
            Arc::clone(&catalog),
            &roster,
            config,
            &script,
            persist,
        ))?;

        match self.format {
            OutputFormat::Summary => print_summary(&log, &roster.names(), &catalog),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&log)
                    .context("Failed to serialize combat log to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Debug => println!("{:#?}", log),
        }
        Ok(())
    }
}

/// Plays `script` against a fresh session and collects what happened.
pub async fn run_script(
    catalog: Arc<AbilityCatalog>,
    roster: &RosterFile,
    config: CombatConfig,
    script: &Script,
    persist: Option<PathBuf>,
) -> Result<SimulationLog> {
    let casts = script.resolve(roster, &catalog)?;
    let seed = config.session_seed;
    let interval = config.tick_interval_ms.max(1);

    let mut builder = Runtime::builder()
        .combat_config(config)
        .catalog(Arc::clone(&catalog))
        .roster(roster.build_roster()?);
    if let Some(dir) = &persist {
        if dir.join("events.log").exists() {
            anyhow::bail!("{} already holds a session", dir.display());
        }
        builder = builder.persist_to(dir);
    }
    let runtime = builder.build().await?;
    let handle = runtime.handle();
    tracing::info!(casts = casts.len(), seed, "simulation started");

    let mut events = Vec::new();
    let mut next_tick = Tick(interval);
    let end = casts
        .last()
        .map_or(Tick(script.until), |last| last.at.max(Tick(script.until)));

    for cast in &casts {
        while next_tick <= cast.at {
            let report = handle.tick(next_tick).await?;
            if !report.is_empty() {
                events.push(CombatEvent::TicksApplied(report));
            }
            next_tick = next_tick.saturating_add(interval);
        }

        match handle
            .cast(cast.caster, cast.target, cast.ability, cast.at)
            .await
        {
            Ok(result) => events.push(CombatEvent::CastResolved(result)),
            Err(RuntimeError::Validation(error)) => events.push(CombatEvent::CastRejected {
                caster: cast.caster,
                target: cast.target,
                ability: cast.ability,
                at: cast.at,
                error,
            }),
            Err(error) => return Err(error.into()),
        }
    }
    while next_tick <= end {
        let report = handle.tick(next_tick).await?;
        if !report.is_empty() {
            events.push(CombatEvent::TicksApplied(report));
        }
        next_tick = next_tick.saturating_add(interval);
    }

    let checkpoint = match &persist {
        Some(_) => Some(handle.checkpoint().await?),
        None => None,
    };
    let state = handle.query_state().await?;
    drop(handle);
    runtime.shutdown().await?;

    let digest = hex::encode(state_digest(&state)?);
    tracing::info!(events = events.len(), %digest, "simulation finished");

    Ok(SimulationLog {
        seed,
        events,
        combatants: state.roster.iter().cloned().collect(),
        active_effects: state.scheduler.iter().cloned().collect(),
        digest,
        session_dir: persist,
        checkpoint,
    })
}

fn print_summary(
    log: &SimulationLog,
    names: &BTreeMap<CombatantId, String>,
    catalog: &AbilityCatalog,
) {
    let name = |id: CombatantId| {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    };
    let ability_name = |id: AbilityId| {
        catalog
            .get(id)
            .map_or_else(|_| id.to_string(), |ability| ability.name.clone())
    };

    println!("{} {}", style("Seed:").bold().cyan(), log.seed);
    println!("{} {}", style("Events:").bold().cyan(), log.events.len());
    println!();

    println!("{}", style("=== Combat Log ===").bold().green());
    for event in &log.events {
        match event {
            CombatEvent::CastResolved(result) => {
                println!(
                    "{} {} casts {} on {} (spent {})",
                    style(format!("[{:>6}]", result.cast_at)).dim(),
                    style(name(result.caster)).bold(),
                    style(ability_name(result.ability)).yellow(),
                    name(result.target),
                    result.resource_spent
                );
                for applied in &result.applied_effects {
                    let mut line = format!(
                        "           #{} {} {} on {}",
                        applied.order,
                        applied.effect_type,
                        applied.applied,
                        name(applied.recipient)
                    );
                    if applied.drained > 0 {
                        line.push_str(&format!(", drained {}", applied.drained));
                    }
                    if let Some(effect) = applied.active_effect {
                        line.push_str(&format!(", active {}", effect));
                    }
                    println!("{}", line);
                }
                for fault in &result.errors {
                    println!("           {}", style(fault).magenta());
                }
            }
            CombatEvent::CastRejected {
                caster,
                ability,
                at,
                error,
                ..
            } => {
                println!(
                    "{} {} cannot cast {}: {}",
                    style(format!("[{:>6}]", at)).dim(),
                    style(name(*caster)).bold(),
                    style(ability_name(*ability)).yellow(),
                    style(error).red()
                );
            }
            CombatEvent::TicksApplied(report) => {
                for tick in &report.applications {
                    println!(
                        "{} {} {} {} on {} ({} left)",
                        style(format!("[{:>6}]", tick.at)).dim(),
                        tick.source,
                        tick.kind,
                        tick.applied,
                        name(tick.target),
                        tick.remaining_ticks
                    );
                }
                for effect in &report.expired {
                    println!(
                        "{} {} expired",
                        style(format!("[{:>6}]", report.now)).dim(),
                        effect
                    );
                }
            }
            CombatEvent::EffectCancelled { effect, at } => {
                println!("{} {} cancelled", style(format!("[{:>6}]", at)).dim(), effect);
            }
            CombatEvent::Dispelled { target, at, cancelled } => {
                println!(
                    "{} {} dispelled ({} effects)",
                    style(format!("[{:>6}]", at)).dim(),
                    name(*target),
                    cancelled.len()
                );
            }
        }
    }
    println!();

    println!("{}", style("=== Final State ===").bold().green());
    for combatant in &log.combatants {
        let status = if combatant.is_defeated() {
            style("defeated").red()
        } else {
            style("standing").green()
        };
        println!(
            "  {} - HP {}/{}, resource {}/{}, {}",
            style(name(combatant.id)).bold(),
            combatant.health.current,
            combatant.health.maximum,
            combatant.resource.current,
            combatant.resource.maximum,
            status
        );
        for effect in log.active_effects.iter().filter(|e| e.target == combatant.id) {
            println!(
                "    {} {} from {}, {} ticks left, next at {}",
                effect.id,
                effect.kind,
                effect.source,
                effect.remaining_ticks,
                effect.next_tick_at
            );
        }
    }
    println!();

    println!("{} {}", style("Digest:").bold().cyan(), log.digest);
    if let Some(dir) = &log.session_dir {
        println!("{} {}", style("Session:").bold().cyan(), dir.display());
    }
    if let Some(sequence) = log.checkpoint {
        println!("{} {}", style("Checkpoint:").bold().cyan(), sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel() -> (Arc<AbilityCatalog>, RosterFile) {
        (
            Arc::new(AbilityLoader::builtin().unwrap()),
            RosterLoader::builtin().unwrap(),
        )
    }

    #[test]
    fn builtin_script_resolves_against_builtin_content() {
        let (catalog, roster) = duel();
        let casts = Script::builtin().unwrap().resolve(&roster, &catalog).unwrap();
        assert_eq!(casts.len(), 10);
        assert!(casts.windows(2).all(|pair| pair[0].at <= pair[1].at));
    }

    #[test]
    fn unknown_names_are_reported() {
        let (catalog, roster) = duel();
        let script = Script::parse(
            r#"(casts: [(at: 0, caster: "Mage", target: "Ogre", ability: "Fire Bolt")])"#,
            "inline",
        )
        .unwrap();
        let error = script.resolve(&roster, &catalog).unwrap_err();
        assert!(error.to_string().contains("Ogre"));
    }

    #[tokio::test]
    async fn same_seed_same_outcome() {
        let (catalog, roster) = duel();
        let script = Script::builtin().unwrap();
        let config = CombatConfig::with_seed(7);

        let first = run_script(catalog.clone(), &roster, config.clone(), &script, None)
            .await
            .unwrap();
        let second = run_script(catalog, &roster, config, &script, None)
            .await
            .unwrap();

        assert!(matches!(first.events[0], CombatEvent::CastResolved(_)));
        assert_eq!(first.events, second.events);
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.combatants.len(), 2);
    }

    #[tokio::test]
    async fn persisted_session_holds_log_and_checkpoint() {
        let (catalog, roster) = duel();
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session_1");
        let script = Script::builtin().unwrap();

        let log = run_script(
            catalog.clone(),
            &roster,
            CombatConfig::with_seed(3),
            &script,
            Some(session.clone()),
        )
        .await
        .unwrap();

        assert_eq!(log.checkpoint, Some(log.events.len() as u64));
        assert!(session.join("events.log").exists());
        let logged = combat_runtime::FileEventLog::read_path(session.join("events.log")).unwrap();
        assert_eq!(logged, log.events);

        let again = run_script(
            catalog,
            &roster,
            CombatConfig::with_seed(3),
            &script,
            Some(session),
        )
        .await;
        assert!(again.is_err());
    }
}
