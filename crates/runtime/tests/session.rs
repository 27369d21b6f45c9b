//! End-to-end runtime tests over the bundled duel roster and abilities.

use std::time::Duration;

use combat_content::{AbilityLoader, RosterLoader};
use combat_core::{
    AbilityCatalog, AbilityId, CombatConfig, CombatState, CombatantId, CombatantStore,
    PeriodicKind, Roster, Tick, ValidationError,
};
use combat_runtime::repository;
use combat_runtime::{
    CombatEvent, EventRepository, FileEventLog, InMemoryEventLog, RepositoryError, Runtime,
    RuntimeConfig, RuntimeError, SnapshotService, Topic, replay, state_digest,
};

const MAGE: CombatantId = CombatantId(1);
const BRUTE: CombatantId = CombatantId(2);
const FIRE_BOLT: AbilityId = AbilityId(1);
const REJUVENATION: AbilityId = AbilityId(10);
const MENDING_TOUCH: AbilityId = AbilityId(11);
const WITHER: AbilityId = AbilityId(13);

fn catalog() -> AbilityCatalog {
    AbilityLoader::builtin().unwrap()
}

fn roster() -> Roster {
    RosterLoader::builtin().unwrap().build_roster().unwrap()
}

fn config() -> RuntimeConfig {
    RuntimeConfig {
        combat: CombatConfig::with_seed(7),
        ..RuntimeConfig::default()
    }
}

async fn runtime() -> Runtime {
    Runtime::builder()
        .config(config())
        .catalog(catalog())
        .roster(roster())
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn cast_commits_and_publishes() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let mut casts = handle.subscribe(Topic::Cast);

    let result = handle.cast(MAGE, BRUTE, FIRE_BOLT, Tick(0)).await.unwrap();
    let dealt = result.damage_to(BRUTE);
    assert!(dealt >= 12);
    assert_eq!(result.resource_spent, 10);

    let event = casts.recv().await.unwrap();
    assert_eq!(event, CombatEvent::CastResolved(result));

    let state = handle.query_state().await.unwrap();
    let brute = state.roster.combatant(BRUTE).unwrap();
    assert_eq!(u64::from(brute.health.maximum - brute.health.current), dealt);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_cast_leaves_state_untouched() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    handle.cast(MAGE, BRUTE, FIRE_BOLT, Tick(0)).await.unwrap();
    let before = handle.query_state().await.unwrap();

    let error = handle
        .cast(MAGE, BRUTE, FIRE_BOLT, Tick(1_000))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RuntimeError::Validation(ValidationError::OnCooldown { ready_at: Tick(2_000) })
    ));
    assert_eq!(handle.query_state().await.unwrap(), before);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn heal_over_time_restores_what_was_lost() {
    let runtime = runtime().await;
    let handle = runtime.handle();
    let mut periodic = handle.subscribe(Topic::Periodic);

    let hit = handle.cast(BRUTE, MAGE, FIRE_BOLT, Tick(0)).await.unwrap();
    let lost = hit.damage_to(MAGE);
    let cast = handle
        .cast(MAGE, MAGE, REJUVENATION, Tick(0))
        .await
        .unwrap();
    assert!(cast.applied(1).unwrap().active_effect.is_some());

    let report = handle.tick(Tick(15_000)).await.unwrap();
    assert_eq!(report.applications.len(), 5);
    assert_eq!(report.total_applied(MAGE, PeriodicKind::HealOverTime), lost);
    assert_eq!(report.expired.len(), 1);

    let event = periodic.recv().await.unwrap();
    assert_eq!(event, CombatEvent::TicksApplied(report));

    let state = handle.query_state().await.unwrap();
    let mage = state.roster.combatant(MAGE).unwrap();
    assert_eq!(mage.health.current, mage.health.maximum);
    assert!(state.scheduler.is_empty());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cancel_and_dispel_go_through_the_worker() {
    let runtime = runtime().await;
    let handle = runtime.handle();

    let cast = handle
        .cast(MAGE, MAGE, REJUVENATION, Tick(0))
        .await
        .unwrap();
    let effect = cast.applied(1).unwrap().active_effect.unwrap();
    assert!(handle.cancel(effect).await.unwrap().is_some());
    assert!(handle.cancel(effect).await.unwrap().is_none());

    // Wither may be resisted; retry at later times until it lands.
    let mut at = 0;
    loop {
        match handle.cast(MAGE, BRUTE, WITHER, Tick(at)).await {
            Ok(result) if result.applied(1).is_some() => break,
            Ok(_) => {}
            Err(error) => panic!("unexpected rejection: {error}"),
        }
        at += 12_000;
        assert!(at < 12_000 * 50, "wither never landed");
    }
    let state = handle.query_state().await.unwrap();
    assert_eq!(state.roster.combatant(BRUTE).unwrap().modifiers().count(), 1);

    handle.dispel(BRUTE).await.unwrap();
    let state = handle.query_state().await.unwrap();
    assert_eq!(state.roster.combatant(BRUTE).unwrap().modifiers().count(), 0);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

async fn play_session(runtime: &Runtime) -> CombatState {
    let handle = runtime.handle();
    handle.cast(MAGE, BRUTE, FIRE_BOLT, Tick(0)).await.unwrap();
    handle.cast(BRUTE, MAGE, FIRE_BOLT, Tick(500)).await.unwrap();
    handle
        .cast(MAGE, MAGE, REJUVENATION, Tick(1_000))
        .await
        .unwrap();
    let _ = handle.cast(MAGE, BRUTE, FIRE_BOLT, Tick(1_500)).await;
    handle.tick(Tick(4_000)).await.unwrap();
    handle.cast(MAGE, BRUTE, FIRE_BOLT, Tick(4_000)).await.unwrap();
    handle.tick(Tick(10_000)).await.unwrap();
    handle.query_state().await.unwrap()
}

#[tokio::test]
async fn event_log_replays_to_the_same_digest() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::builder()
        .config(config())
        .catalog(catalog())
        .roster(roster())
        .persist_to(dir.path())
        .build()
        .await
        .unwrap();
    let live = play_session(&runtime).await;
    runtime.shutdown().await.unwrap();

    let events = FileEventLog::read_path(dir.path().join("events.log")).unwrap();
    assert!(events.iter().any(|e| matches!(e, CombatEvent::CastRejected { .. })));

    let initial = CombatState::new(roster(), &config().combat);
    let outcome = replay(initial, &events, &catalog(), &config().combat).unwrap();
    assert_eq!(outcome.state, live);
    assert_eq!(outcome.digest, state_digest(&live).unwrap());
    assert_eq!(outcome.skipped, 1);
}

#[tokio::test]
async fn replay_from_a_different_start_diverges() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::builder()
        .config(config())
        .catalog(catalog())
        .roster(roster())
        .persist_to(dir.path())
        .build()
        .await
        .unwrap();
    play_session(&runtime).await;
    runtime.shutdown().await.unwrap();

    let events = FileEventLog::read_path(dir.path().join("events.log")).unwrap();
    let mut altered = roster();
    let mut mage = altered.combatant(MAGE).unwrap().clone();
    mage.attributes.intelligence += 20;
    altered.insert(mage);

    let config = config().combat;
    let error = replay(CombatState::new(altered, &config), &events, &catalog(), &config);
    assert!(matches!(
        error,
        Err(RuntimeError::ReplayDiverged { index: 0, .. })
    ));
}

#[tokio::test]
async fn resume_replays_the_tail_after_the_last_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            checkpoint_interval: 0,
            ..config()
        })
        .catalog(catalog())
        .roster(roster())
        .persist_to(dir.path())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle
        .cast(MAGE, MAGE, MENDING_TOUCH, Tick(0))
        .await
        .unwrap();
    let midpoint = handle.checkpoint().await.unwrap();
    assert_eq!(midpoint, 1);
    let live = play_session(&runtime).await;
    drop(handle);
    runtime.shutdown().await.unwrap();

    // Drop the shutdown checkpoint so the resume has to replay the tail.
    let snapshots = SnapshotService::file_based(dir.path()).unwrap();
    let last = snapshots.latest().unwrap().unwrap().sequence;
    assert!(last > midpoint);
    snapshots.delete(last).unwrap();

    let resumed = Runtime::builder()
        .config(config())
        .catalog(catalog())
        .persist_to(dir.path())
        .resume(true)
        .build()
        .await
        .unwrap();
    assert_eq!(resumed.handle().query_state().await.unwrap(), live);
    resumed.shutdown().await.unwrap();
}

/// Event log that refuses one append, by position.
struct FailingLog {
    inner: InMemoryEventLog,
    fail_at: usize,
    appends: usize,
}

impl EventRepository for FailingLog {
    fn append(&mut self, event: &CombatEvent) -> repository::Result<u64> {
        let attempt = self.appends;
        self.appends += 1;
        if attempt == self.fail_at {
            return Err(RepositoryError::Io(std::io::Error::other("disk full")));
        }
        self.inner.append(event)
    }

    fn read_at_offset(
        &self,
        offset: u64,
    ) -> repository::Result<Option<(CombatEvent, u64)>> {
        self.inner.read_at_offset(offset)
    }

    fn flush(&mut self) -> repository::Result<()> {
        self.inner.flush()
    }

    fn size(&self) -> repository::Result<u64> {
        self.inner.size()
    }

    fn session_id(&self) -> &str {
        self.inner.session_id()
    }
}

#[tokio::test]
async fn failed_append_is_not_counted_and_forces_a_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let log = InMemoryEventLog::new("failing");
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            checkpoint_interval: 0,
            ..config()
        })
        .catalog(catalog())
        .roster(roster())
        .persistence(
            SnapshotService::file_based(dir.path()).unwrap(),
            FailingLog {
                inner: log.clone(),
                fail_at: 1,
                appends: 0,
            },
        )
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle
        .cast(MAGE, MAGE, MENDING_TOUCH, Tick(0))
        .await
        .unwrap();
    handle.cast(MAGE, BRUTE, FIRE_BOLT, Tick(0)).await.unwrap();
    handle.cast(BRUTE, MAGE, FIRE_BOLT, Tick(500)).await.unwrap();
    let live = handle.query_state().await.unwrap();
    drop(handle);
    runtime.shutdown().await.unwrap();

    assert_eq!(log.read_all().unwrap().len(), 2);
    let snapshots = SnapshotService::file_based(dir.path()).unwrap();
    assert_eq!(snapshots.latest().unwrap().unwrap().sequence, 2);

    // The checkpoint taken at the failed append must carry the lost event.
    snapshots.delete(2).unwrap();
    assert_eq!(snapshots.latest().unwrap().unwrap().sequence, 1);
    let resumed = Runtime::builder()
        .config(config())
        .catalog(catalog())
        .persistence(snapshots, log)
        .resume(true)
        .build()
        .await
        .unwrap();
    assert_eq!(resumed.handle().query_state().await.unwrap(), live);
    resumed.shutdown().await.unwrap();
}

#[tokio::test]
async fn checkpoint_without_persistence_is_an_error() {
    let runtime = runtime().await;
    assert!(matches!(
        runtime.handle().checkpoint().await,
        Err(RuntimeError::PersistenceDisabled)
    ));
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn builder_requires_catalog_and_state() {
    assert!(matches!(
        Runtime::builder().roster(roster()).build().await,
        Err(RuntimeError::MissingCatalog)
    ));
    assert!(matches!(
        Runtime::builder().catalog(catalog()).build().await,
        Err(RuntimeError::MissingState)
    ));
}

#[tokio::test]
async fn tick_driver_advances_game_time_in_whole_steps() {
    let mut config = config();
    config.combat.tick_interval_ms = 5;
    let mut runtime = Runtime::builder()
        .config(config)
        .catalog(catalog())
        .roster(roster())
        .build()
        .await
        .unwrap();

    runtime.start_ticker(Tick(1_000)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    let reached = runtime.stop_ticker().await.unwrap().unwrap();

    assert!(reached > Tick(1_000));
    assert_eq!((reached.0 - 1_000) % 5, 0);
    runtime.shutdown().await.unwrap();
}
