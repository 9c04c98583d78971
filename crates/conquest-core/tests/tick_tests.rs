//! Tick engine and runner tests against the in-memory store.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects
)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use conquest_core::config::SimulationBoundsConfig;
use conquest_core::{
    EngineContext, GridPublisher, NoOpPublisher, OperatorState, RunnerError, SimulationEndReason,
    TickCallback, TickEngine, TickError, TickSummary, join_player, run_simulation,
    submit_action,
};
use conquest_db::{DbError, MemoryStore, StateStore};
use conquest_rules::ActionCosts;
use conquest_types::{
    ActionParameters, CellPos, CellTarget, Donation, Faction, FactionName, Grid, GridUpdate,
    Player, PlayerId, QueuedAction, StructureKind, UpgradeOrder,
};

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct RecordingPublisher {
    updates: Mutex<Vec<GridUpdate>>,
}

impl RecordingPublisher {
    fn updates(&self) -> Vec<GridUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

impl GridPublisher for RecordingPublisher {
    fn publish(&self, update: &GridUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

fn engine_with<S: StateStore>(store: S, publisher: Arc<dyn GridPublisher>) -> TickEngine<S> {
    TickEngine::new(EngineContext {
        store,
        publisher,
        costs: ActionCosts::default(),
        io_timeout: Duration::from_millis(100),
    })
}

fn pos(x: u32, y: u32) -> CellPos {
    CellPos { x, y }
}

fn claim(grid: &mut Grid, x: u32, y: u32, faction: FactionName) {
    grid.get_mut(pos(x, y)).unwrap().owner_faction = Some(faction);
}

fn stronghold(grid: &mut Grid, x: u32, y: u32, faction: FactionName) {
    claim(grid, x, y, faction);
    grid.get_mut(pos(x, y)).unwrap().structure = Some(StructureKind::Stronghold);
}

/// 5x5: red stronghold at (0,0), blue stronghold at (4,0).
fn base_grid() -> Grid {
    let mut grid = Grid::new(5, 5).unwrap();
    stronghold(&mut grid, 0, 0, FactionName::Red);
    stronghold(&mut grid, 4, 0, FactionName::Blue);
    grid
}

async fn seed(store: &MemoryStore, grid: &Grid) {
    store.set_grid(grid).await.unwrap();
    for name in FactionName::ALL {
        store.set_faction(&Faction::new(name)).await.unwrap();
    }
}

async fn add_player(store: &MemoryStore, id: &str, faction: FactionName, ap: u64) -> PlayerId {
    let id = PlayerId::from(id);
    join_player(store, id.clone(), faction, ap).await.unwrap();
    id
}

async fn enqueue(store: &MemoryStore, id: &PlayerId, params: ActionParameters) {
    submit_action(store, id, params).await.unwrap();
}

fn attack(x: i64, y: i64) -> ActionParameters {
    ActionParameters::Attack(CellTarget { x, y })
}

fn fortify(x: i64, y: i64) -> ActionParameters {
    ActionParameters::Fortify(CellTarget { x, y })
}

async fn player(store: &MemoryStore, id: &PlayerId) -> Player {
    store.get_player(id).await.unwrap().unwrap()
}

async fn cell(store: &MemoryStore, x: u32, y: u32) -> conquest_types::Cell {
    store
        .get_grid()
        .await
        .unwrap()
        .unwrap()
        .get(pos(x, y))
        .cloned()
        .unwrap()
}

// =============================================================================
// Tick engine
// =============================================================================

#[tokio::test]
async fn missing_grid_aborts_tick() {
    let store = MemoryStore::new();
    let engine = engine_with(store.clone(), Arc::new(NoOpPublisher));

    let result = engine.run_tick().await;

    assert!(matches!(result, Err(TickError::NoGrid)));
    assert_eq!(store.get_world_tick().await.unwrap(), 0);
}

#[tokio::test]
async fn capture_of_adjacent_neutral_cell() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, attack(1, 0)).await;
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine_with(store.clone(), publisher.clone());

    let summary = engine.run_tick().await.unwrap();

    assert_eq!(summary.tick, 1);
    assert_eq!(summary.actions_accepted, 1);
    assert!(summary.grid_changed);
    let captured = cell(&store, 1, 0).await;
    assert_eq!(captured.owner_faction, Some(FactionName::Red));
    assert_eq!(captured.fortification_level, 0);
    assert_eq!(captured.last_captured_by, Some(red.clone()));
    assert_eq!(player(&store, &red).await.ap, 90);
    assert_eq!(store.queue_len(&red).await.unwrap(), 0);
    assert_eq!(store.get_world_tick().await.unwrap(), 1);

    let updates = publisher.updates();
    assert_eq!(updates.len(), 1);
    let update = updates.first().unwrap();
    assert_eq!(update.tick, 1);
    assert_eq!(
        update.changed.iter().map(conquest_types::Cell::pos).collect::<Vec<_>>(),
        vec![pos(1, 0)]
    );
    assert!(update.reverted.is_empty());
}

#[tokio::test]
async fn rejected_attacks_leave_state_untouched() {
    let store = MemoryStore::new();
    let grid = base_grid();
    seed(&store, &grid).await;
    let rich = add_player(&store, "alice", FactionName::Red, 100).await;
    let poor = add_player(&store, "bob", FactionName::Red, 5).await;
    enqueue(&store, &rich, attack(9, 9)).await;
    enqueue(&store, &rich, attack(-1, 0)).await;
    enqueue(&store, &rich, attack(3, 3)).await;
    enqueue(&store, &rich, attack(0, 0)).await;
    enqueue(&store, &poor, attack(1, 0)).await;
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine_with(store.clone(), publisher.clone());

    let summary = engine.run_tick().await.unwrap();

    assert_eq!(summary.actions_rejected, 5);
    assert_eq!(summary.actions_accepted, 0);
    assert!(!summary.grid_changed);
    assert_eq!(player(&store, &rich).await.ap, 100);
    assert_eq!(player(&store, &poor).await.ap, 5);
    assert_eq!(store.get_grid().await.unwrap(), Some(grid));
    assert!(publisher.updates().is_empty());
    // The tick still counts.
    assert_eq!(store.get_world_tick().await.unwrap(), 1);
}

#[tokio::test]
async fn attack_on_fortified_cell_wears_it_down() {
    let store = MemoryStore::new();
    let mut grid = base_grid();
    for x in 1..4 {
        claim(&mut grid, x, 0, FactionName::Blue);
    }
    grid.get_mut(pos(1, 0)).unwrap().fortification_level = 2;
    seed(&store, &grid).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, attack(1, 0)).await;

    engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    let target = cell(&store, 1, 0).await;
    assert_eq!(target.owner_faction, Some(FactionName::Blue));
    assert_eq!(target.fortification_level, 1);
    assert_eq!(target.last_attacked_by, Some(red.clone()));
    assert_eq!(player(&store, &red).await.ap, 90);
}

#[tokio::test]
async fn fortify_only_owned_cells() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, fortify(0, 0)).await;
    enqueue(&store, &red, fortify(4, 0)).await;
    enqueue(&store, &red, fortify(2, 2)).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_accepted, 1);
    assert_eq!(summary.actions_rejected, 2);
    assert_eq!(cell(&store, 0, 0).await.fortification_level, 1);
    assert_eq!(cell(&store, 4, 0).await.fortification_level, 0);
    assert_eq!(cell(&store, 2, 2).await.fortification_level, 0);
    assert_eq!(player(&store, &red).await.ap, 95);
}

#[tokio::test]
async fn donation_moves_ap_without_creating_any() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, ActionParameters::DonateAp(Donation { amount: 30 })).await;
    enqueue(&store, &red, ActionParameters::DonateAp(Donation { amount: 0 })).await;
    enqueue(&store, &red, ActionParameters::DonateAp(Donation { amount: -10 })).await;
    enqueue(&store, &red, ActionParameters::DonateAp(Donation { amount: 71 })).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_accepted, 1);
    assert_eq!(summary.actions_rejected, 3);
    let after = player(&store, &red).await;
    let pool = store.get_faction(FactionName::Red).await.unwrap().unwrap();
    assert_eq!(after.ap, 70);
    assert_eq!(pool.ap_pool, 30);
    assert_eq!(after.ap + pool.ap_pool, 100);
    assert!(!summary.grid_changed);
}

#[tokio::test]
async fn upgrade_needs_a_full_pool() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let mut blue_faction = Faction::new(FactionName::Blue);
    blue_faction.ap_pool = 150;
    store.set_faction(&blue_faction).await.unwrap();
    let blue = add_player(&store, "bob", FactionName::Blue, 0).await;
    let order = || {
        ActionParameters::UpgradeRequest(UpgradeOrder {
            upgrade: String::from("factory"),
        })
    };
    enqueue(&store, &blue, order()).await;
    enqueue(&store, &blue, order()).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_accepted, 1);
    assert_eq!(summary.actions_rejected, 1);
    let faction = store.get_faction(FactionName::Blue).await.unwrap().unwrap();
    assert_eq!(faction.ap_pool, 50);
    assert_eq!(faction.upgrade_count("factory"), 1);
}

#[tokio::test]
async fn faction_is_reloaded_between_actions() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, ActionParameters::DonateAp(Donation { amount: 100 })).await;
    enqueue(
        &store,
        &red,
        ActionParameters::UpgradeRequest(UpgradeOrder {
            upgrade: String::from("castle"),
        }),
    )
    .await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_accepted, 2);
    let faction = store.get_faction(FactionName::Red).await.unwrap().unwrap();
    assert_eq!(faction.ap_pool, 0);
    assert_eq!(faction.upgrade_count("castle"), 1);
}

#[tokio::test]
async fn player_ap_carries_forward_within_a_tick() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 15).await;
    enqueue(&store, &red, attack(1, 0)).await;
    enqueue(&store, &red, attack(2, 0)).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_accepted, 1);
    assert_eq!(summary.actions_rejected, 1);
    assert_eq!(player(&store, &red).await.ap, 5);
    assert_eq!(cell(&store, 2, 0).await.owner_faction, None);
}

#[tokio::test]
async fn chained_captures_in_one_queue() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, attack(1, 0)).await;
    enqueue(&store, &red, attack(2, 0)).await;

    engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(cell(&store, 2, 0).await.owner_faction, Some(FactionName::Red));
    assert_eq!(player(&store, &red).await.ap, 80);
}

async fn run_race() -> conquest_types::Cell {
    let store = MemoryStore::new();
    let mut grid = base_grid();
    claim(&mut grid, 1, 0, FactionName::Red);
    claim(&mut grid, 3, 0, FactionName::Blue);
    seed(&store, &grid).await;
    // Registered out of order on purpose.
    let bob = add_player(&store, "bob", FactionName::Blue, 100).await;
    let alice = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &bob, attack(2, 0)).await;
    enqueue(&store, &alice, attack(2, 0)).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();
    assert_eq!(summary.actions_accepted, 2);
    cell(&store, 2, 0).await
}

#[tokio::test]
async fn same_cell_race_has_one_deterministic_winner() {
    let first = run_race().await;
    let second = run_race().await;

    // alice runs first and captures; bob then captures it back.
    assert_eq!(first.owner_faction, Some(FactionName::Blue));
    assert_eq!(first.last_captured_by, Some(PlayerId::from("bob")));
    assert_eq!(first, second);
}

#[tokio::test]
async fn severed_territory_reverts_after_capture() {
    let store = MemoryStore::new();
    let mut grid = Grid::new(5, 5).unwrap();
    stronghold(&mut grid, 0, 0, FactionName::Red);
    claim(&mut grid, 1, 0, FactionName::Red);
    claim(&mut grid, 2, 0, FactionName::Red);
    claim(&mut grid, 3, 0, FactionName::Red);
    grid.get_mut(pos(3, 0)).unwrap().fortification_level = 2;
    stronghold(&mut grid, 2, 2, FactionName::Blue);
    claim(&mut grid, 2, 1, FactionName::Blue);
    seed(&store, &grid).await;
    let blue = add_player(&store, "bob", FactionName::Blue, 100).await;
    enqueue(&store, &blue, attack(2, 0)).await;
    let publisher = Arc::new(RecordingPublisher::default());

    let summary = engine_with(store.clone(), publisher.clone())
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.cells_reverted, 1);
    let orphan = cell(&store, 3, 0).await;
    assert_eq!(orphan.owner_faction, None);
    assert_eq!(orphan.fortification_level, 0);
    assert_eq!(cell(&store, 1, 0).await.owner_faction, Some(FactionName::Red));
    assert_eq!(cell(&store, 2, 0).await.owner_faction, Some(FactionName::Blue));

    let updates = publisher.updates();
    assert_eq!(updates.len(), 1);
    let update = updates.first().unwrap();
    assert_eq!(update.reverted, vec![pos(3, 0)]);
    assert_eq!(update.changed.len(), 2);
}

#[tokio::test]
async fn rootless_faction_is_left_alone() {
    let store = MemoryStore::new();
    let mut grid = base_grid();
    claim(&mut grid, 2, 4, FactionName::Green);
    claim(&mut grid, 4, 4, FactionName::Green);
    seed(&store, &grid).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.cells_reverted, 0);
    assert!(!summary.grid_changed);
    assert_eq!(cell(&store, 4, 4).await.owner_faction, Some(FactionName::Green));
}

#[tokio::test]
async fn malformed_queue_entry_is_discarded() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    store.push_raw_action(&red, "{garbage").await;
    store
        .push_raw_action(&red, r#"{"type":"attack","payload":{"x":1,"y":0}}"#)
        .await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_malformed, 2);
    assert_eq!(summary.actions_accepted, 0);
    assert_eq!(store.queue_len(&red).await.unwrap(), 0);

    // Entries without a timestamp are not valid queue records; stamped
    // entries are.
    let stamped = QueuedAction::now(attack(1, 0));
    store
        .push_raw_action(&red, &serde_json::to_string(&stamped).unwrap())
        .await;
    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();
    assert_eq!(summary.actions_accepted, 1);
}

#[tokio::test]
async fn unreadable_player_keeps_its_queue() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let ghost = add_player(&store, "ghost", FactionName::Red, 100).await;
    enqueue(&store, &ghost, attack(1, 0)).await;
    store.put_raw("player:ghost", "{corrupt").await;
    let alice = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &alice, fortify(0, 0)).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.players_skipped, 1);
    assert_eq!(summary.players_processed, 1);
    assert_eq!(store.queue_len(&ghost).await.unwrap(), 1);
    assert_eq!(cell(&store, 0, 0).await.fortification_level, 1);
}

#[tokio::test]
async fn missing_faction_rejects_actions() {
    let store = MemoryStore::new();
    store.set_grid(&base_grid()).await.unwrap();
    let red = add_player(&store, "alice", FactionName::Red, 100).await;
    enqueue(&store, &red, attack(1, 0)).await;

    let summary = engine_with(store.clone(), Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.actions_rejected, 1);
    assert_eq!(player(&store, &red).await.ap, 100);
}

#[tokio::test]
async fn idle_tick_publishes_nothing_but_advances() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    add_player(&store, "alice", FactionName::Red, 100).await;
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine_with(store.clone(), publisher.clone());

    engine.run_tick().await.unwrap();
    let second = engine.run_tick().await.unwrap();

    assert_eq!(second.tick, 2);
    assert_eq!(second.players_processed, 0);
    assert!(publisher.updates().is_empty());
    assert_eq!(store.get_world_tick().await.unwrap(), 2);
}

// =============================================================================
// Store faults
// =============================================================================

/// Wraps a [`MemoryStore`], failing or stalling calls for one player.
#[derive(Clone)]
struct FaultyStore {
    inner: MemoryStore,
    fail_pop_for: Option<PlayerId>,
    stall_get_for: Option<PlayerId>,
    fail_player_write_for: Option<PlayerId>,
}

impl FaultyStore {
    fn wrap(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_pop_for: None,
            stall_get_for: None,
            fail_player_write_for: None,
        }
    }

    fn player_write_fails(&self, id: &PlayerId) -> Result<(), DbError> {
        if self.fail_player_write_for.as_ref() == Some(id) {
            return Err(DbError::Config(String::from("injected player write failure")));
        }
        Ok(())
    }
}

impl StateStore for FaultyStore {
    async fn get_player(&self, id: &PlayerId) -> Result<Option<Player>, DbError> {
        if self.stall_get_for.as_ref() == Some(id) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        self.inner.get_player(id).await
    }

    async fn set_player(&self, player: &Player) -> Result<(), DbError> {
        self.player_write_fails(&player.id)?;
        self.inner.set_player(player).await
    }

    async fn register_player(&self, player: &Player) -> Result<bool, DbError> {
        self.inner.register_player(player).await
    }

    async fn list_players(&self) -> Result<Vec<PlayerId>, DbError> {
        self.inner.list_players().await
    }

    async fn get_faction(&self, name: FactionName) -> Result<Option<Faction>, DbError> {
        self.inner.get_faction(name).await
    }

    async fn set_faction(&self, faction: &Faction) -> Result<(), DbError> {
        self.inner.set_faction(faction).await
    }

    async fn commit_action(&self, player: &Player, faction: &Faction) -> Result<(), DbError> {
        self.player_write_fails(&player.id)?;
        self.inner.commit_action(player, faction).await
    }

    async fn get_grid(&self) -> Result<Option<Grid>, DbError> {
        self.inner.get_grid().await
    }

    async fn set_grid(&self, grid: &Grid) -> Result<(), DbError> {
        self.inner.set_grid(grid).await
    }

    async fn push_action(&self, id: &PlayerId, action: &QueuedAction) -> Result<u64, DbError> {
        self.inner.push_action(id, action).await
    }

    async fn pop_action(&self, id: &PlayerId) -> Result<Option<String>, DbError> {
        if self.fail_pop_for.as_ref() == Some(id) {
            return Err(DbError::Config(String::from("injected failure")));
        }
        self.inner.pop_action(id).await
    }

    async fn queue_len(&self, id: &PlayerId) -> Result<u64, DbError> {
        self.inner.queue_len(id).await
    }

    async fn get_world_tick(&self) -> Result<u64, DbError> {
        self.inner.get_world_tick().await
    }

    async fn set_world_tick(&self, tick: u64) -> Result<(), DbError> {
        self.inner.set_world_tick(tick).await
    }
}

#[tokio::test]
async fn store_error_skips_only_that_player() {
    let memory = MemoryStore::new();
    seed(&memory, &base_grid()).await;
    let alice = add_player(&memory, "alice", FactionName::Red, 100).await;
    let bob = add_player(&memory, "bob", FactionName::Blue, 100).await;
    enqueue(&memory, &alice, attack(1, 0)).await;
    enqueue(&memory, &bob, attack(3, 0)).await;
    let mut store = FaultyStore::wrap(memory.clone());
    store.fail_pop_for = Some(alice.clone());

    let summary = engine_with(store, Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.players_skipped, 1);
    assert_eq!(summary.players_processed, 1);
    assert_eq!(cell(&memory, 1, 0).await.owner_faction, None);
    assert_eq!(cell(&memory, 3, 0).await.owner_faction, Some(FactionName::Blue));
    assert_eq!(memory.queue_len(&alice).await.unwrap(), 1);
}

#[tokio::test]
async fn failed_player_write_leaves_faction_uncredited() {
    let memory = MemoryStore::new();
    seed(&memory, &base_grid()).await;
    let alice = add_player(&memory, "alice", FactionName::Red, 100).await;
    enqueue(&memory, &alice, ActionParameters::DonateAp(Donation { amount: 50 })).await;
    enqueue(&memory, &alice, attack(1, 0)).await;
    let mut store = FaultyStore::wrap(memory.clone());
    store.fail_player_write_for = Some(alice.clone());

    let summary = engine_with(store, Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.players_skipped, 1);
    assert_eq!(summary.actions_accepted, 0);
    let ap = player(&memory, &alice).await.ap;
    let pool = memory
        .get_faction(FactionName::Red)
        .await
        .unwrap()
        .unwrap()
        .ap_pool;
    assert_eq!((ap, pool), (100, 0));
    assert_eq!(memory.queue_len(&alice).await.unwrap(), 1);
    assert_eq!(cell(&memory, 1, 0).await.owner_faction, None);
}

#[tokio::test]
async fn slow_store_call_times_out_for_one_player() {
    let memory = MemoryStore::new();
    seed(&memory, &base_grid()).await;
    let alice = add_player(&memory, "alice", FactionName::Red, 100).await;
    let bob = add_player(&memory, "bob", FactionName::Blue, 100).await;
    enqueue(&memory, &alice, attack(1, 0)).await;
    enqueue(&memory, &bob, attack(3, 0)).await;
    let mut store = FaultyStore::wrap(memory.clone());
    store.stall_get_for = Some(bob.clone());

    let summary = engine_with(store, Arc::new(NoOpPublisher))
        .run_tick()
        .await
        .unwrap();

    assert_eq!(summary.players_processed, 1);
    assert_eq!(summary.players_skipped, 1);
    assert_eq!(cell(&memory, 1, 0).await.owner_faction, Some(FactionName::Red));
    assert_eq!(memory.queue_len(&bob).await.unwrap(), 1);
}

// =============================================================================
// Runner
// =============================================================================

#[derive(Default)]
struct CountingCallback {
    ticks: Vec<u64>,
}

impl TickCallback for CountingCallback {
    fn on_tick(&mut self, summary: &TickSummary) {
        self.ticks.push(summary.tick);
    }
}

fn operator(interval_ms: u64, max_ticks: u64) -> Arc<OperatorState> {
    Arc::new(OperatorState::new(
        interval_ms,
        &SimulationBoundsConfig {
            max_ticks,
            ..SimulationBoundsConfig::default()
        },
    ))
}

#[tokio::test]
async fn runner_stops_at_max_ticks() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let engine = engine_with(store.clone(), Arc::new(NoOpPublisher));
    let op = operator(0, 3);
    let mut callback = CountingCallback::default();

    let result = run_simulation(&engine, &op, 0, &mut callback).await.unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
    assert_eq!(result.total_ticks, 3);
    assert_eq!(callback.ticks, vec![1, 2, 3]);
    assert_eq!(op.current_tick(), 3);
    assert_eq!(store.get_world_tick().await.unwrap(), 3);
    assert_eq!(op.end_reason(), Some(SimulationEndReason::MaxTicksReached));
}

#[tokio::test]
async fn runner_honours_stop_before_first_tick() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let engine = engine_with(store.clone(), Arc::new(NoOpPublisher));
    let op = operator(0, 0);
    op.request_stop();

    let result = run_simulation(&engine, &op, 0, &mut conquest_core::NoOpCallback)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 0);
    assert!(result.final_summary.is_none());
}

#[tokio::test]
async fn runner_gives_up_after_repeated_failures() {
    let engine = engine_with(MemoryStore::new(), Arc::new(NoOpPublisher));
    let op = operator(0, 0);

    let result = run_simulation(&engine, &op, 2, &mut conquest_core::NoOpCallback).await;

    assert!(matches!(
        result,
        Err(RunnerError::TooManyFailures {
            count: 2,
            last: TickError::NoGrid
        })
    ));
    assert_eq!(op.end_reason(), Some(SimulationEndReason::TooManyFailures));
}

#[tokio::test]
async fn failed_ticks_do_not_stop_an_unbounded_runner() {
    let engine = engine_with(MemoryStore::new(), Arc::new(NoOpPublisher));
    let op = operator(0, 0);
    let stopper = {
        let op = Arc::clone(&op);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            op.request_stop();
        })
    };

    let result = run_simulation(&engine, &op, 0, &mut conquest_core::NoOpCallback)
        .await
        .unwrap();
    stopper.await.unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 0);
    assert!(result.failed_ticks > 0);
}

#[tokio::test]
async fn paused_runner_does_not_tick_until_resumed() {
    let store = MemoryStore::new();
    seed(&store, &base_grid()).await;
    let engine = engine_with(store.clone(), Arc::new(NoOpPublisher));
    let op = operator(0, 2);
    op.pause();

    let handle = {
        let op = Arc::clone(&op);
        tokio::spawn(async move {
            run_simulation(&engine, &op, 0, &mut conquest_core::NoOpCallback).await
        })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.get_world_tick().await.unwrap(), 0);

    op.resume();
    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("runner should finish after resume")
        .unwrap()
        .unwrap();
    assert_eq!(result.total_ticks, 2);
    assert_eq!(store.get_world_tick().await.unwrap(), 2);
}
