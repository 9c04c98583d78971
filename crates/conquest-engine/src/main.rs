//! Engine binary for the Conquest simulation.
//!
//! Wires the store, the starting world, the observer API, and the tick
//! loop together, then runs until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `conquest-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the configured store (Dragonfly or in-memory)
//! 4. Seed the grid and factions if the store is empty
//! 5. Create operator state from simulation bounds
//! 6. Start the observer API server
//! 7. Run the simulation loop
//! 8. Log the result

mod error;
mod seed;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use conquest_core::config::SimulationConfig;
use conquest_core::{
    EngineContext, GridPublisher, NoOpCallback, OperatorState, StoreMode, TickEngine, runner,
};
use conquest_db::{DragonflyPool, MemoryStore, StateStore};
use conquest_observer::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_PATH: &str = "conquest-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("conquest-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        tick_interval_ms = config.world.tick_interval_ms,
        grid_width = config.world.grid_width,
        grid_height = config.world.grid_height,
        store = ?config.infrastructure.store,
        store_timeout_ms = config.infrastructure.store_timeout_ms,
        "Configuration loaded"
    );

    // 3. Connect the store and run.
    match config.infrastructure.store {
        StoreMode::Dragonfly => {
            let url = &config.infrastructure.dragonfly_url;
            info!(url, "Connecting to Dragonfly");
            let store = DragonflyPool::connect(url)
                .await
                .map_err(EngineError::from)?;
            run(store, &config).await?;
        }
        StoreMode::Memory => {
            warn!("Using in-memory store, state will not survive a restart");
            run(MemoryStore::new(), &config).await?;
        }
    }

    Ok(())
}

/// Seed, start the observer, and drive the tick loop over `store`.
async fn run<S: StateStore>(store: S, config: &SimulationConfig) -> Result<(), EngineError> {
    // 4. Seed the world.
    seed::seed_world(&store, &config.world).await?;

    // 5. Create operator state.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );

    // 6. Start Observer API server.
    let observer_port = config.infrastructure.observer_port;
    let app_state = Arc::new(
        AppState::new(store.clone(), config.economy.starting_ap)
            .with_operator(Arc::clone(&operator)),
    );
    let observer_handle = conquest_observer::spawn_observer(observer_port, Arc::clone(&app_state))
        .await
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    info!(port = observer_port, "Observer API server started");

    // Ctrl-C asks for a clean stop after the current tick.
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after current tick");
                operator.request_stop();
            }
        });
    }

    // 7. Run the simulation.
    let publisher: Arc<dyn GridPublisher> = app_state;
    let engine = TickEngine::new(EngineContext {
        store,
        publisher,
        costs: config.economy.costs,
        io_timeout: Duration::from_millis(config.infrastructure.store_timeout_ms),
    });

    let result = runner::run_simulation(
        &engine,
        &operator,
        config.simulation.max_consecutive_failures,
        &mut NoOpCallback,
    )
    .await?;

    // 8. Log results.
    runner::log_simulation_end(&result);
    observer_handle.abort();

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "conquest-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `conquest-config.yaml` in the working directory.
///
/// Returns the config and whether it came from the file. Environment
/// overrides apply either way.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((SimulationConfig::from_file(config_path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok((config, false))
    }
}
