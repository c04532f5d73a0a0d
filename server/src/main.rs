//! Skirmish game server
//!
//! Authoritative simulation server for the 2D action game.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};

use skirmish_server::auth::SessionAuth;
use skirmish_server::config::{Args, ServerConfig};
use skirmish_server::entities::ItemCatalog;
use skirmish_server::network::Server;
use skirmish_server::persistence;
use skirmish_server::world::{GameWorld, MobSpawner, TileMap, WorldSettings};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_args(Args::parse());

    info!("Starting Skirmish server...");
    info!("Tick rate: {} Hz", config.tick_rate);

    let (persistence, db) = persistence::init(&config.database_url, &config.redis_url).await?;

    // Static game data
    let (mut items, creatures, spawns, blocking) = futures::try_join!(
        db.load_all_items(),
        db.load_creatures(),
        db.load_mob_spawns(),
        db.load_blocking_tiles(),
    )?;
    if items.is_empty() {
        info!("Item table is empty, using built-in item definitions");
        items = skirmish_shared::get_item_definitions();
    }
    info!(
        "Loaded {} items, {} creatures, {} spawn points, {} blocking tiles",
        items.len(),
        creatures.len(),
        spawns.len(),
        blocking.len()
    );

    let map = TileMap::load(&config.map_path, blocking)?;

    let mut world = GameWorld::new(
        Box::new(map),
        ItemCatalog::new(items),
        MobSpawner::new(creatures, spawns),
        WorldSettings {
            tick_rate: config.tick_rate,
            spawn_point: config.spawn_point(),
        },
    );

    let mut server = Server::bind(
        &config.bind_addr(),
        Arc::new(SessionAuth::new(db)),
        Arc::new(persistence.clone()),
        Duration::from_secs(config.connection_timeout_secs),
    )
    .await?;
    info!("Listening on {}", config.bind_addr());

    run_game_loop(&mut server, &mut world, config.tick_rate).await;

    info!("Saving {} connected players", server.client_count());
    server.save_all_players(&world);
    persistence.shutdown().await;
    Ok(())
}

/// Fixed-rate loop: drain the network, step the world, broadcast.
/// Returns on Ctrl-C.
async fn run_game_loop(server: &mut Server, world: &mut GameWorld, tick_rate: u32) {
    let tick_duration = Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64);
    let (shutdown_tx, mut shutdown) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                // Keep the sender alive so the loop runs on
                std::future::pending::<()>().await;
            }
        }
    });

    info!("Server started successfully!");

    loop {
        let tick_start = Instant::now();

        server.process_incoming(world).await;
        let snapshot = world.tick();
        server.broadcast_snapshot(snapshot).await;

        // Sleep until next tick
        let remaining = tick_duration.saturating_sub(tick_start.elapsed());
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                return;
            }
            _ = tokio::time::sleep(remaining) => {}
        }
    }
}
