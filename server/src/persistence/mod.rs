//! Persistence layer for the simulation server.
//!
//! Character loads and saves run in a background task so the game loop
//! never waits on I/O. Reads go to the redis cache first and fall back to
//! PostgreSQL; saves write through to both.

mod cache;
mod database;

pub use cache::Cache;
pub use database::{Database, SessionRow};

use async_trait::async_trait;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use skirmish_shared::{EquipSlot, ItemRecord, StatBlock};

use crate::error::PersistenceError;

/// Persisted form of a character. Stats exclude equipment bonuses and
/// active effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub character_id: u64,
    pub user_id: u64,
    pub name: String,
    pub texture: u32,
    pub x: f32,
    pub y: f32,
    pub stats: StatBlock,
    pub inventory: Vec<Option<ItemRecord>>,
    pub equipment: Vec<(EquipSlot, ItemRecord)>,
}

/// Character storage as seen by the network front
#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn load_character(&self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError>;

    /// Fire and forget
    fn save_character(&self, record: CharacterRecord);
}

/// Backing store driven by the persistence task
#[async_trait]
pub trait CharacterStore: Send + 'static {
    async fn load(&mut self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError>;
    async fn save(&mut self, record: &CharacterRecord) -> Result<(), PersistenceError>;
}

/// Redis in front of PostgreSQL
pub struct Storage {
    db: Database,
    cache: Cache,
}

impl Storage {
    pub fn new(db: Database, cache: Cache) -> Self {
        Self { db, cache }
    }
}

#[async_trait]
impl CharacterStore for Storage {
    async fn load(&mut self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError> {
        match self.cache.load_character(character_id).await {
            Ok(Some(record)) => {
                info!("Loaded character {} from cache", character_id);
                return Ok(Some(record));
            }
            Ok(None) => {}
            Err(e) => warn!("Cache read for character {} failed: {}", character_id, e),
        }

        let record = self.db.load_character(character_id).await?;
        if let Some(record) = &record {
            info!("Loaded character {} from database", character_id);
            if let Err(e) = self.cache.save_character(record).await {
                warn!("Failed to cache character {}: {}", character_id, e);
            }
        }
        Ok(record)
    }

    async fn save(&mut self, record: &CharacterRecord) -> Result<(), PersistenceError> {
        if let Err(e) = self.cache.save_character(record).await {
            warn!("Failed to save character {} to cache: {}", record.character_id, e);
        }
        self.db.save_character(record).await
    }
}

/// Commands sent to the persistence background task
#[derive(Debug)]
pub enum PersistenceCommand {
    SaveCharacter {
        record: CharacterRecord,
    },
    LoadCharacter {
        character_id: u64,
        response: oneshot::Sender<Result<Option<CharacterRecord>, PersistenceError>>,
    },
    /// Stop after everything queued before it; `done` fires once stopped
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Handle for sending commands to the persistence task
#[derive(Clone)]
pub struct PersistenceHandle {
    sender: mpsc::Sender<PersistenceCommand>,
}

impl PersistenceHandle {
    /// Shutdown the persistence task and wait for queued saves to finish
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(PersistenceCommand::Shutdown { done: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl PersistenceService for PersistenceHandle {
    async fn load_character(&self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PersistenceCommand::LoadCharacter {
                character_id,
                response: tx,
            })
            .await
            .map_err(|_| PersistenceError::Unavailable)?;
        rx.await.map_err(|_| PersistenceError::Unavailable)?
    }

    fn save_character(&self, record: CharacterRecord) {
        let character_id = record.character_id;
        if self
            .sender
            .try_send(PersistenceCommand::SaveCharacter { record })
            .is_err()
        {
            error!("Persistence queue rejected save of character {}", character_id);
        }
    }
}

/// Spawn the background task over any store and return its handle
pub fn start<S: CharacterStore>(store: S) -> PersistenceHandle {
    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(persistence_task(store, rx));
    PersistenceHandle { sender: tx }
}

/// Connect to PostgreSQL and Redis and start the persistence task.
/// The database handle is returned as well for startup loads and auth.
pub async fn init(
    database_url: &str,
    redis_url: &str,
) -> Result<(PersistenceHandle, Database), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    info!("Connected to PostgreSQL");

    let cache = Cache::connect(redis_url).await?;
    info!("Connected to Redis");

    let handle = start(Storage::new(db.clone(), cache));
    info!("Persistence background task started");

    Ok((handle, db))
}

async fn persistence_task<S: CharacterStore>(mut store: S, mut rx: mpsc::Receiver<PersistenceCommand>) {
    info!("Persistence task running");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            PersistenceCommand::SaveCharacter { record } => {
                match store.save(&record).await {
                    Ok(()) => info!("Saved character {}", record.character_id),
                    Err(e) => error!("Failed to save character {}: {}", record.character_id, e),
                }
            }

            PersistenceCommand::LoadCharacter { character_id, response } => {
                let result = store.load(character_id).await;
                if let Err(e) = &result {
                    error!("Failed to load character {}: {}", character_id, e);
                }
                let _ = response.send(result);
            }

            PersistenceCommand::Shutdown { done } => {
                info!("Persistence task shutting down");
                let _ = done.send(());
                break;
            }
        }
    }

    info!("Persistence task stopped");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory store shared with the test body
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        pub records: Arc<Mutex<HashMap<u64, CharacterRecord>>>,
    }

    #[async_trait]
    impl CharacterStore for MemoryStore {
        async fn load(&mut self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError> {
            Ok(self.records.lock().unwrap().get(&character_id).cloned())
        }

        async fn save(&mut self, record: &CharacterRecord) -> Result<(), PersistenceError> {
            self.records
                .lock()
                .unwrap()
                .insert(record.character_id, record.clone());
            Ok(())
        }
    }

    pub fn record(character_id: u64, user_id: u64) -> CharacterRecord {
        CharacterRecord {
            character_id,
            user_id,
            name: format!("hero{}", character_id),
            texture: 1,
            x: 64.0,
            y: 96.0,
            stats: StatBlock::default(),
            inventory: vec![Some(ItemRecord { id: 1, quant: 3 }), None],
            equipment: vec![(EquipSlot::Head, ItemRecord { id: 10, quant: 1 })],
        }
    }
}
