//! PostgreSQL database operations.
//!
//! Structured columns (stats, inventory, equipment, item kinds) are stored as
//! JSON text and decoded with `serde_json`.

use std::collections::HashSet;

use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use skirmish_shared::{CreatureDef, ItemDef, ItemDefKind, StatBlock};

use super::CharacterRecord;
use crate::error::PersistenceError;
use crate::world::MobSpawnPoint;

/// Session row joined with its user
#[derive(Debug, Clone)]
pub struct SessionRow {
    pub user_id: u64,
    pub username: String,
    pub secret_hash: String,
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Look up a live session by id
    pub async fn find_session(&self, session_id: i64) -> Result<Option<SessionRow>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT s.secret_hash, u.id AS user_id, u.username
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.id = $1 AND s.expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(SessionRow {
                user_id: r.try_get::<i64, _>("user_id")? as u64,
                username: r.try_get("username")?,
                secret_hash: r.try_get("secret_hash")?,
            })
        })
        .transpose()
    }

    // =========================================================================
    // Character Operations
    // =========================================================================

    /// Load a character by id
    pub async fn load_character(&self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError> {
        let row = sqlx::query(
            "SELECT id, user_id, name, texture, x, y, stats, inventory, equipment
             FROM characters WHERE id = $1",
        )
        .bind(character_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let stats: String = r.try_get("stats")?;
        let inventory: String = r.try_get("inventory")?;
        let equipment: String = r.try_get("equipment")?;

        Ok(Some(CharacterRecord {
            character_id: r.try_get::<i64, _>("id")? as u64,
            user_id: r.try_get::<i64, _>("user_id")? as u64,
            name: r.try_get("name")?,
            texture: r.try_get::<i32, _>("texture")? as u32,
            x: r.try_get("x")?,
            y: r.try_get("y")?,
            stats: serde_json::from_str(&stats)?,
            inventory: serde_json::from_str(&inventory)?,
            equipment: serde_json::from_str(&equipment)?,
        }))
    }

    /// Save position, stats, inventory and equipment of a character
    pub async fn save_character(&self, record: &CharacterRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            "UPDATE characters
             SET x = $2, y = $3, stats = $4, inventory = $5, equipment = $6
             WHERE id = $1",
        )
        .bind(record.character_id as i64)
        .bind(record.x)
        .bind(record.y)
        .bind(serde_json::to_string(&record.stats)?)
        .bind(serde_json::to_string(&record.inventory)?)
        .bind(serde_json::to_string(&record.equipment)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Static Game Data
    // =========================================================================

    /// Load the item catalog. `kind` holds the JSON encoded variant data.
    pub async fn load_all_items(&self) -> Result<Vec<ItemDef>, PersistenceError> {
        let rows = sqlx::query("SELECT id, name, texture, description, kind FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let kind: ItemDefKind = serde_json::from_str(&kind)?;
            items.push(ItemDef {
                id: row.try_get::<i32, _>("id")? as u32,
                name: row.try_get("name")?,
                texture: row.try_get::<i32, _>("texture")? as u32,
                description: row
                    .try_get::<Option<String>, _>("description")?
                    .unwrap_or_default(),
                kind,
            });
        }
        Ok(items)
    }

    /// Load creature templates for mobs
    pub async fn load_creatures(&self) -> Result<Vec<CreatureDef>, PersistenceError> {
        let rows = sqlx::query("SELECT id, name, width, height, texture, stats FROM creatures")
            .fetch_all(&self.pool)
            .await?;

        let mut creatures = Vec::with_capacity(rows.len());
        for row in rows {
            let stats: String = row.try_get("stats")?;
            let stats: StatBlock = serde_json::from_str(&stats)?;
            creatures.push(CreatureDef {
                id: row.try_get::<i32, _>("id")? as u32,
                name: row.try_get("name")?,
                width: row.try_get("width")?,
                height: row.try_get("height")?,
                texture: row.try_get::<i32, _>("texture")? as u32,
                stats,
            });
        }
        Ok(creatures)
    }

    /// Load mob spawn points
    pub async fn load_mob_spawns(&self) -> Result<Vec<MobSpawnPoint>, PersistenceError> {
        let rows = sqlx::query("SELECT creature_id, x, y, respawn_secs FROM mob_spawns ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(MobSpawnPoint {
                    creature_id: row.try_get::<i32, _>("creature_id")? as u32,
                    x: row.try_get("x")?,
                    y: row.try_get("y")?,
                    respawn_secs: row.try_get("respawn_secs")?,
                })
            })
            .collect()
    }

    /// Tile ids that block movement
    pub async fn load_blocking_tiles(&self) -> Result<HashSet<u32>, PersistenceError> {
        let rows = sqlx::query("SELECT id FROM tiles WHERE col <> 0")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<i32, _>("id")? as u32))
            .collect()
    }
}
