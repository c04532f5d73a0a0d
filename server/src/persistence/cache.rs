//! Redis cache for hot character records.

use redis::{aio::ConnectionManager, AsyncCommands};

use super::CharacterRecord;
use crate::error::PersistenceError;

const CHARACTER_PREFIX: &str = "char:record:";

/// TTL for cached data (1 hour)
const CACHE_TTL_SECONDS: u64 = 3600;

/// Redis cache wrapper
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

fn character_key(character_id: u64) -> String {
    format!("{}{}", CHARACTER_PREFIX, character_id)
}

impl Cache {
    /// Connect to Redis
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    pub async fn save_character(&self, record: &CharacterRecord) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(character_key(record.character_id), json, CACHE_TTL_SECONDS)
            .await?;
        Ok(())
    }

    /// Cached record, if any. Entries that fail to parse count as a miss.
    pub async fn load_character(&self, character_id: u64) -> Result<Option<CharacterRecord>, PersistenceError> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(character_key(character_id)).await?;
        Ok(json.and_then(|j| serde_json::from_str(&j).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_key() {
        assert_eq!(character_key(42), "char:record:42");
    }
}
