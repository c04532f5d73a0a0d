//! Error types for the server.

use thiserror::Error;

/// Rejected inventory/equipment command. Reported to the requesting
/// connection only; world state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Invalid inventory slot {0}")]
    InvalidSlot(usize),
    #[error("Inventory slot {0} is empty")]
    EmptySlot(usize),
    #[error("Item cannot be equipped")]
    NotEquippable,
    #[error("Unknown equipment slot '{0}'")]
    UnknownEquipmentSlot(String),
    #[error("Nothing equipped in slot '{0}'")]
    NothingEquipped(String),
    #[error("Inventory full")]
    InventoryFull,
    #[error("Invalid quantity")]
    InvalidQuantity,
}

/// Session token verification errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session token not provided")]
    MissingToken,
    #[error("Malformed session token")]
    MalformedToken,
    #[error("Invalid or expired session token")]
    InvalidToken,
    #[error("Token verification failed: {0}")]
    Hash(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// Persistence collaborator errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),
    #[error("Corrupt character data: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Persistence task unavailable")]
    Unavailable,
}

/// Reasons a join attempt terminates the connection
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("Protocol version mismatch. Server: {server}, Client: {client}")]
    VersionMismatch { server: u32, client: u32 },
    #[error("Character id not provided")]
    MissingCharacter,
    #[error("Authentication error: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("Character {0} not found")]
    CharacterNotFound(u64),
    #[error("Character {0} does not belong to this account")]
    NotOwner(u64),
    #[error("Character {0} is already in the world")]
    AlreadyInWorld(u64),
    #[error("Failed to load character: {0}")]
    Load(#[from] PersistenceError),
}

/// Map/collision data loading errors
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to read map file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse map file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Map has no collision layers")]
    NoLayers,
    #[error("Layer '{name}' has {actual} tiles, expected {expected}")]
    LayerSize {
        name: String,
        expected: usize,
        actual: usize,
    },
}
