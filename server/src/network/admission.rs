//! Join admission: protocol check, token verification, character load.

use log::info;
use skirmish_shared::PROTOCOL_VERSION;

use crate::auth::AuthService;
use crate::error::JoinError;
use crate::persistence::{CharacterRecord, PersistenceService};

/// Decide whether a join request may enter the world
pub async fn admit(
    auth: &dyn AuthService,
    store: &dyn PersistenceService,
    protocol_version: u32,
    token: &str,
    character_id: Option<u64>,
) -> Result<CharacterRecord, JoinError> {
    if protocol_version != PROTOCOL_VERSION {
        return Err(JoinError::VersionMismatch {
            server: PROTOCOL_VERSION,
            client: protocol_version,
        });
    }
    let character_id = character_id.ok_or(JoinError::MissingCharacter)?;

    let identity = auth.verify(token).await?;
    let record = store
        .load_character(character_id)
        .await?
        .ok_or(JoinError::CharacterNotFound(character_id))?;

    if record.user_id != identity.user_id {
        return Err(JoinError::NotOwner(character_id));
    }

    info!(
        "Account '{}' admitted with character '{}' ({})",
        identity.username, record.name, character_id
    );
    Ok(record)
}
