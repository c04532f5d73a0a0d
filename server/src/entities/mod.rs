//! Server-side entity definitions.

pub mod body;
pub mod equipment;
pub mod inventory;
pub mod item;
pub mod mob;
pub mod player;
pub mod projectile;
pub mod status;

pub use body::{Body, EntityRef};
pub use equipment::EquipmentSet;
pub use inventory::Inventory;
pub use item::{Consumable, Equipment, Item, ItemCatalog, ItemKind, Weapon};
pub use mob::ServerMob;
pub use player::ServerPlayer;
pub use projectile::Projectile;
pub use status::{Effect, Status};
