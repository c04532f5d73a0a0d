pub mod protocol;
pub mod entities;
pub mod items;

pub use protocol::*;
pub use entities::*;
pub use items::*;
