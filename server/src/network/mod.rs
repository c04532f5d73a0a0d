//! Network front: UDP transport and join admission.

pub mod admission;
pub mod server;

pub use server::Server;
