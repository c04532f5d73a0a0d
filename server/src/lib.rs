//! Authoritative simulation server for a real-time 2D action game.
//!
//! The world is owned by a single game loop task. Network input is drained
//! into it at the start of every tick and a snapshot is broadcast at the end.

pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod network;
pub mod persistence;
pub mod world;
