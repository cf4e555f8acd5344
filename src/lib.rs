//! Helicopter-versus-dinosaur simulation core.
//!
//! Several timed activities share one [`entities::World`] behind the
//! session's general lock, while the [`depot::Depot`] mediates the contended
//! ammunition supply between the truck and the helicopter.

pub mod compute;
pub mod config;
pub mod depot;
pub mod entities;
pub mod reload;
pub mod session;
pub mod tasks;
