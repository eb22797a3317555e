//! Catalogue domain model.
//!
//! # Responsibility
//! - Define the records decoded from the remote catalogue API.
//! - Define the entities persisted in the local store.

pub mod favorite;
pub mod game;
