//! Typed entities over an embedded transactional row store.
//!
//! Entities are plain structs holding `Field` slots that load lazily from
//! their attached row and track which values changed. Every store access goes
//! through a `Storage`, which runs the operations one at a time on a dedicated
//! worker thread and commits each one atomically.
//!
//! Store implementations live in their own crates (for instance `trove-sqlite`).

pub use trove_core::*;
