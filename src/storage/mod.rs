//! Storage Module
//!
//! Everything that touches table files on disk.
//!
//! ## Responsibilities
//! - Load table documents (`durable::load_document`)
//! - Commit documents crash-safely (`durable::write_atomic`)
//! - Serialize writers per table in arrival order (`WriteSlot`)
//! - Snapshot all table files into a timestamped directory (`BackupManager`)
//!
//! ## Commit Protocol
//! ```text
//!   ticket ──▶ wait for turn ──▶ write {file}.tmp ──▶ fsync
//!                                                       │
//!   release ◀── publish to cache ◀── fsync dir ◀── rename onto {file}
//! ```
//! A crash before the rename leaves the previous file intact; a crash after
//! it leaves the new file intact. A leftover `.tmp` is discarded on the next
//! initialization.

pub mod backup;
pub mod durable;
mod slot;

pub use backup::BackupManager;
pub use slot::{SlotGuard, Ticket, WriteSlot};
