//! Repair-shop domain model.
//!
//! # Responsibility
//! - Define the repair record and the request shapes accepted at the service
//!   boundary.
//!
//! # Invariants
//! - Every persisted repair is identified by a store-assigned `RepairId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod repair;
