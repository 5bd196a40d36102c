//! Record-store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access contract the repair service depends on.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Store writes enforce `Repair::validate()` before persistence.
//! - Stores return semantic errors (`NotFound`, `DuplicatePhoneNumber`) in
//!   addition to transport errors.

pub mod memory_repo;
pub mod repair_repo;
