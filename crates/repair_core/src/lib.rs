//! Core business logic for the repair-shop ticket system.
//! This crate is the single source of truth for repair invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::RepairConfig;
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::repair::{
    PhoneNumber, Repair, RepairId, RepairRegistrationRequest, RepairUpdateRequest,
    RepairValidationError,
};
pub use repo::memory_repo::InMemoryRepairRepository;
pub use repo::repair_repo::{RepairRepository, RepoError, RepoResult, SqliteRepairRepository};
pub use service::repair_service::{ErrorKind, RepairService, RepairServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
