//! Repair use-case service.
//!
//! # Responsibility
//! - Enforce business rules the store does not know about.
//! - Translate registration/update requests into store calls.
//!
//! # Invariants
//! - Every rejection happens before any store mutation.
//! - `phone_number` stays unique across all stored repairs.
//! - An update that changes nothing is rejected, never written.
//! - The id of an existing repair is never reassigned.

use crate::model::repair::{
    PhoneNumber, Repair, RepairId, RepairRegistrationRequest, RepairUpdateRequest,
    RepairValidationError,
};
use crate::repo::repair_repo::{RepairRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse error category for transport-layer mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Storage,
}

/// Service error for repair use-cases.
#[derive(Debug)]
pub enum RepairServiceError {
    /// No repair with this id.
    RepairNotFound(RepairId),
    /// Phone number is already registered to another repair.
    DuplicatePhoneNumber(PhoneNumber),
    /// Update request leaves the record identical.
    NoChanges,
    /// Business fields failed validation.
    InvalidRequest(RepairValidationError),
    /// Record-store failure.
    Repo(RepoError),
}

impl RepairServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RepairNotFound(_) => ErrorKind::NotFound,
            Self::DuplicatePhoneNumber(_) => ErrorKind::Conflict,
            Self::NoChanges | Self::InvalidRequest(_) => ErrorKind::Invalid,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for RepairServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepairNotFound(id) => write!(f, "Repair with id [{id}] not found"),
            Self::DuplicatePhoneNumber(_) => write!(f, "Phone Number already in use"),
            Self::NoChanges => write!(f, "No data changes found"),
            Self::InvalidRequest(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepairServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRequest(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RepairServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::RepairNotFound(id),
            RepoError::DuplicatePhoneNumber(phone_number) => {
                Self::DuplicatePhoneNumber(phone_number)
            }
            RepoError::Validation(err) => Self::InvalidRequest(err),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, RepairServiceError>;

/// Repair service facade over a record store.
pub struct RepairService<R: RepairRepository> {
    repo: R,
}

impl<R: RepairRepository> RepairService<R> {
    /// Creates a service using the provided store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns every stored repair in store order.
    pub fn list_repairs(&self) -> ServiceResult<Vec<Repair>> {
        Ok(self.repo.list_repairs()?)
    }

    /// Gets one repair by id.
    ///
    /// # Errors
    /// - `RepairNotFound` when no repair has this id.
    pub fn get_repair(&self, id: RepairId) -> ServiceResult<Repair> {
        self.repo
            .get_repair(id)?
            .ok_or(RepairServiceError::RepairNotFound(id))
    }

    /// Registers a new repair. The store assigns the id.
    ///
    /// # Errors
    /// - `DuplicatePhoneNumber` when the phone number is already stored.
    /// - `InvalidRequest` when a field is blank or the phone number is not positive.
    pub fn add_repair(&self, request: RepairRegistrationRequest) -> ServiceResult<()> {
        if self
            .repo
            .exists_repair_with_phone_number(request.phone_number)?
        {
            return Err(RepairServiceError::DuplicatePhoneNumber(
                request.phone_number,
            ));
        }

        let repair = Repair::from(request);
        repair
            .validate()
            .map_err(RepairServiceError::InvalidRequest)?;
        self.repo.insert_repair(&repair)?;
        Ok(())
    }

    /// Deletes one repair by id.
    ///
    /// # Errors
    /// - `RepairNotFound` when no repair has this id.
    pub fn delete_repair(&self, id: RepairId) -> ServiceResult<()> {
        if !self.repo.exists_repair_with_id(id)? {
            return Err(RepairServiceError::RepairNotFound(id));
        }

        self.repo.delete_repair(id)?;
        Ok(())
    }

    /// Applies a per-field patch to an existing repair.
    ///
    /// Fields that are absent or equal to the stored value are ignored. The
    /// phone-number uniqueness check only runs when the number actually
    /// changes.
    ///
    /// # Errors
    /// - `RepairNotFound` when no repair has this id.
    /// - `DuplicatePhoneNumber` when the new number belongs to another repair.
    /// - `NoChanges` when the patch would leave the record identical.
    /// - `InvalidRequest` when the patched record fails validation.
    pub fn update_repair(&self, id: RepairId, request: RepairUpdateRequest) -> ServiceResult<()> {
        let current = self.get_repair(id)?;
        if request.is_empty() {
            return Err(RepairServiceError::NoChanges);
        }
        let merged = merge_update(&current, request);

        if merged.phone_number != current.phone_number
            && self
                .repo
                .exists_repair_with_phone_number(merged.phone_number)?
        {
            return Err(RepairServiceError::DuplicatePhoneNumber(
                merged.phone_number,
            ));
        }

        if merged == current {
            return Err(RepairServiceError::NoChanges);
        }
        merged
            .validate()
            .map_err(RepairServiceError::InvalidRequest)?;

        self.repo.update_repair(&merged)?;
        Ok(())
    }
}

/// Overlays present request fields onto `current`, keeping its id.
pub fn merge_update(current: &Repair, request: RepairUpdateRequest) -> Repair {
    Repair {
        id: current.id,
        name: request.name.unwrap_or_else(|| current.name.clone()),
        title: request.title.unwrap_or_else(|| current.title.clone()),
        brand: request.brand.unwrap_or_else(|| current.brand.clone()),
        issue: request.issue.unwrap_or_else(|| current.issue.clone()),
        phone_number: request.phone_number.unwrap_or(current.phone_number),
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_update, ErrorKind, RepairServiceError};
    use crate::model::repair::{Repair, RepairUpdateRequest};
    use crate::repo::repair_repo::RepoError;

    fn kamau() -> Repair {
        Repair::with_id(1, "Kamau", "Nikia 3300", "Nokia", "Charging port", 800_565_222)
    }

    #[test]
    fn merge_keeps_id_and_untouched_fields() {
        let merged = merge_update(
            &kamau(),
            RepairUpdateRequest {
                issue: Some("Power IC issue".to_string()),
                ..RepairUpdateRequest::default()
            },
        );

        assert_eq!(merged.id, Some(1));
        assert_eq!(merged.issue, "Power IC issue");
        assert_eq!(merged.name, "Kamau");
        assert_eq!(merged.phone_number, 800_565_222);
    }

    #[test]
    fn empty_patch_merges_to_identical_record() {
        assert_eq!(merge_update(&kamau(), RepairUpdateRequest::default()), kamau());
    }

    #[test]
    fn store_errors_map_to_service_kinds() {
        assert_eq!(
            RepairServiceError::from(RepoError::NotFound(9)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RepairServiceError::from(RepoError::DuplicatePhoneNumber(1)).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            RepairServiceError::from(RepoError::Poisoned).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn messages_carry_id_and_normalized_conflict_text() {
        assert_eq!(
            RepairServiceError::RepairNotFound(7).to_string(),
            "Repair with id [7] not found"
        );
        assert_eq!(
            RepairServiceError::DuplicatePhoneNumber(700_000_000).to_string(),
            "Phone Number already in use"
        );
    }
}
