//! Repair domain model.
//!
//! # Responsibility
//! - Define the canonical repair-ticket record and its request shapes.
//! - Validate business fields before they reach persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - A persisted repair has all five business fields populated.
//! - `phone_number` is the uniqueness key across all persisted repairs.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned repair identifier.
pub type RepairId = i64;

/// Customer contact number, also used as the repair uniqueness key.
pub type PhoneNumber = i64;

/// Validation failures for repair business fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairValidationError {
    /// A required text field is empty or whitespace-only.
    BlankField(&'static str),
    /// Phone number must be a positive integer.
    InvalidPhoneNumber(PhoneNumber),
}

impl Display for RepairValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidPhoneNumber(value) => {
                write!(f, "phoneNumber must be positive, got {value}")
            }
        }
    }
}

impl Error for RepairValidationError {}

/// One repair ticket for a customer device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    /// `None` until the store assigns an id on insert.
    pub id: Option<RepairId>,
    /// Customer name.
    pub name: String,
    /// Device model, e.g. `Nokia 3310`.
    pub title: String,
    pub brand: String,
    /// Free-text fault description.
    pub issue: String,
    pub phone_number: PhoneNumber,
}

impl Repair {
    /// Creates a not-yet-persisted repair (no id).
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        brand: impl Into<String>,
        issue: impl Into<String>,
        phone_number: PhoneNumber,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            title: title.into(),
            brand: brand.into(),
            issue: issue.into(),
            phone_number,
        }
    }

    /// Creates a repair carrying an already-assigned id.
    ///
    /// Used by stores when materializing rows and by seed data.
    pub fn with_id(
        id: RepairId,
        name: impl Into<String>,
        title: impl Into<String>,
        brand: impl Into<String>,
        issue: impl Into<String>,
        phone_number: PhoneNumber,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name, title, brand, issue, phone_number)
        }
    }

    /// Checks business-field invariants.
    ///
    /// # Errors
    /// - `BlankField` for an empty/whitespace `name`, `title`, `brand` or `issue`.
    /// - `InvalidPhoneNumber` when `phone_number <= 0`.
    pub fn validate(&self) -> Result<(), RepairValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("title", &self.title),
            ("brand", &self.brand),
            ("issue", &self.issue),
        ] {
            if value.trim().is_empty() {
                return Err(RepairValidationError::BlankField(field));
            }
        }

        if self.phone_number <= 0 {
            return Err(RepairValidationError::InvalidPhoneNumber(self.phone_number));
        }

        Ok(())
    }
}

/// Caller-supplied data for registering a new repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRegistrationRequest {
    pub name: String,
    pub title: String,
    pub brand: String,
    pub issue: String,
    pub phone_number: PhoneNumber,
}

impl From<RepairRegistrationRequest> for Repair {
    fn from(value: RepairRegistrationRequest) -> Self {
        Repair::new(
            value.name,
            value.title,
            value.brand,
            value.issue,
            value.phone_number,
        )
    }
}

/// Per-field patch for an existing repair.
///
/// `None` means "leave unchanged"; there is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepairUpdateRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub phone_number: Option<PhoneNumber>,
    pub issue: Option<String>,
}

impl RepairUpdateRequest {
    /// Returns whether no field is present at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.title.is_none()
            && self.brand.is_none()
            && self.phone_number.is_none()
            && self.issue.is_none()
    }
}
