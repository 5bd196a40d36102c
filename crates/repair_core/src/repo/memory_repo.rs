//! In-memory repair store.
//!
//! An explicitly constructed store instance, injected into `RepairService`
//! like any other repository. Useful for development, demos and tests.
//!
//! # Invariants
//! - Ids are assigned from a monotonic counter and never reused.
//! - List order is insertion order.
//! - Each call holds the lock for its whole read or write.

use crate::model::repair::{PhoneNumber, Repair, RepairId};
use crate::repo::repair_repo::{RepairRepository, RepoError, RepoResult};
use log::info;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    repairs: Vec<Repair>,
    last_id: RepairId,
}

impl MemoryState {
    fn next_id(&self) -> RepoResult<RepairId> {
        self.last_id
            .checked_add(1)
            .ok_or(RepoError::IdSpaceExhausted)
    }
}

/// `RwLock`-guarded repair collection.
#[derive(Debug, Default)]
pub struct InMemoryRepairRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepairRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given records.
    ///
    /// Records without an id get one assigned; the id counter continues after
    /// the highest id seen.
    ///
    /// # Errors
    /// - `Validation` for a record with blank fields.
    /// - `DuplicatePhoneNumber` when two records share a phone number.
    /// - `DuplicateId` when an id is given twice, explicitly or by assignment.
    /// - `IdSpaceExhausted` when no id is left after the highest one seen.
    pub fn with_repairs(repairs: impl IntoIterator<Item = Repair>) -> RepoResult<Self> {
        let mut state = MemoryState::default();
        for mut repair in repairs {
            repair.validate()?;
            if state
                .repairs
                .iter()
                .any(|existing| existing.phone_number == repair.phone_number)
            {
                return Err(RepoError::DuplicatePhoneNumber(repair.phone_number));
            }
            let id = match repair.id {
                Some(id) => id,
                None => state.next_id()?,
            };
            if state.repairs.iter().any(|existing| existing.id == Some(id)) {
                return Err(RepoError::DuplicateId(id));
            }
            repair.id = Some(id);
            state.last_id = state.last_id.max(id);
            state.repairs.push(repair);
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Creates a store seeded with two sample tickets.
    pub fn with_sample_data() -> Self {
        let state = MemoryState {
            repairs: sample_repairs(),
            last_id: 2,
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.read()?.repairs.is_empty())
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| RepoError::Poisoned)
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| RepoError::Poisoned)
    }
}

impl RepairRepository for InMemoryRepairRepository {
    fn list_repairs(&self) -> RepoResult<Vec<Repair>> {
        Ok(self.read()?.repairs.clone())
    }

    fn get_repair(&self, id: RepairId) -> RepoResult<Option<Repair>> {
        Ok(self
            .read()?
            .repairs
            .iter()
            .find(|repair| repair.id == Some(id))
            .cloned())
    }

    fn exists_repair_with_id(&self, id: RepairId) -> RepoResult<bool> {
        Ok(self
            .read()?
            .repairs
            .iter()
            .any(|repair| repair.id == Some(id)))
    }

    fn exists_repair_with_phone_number(&self, phone_number: PhoneNumber) -> RepoResult<bool> {
        Ok(self
            .read()?
            .repairs
            .iter()
            .any(|repair| repair.phone_number == phone_number))
    }

    fn insert_repair(&self, repair: &Repair) -> RepoResult<RepairId> {
        if let Some(id) = repair.id {
            return Err(RepoError::AlreadyPersisted(id));
        }
        repair.validate()?;

        let mut state = self.write()?;
        if state
            .repairs
            .iter()
            .any(|existing| existing.phone_number == repair.phone_number)
        {
            return Err(RepoError::DuplicatePhoneNumber(repair.phone_number));
        }

        let id = state.next_id()?;
        state.last_id = id;
        state.repairs.push(Repair {
            id: Some(id),
            ..repair.clone()
        });

        info!("event=repair_insert module=repo store=memory status=ok id={id}");
        Ok(id)
    }

    fn update_repair(&self, repair: &Repair) -> RepoResult<()> {
        let id = repair.id.ok_or(RepoError::MissingId)?;
        repair.validate()?;

        let mut state = self.write()?;
        if state.repairs.iter().any(|existing| {
            existing.id != Some(id) && existing.phone_number == repair.phone_number
        }) {
            return Err(RepoError::DuplicatePhoneNumber(repair.phone_number));
        }

        let slot = state
            .repairs
            .iter_mut()
            .find(|existing| existing.id == Some(id))
            .ok_or(RepoError::NotFound(id))?;
        *slot = repair.clone();

        info!("event=repair_update module=repo store=memory status=ok id={id}");
        Ok(())
    }

    fn delete_repair(&self, id: RepairId) -> RepoResult<()> {
        let mut state = self.write()?;
        let index = state
            .repairs
            .iter()
            .position(|repair| repair.id == Some(id))
            .ok_or(RepoError::NotFound(id))?;
        state.repairs.remove(index);

        info!("event=repair_delete module=repo store=memory status=ok id={id}");
        Ok(())
    }
}

fn sample_repairs() -> Vec<Repair> {
    vec![
        Repair::with_id(
            1,
            "Mucomba",
            "Nokia 3310",
            "Nokia",
            "The phone is not charging",
            722_000_000,
        ),
        Repair::with_id(
            2,
            "Ruger",
            "Lenovo 500",
            "Lenovo",
            "The Screen is broken",
            722_111_111,
        ),
    ]
}
