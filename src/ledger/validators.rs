//! Validator Registry
//!
//! Maps validator identities to an active flag. Entries are never deleted:
//! removing a validator flips its flag to inactive, and signatures it submitted
//! while active stay on record.

use std::collections::HashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::types::Principal;
use crate::validation::is_valid_account_identity;

/// Trusted validator identities and their active status.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    status: HashMap<Principal, bool>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `identity` active.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Identity is now active
    /// * `Err(BridgeError::InvalidValidatorAddress)` - Identity is malformed
    pub fn add(&mut self, identity: &Principal) -> BridgeResult<()> {
        Self::check_identity(identity)?;
        self.status.insert(identity.clone(), true);
        Ok(())
    }

    /// Marks `identity` inactive. Unknown identities are recorded as inactive.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Identity is now inactive
    /// * `Err(BridgeError::InvalidValidatorAddress)` - Identity is malformed
    pub fn remove(&mut self, identity: &Principal) -> BridgeResult<()> {
        Self::check_identity(identity)?;
        self.status.insert(identity.clone(), false);
        Ok(())
    }

    /// Unknown identities are inactive.
    pub fn is_active(&self, identity: &Principal) -> bool {
        self.status.get(identity).copied().unwrap_or(false)
    }

    /// Number of currently active validators.
    pub fn active_count(&self) -> usize {
        self.status.values().filter(|active| **active).count()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Principal, bool)> {
        self.status.iter().map(|(identity, active)| (identity, *active))
    }

    pub(crate) fn from_entries(entries: impl IntoIterator<Item = (Principal, bool)>) -> Self {
        Self {
            status: entries.into_iter().collect(),
        }
    }

    fn check_identity(identity: &Principal) -> BridgeResult<()> {
        if is_valid_account_identity(identity.as_str()) {
            Ok(())
        } else {
            Err(BridgeError::InvalidValidatorAddress)
        }
    }
}
