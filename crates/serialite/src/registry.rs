// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide registry of wrapped resources.
//!
//! A resource may be owned by at most one live wrapper. Wrapping acquires a
//! [`RegistryToken`]; dropping the token releases the resource.

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use serialite_core::{ResourceId, SerialiteError};
use tracing::debug;

static WRAPPED: LazyLock<Mutex<HashSet<ResourceId>>> = LazyLock::new(Default::default);

fn wrapped() -> MutexGuard<'static, HashSet<ResourceId>> {
    WRAPPED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive claim on a resource identity.
#[derive(Debug)]
pub struct RegistryToken {
    resource: ResourceId,
}

impl RegistryToken {
    /// Claims `resource`, failing with `AlreadyWrapped` if it is held.
    pub fn acquire(resource: ResourceId) -> Result<Self, SerialiteError> {
        if !wrapped().insert(resource.clone()) {
            return Err(SerialiteError::AlreadyWrapped { resource });
        }
        debug!(resource = %resource, "resource registered");
        Ok(Self { resource })
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }
}

impl Drop for RegistryToken {
    fn drop(&mut self) {
        wrapped().remove(&self.resource);
        debug!(resource = %self.resource, "resource released");
    }
}

/// Whether `resource` is currently owned by a wrapper.
pub fn is_wrapped(resource: &ResourceId) -> bool {
    wrapped().contains(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let id = ResourceId::new("registry-test:second-acquire");
        let token = RegistryToken::acquire(id.clone()).unwrap();
        assert!(is_wrapped(&id));

        match RegistryToken::acquire(id.clone()) {
            Err(SerialiteError::AlreadyWrapped { resource }) => assert_eq!(resource, id),
            other => panic!("expected AlreadyWrapped, got {other:?}"),
        }

        drop(token);
        assert!(!is_wrapped(&id));
        let again = RegistryToken::acquire(id.clone()).unwrap();
        assert_eq!(again.resource(), &id);
    }

    #[test]
    fn distinct_resources_do_not_conflict() {
        let a = RegistryToken::acquire(ResourceId::new("registry-test:a")).unwrap();
        let b = RegistryToken::acquire(ResourceId::new("registry-test:b")).unwrap();
        assert_ne!(a.resource(), b.resource());
    }
}
