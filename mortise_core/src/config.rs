// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount engine configuration.

/// Tunables for a [`MountState`](crate::mount::MountState).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountConfig {
    /// Maintain the test-key introspection map after every pass.
    pub test_introspection: bool,
    /// Verify that every animation lock counter is zero once no key is
    /// animating.
    pub check_lock_balance: bool,
    /// Maximum recycled handles kept per content shape. Zero disables
    /// recycling.
    pub pool_capacity: usize,
    /// Whether host containers are recycled along with leaf content.
    pub recycle_hosts: bool,
}

impl MountConfig {
    /// Configuration for production use.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            test_introspection: false,
            check_lock_balance: cfg!(debug_assertions),
            pool_capacity: 8,
            recycle_hosts: false,
        }
    }

    /// Configuration for end-to-end tests: introspection and lock checks on.
    #[must_use]
    pub const fn testing() -> Self {
        Self {
            test_introspection: true,
            check_lock_balance: true,
            pool_capacity: 8,
            recycle_hosts: false,
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_enables_checks() {
        let config = MountConfig::testing();
        assert!(config.test_introspection);
        assert!(config.check_lock_balance);
        assert!(!MountConfig::default().test_introspection);
    }
}
