// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pass mount counters.

/// Counters for one mount pass (or one completion drain).
///
/// Returned by value from every pass rather than accumulated in shared state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountStats {
    /// Items mounted.
    pub mounted: u32,
    /// Items unmounted.
    pub unmounted: u32,
    /// Items whose content was refreshed by the update check.
    pub updated: u32,
    /// Items the update check left untouched (bounds still reapplied).
    pub skipped_updates: u32,
    /// Items detached from diffing to play an exit animation.
    pub disappearing: u32,
    /// Disappearing items whose teardown finished.
    pub torn_down: u32,
}

impl MountStats {
    /// Returns whether the pass mounted or unmounted anything.
    #[must_use]
    pub fn changed_tree(&self) -> bool {
        self.mounted > 0 || self.unmounted > 0 || self.disappearing > 0 || self.torn_down > 0
    }

    /// Adds `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.mounted += other.mounted;
        self.unmounted += other.unmounted;
        self.updated += other.updated;
        self.skipped_updates += other.skipped_updates;
        self.disappearing += other.disappearing;
        self.torn_down += other.torn_down;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_sums_fields() {
        let mut total = MountStats {
            mounted: 2,
            ..MountStats::default()
        };
        total.accumulate(&MountStats {
            mounted: 1,
            torn_down: 3,
            ..MountStats::default()
        });
        assert_eq!(total.mounted, 3);
        assert_eq!(total.torn_down, 3);
        assert!(total.changed_tree());
        assert!(!MountStats::default().changed_tree());
    }
}
