// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output, tree, and transition identity types.

use alloc::rc::Rc;
use core::fmt;

/// Stable identity of a render output.
///
/// Ids are produced by layout and stay stable across relayouts as long as the
/// content they describe is identity-equivalent. Id `0` is reserved for the
/// synthetic root container, see [`OutputId::ROOT`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u64);

impl OutputId {
    /// The externally owned root container. Always mounted, never unmounted.
    pub const ROOT: Self = Self(0);

    /// Returns whether this is the root id.
    #[inline]
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("OutputId(root)")
        } else {
            write!(f, "OutputId({})", self.0)
        }
    }
}

/// Identity of the component tree a layout was produced from.
///
/// Mounting a layout from a different tree than the previous pass discards
/// all in-flight transition state.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub u32);

impl TreeId {
    /// Sentinel for layouts that do not belong to an identified tree.
    ///
    /// The updated-state fast path is never taken for such layouts.
    pub const INVALID: Self = Self(u32::MAX);

    /// Returns whether this id identifies a real tree.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TreeId({})", self.0)
        } else {
            f.write_str("TreeId(invalid)")
        }
    }
}

/// String identity used to correlate an item across layout passes for
/// animation, independent of its numeric [`OutputId`].
///
/// Cloning is cheap (reference counted).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionKey(Rc<str>);

impl TransitionKey {
    /// Creates a key from a string.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(Rc::from(key))
    }

    /// Returns the key as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransitionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Debug for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionKey({:?})", &*self.0)
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn root_id_is_zero() {
        assert!(OutputId::ROOT.is_root());
        assert!(!OutputId(3).is_root());
        assert_eq!(format!("{:?}", OutputId::ROOT), "OutputId(root)");
        assert_eq!(format!("{:?}", OutputId(7)), "OutputId(7)");
    }

    #[test]
    fn tree_id_defaults_to_invalid() {
        assert_eq!(TreeId::default(), TreeId::INVALID);
        assert!(!TreeId::default().is_valid());
        assert!(TreeId(0).is_valid());
    }

    #[test]
    fn transition_keys_compare_by_content() {
        let a = TransitionKey::new("header");
        let b = TransitionKey::from("header");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "header");
        assert_eq!(format!("{a}"), "header");
        assert_eq!(format!("{a:?}"), "TransitionKey(\"header\")");
    }
}
