// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fatal mount errors.
//!
//! Every variant signals a broken invariant in the caller or in a backend
//! integration. The mount pass that raised it is aborted; the state is not
//! guaranteed to be usable afterwards except for [`unmount_all`].
//!
//! [`unmount_all`]: crate::mount::MountState::unmount_all

use thiserror::Error;

use crate::component::ContentKind;
use crate::id::{OutputId, TransitionKey};
use crate::layout::LayoutError;

/// An invariant violation detected while mounting.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MountError {
    /// The layout handed to the engine is malformed.
    #[error(transparent)]
    InvalidLayout(#[from] LayoutError),

    /// An output's host is neither mounted nor mountable.
    #[error("output {id:?} needs host {host:?}, which is not mounted")]
    HostNotMounted {
        /// The output being mounted.
        id: OutputId,
        /// Its missing host.
        host: OutputId,
    },

    /// Recursively unmounting a host left children behind.
    ///
    /// Guards registry consistency; valid layouts never reach it.
    #[error("unmounting host {0:?} left some of its children mounted")]
    HostNotEmpty(OutputId),

    /// The same transition key was detached as disappearing twice.
    ///
    /// Guards the disappearing bookkeeping; returning keys end their exit
    /// animation before the diff runs.
    #[error("transition key {0} is already disappearing")]
    DuplicateDisappearingKey(TransitionKey),

    /// An animation lock counter would drop below zero.
    #[error("animation lock at position {0} decremented below zero")]
    LockUnderflow(usize),

    /// No key is animating but a lock counter is still non-zero.
    ///
    /// Only checked when [`MountConfig::check_lock_balance`] is set.
    ///
    /// [`MountConfig::check_lock_balance`]: crate::config::MountConfig::check_lock_balance
    #[error("no animations are running but position {0} is still locked")]
    LockLeak(usize),

    /// A completion arrived for a key that was never recorded as animating.
    #[error("animation for key {0} completed but it was not recorded as animating")]
    UnknownAnimation(TransitionKey),

    /// The backend produced content of a different kind than the component
    /// declares.
    #[error("content for output {id:?} is {actual:?}, expected {expected:?}")]
    UnsupportedContent {
        /// The output being mounted.
        id: OutputId,
        /// Kind declared by the component.
        expected: ContentKind,
        /// Kind reported by the backend.
        actual: ContentKind,
    },

    /// The registry's positions no longer line up with the layout.
    ///
    /// Guards the alignment established by the diff at the start of a pass.
    #[error("position {index} holds {found:?} but the layout expects {expected:?}")]
    StaleLayout {
        /// Position in the layout.
        index: usize,
        /// Id the layout has at that position.
        expected: OutputId,
        /// Id the registry has at that position.
        found: Option<OutputId>,
    },

    /// Test introspection was requested but is disabled in the configuration.
    #[error("test introspection is disabled")]
    TestItemsDisabled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            MountError::DuplicateDisappearingKey(TransitionKey::new("x")).to_string(),
            "transition key x is already disappearing"
        );
        assert_eq!(
            MountError::HostNotEmpty(OutputId(4)).to_string(),
            "unmounting host OutputId(4) left some of its children mounted"
        );
    }

    #[test]
    fn layout_errors_convert() {
        let err: MountError = LayoutError::DuplicateId(OutputId(2)).into();
        assert_eq!(err.to_string(), "output id OutputId(2) appears more than once");
    }
}
