//! Fold policy state snapshot.

use crate::types::{FoldDisplayMode, FoldStatus, ScreenId};

/// A snapshot of the fold policy's current state.
///
/// Use [`FoldScreenPolicy::get_state`](crate::FoldScreenPolicy::get_state) to obtain one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FoldPolicyState {
    /// Mode the state machine last finished dispatching.
    pub current_display_mode: FoldDisplayMode,
    /// Last mode accepted by the guard.
    pub last_display_mode: FoldDisplayMode,
    /// Most recent mode requested, accepted or not.
    pub last_cached_display_mode: FoldDisplayMode,
    /// Fold status the mode is matched against.
    pub current_fold_status: FoldStatus,
    /// Fold status last reported to callers.
    pub last_fold_status: FoldStatus,
    /// Panel currently switched to (0 = full, 5 = main).
    pub screen_id: ScreenId,
    /// Whether a transition is running inside its deadline.
    pub mode_change_running: bool,
    /// Whether sensor changes are locked out.
    pub lock_display_status: bool,
    /// Whether boot animation is running.
    pub on_boot_animation: bool,
    /// Whether boot animation is being cleared.
    pub is_clearing_boot_animation: bool,
    /// Whether the first frame after the last transition was reported.
    pub first_frame_commit_reported: bool,
    /// Duration of the last finished transition.
    pub folding_elapsed_ms: u64,
}
