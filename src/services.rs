//! Collaborator interfaces consumed by the fold policy and the multi-screen managers.
//!
//! The screen-session registry, the window-scene client, the rendering
//! service and the power manager all live outside this crate. Each is
//! modelled as a trait so hosts can plug in real services and tests can use
//! the recording fakes in [`crate::mock`].

use crate::scheduler::TaskScheduler;
use crate::session::{RenderContext, ScreenSession};
use crate::types::{
    DeviceStatus, DisplayChangeEvent, DisplayInfo, FoldDisplayMode, RefreshRateEvent,
    ScreenChangeEvent, ScreenCombination, ScreenEvent, ScreenId, ScreenPowerStatus,
    ScreenProperty, SessionOption, WakeupReason,
};

use std::sync::Arc;

// =============================================================================
// Screen Session Registry
// =============================================================================

/// Registry of screen sessions and the display-manager service around it.
pub trait ScreenRegistry: Send + Sync {
    /// Look up a logical screen session.
    fn get_screen_session(&self, id: ScreenId) -> Option<Arc<ScreenSession>>;

    /// Look up the session describing a physical panel by rendering id.
    fn get_physical_screen_session(&self, rs_id: ScreenId) -> Option<Arc<ScreenSession>>;

    /// Physical property of a fold panel.
    fn get_phy_screen_property(&self, id: ScreenId) -> ScreenProperty;

    /// The window-scene client, if connected.
    fn client_proxy(&self) -> Option<Arc<dyn ClientProxy>>;

    /// Power a fold panel on or off.
    fn set_screen_power_for_fold(&self, id: ScreenId, status: ScreenPowerStatus);

    /// Set a panel's power state directly in the rendering service.
    fn set_rs_screen_power_status(&self, id: ScreenId, status: ScreenPowerStatus);

    /// Synchronously set a panel's power state by rendering id.
    fn call_rs_set_screen_power_status_sync(&self, rs_id: ScreenId, status: ScreenPowerStatus);

    /// Reset or set the keyguard-drawn flag before a power change.
    fn set_keyguard_drawn_done_flag(&self, done: bool);

    /// Publish a new display mode.
    fn notify_display_mode_changed(&self, mode: FoldDisplayMode);

    /// Request a follow-up change to the last requested mode.
    fn trigger_display_mode_update(&self, mode: FoldDisplayMode);

    /// Whether coordination mode is active.
    fn coordination_flag(&self) -> bool;

    /// Set the coordination flag.
    fn set_coordination_flag(&self, active: bool);

    /// Connect or disconnect a screen.
    fn on_screen_change(&self, id: ScreenId, event: ScreenEvent);

    /// Whether a pending suspend has been cancelled.
    fn cancel_suspend_status(&self) -> bool;

    /// Try to cancel an in-progress screen-off. Returns true on success.
    fn try_to_cancel_screen_off(&self) -> bool;

    /// Skip the screen-off animation for the next power-off.
    fn force_skip_screen_off_animation(&self);

    /// Whether tent mode is active.
    fn tent_mode(&self) -> bool;

    /// Whether the system is asleep.
    fn is_system_sleep(&self) -> bool;

    /// Whether a laptop lid is open (always true on devices without one).
    fn is_laptop_lid_open(&self) -> bool;

    /// Publish the device posture status.
    fn set_device_status(&self, status: DeviceStatus);

    /// Move a screen in the combined coordinate space.
    fn set_screen_offset(&self, id: ScreenId, x: f32, y: f32);

    /// Publish a screen density.
    fn set_virtual_pixel_ratio(&self, id: ScreenId, ratio: f32);

    /// Swap the logical/rendering id mapping of two sessions.
    fn update_screen_id_manager(&self, inner: &ScreenSession, external: &ScreenSession);

    /// Notify display listeners.
    fn notify_display_changed(&self, info: DisplayInfo, event: DisplayChangeEvent);

    /// Notify screen listeners.
    fn notify_screen_changed(&self, info: DisplayInfo, event: ScreenChangeEvent);

    /// Publish a newly available display.
    fn notify_display_create(&self, info: DisplayInfo);

    /// Withdraw a display.
    fn notify_display_destroy(&self, id: ScreenId);

    /// Record the name of the running multi-screen change for diagnostics.
    fn set_multi_screen_mode_change_tracker(&self, change: &str);
}

// =============================================================================
// Window-Scene Client
// =============================================================================

/// Cross-process window-scene client.
pub trait ClientProxy: Send + Sync {
    /// Swap the extend display nodes of two screens.
    fn on_extend_display_node_change(&self, main_id: ScreenId, extend_id: ScreenId) -> bool;

    /// Swap the main display node onto a new screen.
    fn on_main_display_node_change(
        &self,
        main_id: ScreenId,
        extend_id: ScreenId,
        extend_rs_id: ScreenId,
    ) -> bool;

    /// Create a client-side session without a full connection.
    fn on_create_screen_session_only(
        &self,
        id: ScreenId,
        rs_id: ScreenId,
        name: &str,
        is_extend: bool,
    ) -> bool;

    /// Inform the client of a new combination pairing.
    fn set_screen_combination(
        &self,
        main_id: ScreenId,
        extend_id: ScreenId,
        combination: ScreenCombination,
    );

    /// Connect or disconnect a screen on the client side.
    fn on_screen_connection_changed(&self, option: SessionOption, event: ScreenEvent);
}

// =============================================================================
// Rendering Service
// =============================================================================

/// Batching adapter for render-tree mutations.
pub trait RenderCommitAdapter: Send + Sync {
    /// Commit pending mutations for all `contexts` in one round trip.
    fn flush_implicit_transaction(&self, contexts: &[RenderContext]);

    /// Tell the renderer a fold screen switch is starting.
    fn notify_screen_switched(&self);

    /// Vote for a refresh-rate range.
    fn notify_refresh_rate_event(&self, event: RefreshRateEvent);
}

// =============================================================================
// Power Manager
// =============================================================================

/// Power-manager client.
pub trait PowerClient: Send + Sync {
    /// Whether the fold screen is currently powered.
    fn is_fold_screen_on(&self) -> bool;

    /// Whether the display is reported on.
    fn is_screen_on(&self) -> bool;

    /// Wake the device.
    fn wakeup_device(&self, reason: WakeupReason);

    /// Reset the inactivity timer.
    fn refresh_activity(&self);
}

/// Handles to every collaborator, shared by the policy and the managers.
#[derive(Clone)]
pub struct DisplayServices {
    /// Screen session registry.
    pub registry: Arc<dyn ScreenRegistry>,
    /// Render commit adapter.
    pub render: Arc<dyn RenderCommitAdapter>,
    /// Power manager.
    pub power: Arc<dyn PowerClient>,
    /// Serial queue for fold screen power operations.
    pub screen_power_scheduler: Arc<TaskScheduler>,
    /// Serial queue for multi-screen power operations.
    pub power_scheduler: Arc<TaskScheduler>,
}
