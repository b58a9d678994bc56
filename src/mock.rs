//! Recording fakes of every collaborator, for testing.
//!
//! Each mock records what the state machines asked of it so tests can assert
//! on order and content. [`MockServices`] wires a full set together with
//! manual task schedulers.
//!
//! # Example
//!
//! ```
//! use foldscreen_core::{
//!     DisplayModeChangeReason, FoldDisplayMode, FoldScreenConfig, FoldScreenPolicy, MockServices,
//! };
//!
//! let mocks = MockServices::fold_device();
//! let policy = FoldScreenPolicy::new(mocks.services(), FoldScreenConfig::default());
//! policy.change_screen_display_mode(FoldDisplayMode::Main, false, DisplayModeChangeReason::Default);
//! mocks.screen_power_scheduler.run_pending();
//! assert_eq!(policy.current_display_mode(), FoldDisplayMode::Main);
//! ```

use crate::scheduler::TaskScheduler;
use crate::services::{ClientProxy, DisplayServices, PowerClient, RenderCommitAdapter, ScreenRegistry};
use crate::session::{DisplayNodeConfig, RenderContext, ScreenSession, ScreenSessionSpec};
use crate::types::{
    Bounds, DeviceStatus, DisplayChangeEvent, DisplayInfo, FoldDisplayMode, RefreshRateEvent,
    ScreenChangeEvent, ScreenCombination, ScreenEvent, ScreenId, ScreenPowerStatus, ScreenProperty,
    SessionOption, WakeupReason, SCREEN_ID_FULL, SCREEN_ID_MAIN,
};

use parking_lot::{Mutex, ReentrantMutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// Registry
// =============================================================================

/// A call recorded by [`MockScreenRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// `set_screen_power_for_fold`.
    ScreenPowerForFold(ScreenId, ScreenPowerStatus),
    /// `set_rs_screen_power_status`.
    RsScreenPower(ScreenId, ScreenPowerStatus),
    /// `call_rs_set_screen_power_status_sync`.
    RsScreenPowerSync(ScreenId, ScreenPowerStatus),
    /// `set_keyguard_drawn_done_flag`.
    KeyguardDrawnDone(bool),
    /// `notify_display_mode_changed`.
    DisplayModeChanged(FoldDisplayMode),
    /// `trigger_display_mode_update`.
    TriggerDisplayModeUpdate(FoldDisplayMode),
    /// `set_coordination_flag`.
    CoordinationFlag(bool),
    /// `on_screen_change`.
    ScreenChange(ScreenId, ScreenEvent),
    /// `force_skip_screen_off_animation`.
    ForceSkipScreenOffAnimation,
    /// `set_device_status`.
    DeviceStatus(DeviceStatus),
    /// `set_screen_offset`.
    ScreenOffset(ScreenId, f32, f32),
    /// `set_virtual_pixel_ratio`.
    VirtualPixelRatio(ScreenId, f32),
    /// `update_screen_id_manager` with (inner, external) logical ids.
    ScreenIdManagerUpdate(ScreenId, ScreenId),
    /// `notify_display_changed`.
    DisplayChanged(ScreenId, DisplayChangeEvent),
    /// `notify_screen_changed`.
    ScreenChanged(ScreenId, ScreenChangeEvent),
    /// `notify_display_create`.
    DisplayCreate(ScreenId),
    /// `notify_display_destroy`.
    DisplayDestroy(ScreenId),
    /// `set_multi_screen_mode_change_tracker`.
    ModeChangeTracker(String),
}

/// In-memory screen registry.
pub struct MockScreenRegistry {
    sessions: Mutex<HashMap<ScreenId, Arc<ScreenSession>>>,
    physical: Mutex<HashMap<ScreenId, Arc<ScreenSession>>>,
    phy_properties: Mutex<HashMap<ScreenId, ScreenProperty>>,
    client: Mutex<Option<Arc<dyn ClientProxy>>>,
    coordination: AtomicBool,
    tent_mode: AtomicBool,
    cancel_suspend: AtomicBool,
    try_cancel_screen_off: AtomicBool,
    system_sleep: AtomicBool,
    laptop_lid_open: AtomicBool,
    display_info_lock: Mutex<Option<Arc<ReentrantMutex<()>>>>,
    events: Mutex<Vec<RegistryEvent>>,
}

impl MockScreenRegistry {
    /// Create an empty registry with no client proxy.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            physical: Mutex::new(HashMap::new()),
            phy_properties: Mutex::new(HashMap::new()),
            client: Mutex::new(None),
            coordination: AtomicBool::new(false),
            tent_mode: AtomicBool::new(false),
            cancel_suspend: AtomicBool::new(false),
            try_cancel_screen_off: AtomicBool::new(false),
            system_sleep: AtomicBool::new(false),
            laptop_lid_open: AtomicBool::new(true),
            display_info_lock: Mutex::new(None),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Register a logical session.
    pub fn add_session(&self, session: Arc<ScreenSession>) {
        self.sessions.lock().insert(session.screen_id(), session);
    }

    /// Register the session describing a physical panel, keyed by rendering id.
    pub fn add_physical_session(&self, session: Arc<ScreenSession>) {
        self.physical.lock().insert(session.rs_id(), session);
    }

    /// Set the physical property returned for a fold panel.
    pub fn set_phy_screen_property(&self, id: ScreenId, property: ScreenProperty) {
        self.phy_properties.lock().insert(id, property);
    }

    /// Connect or disconnect the client proxy.
    pub fn set_client_proxy(&self, client: Option<Arc<dyn ClientProxy>>) {
        *self.client.lock() = client;
    }

    /// Share a display-info lock that display-change notifications take, the
    /// way a display service guards its display info.
    pub fn set_display_info_lock(&self, lock: Option<Arc<ReentrantMutex<()>>>) {
        *self.display_info_lock.lock() = lock;
    }

    /// Set tent mode.
    pub fn set_tent_mode(&self, on: bool) {
        self.tent_mode.store(on, Ordering::SeqCst);
    }

    /// Set whether a suspend was cancelled.
    pub fn set_cancel_suspend(&self, on: bool) {
        self.cancel_suspend.store(on, Ordering::SeqCst);
    }

    /// Set the result of `try_to_cancel_screen_off`.
    pub fn set_try_cancel_screen_off(&self, on: bool) {
        self.try_cancel_screen_off.store(on, Ordering::SeqCst);
    }

    /// Set whether the system is asleep.
    pub fn set_system_sleep(&self, on: bool) {
        self.system_sleep.store(on, Ordering::SeqCst);
    }

    /// Set whether the laptop lid is open.
    pub fn set_laptop_lid_open(&self, open: bool) {
        self.laptop_lid_open.store(open, Ordering::SeqCst);
    }

    /// Recorded calls, oldest first.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().clone()
    }

    /// Forget recorded calls.
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Recorded fold power changes.
    pub fn fold_power_events(&self) -> Vec<(ScreenId, ScreenPowerStatus)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RegistryEvent::ScreenPowerForFold(id, status) => Some((*id, *status)),
                _ => None,
            })
            .collect()
    }

    /// Recorded synchronous rendering-service power changes.
    pub fn rs_power_sync_events(&self) -> Vec<(ScreenId, ScreenPowerStatus)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                RegistryEvent::RsScreenPowerSync(id, status) => Some((*id, *status)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: RegistryEvent) {
        self.events.lock().push(event);
    }
}

impl Default for MockScreenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRegistry for MockScreenRegistry {
    fn get_screen_session(&self, id: ScreenId) -> Option<Arc<ScreenSession>> {
        self.sessions.lock().get(&id).cloned()
    }

    fn get_physical_screen_session(&self, rs_id: ScreenId) -> Option<Arc<ScreenSession>> {
        self.physical.lock().get(&rs_id).cloned()
    }

    fn get_phy_screen_property(&self, id: ScreenId) -> ScreenProperty {
        self.phy_properties.lock().get(&id).cloned().unwrap_or_default()
    }

    fn client_proxy(&self) -> Option<Arc<dyn ClientProxy>> {
        self.client.lock().clone()
    }

    fn set_screen_power_for_fold(&self, id: ScreenId, status: ScreenPowerStatus) {
        self.record(RegistryEvent::ScreenPowerForFold(id, status));
    }

    fn set_rs_screen_power_status(&self, id: ScreenId, status: ScreenPowerStatus) {
        self.record(RegistryEvent::RsScreenPower(id, status));
    }

    fn call_rs_set_screen_power_status_sync(&self, rs_id: ScreenId, status: ScreenPowerStatus) {
        self.record(RegistryEvent::RsScreenPowerSync(rs_id, status));
    }

    fn set_keyguard_drawn_done_flag(&self, done: bool) {
        self.record(RegistryEvent::KeyguardDrawnDone(done));
    }

    fn notify_display_mode_changed(&self, mode: FoldDisplayMode) {
        self.record(RegistryEvent::DisplayModeChanged(mode));
    }

    fn trigger_display_mode_update(&self, mode: FoldDisplayMode) {
        self.record(RegistryEvent::TriggerDisplayModeUpdate(mode));
    }

    fn coordination_flag(&self) -> bool {
        self.coordination.load(Ordering::SeqCst)
    }

    fn set_coordination_flag(&self, active: bool) {
        self.coordination.store(active, Ordering::SeqCst);
        self.record(RegistryEvent::CoordinationFlag(active));
    }

    fn on_screen_change(&self, id: ScreenId, event: ScreenEvent) {
        self.record(RegistryEvent::ScreenChange(id, event));
    }

    fn cancel_suspend_status(&self) -> bool {
        self.cancel_suspend.load(Ordering::SeqCst)
    }

    fn try_to_cancel_screen_off(&self) -> bool {
        self.try_cancel_screen_off.load(Ordering::SeqCst)
    }

    fn force_skip_screen_off_animation(&self) {
        self.record(RegistryEvent::ForceSkipScreenOffAnimation);
    }

    fn tent_mode(&self) -> bool {
        self.tent_mode.load(Ordering::SeqCst)
    }

    fn is_system_sleep(&self) -> bool {
        self.system_sleep.load(Ordering::SeqCst)
    }

    fn is_laptop_lid_open(&self) -> bool {
        self.laptop_lid_open.load(Ordering::SeqCst)
    }

    fn set_device_status(&self, status: DeviceStatus) {
        self.record(RegistryEvent::DeviceStatus(status));
    }

    fn set_screen_offset(&self, id: ScreenId, x: f32, y: f32) {
        self.record(RegistryEvent::ScreenOffset(id, x, y));
    }

    fn set_virtual_pixel_ratio(&self, id: ScreenId, ratio: f32) {
        self.record(RegistryEvent::VirtualPixelRatio(id, ratio));
    }

    fn update_screen_id_manager(&self, inner: &ScreenSession, external: &ScreenSession) {
        self.record(RegistryEvent::ScreenIdManagerUpdate(
            inner.screen_id(),
            external.screen_id(),
        ));
    }

    fn notify_display_changed(&self, info: DisplayInfo, event: DisplayChangeEvent) {
        let lock = self.display_info_lock.lock().clone();
        let _info = lock.as_ref().map(|lock| lock.lock());
        self.record(RegistryEvent::DisplayChanged(info.screen_id, event));
    }

    fn notify_screen_changed(&self, info: DisplayInfo, event: ScreenChangeEvent) {
        self.record(RegistryEvent::ScreenChanged(info.screen_id, event));
    }

    fn notify_display_create(&self, info: DisplayInfo) {
        self.record(RegistryEvent::DisplayCreate(info.screen_id));
    }

    fn notify_display_destroy(&self, id: ScreenId) {
        self.record(RegistryEvent::DisplayDestroy(id));
    }

    fn set_multi_screen_mode_change_tracker(&self, change: &str) {
        self.record(RegistryEvent::ModeChangeTracker(change.to_string()));
    }
}

// =============================================================================
// Client proxy
// =============================================================================

/// A call recorded by [`MockClientProxy`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    /// `on_extend_display_node_change`.
    ExtendDisplayNodeChange {
        /// Main screen.
        main_id: ScreenId,
        /// Extend screen.
        extend_id: ScreenId,
    },
    /// `on_main_display_node_change`.
    MainDisplayNodeChange {
        /// Main screen.
        main_id: ScreenId,
        /// Extend screen.
        extend_id: ScreenId,
        /// Rendering id of the extend screen.
        extend_rs_id: ScreenId,
    },
    /// `on_create_screen_session_only`.
    CreateScreenSessionOnly {
        /// Screen id.
        id: ScreenId,
        /// Rendering id.
        rs_id: ScreenId,
        /// Name.
        name: String,
        /// Whether the session extends the main screen.
        is_extend: bool,
    },
    /// `set_screen_combination`.
    SetScreenCombination {
        /// Main screen.
        main_id: ScreenId,
        /// Extend screen.
        extend_id: ScreenId,
        /// New combination of the extend screen.
        combination: ScreenCombination,
    },
    /// `on_screen_connection_changed`.
    ScreenConnectionChanged {
        /// Session description.
        option: SessionOption,
        /// Connect or disconnect.
        event: ScreenEvent,
    },
}

/// Window-scene client that records calls and can be told to fail.
#[derive(Default)]
pub struct MockClientProxy {
    calls: Mutex<Vec<ClientCall>>,
    fail_extend_node_change: AtomicBool,
    fail_main_node_change: AtomicBool,
    fail_create_session_only: AtomicBool,
}

impl MockClientProxy {
    /// Create a client whose calls all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `on_extend_display_node_change` report failure.
    pub fn set_fail_extend_node_change(&self, fail: bool) {
        self.fail_extend_node_change.store(fail, Ordering::SeqCst);
    }

    /// Make `on_main_display_node_change` report failure.
    pub fn set_fail_main_node_change(&self, fail: bool) {
        self.fail_main_node_change.store(fail, Ordering::SeqCst);
    }

    /// Make `on_create_screen_session_only` report failure.
    pub fn set_fail_create_session_only(&self, fail: bool) {
        self.fail_create_session_only.store(fail, Ordering::SeqCst);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl ClientProxy for MockClientProxy {
    fn on_extend_display_node_change(&self, main_id: ScreenId, extend_id: ScreenId) -> bool {
        self.calls
            .lock()
            .push(ClientCall::ExtendDisplayNodeChange { main_id, extend_id });
        !self.fail_extend_node_change.load(Ordering::SeqCst)
    }

    fn on_main_display_node_change(
        &self,
        main_id: ScreenId,
        extend_id: ScreenId,
        extend_rs_id: ScreenId,
    ) -> bool {
        self.calls.lock().push(ClientCall::MainDisplayNodeChange {
            main_id,
            extend_id,
            extend_rs_id,
        });
        !self.fail_main_node_change.load(Ordering::SeqCst)
    }

    fn on_create_screen_session_only(
        &self,
        id: ScreenId,
        rs_id: ScreenId,
        name: &str,
        is_extend: bool,
    ) -> bool {
        self.calls.lock().push(ClientCall::CreateScreenSessionOnly {
            id,
            rs_id,
            name: name.to_string(),
            is_extend,
        });
        !self.fail_create_session_only.load(Ordering::SeqCst)
    }

    fn set_screen_combination(
        &self,
        main_id: ScreenId,
        extend_id: ScreenId,
        combination: ScreenCombination,
    ) {
        self.calls.lock().push(ClientCall::SetScreenCombination {
            main_id,
            extend_id,
            combination,
        });
    }

    fn on_screen_connection_changed(&self, option: SessionOption, event: ScreenEvent) {
        self.calls
            .lock()
            .push(ClientCall::ScreenConnectionChanged { option, event });
    }
}

// =============================================================================
// Render commit and power
// =============================================================================

/// Render adapter that records flushes and votes.
#[derive(Default)]
pub struct MockRenderCommit {
    flushes: Mutex<Vec<Vec<RenderContext>>>,
    screen_switched: AtomicUsize,
    refresh_rate_events: Mutex<Vec<RefreshRateEvent>>,
}

impl MockRenderCommit {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every flush, each with the contexts committed together.
    pub fn flushes(&self) -> Vec<Vec<RenderContext>> {
        self.flushes.lock().clone()
    }

    /// Number of screen-switch notifications.
    pub fn screen_switched_count(&self) -> usize {
        self.screen_switched.load(Ordering::SeqCst)
    }

    /// Recorded refresh-rate votes.
    pub fn refresh_rate_events(&self) -> Vec<RefreshRateEvent> {
        self.refresh_rate_events.lock().clone()
    }
}

impl RenderCommitAdapter for MockRenderCommit {
    fn flush_implicit_transaction(&self, contexts: &[RenderContext]) {
        self.flushes.lock().push(contexts.to_vec());
    }

    fn notify_screen_switched(&self) {
        self.screen_switched.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_refresh_rate_event(&self, event: RefreshRateEvent) {
        self.refresh_rate_events.lock().push(event);
    }
}

/// Power manager with settable screen state.
pub struct MockPowerClient {
    fold_screen_on: AtomicBool,
    screen_on: AtomicBool,
    wakeups: Mutex<Vec<WakeupReason>>,
    refresh_activity: AtomicUsize,
}

impl MockPowerClient {
    /// Create a client reporting every screen on.
    pub fn new() -> Self {
        Self {
            fold_screen_on: AtomicBool::new(true),
            screen_on: AtomicBool::new(true),
            wakeups: Mutex::new(Vec::new()),
            refresh_activity: AtomicUsize::new(0),
        }
    }

    /// Set whether the fold screen is on.
    pub fn set_fold_screen_on(&self, on: bool) {
        self.fold_screen_on.store(on, Ordering::SeqCst);
    }

    /// Set whether the display is reported on.
    pub fn set_screen_on(&self, on: bool) {
        self.screen_on.store(on, Ordering::SeqCst);
    }

    /// Recorded wakeups.
    pub fn wakeups(&self) -> Vec<WakeupReason> {
        self.wakeups.lock().clone()
    }

    /// Number of inactivity-timer resets.
    pub fn refresh_activity_count(&self) -> usize {
        self.refresh_activity.load(Ordering::SeqCst)
    }
}

impl Default for MockPowerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerClient for MockPowerClient {
    fn is_fold_screen_on(&self) -> bool {
        self.fold_screen_on.load(Ordering::SeqCst)
    }

    fn is_screen_on(&self) -> bool {
        self.screen_on.load(Ordering::SeqCst)
    }

    fn wakeup_device(&self, reason: WakeupReason) {
        self.wakeups.lock().push(reason);
    }

    fn refresh_activity(&self) {
        self.refresh_activity.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// A full set of mocks with manual schedulers.
pub struct MockServices {
    /// Registry.
    pub registry: Arc<MockScreenRegistry>,
    /// Client proxy, connected to the registry.
    pub client: Arc<MockClientProxy>,
    /// Render adapter.
    pub render: Arc<MockRenderCommit>,
    /// Power manager.
    pub power: Arc<MockPowerClient>,
    /// Fold screen-power queue.
    pub screen_power_scheduler: Arc<TaskScheduler>,
    /// Multi-screen power queue.
    pub power_scheduler: Arc<TaskScheduler>,
}

impl MockServices {
    /// Mocks with an empty registry and a connected client proxy.
    pub fn new() -> Self {
        let registry = Arc::new(MockScreenRegistry::new());
        let client = Arc::new(MockClientProxy::new());
        registry.set_client_proxy(Some(client.clone() as Arc<dyn ClientProxy>));
        Self {
            registry,
            client,
            render: Arc::new(MockRenderCommit::new()),
            power: Arc::new(MockPowerClient::new()),
            screen_power_scheduler: Arc::new(TaskScheduler::manual("screen_power")),
            power_scheduler: Arc::new(TaskScheduler::manual("power")),
        }
    }

    /// Mocks for a foldable phone: a full session with id 0, a main session
    /// with id 5 owning a display node, and both panels' physical properties.
    pub fn fold_device() -> Self {
        let mocks = Self::new();
        let full_property = panel_property(2224.0, 2496.0);
        let main_property = panel_property(1136.0, 2504.0);

        let full = Arc::new(ScreenSession::new(ScreenSessionSpec {
            screen_id: SCREEN_ID_FULL,
            rs_id: SCREEN_ID_FULL,
            name: "full".into(),
            is_internal: true,
            property: full_property.clone(),
            ..Default::default()
        }));
        let main = Arc::new(ScreenSession::new(ScreenSessionSpec {
            screen_id: SCREEN_ID_MAIN,
            rs_id: SCREEN_ID_MAIN,
            name: "main".into(),
            is_internal: true,
            property: main_property.clone(),
            ..Default::default()
        }));
        main.reuse_display_node(DisplayNodeConfig {
            rs_id: SCREEN_ID_MAIN,
            is_mirrored: false,
            mirror_node_id: None,
        });
        main.set_display_node_in_tree(false);

        mocks.registry.add_session(full);
        mocks.registry.add_session(main);
        mocks
            .registry
            .set_phy_screen_property(SCREEN_ID_FULL, full_property);
        mocks
            .registry
            .set_phy_screen_property(SCREEN_ID_MAIN, main_property);
        mocks
    }

    /// Register a built-in screen (id 0, rendering id 10) and an external
    /// screen (id 20, rendering id 20) with the given combinations, plus a
    /// physical session per panel. Returns (inner, external).
    pub fn inner_and_external(
        &self,
        inner_combination: ScreenCombination,
        external_combination: ScreenCombination,
    ) -> (Arc<ScreenSession>, Arc<ScreenSession>) {
        let inner_spec = ScreenSessionSpec {
            screen_id: 0,
            rs_id: 10,
            name: "inner".into(),
            serial_number: "SN-INNER".into(),
            combination: inner_combination,
            is_internal: true,
            property: panel_property(1260.0, 2720.0),
            supported_refresh_rates: vec![60, 90, 120],
            active_id: 1,
            ..Default::default()
        };
        let external_spec = ScreenSessionSpec {
            screen_id: 20,
            rs_id: 20,
            name: "external".into(),
            serial_number: "SN-EXTERNAL".into(),
            combination: external_combination,
            is_internal: false,
            property: panel_property(3840.0, 2160.0),
            supported_refresh_rates: vec![30, 60],
            active_id: 4,
            ..Default::default()
        };

        self.registry
            .add_physical_session(Arc::new(ScreenSession::new(inner_spec.clone())));
        self.registry
            .add_physical_session(Arc::new(ScreenSession::new(external_spec.clone())));

        let inner = Arc::new(ScreenSession::new(inner_spec));
        let external = Arc::new(ScreenSession::new(external_spec));
        for session in [&inner, &external] {
            session.reuse_display_node(DisplayNodeConfig {
                rs_id: session.rs_id(),
                is_mirrored: false,
                mirror_node_id: None,
            });
            self.registry.add_session(session.clone());
        }
        (inner, external)
    }

    /// Collaborator handles for the state machines.
    pub fn services(&self) -> DisplayServices {
        DisplayServices {
            registry: self.registry.clone(),
            render: self.render.clone(),
            power: self.power.clone(),
            screen_power_scheduler: self.screen_power_scheduler.clone(),
            power_scheduler: self.power_scheduler.clone(),
        }
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

fn panel_property(width: f32, height: f32) -> ScreenProperty {
    ScreenProperty {
        bounds: Bounds { width, height },
        valid_width: width as u32,
        valid_height: height as u32,
        virtual_pixel_ratio: 3.0,
        refresh_rate: 60,
        ..Default::default()
    }
}
