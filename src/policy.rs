//! Fold-screen display-mode state machine.
//!
//! [`FoldScreenPolicy`] moves a foldable device between MAIN, FULL and
//! COORDINATION. The synchronous part of a transition runs on the caller's
//! thread; panel power changes are posted to a serial screen-power queue and
//! report back through the generation-tagged [`ModeChangeTracker`].

use crate::config::FoldScreenConfig;
use crate::crease::{FoldCreaseRegion, FoldCreaseRegionController, FoldCreaseRegionItem};
use crate::scheduler::TaskScheduler;
use crate::services::DisplayServices;
use crate::session::ScreenSession;
use crate::state::FoldPolicyState;
use crate::transition::{Completion, Generation, ModeChangeTracker};
use crate::types::{
    mode_for_fold_status, DeviceStatus, DisplayChangeEvent, DisplayModeChangeReason,
    FoldDisplayMode, FoldStatus, RefreshRateEvent, Rotation, ScreenEvent, ScreenId,
    ScreenPowerStatus, ScreenPropertyChangeReason, WakeupReason, SCREEN_ID_FULL, SCREEN_ID_MAIN,
};

use log::{debug, error, info, warn};
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

const TELEMETRY: &str = "foldscreen::telemetry";

const REFRESH_RATE_VOTER: &str = "VOTER_MULTISELFOWNEDSCREEN";
const COORDINATION_REFRESH_RATE: u32 = 60;

/// Which fold device the policy drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVariant {
    /// Single inner and outer panel.
    Base,
    /// Single-display super fold; leaving coordination for FULL re-runs the
    /// full transition when the sensor disagrees.
    SuperFold,
}

#[derive(Debug, Clone, Copy, Default)]
struct DisplayModes {
    current: FoldDisplayMode,
    last: FoldDisplayMode,
}

/// Fold-screen display-mode policy.
///
/// Construct one per device with [`FoldScreenPolicy::new`] or
/// [`FoldScreenPolicy::new_super_fold`] and share the returned `Arc`.
pub struct FoldScreenPolicy {
    variant: PolicyVariant,
    services: DisplayServices,
    config: FoldScreenConfig,
    crease: FoldCreaseRegionController,
    screen_power_scheduler: Arc<TaskScheduler>,
    display_info_lock: Option<Arc<ReentrantMutex<()>>>,

    modes: Mutex<DisplayModes>,
    last_cached_mode: AtomicU8,
    current_fold_status: AtomicU8,
    last_fold_status: AtomicU8,
    tracker: Mutex<ModeChangeTracker>,
    coordination: Mutex<()>,

    lock_display_status: AtomicBool,
    on_boot_animation: AtomicBool,
    is_clearing_boot_animation: AtomicBool,
    first_frame_commit_reported: AtomicBool,
    screen_id: AtomicU64,

    weak_self: Weak<FoldScreenPolicy>,
}

impl FoldScreenPolicy {
    /// Create a base policy posting power tasks to the shared screen-power queue.
    pub fn new(services: DisplayServices, config: FoldScreenConfig) -> Arc<Self> {
        let scheduler = services.screen_power_scheduler.clone();
        Self::build(PolicyVariant::Base, services, config, scheduler, None)
    }

    /// Create a super-fold policy with its own screen-power queue and the
    /// owning service's display-info lock.
    ///
    /// The lock is held while display-change notifications go out, so the
    /// service may take it again from inside those callbacks.
    pub fn new_super_fold(
        services: DisplayServices,
        config: FoldScreenConfig,
        screen_power_scheduler: Arc<TaskScheduler>,
        display_info_lock: Arc<ReentrantMutex<()>>,
    ) -> Arc<Self> {
        Self::build(
            PolicyVariant::SuperFold,
            services,
            config,
            screen_power_scheduler,
            Some(display_info_lock),
        )
    }

    fn build(
        variant: PolicyVariant,
        services: DisplayServices,
        config: FoldScreenConfig,
        screen_power_scheduler: Arc<TaskScheduler>,
        display_info_lock: Option<Arc<ReentrantMutex<()>>>,
    ) -> Arc<Self> {
        let crease = FoldCreaseRegionController::new(config.crease_region.clone());
        Arc::new_cyclic(|weak_self| Self {
            variant,
            services,
            config,
            crease,
            screen_power_scheduler,
            display_info_lock,
            modes: Mutex::new(DisplayModes::default()),
            last_cached_mode: AtomicU8::new(FoldDisplayMode::Unknown as u8),
            current_fold_status: AtomicU8::new(FoldStatus::Unknown as u8),
            last_fold_status: AtomicU8::new(FoldStatus::Unknown as u8),
            tracker: Mutex::new(ModeChangeTracker::new()),
            coordination: Mutex::new(()),
            lock_display_status: AtomicBool::new(false),
            on_boot_animation: AtomicBool::new(false),
            is_clearing_boot_animation: AtomicBool::new(false),
            first_frame_commit_reported: AtomicBool::new(false),
            screen_id: AtomicU64::new(SCREEN_ID_FULL),
            weak_self: weak_self.clone(),
        })
    }

    /// Policy variant.
    pub fn variant(&self) -> PolicyVariant {
        self.variant
    }

    // =========================================================================
    // Mode change entry
    // =========================================================================

    /// Request a display-mode change.
    ///
    /// Rejected requests are logged and dropped; the next sensor event is the
    /// retry.
    pub fn change_screen_display_mode(
        &self,
        mode: FoldDisplayMode,
        is_force: bool,
        reason: DisplayModeChangeReason,
    ) {
        if !self.check_display_mode_change(mode, is_force) {
            return;
        }
        self.change_screen_display_mode_inner(mode, reason);
        self.update_device_status(mode);
        self.services.registry.notify_display_mode_changed(mode);
    }

    /// Guard for [`Self::change_screen_display_mode`]. Returns whether the
    /// change should proceed.
    pub fn check_display_mode_change(&self, mode: FoldDisplayMode, is_force: bool) -> bool {
        if is_force {
            info!("force change display mode to {:?}", mode);
            self.set_last_cache_display_mode(mode);
            return true;
        }
        if self.is_clearing_boot_animation.load(Ordering::SeqCst) {
            info!("clearing boot animation, not changing display mode");
            return false;
        }
        self.set_last_cache_display_mode(mode);
        if self.is_mode_change_running() {
            warn!("last mode change not complete, skip mode {:?}", mode);
            return false;
        }
        info!(
            "start change display mode to {:?}, last elapsed {} ms",
            mode,
            self.get_folding_elapsed_ms()
        );
        if self.current_display_mode() == mode {
            warn!("already in display mode {:?}", mode);
            return false;
        }
        true
    }

    fn change_screen_display_mode_inner(&self, mode: FoldDisplayMode, reason: DisplayModeChangeReason) {
        let Some(session) = self.services.registry.get_screen_session(SCREEN_ID_FULL) else {
            error!("default screen session is null");
            return;
        };
        let current = {
            let mut modes = self.modes.lock();
            modes.last = mode;
            modes.current
        };
        self.report_fold_display_mode_change(mode);

        match (mode, current) {
            (FoldDisplayMode::Main, current) => {
                if current == FoldDisplayMode::Coordination {
                    self.close_coordination_screen();
                }
                let generation = self.begin_display_mode_change();
                self.change_screen_display_mode_to_main(&session, generation);
            }
            (FoldDisplayMode::Full, FoldDisplayMode::Coordination) => {
                self.close_coordination_screen();
                if self.variant == PolicyVariant::SuperFold && self.get_mode_match_status() != mode {
                    info!("exit coordination and recover full");
                    let generation = self.begin_display_mode_change();
                    self.change_screen_display_mode_to_full(&session, reason, generation);
                }
            }
            (FoldDisplayMode::Full, _) => {
                let generation = self.begin_display_mode_change();
                self.change_screen_display_mode_to_full(&session, reason, generation);
            }
            (FoldDisplayMode::Coordination, _) => self.change_screen_display_mode_to_coordination(),
            (other, _) => info!("display mode {:?} is not handled", other),
        }

        self.modes.lock().current = mode;
    }

    /// Record a fold status reported by the hinge sensor and follow it.
    pub fn send_sensor_result(&self, fold_status: FoldStatus) {
        info!("sensor fold status {:?}", fold_status);
        if self.get_lock_display_status() {
            info!("display status locked, ignore sensor result");
            return;
        }
        self.set_fold_status(fold_status);
        let mode = self.get_mode_match_status();
        self.change_screen_display_mode(mode, false, DisplayModeChangeReason::Default);
    }

    /// Display mode implied by the current fold status.
    pub fn get_mode_match_status(&self) -> FoldDisplayMode {
        let status = FoldStatus::from_u8(self.current_fold_status.load(Ordering::SeqCst));
        let mode = mode_for_fold_status(status);
        if mode == FoldDisplayMode::Unknown {
            info!("fold status {:?} has no matching mode", status);
        }
        mode
    }

    /// Publish the device status for `mode`.
    pub fn update_device_status(&self, mode: FoldDisplayMode) {
        let status = DeviceStatus::from(mode);
        info!("set device status to {:?}", status);
        self.services.registry.set_device_status(status);
    }

    // =========================================================================
    // To MAIN / to FULL
    // =========================================================================

    fn change_screen_display_mode_to_main(&self, session: &Arc<ScreenSession>, generation: Generation) {
        if self.on_boot_animation.load(Ordering::SeqCst) {
            self.change_screen_display_mode_on_boot_animation(
                session,
                SCREEN_ID_MAIN,
                ScreenPropertyChangeReason::FoldScreenFolding,
            );
            return;
        }
        self.services.render.notify_screen_switched();
        let registry = &self.services.registry;
        if self.services.power.is_fold_screen_on() || registry.cancel_suspend_status() {
            self.change_screen_display_mode_to_main_when_fold_screen_on(session, generation);
        } else {
            registry.force_skip_screen_off_animation();
            self.change_screen_display_mode_to_main_when_fold_screen_off(session, generation);
        }
    }

    fn change_screen_display_mode_to_main_when_fold_screen_on(
        &self,
        session: &Arc<ScreenSession>,
        generation: Generation,
    ) {
        info!("fold screen on, switch to main");
        self.report_fold_status_change_begin(SCREEN_ID_FULL, SCREEN_ID_MAIN);
        self.post_power_task("screenOnMainTask", move |policy| {
            debug!("screen full off");
            policy.screen_id.store(SCREEN_ID_FULL, Ordering::SeqCst);
            policy.change_screen_display_mode_power(SCREEN_ID_FULL, ScreenPowerStatus::Off);
            policy.finish_display_mode_sub_task(generation);

            debug!("screen main on");
            policy.screen_id.store(SCREEN_ID_MAIN, Ordering::SeqCst);
            policy.change_screen_display_mode_power(SCREEN_ID_MAIN, ScreenPowerStatus::On);
            policy.finish_display_mode_sub_task(generation);
        });
        self.send_property_change_result(session, SCREEN_ID_MAIN, ScreenPropertyChangeReason::FoldScreenFolding);
    }

    fn change_screen_display_mode_to_main_when_fold_screen_off(
        &self,
        session: &Arc<ScreenSession>,
        generation: Generation,
    ) {
        info!("fold screen off, switch to main");
        self.post_power_task("screenOffMainOffTask", move |policy| {
            debug!("screen full off");
            policy.screen_id.store(SCREEN_ID_FULL, Ordering::SeqCst);
            policy.change_screen_display_mode_power(SCREEN_ID_FULL, ScreenPowerStatus::Off);
            policy.finish_display_mode_sub_task(generation);
        });
        self.send_property_change_result(session, SCREEN_ID_MAIN, ScreenPropertyChangeReason::FoldScreenFolding);

        let is_tent_mode = self.services.registry.tent_mode();
        self.post_power_task("taskScreenOnMainChangeScreenId", move |policy| {
            debug!("change screen id to main");
            policy.screen_id.store(SCREEN_ID_MAIN, Ordering::SeqCst);
            if is_tent_mode {
                policy.services.power.wakeup_device(WakeupReason::TentModeChange);
            }
            policy.finish_display_mode_sub_task(generation);
        });
    }

    fn change_screen_display_mode_to_full(
        &self,
        session: &Arc<ScreenSession>,
        reason: DisplayModeChangeReason,
        generation: Generation,
    ) {
        if self.on_boot_animation.load(Ordering::SeqCst) {
            self.change_screen_display_mode_on_boot_animation(
                session,
                SCREEN_ID_FULL,
                ScreenPropertyChangeReason::FoldScreenExpand,
            );
            return;
        }
        self.services.render.notify_screen_switched();
        self.report_fold_status_change_begin(SCREEN_ID_MAIN, SCREEN_ID_FULL);
        if self.services.power.is_fold_screen_on() || self.services.registry.try_to_cancel_screen_off() {
            self.change_screen_display_mode_to_full_when_fold_screen_on(session, generation);
        } else {
            self.change_screen_display_mode_to_full_when_fold_screen_off(session, reason, generation);
        }
    }

    fn change_screen_display_mode_to_full_when_fold_screen_on(
        &self,
        session: &Arc<ScreenSession>,
        generation: Generation,
    ) {
        info!("fold screen on, switch to full");
        self.post_power_task("screenOnFullTask", move |policy| {
            debug!("screen main off");
            policy.screen_id.store(SCREEN_ID_MAIN, Ordering::SeqCst);
            policy.change_screen_display_mode_power(SCREEN_ID_MAIN, ScreenPowerStatus::Off);
            policy.finish_display_mode_sub_task(generation);

            debug!("screen full on");
            policy.screen_id.store(SCREEN_ID_FULL, Ordering::SeqCst);
            policy.change_screen_display_mode_power(SCREEN_ID_FULL, ScreenPowerStatus::On);
            policy.finish_display_mode_sub_task(generation);
        });
        self.send_property_change_result(session, SCREEN_ID_FULL, ScreenPropertyChangeReason::FoldScreenExpand);
    }

    fn change_screen_display_mode_to_full_when_fold_screen_off(
        &self,
        session: &Arc<ScreenSession>,
        reason: DisplayModeChangeReason,
        generation: Generation,
    ) {
        info!("fold screen off, switch to full");
        self.post_power_task("screenOffFullOffTask", move |policy| {
            debug!("screen main off");
            policy.screen_id.store(SCREEN_ID_MAIN, Ordering::SeqCst);
            policy.change_screen_display_mode_power(SCREEN_ID_MAIN, ScreenPowerStatus::Off);
            policy.finish_display_mode_sub_task(generation);
        });
        self.send_property_change_result(session, SCREEN_ID_FULL, ScreenPropertyChangeReason::FoldScreenExpand);

        self.post_power_task("screenOnFullOnTask", move |policy| {
            debug!("screen full on");
            policy.screen_id.store(SCREEN_ID_FULL, Ordering::SeqCst);
            if reason != DisplayModeChangeReason::Recover {
                policy.services.power.wakeup_device(WakeupReason::Application);
            }
            policy.finish_display_mode_sub_task(generation);
        });
    }

    fn change_screen_display_mode_on_boot_animation(
        &self,
        session: &ScreenSession,
        screen_id: ScreenId,
        reason: ScreenPropertyChangeReason,
    ) {
        info!("boot animation running, switch geometry to screen {}", screen_id);
        let property = {
            let _info = self.display_info_lock.as_ref().map(|lock| lock.lock());
            self.services.registry.get_phy_screen_property(screen_id)
        };
        session.update_property_by_fold_control(&property);
        session.set_valid_size(property.bounds.width as u32, property.bounds.height as u32);
        session.property_change(reason);
        debug!(
            "screen bounds {}x{}",
            property.bounds.width, property.bounds.height
        );
        self.screen_id.store(screen_id, Ordering::SeqCst);
    }

    fn change_screen_display_mode_power(&self, screen_id: ScreenId, status: ScreenPowerStatus) {
        let registry = &self.services.registry;
        registry.set_keyguard_drawn_done_flag(false);
        registry.set_screen_power_for_fold(screen_id, status);
    }

    fn send_property_change_result(
        &self,
        session: &ScreenSession,
        screen_id: ScreenId,
        reason: ScreenPropertyChangeReason,
    ) {
        let registry = &self.services.registry;
        let _info = self.display_info_lock.as_ref().map(|lock| lock.lock());
        let property = registry.get_phy_screen_property(screen_id);
        session.set_phy_screen_id(screen_id);
        if registry.client_proxy().is_none() {
            session.update_property_by_fold_control(&property);
            session.property_change(reason);
            debug!(
                "screen bounds {}x{}",
                property.bounds.width, property.bounds.height
            );
            session.set_rotation(Rotation::Rotation0);
            registry.notify_display_changed(session.display_info(), DisplayChangeEvent::DisplaySizeChanged);
        } else {
            session.notify_fold_property_change(&property, reason, self.get_screen_display_mode());
        }
    }

    fn post_power_task<F>(&self, name: &str, task: F)
    where
        F: FnOnce(&FoldScreenPolicy) + Send + 'static,
    {
        let weak = self.weak_self.clone();
        let task_name = name.to_string();
        self.screen_power_scheduler.post_async_task(
            move || match weak.upgrade() {
                Some(policy) => task(&policy),
                None => debug!("policy dropped, skip {}", task_name),
            },
            name,
        );
    }

    // =========================================================================
    // Completion tracking
    // =========================================================================

    /// Start tracking a transition. The expected completion count depends on
    /// whether boot animation is running.
    ///
    /// The first-frame flag is cleared here, so it always describes the
    /// latest transition.
    pub fn begin_display_mode_change(&self) -> Generation {
        self.first_frame_commit_reported
            .store(false, Ordering::SeqCst);
        let expected = if self.on_boot_animation.load(Ordering::SeqCst) {
            self.config.boot_animation_task_num
        } else {
            self.config.fold_task_num
        };
        self.tracker.lock().begin(expected)
    }

    /// Report one finished sub-task of transition `generation`.
    ///
    /// When the last one arrives and a newer mode was requested meanwhile, a
    /// display-mode update for the cached request is triggered.
    pub fn finish_display_mode_sub_task(&self, generation: Generation) -> Completion {
        let completion = self.tracker.lock().complete(generation);
        if let Completion::Finished { elapsed } = completion {
            info!("display mode change finished in {} ms", elapsed.as_millis());
            let cached = self.get_last_cache_display_mode();
            if cached != self.get_screen_display_mode() {
                info!("trigger display mode update to cached {:?}", cached);
                self.services.registry.trigger_display_mode_update(cached);
            }
        }
        completion
    }

    /// The first frame of the new mode was committed.
    pub fn on_first_frame_committed(&self) {
        self.set_is_first_frame_commit_reported(true);
        let generation = {
            let tracker = self.tracker.lock();
            if !tracker.is_pending() {
                debug!("first frame committed with no transition pending");
                return;
            }
            tracker.current_generation()
        };
        if let Some(generation) = generation {
            self.finish_display_mode_sub_task(generation);
        }
    }

    /// Whether a transition is running and still inside its deadline.
    pub fn is_mode_change_running(&self) -> bool {
        self.tracker
            .lock()
            .is_running_at(Instant::now(), self.config.mode_change_timeout)
    }

    /// Whether a transition is pending, ignoring the deadline.
    pub fn get_display_mode_running_status(&self) -> bool {
        self.tracker.lock().is_pending()
    }

    /// Duration of the last finished transition, 0 if none.
    pub fn get_folding_elapsed_ms(&self) -> u64 {
        match self.tracker.lock().last_span() {
            Some((started, ended)) => ended.saturating_duration_since(started).as_millis() as u64,
            None => 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn backdate_mode_change(&self, by: std::time::Duration) {
        self.tracker.lock().backdate(by);
    }

    // =========================================================================
    // Coordination
    // =========================================================================

    /// Power the secondary screen for coordination.
    pub fn change_screen_display_mode_to_coordination(&self) {
        let _guard = self.coordination.lock();
        let registry = &self.services.registry;
        if registry.coordination_flag() {
            warn!("coordination flag already set, skip");
            return;
        }
        info!("change to coordination from {:?}", self.current_display_mode());
        registry.set_coordination_flag(true);
        registry.on_screen_change(SCREEN_ID_MAIN, ScreenEvent::Connected);

        self.post_power_task("ScreenToCoordinationTask", |policy| {
            debug!("screen main on for coordination");
            policy.notify_refresh_rate_event(true);
            policy.services.registry.set_keyguard_drawn_done_flag(false);
            policy
                .services
                .registry
                .set_screen_power_for_fold(SCREEN_ID_MAIN, ScreenPowerStatus::On);
            policy.services.power.refresh_activity();
        });
        self.add_or_remove_display_node_to_tree(SCREEN_ID_MAIN, true);
    }

    /// Leave coordination, powering the secondary screen off asynchronously.
    pub fn close_coordination_screen(&self) {
        let _guard = self.coordination.lock();
        let registry = &self.services.registry;
        if !registry.coordination_flag() {
            warn!("coordination flag not set, skip close");
            return;
        }
        info!("close coordination screen, current {:?}", self.current_display_mode());
        self.post_power_task("CloseCoordinationScreenTask", |policy| {
            debug!("screen main off after coordination");
            policy.services.registry.set_keyguard_drawn_done_flag(false);
            policy
                .services
                .registry
                .set_screen_power_for_fold(SCREEN_ID_MAIN, ScreenPowerStatus::Off);
            policy.notify_refresh_rate_event(false);
        });
        self.add_or_remove_display_node_to_tree(SCREEN_ID_MAIN, false);
        registry.on_screen_change(SCREEN_ID_MAIN, ScreenEvent::Disconnected);
        registry.set_coordination_flag(false);
    }

    /// Tear coordination down synchronously and return to the sensor mode.
    pub fn exit_coordination(&self) {
        let _guard = self.coordination.lock();
        let registry = &self.services.registry;
        if !registry.coordination_flag() {
            warn!("coordination flag not set, skip exit");
            return;
        }
        registry.set_keyguard_drawn_done_flag(false);
        registry.set_rs_screen_power_status(SCREEN_ID_MAIN, ScreenPowerStatus::Off);
        self.add_or_remove_display_node_to_tree(SCREEN_ID_MAIN, false);
        registry.on_screen_change(SCREEN_ID_MAIN, ScreenEvent::Disconnected);
        registry.set_coordination_flag(false);
        self.notify_refresh_rate_event(false);

        let mode = self.get_mode_match_status();
        {
            let mut modes = self.modes.lock();
            modes.current = mode;
            modes.last = mode;
        }
        info!("exit coordination, display mode {:?}", mode);
        registry.notify_display_mode_changed(mode);
    }

    fn notify_refresh_rate_event(&self, active: bool) {
        self.services.render.notify_refresh_rate_event(RefreshRateEvent {
            event_name: REFRESH_RATE_VOTER,
            event_status: active,
            min_refresh_rate: COORDINATION_REFRESH_RATE,
            max_refresh_rate: COORDINATION_REFRESH_RATE,
        });
    }

    fn add_or_remove_display_node_to_tree(&self, screen_id: ScreenId, add: bool) {
        info!("screen {} display node in tree: {}", screen_id, add);
        let Some(session) = self.services.registry.get_screen_session(screen_id) else {
            error!("screen session {} is null", screen_id);
            return;
        };
        if !session.set_display_node_in_tree(add) {
            error!("screen {} has no display node", screen_id);
            return;
        }
        self.services
            .render
            .flush_implicit_transaction(&[session.render_context()]);
    }

    // =========================================================================
    // Tent mode and boot animation
    // =========================================================================

    /// Enter tent mode: force MAIN, waking the device when it was folded.
    pub fn change_on_tent_mode(&self, current: FoldStatus) {
        info!("enter tent mode from {:?}", current);
        match current {
            FoldStatus::Expand | FoldStatus::HalfFold => {
                self.change_screen_display_mode(FoldDisplayMode::Main, false, DisplayModeChangeReason::Default);
            }
            FoldStatus::Folded => {
                self.change_screen_display_mode(FoldDisplayMode::Main, false, DisplayModeChangeReason::Default);
                self.services.power.wakeup_device(WakeupReason::Application);
            }
            FoldStatus::Unknown => error!("tent mode with invalid fold status {:?}", current),
        }
    }

    /// Leave tent mode and follow the sensor again.
    pub fn change_off_tent_mode(&self) {
        self.services.power.wakeup_device(WakeupReason::Application);
        let mode = self.get_mode_match_status();
        warn!(
            "leave tent mode, current {:?}, fold status {:?}",
            self.current_display_mode(),
            self.current_fold_status()
        );
        self.change_screen_display_mode(mode, false, DisplayModeChangeReason::Default);
    }

    /// Mark boot animation running or finished. Finishing forces the mode
    /// matching the sensor.
    pub fn set_on_boot_animation(&self, on_boot_animation: bool) {
        info!("on boot animation: {}", on_boot_animation);
        self.on_boot_animation.store(on_boot_animation, Ordering::SeqCst);
        if !on_boot_animation {
            self.recover_when_boot_animation_exit();
        }
    }

    fn recover_when_boot_animation_exit(&self) {
        info!("boot animation exit, current screen {}", self.get_current_screen_id());
        let mode = self.get_mode_match_status();
        self.change_screen_display_mode(mode, true, DisplayModeChangeReason::Default);
    }

    /// Whether boot animation is running.
    pub fn is_on_boot_animation(&self) -> bool {
        self.on_boot_animation.load(Ordering::SeqCst)
    }

    /// While set, unforced mode changes are rejected.
    pub fn set_is_clearing_boot_animation(&self, clearing: bool) {
        info!("clearing boot animation: {}", clearing);
        self.is_clearing_boot_animation.store(clearing, Ordering::SeqCst);
    }

    /// Re-match the display mode after a physical property change.
    pub fn update_for_phy_screen_property_change(&self) {
        info!("phy property change, current screen {}", self.get_current_screen_id());
        let mode = self.get_mode_match_status();
        if self.current_display_mode() != mode {
            self.change_screen_display_mode(mode, false, DisplayModeChangeReason::Default);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Last requested display mode that passed the guard.
    pub fn get_screen_display_mode(&self) -> FoldDisplayMode {
        self.modes.lock().last
    }

    /// Mode the state machine last completed dispatching.
    pub fn current_display_mode(&self) -> FoldDisplayMode {
        self.modes.lock().current
    }

    /// Overwrite the current display mode.
    pub fn set_current_display_mode(&self, mode: FoldDisplayMode) {
        self.modes.lock().current = mode;
    }

    /// Most recent mode requested, accepted or not.
    pub fn get_last_cache_display_mode(&self) -> FoldDisplayMode {
        FoldDisplayMode::from_u8(self.last_cached_mode.load(Ordering::SeqCst))
    }

    /// Setter for [`Self::get_last_cache_display_mode`].
    pub fn set_last_cache_display_mode(&self, mode: FoldDisplayMode) {
        self.last_cached_mode.store(mode as u8, Ordering::SeqCst);
    }

    /// Last fold status reported.
    pub fn get_fold_status(&self) -> FoldStatus {
        FoldStatus::from_u8(self.last_fold_status.load(Ordering::SeqCst))
    }

    fn current_fold_status(&self) -> FoldStatus {
        FoldStatus::from_u8(self.current_fold_status.load(Ordering::SeqCst))
    }

    /// Set both the current and last fold status.
    pub fn set_fold_status(&self, status: FoldStatus) {
        info!("set fold status {:?}", status);
        self.current_fold_status.store(status as u8, Ordering::SeqCst);
        self.last_fold_status.store(status as u8, Ordering::SeqCst);
    }

    /// Lock or unlock the display status against sensor changes.
    pub fn lock_display_status(&self, locked: bool) {
        info!("lock display status: {}", locked);
        self.lock_display_status.store(locked, Ordering::SeqCst);
    }

    /// Whether the display status is locked.
    pub fn get_lock_display_status(&self) -> bool {
        self.lock_display_status.load(Ordering::SeqCst)
    }

    /// Panel the policy last switched to. Unstable while a transition runs.
    pub fn get_current_screen_id(&self) -> ScreenId {
        self.screen_id.load(Ordering::SeqCst)
    }

    /// Whether the first frame after a transition was reported.
    pub fn get_is_first_frame_commit_reported(&self) -> bool {
        self.first_frame_commit_reported.load(Ordering::SeqCst)
    }

    /// Setter for [`Self::get_is_first_frame_commit_reported`].
    pub fn set_is_first_frame_commit_reported(&self, reported: bool) {
        self.first_frame_commit_reported.store(reported, Ordering::SeqCst);
    }

    /// Reset the current display mode and fold status to unknown.
    pub fn clear_state(&self) {
        self.modes.lock().current = FoldDisplayMode::Unknown;
        self.current_fold_status
            .store(FoldStatus::Unknown as u8, Ordering::SeqCst);
    }

    /// Crease region computed at construction.
    pub fn get_current_fold_crease_region(&self) -> FoldCreaseRegion {
        self.crease.current_fold_crease_region()
    }

    /// Crease region for the current mode and the full screen's orientation.
    pub fn get_live_crease_region(&self) -> FoldCreaseRegion {
        let mode = self.get_screen_display_mode();
        if matches!(mode, FoldDisplayMode::Unknown | FoldDisplayMode::Main) {
            return FoldCreaseRegion::empty();
        }
        let Some(session) = self.services.registry.get_screen_session(SCREEN_ID_FULL) else {
            error!("default screen session is null");
            return FoldCreaseRegion::empty();
        };
        let orientation = session.property().display_orientation;
        self.crease.live_crease_region(mode, orientation)
    }

    /// Crease regions for every posture, sized to the full panel at
    /// rotation zero. Empty when the full screen session is missing.
    pub fn get_all_crease_region(&self) -> Vec<FoldCreaseRegionItem> {
        let registry = &self.services.registry;
        if registry.get_screen_session(SCREEN_ID_FULL).is_none() {
            error!("default screen session is null");
            return Vec::new();
        }
        let bounds = registry.get_phy_screen_property(SCREEN_ID_FULL).bounds;
        self.crease
            .all_crease_region(bounds.width as u32, bounds.height as u32)
    }

    /// The crease controller.
    pub fn crease_controller(&self) -> &FoldCreaseRegionController {
        &self.crease
    }

    /// Snapshot of the policy state.
    pub fn get_state(&self) -> FoldPolicyState {
        let modes = *self.modes.lock();
        FoldPolicyState {
            current_display_mode: modes.current,
            last_display_mode: modes.last,
            last_cached_display_mode: self.get_last_cache_display_mode(),
            current_fold_status: self.current_fold_status(),
            last_fold_status: self.get_fold_status(),
            screen_id: self.get_current_screen_id(),
            mode_change_running: self.is_mode_change_running(),
            lock_display_status: self.get_lock_display_status(),
            on_boot_animation: self.is_on_boot_animation(),
            is_clearing_boot_animation: self.is_clearing_boot_animation.load(Ordering::SeqCst),
            first_frame_commit_reported: self.get_is_first_frame_commit_reported(),
            folding_elapsed_ms: self.get_folding_elapsed_ms(),
        }
    }

    // =========================================================================
    // Telemetry
    // =========================================================================

    fn report_fold_display_mode_change(&self, mode: FoldDisplayMode) {
        info!(target: TELEMETRY, "DISPLAY_MODE fold_display_mode={}", mode as u8);
    }

    fn report_fold_status_change_begin(&self, off_screen: ScreenId, on_screen: ScreenId) {
        info!(
            target: TELEMETRY,
            "FOLD_STATE_CHANGE_BEGIN power_off_screen={} power_on_screen={}", off_screen, on_screen
        );
    }
}

impl std::fmt::Debug for FoldScreenPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldScreenPolicy")
            .field("variant", &self.variant)
            .field("state", &self.get_state())
            .finish()
    }
}
