//! Multi-screen topology reconciliation on power and setting changes.
//!
//! When the built-in panel is switched off while an external screen is
//! attached, the external screen takes over as main. The combination pair in
//! effect at that moment is snapshotted so the matching recovery can restore
//! it once the built-in panel comes back on.
//!
//! Callers always pass the sessions by physical role: `inner` is the session
//! currently backed by the built-in panel. An off-change swaps the backing
//! panels between the two sessions, so the recovery call passes them in the
//! opposite order from the off call.

use crate::change_utils::MultiScreenChangeUtils;
use crate::error::DmError;
use crate::scheduler::TaskScheduler;
use crate::services::{ClientProxy, DisplayServices, PowerClient, ScreenRegistry};
use crate::session::{DisplayNodeConfig, ScreenSession};
use crate::types::{
    MultiScreenPowerSwitchType, ScreenCombination, ScreenEvent, ScreenId, ScreenPowerStatus,
    SCREEN_ID_FULL,
};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Combinations of the built-in and external screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombinationPair {
    /// Combination of the session backed by the built-in panel.
    pub inner: ScreenCombination,
    /// Combination of the session backed by the external panel.
    pub external: ScreenCombination,
}

impl CombinationPair {
    /// Create a pair.
    pub const fn new(inner: ScreenCombination, external: ScreenCombination) -> Self {
        Self { inner, external }
    }

    /// Live combinations of two sessions.
    pub fn of(inner: &ScreenSession, external: &ScreenSession) -> Self {
        Self::new(inner.combination(), external.combination())
    }
}

impl Default for CombinationPair {
    fn default() -> Self {
        Self::new(ScreenCombination::Main, ScreenCombination::Main)
    }
}

/// Topologies the power-change tables know how to leave and restore.
///
/// The off table and the recovery table share this key set: the off handler
/// for a topology converges on "external screen is main", and the recovery
/// handler for the same topology rebuilds it from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyChange {
    /// Built-in main, external extend.
    InnerMainExternalExtend,
    /// Built-in main, external mirror.
    InnerMainExternalMirror,
    /// Built-in extend, external main.
    InnerExtendExternalMain,
    /// Built-in mirror, external main.
    InnerMirrorExternalMain,
}

impl TopologyChange {
    /// Look up the topology for a combination pair.
    pub fn for_pair(pair: CombinationPair) -> Option<Self> {
        use ScreenCombination::{Extend, Main, Mirror};
        match (pair.inner, pair.external) {
            (Main, Extend) => Some(Self::InnerMainExternalExtend),
            (Main, Mirror) => Some(Self::InnerMainExternalMirror),
            (Extend, Main) => Some(Self::InnerExtendExternalMain),
            (Mirror, Main) => Some(Self::InnerMirrorExternalMain),
            _ => None,
        }
    }

    /// The pair this topology is keyed by.
    pub fn pair(self) -> CombinationPair {
        use ScreenCombination::{Extend, Main, Mirror};
        match self {
            Self::InnerMainExternalExtend => CombinationPair::new(Main, Extend),
            Self::InnerMainExternalMirror => CombinationPair::new(Main, Mirror),
            Self::InnerExtendExternalMain => CombinationPair::new(Extend, Main),
            Self::InnerMirrorExternalMain => CombinationPair::new(Mirror, Main),
        }
    }

    fn off_tracker_name(self) -> &'static str {
        match self {
            Self::InnerMainExternalExtend => "InnerMainExternalExtendChange",
            Self::InnerMainExternalMirror => "InnerMainExternalMirrorChange",
            Self::InnerExtendExternalMain => "InnerExtendExternalMainChange",
            Self::InnerMirrorExternalMain => "InnerMirrorExternalMainChange",
        }
    }

    fn recovery_tracker_name(self) -> &'static str {
        match self {
            Self::InnerMainExternalExtend => "RecoveryInnerMainExternalExtendChange",
            Self::InnerMainExternalMirror => "RecoveryInnerMainExternalMirrorChange",
            Self::InnerExtendExternalMain => "RecoveryInnerExtendExternalMainChange",
            Self::InnerMirrorExternalMain => "RecoveryInnerMirrorExternalMainChange",
        }
    }
}

fn both<'a>(
    inner: Option<&'a Arc<ScreenSession>>,
    external: Option<&'a Arc<ScreenSession>>,
) -> Result<(&'a Arc<ScreenSession>, &'a Arc<ScreenSession>), DmError> {
    match (inner, external) {
        (Some(inner), Some(external)) => Ok((inner, external)),
        _ => {
            error!("screen session is null");
            Err(DmError::NullPtr)
        }
    }
}

/// Power the rendering-service screen on unless the system is asleep with the
/// display off, or the lid is closed over the built-in panel.
fn power_on_sync(registry: &dyn ScreenRegistry, power: &dyn PowerClient, rs_id: ScreenId) {
    if !power.is_screen_on() && registry.is_system_sleep() {
        info!("system asleep, rs screen {} stays off", rs_id);
        return;
    }
    if !registry.is_laptop_lid_open() && rs_id == SCREEN_ID_FULL {
        info!("lid closed, rs screen {} stays off", rs_id);
        return;
    }
    registry.call_rs_set_screen_power_status_sync(rs_id, ScreenPowerStatus::On);
}

/// Reconciles screen roles when the built-in panel is powered off or on, or
/// when settings move the display to the external screen only.
pub struct MultiScreenPowerChangeManager {
    registry: Arc<dyn ScreenRegistry>,
    power: Arc<dyn PowerClient>,
    power_scheduler: Arc<TaskScheduler>,
    utils: MultiScreenChangeUtils,
    snapshot: Mutex<CombinationPair>,
}

impl MultiScreenPowerChangeManager {
    /// Create a manager over the given collaborators.
    pub fn new(services: &DisplayServices) -> Self {
        Self {
            registry: services.registry.clone(),
            power: services.power.clone(),
            power_scheduler: services.power_scheduler.clone(),
            utils: MultiScreenChangeUtils::new(services.registry.clone(), services.render.clone()),
            snapshot: Mutex::new(CombinationPair::default()),
        }
    }

    /// The change toolbox the handlers use.
    pub fn utils(&self) -> &MultiScreenChangeUtils {
        &self.utils
    }

    /// Combination pair captured by the last screen-off.
    pub fn snapshot(&self) -> CombinationPair {
        *self.snapshot.lock()
    }

    /// Overwrite the screen-off snapshot.
    pub fn set_inner_and_external_combination(
        &self,
        inner: ScreenCombination,
        external: ScreenCombination,
    ) {
        *self.snapshot.lock() = CombinationPair::new(inner, external);
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Handle a power or setting change of the built-in screen.
    pub fn on_multi_screen_power_change_request(
        &self,
        inner: Option<&Arc<ScreenSession>>,
        external: Option<&Arc<ScreenSession>>,
        switch: MultiScreenPowerSwitchType,
    ) -> Result<(), DmError> {
        let (inner, external) = both(inner, external)?;
        info!(
            "power change {:?}: inner screen {}, external screen {}",
            switch,
            inner.screen_id(),
            external.screen_id()
        );
        match switch {
            MultiScreenPowerSwitchType::ScreenSwitchOn => {
                self.handle_screen_on_change(Some(inner), Some(external))
            }
            MultiScreenPowerSwitchType::ScreenSwitchOff => {
                self.handle_screen_off_change(Some(inner), Some(external))
            }
            MultiScreenPowerSwitchType::ScreenSwitchExternal => {
                self.handle_screen_only_external_mode_change(Some(inner), Some(external))
            }
        }
    }

    /// Built-in screen back on: restore the snapshotted topology.
    pub fn handle_screen_on_change(
        &self,
        inner: Option<&Arc<ScreenSession>>,
        external: Option<&Arc<ScreenSession>>,
    ) -> Result<(), DmError> {
        let (inner, external) = both(inner, external)?;
        info!(
            "screen on: inner screen {} rs {} extend {}, external screen {} rs {} extend {}",
            inner.screen_id(),
            inner.rs_id(),
            inner.is_extend(),
            external.screen_id(),
            external.rs_id(),
            external.is_extend()
        );
        self.on_recovery_screen_mode_by_power_change(Some(inner), Some(external))
    }

    /// Built-in screen off: snapshot the topology, then hand the display to
    /// the external screen.
    pub fn handle_screen_off_change(
        &self,
        inner: Option<&Arc<ScreenSession>>,
        external: Option<&Arc<ScreenSession>>,
    ) -> Result<(), DmError> {
        let (inner, external) = both(inner, external)?;
        let pair = CombinationPair::of(inner, external);
        *self.snapshot.lock() = pair;
        info!(
            "screen off: inner screen {} rs {} {:?}, external screen {} rs {} {:?}",
            inner.screen_id(),
            inner.rs_id(),
            pair.inner,
            external.screen_id(),
            external.rs_id(),
            pair.external
        );
        self.handle_screen_only_external_mode_change(Some(inner), Some(external))
    }

    /// Hand the display to the external screen based on the live combinations.
    pub fn handle_screen_only_external_mode_change(
        &self,
        inner: Option<&Arc<ScreenSession>>,
        external: Option<&Arc<ScreenSession>>,
    ) -> Result<(), DmError> {
        let (inner, external) = both(inner, external)?;
        let pair = CombinationPair::of(inner, external);
        let Some(change) = TopologyChange::for_pair(pair) else {
            error!("no off handler for {:?}", pair);
            return Err(DmError::InvalidCalling);
        };
        debug!("off change {:?}", change);
        let result = match change {
            TopologyChange::InnerMainExternalExtend => {
                self.handle_inner_main_external_extend_change(inner, external)
            }
            TopologyChange::InnerMainExternalMirror => {
                self.handle_inner_main_external_mirror_change(inner, external)
            }
            TopologyChange::InnerExtendExternalMain => {
                self.handle_inner_extend_external_main_change(inner, external)
            }
            TopologyChange::InnerMirrorExternalMain => {
                self.handle_inner_mirror_external_main_change(inner, external)
            }
        };
        self.utils
            .set_external_screen_off_screen_rendering(Some(&**inner), Some(&**external));
        result
    }

    /// Restore the topology captured by the last screen-off.
    pub fn on_recovery_screen_mode_by_power_change(
        &self,
        inner: Option<&Arc<ScreenSession>>,
        external: Option<&Arc<ScreenSession>>,
    ) -> Result<(), DmError> {
        let (inner, external) = both(inner, external)?;
        let pair = self.snapshot();
        let Some(change) = TopologyChange::for_pair(pair) else {
            error!("no recovery handler for {:?}", pair);
            return Err(DmError::InvalidCalling);
        };
        debug!("recovery change {:?}", change);
        let result = match change {
            TopologyChange::InnerMainExternalExtend => {
                self.handle_recovery_inner_main_external_extend_change(inner, external)
            }
            TopologyChange::InnerMainExternalMirror => {
                self.handle_recovery_inner_main_external_mirror_change(inner, external)
            }
            TopologyChange::InnerExtendExternalMain => {
                self.handle_recovery_inner_extend_external_main_change(inner, external)
            }
            TopologyChange::InnerMirrorExternalMain => {
                self.handle_recovery_inner_mirror_external_main_change(inner, external)
            }
        };
        self.utils
            .set_external_screen_off_screen_rendering(Some(&**inner), Some(&**external));
        result
    }

    // =========================================================================
    // Off handlers
    // =========================================================================

    fn client(&self) -> Result<Arc<dyn ClientProxy>, DmError> {
        self.registry.client_proxy().ok_or_else(|| {
            error!("client proxy is null");
            DmError::NullPtr
        })
    }

    fn handle_inner_main_external_extend_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        let client = self.client()?;
        self.utils
            .set_multi_screen_mode_change_tracker(TopologyChange::InnerMainExternalExtend.off_tracker_name());
        if !client.on_extend_display_node_change(inner.screen_id(), external.screen_id()) {
            error!("client failed to change extend display node");
            return Err(DmError::RemoteCreateFailed);
        }
        let utils = &self.utils;
        utils.screen_combination_change(inner, external, ScreenCombination::Extend);
        utils.screen_physical_info_change(inner, external);
        utils.screen_main_position_change(external, inner);
        utils.screen_property_change_notify(Some(&**inner), Some(&**external));
        utils.screen_density_change_notify(Some(&**inner), Some(&**external));
        utils.set_screen_available_status(external, false);
        utils.screen_connection_change(client.as_ref(), external, ScreenEvent::Disconnected);

        let registry = self.registry.clone();
        let power = self.power.clone();
        let (inner, external) = (inner.clone(), external.clone());
        self.power_scheduler.post_async_task(
            move || {
                registry.call_rs_set_screen_power_status_sync(external.rs_id(), ScreenPowerStatus::Off);
                power_on_sync(registry.as_ref(), power.as_ref(), inner.rs_id());
            },
            "rsSetScreenPowerStatusTask",
        );
        Ok(())
    }

    fn handle_inner_main_external_mirror_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        let client = self.client()?;
        self.utils
            .set_multi_screen_mode_change_tracker(TopologyChange::InnerMainExternalMirror.off_tracker_name());
        if !client.on_main_display_node_change(
            inner.screen_id(),
            external.screen_id(),
            external.rs_id(),
        ) {
            error!("client failed to change main display node");
            return Err(DmError::RemoteCreateFailed);
        }
        let utils = &self.utils;
        utils.screen_combination_change(inner, external, ScreenCombination::Mirror);
        utils.screen_physical_info_change(inner, external);
        utils.screen_main_position_change(external, inner);
        utils.screen_property_change_notify(Some(&**inner), Some(&**external));
        utils.screen_density_change_notify(Some(&**inner), None);
        utils.set_screen_available_status(external, false);

        self.registry
            .call_rs_set_screen_power_status_sync(external.rs_id(), ScreenPowerStatus::Off);
        self.call_rs_set_screen_power_status_sync_to_on(inner.rs_id());
        Ok(())
    }

    fn handle_inner_extend_external_main_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        let client = self.client()?;
        self.utils
            .set_multi_screen_mode_change_tracker(TopologyChange::InnerExtendExternalMain.off_tracker_name());
        let utils = &self.utils;
        utils.screen_connection_change(client.as_ref(), inner, ScreenEvent::Disconnected);
        utils.screen_combination_change(external, inner, ScreenCombination::Extend);
        utils.set_screen_available_status(inner, false);

        self.registry
            .call_rs_set_screen_power_status_sync(inner.rs_id(), ScreenPowerStatus::Off);
        self.call_rs_set_screen_power_status_sync_to_on(external.rs_id());
        Ok(())
    }

    fn handle_inner_mirror_external_main_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        let client = self.client()?;
        self.utils
            .set_multi_screen_mode_change_tracker(TopologyChange::InnerMirrorExternalMain.off_tracker_name());
        let utils = &self.utils;
        utils.screen_connection_change(client.as_ref(), inner, ScreenEvent::Disconnected);
        utils.screen_combination_change(external, inner, ScreenCombination::Mirror);
        utils.set_screen_available_status(inner, false);
        self.screen_display_node_remove(inner);

        self.registry
            .call_rs_set_screen_power_status_sync(inner.rs_id(), ScreenPowerStatus::Off);
        self.call_rs_set_screen_power_status_sync_to_on(external.rs_id());
        Ok(())
    }

    // =========================================================================
    // Recovery handlers
    // =========================================================================

    fn handle_recovery_inner_main_external_extend_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        let client = self.client()?;
        self.utils.set_multi_screen_mode_change_tracker(
            TopologyChange::InnerMainExternalExtend.recovery_tracker_name(),
        );
        self.create_external_screen_display_node_only(inner, external, ScreenCombination::Extend);
        if !client.on_create_screen_session_only(
            inner.screen_id(),
            inner.rs_id(),
            &inner.name(),
            inner.is_extend(),
        ) {
            error!("client failed to create screen session");
            return Err(DmError::RemoteCreateFailed);
        }
        if !client.on_extend_display_node_change(inner.screen_id(), external.screen_id()) {
            error!("client failed to change extend display node");
            return Err(DmError::RemoteCreateFailed);
        }
        let utils = &self.utils;
        utils.screen_combination_change(external, inner, ScreenCombination::Extend);
        utils.screen_physical_info_change(inner, external);
        self.screen_to_extend_change(client.as_ref(), inner);
        utils.screen_property_change_notify(Some(&**inner), Some(&**external));
        utils.screen_density_change_notify(Some(&**inner), None);
        utils.screen_extend_position_change(inner, external);
        utils.set_screen_available_status(inner, true);

        self.call_rs_set_screen_power_status_sync_to_on(SCREEN_ID_FULL);
        Ok(())
    }

    fn handle_recovery_inner_main_external_mirror_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        self.utils.set_multi_screen_mode_change_tracker(
            TopologyChange::InnerMainExternalMirror.recovery_tracker_name(),
        );
        self.create_external_screen_display_node_only(inner, external, ScreenCombination::Mirror);
        let client = self.client()?;
        if !client.on_main_display_node_change(
            external.screen_id(),
            inner.screen_id(),
            inner.rs_id(),
        ) {
            error!("client failed to change main display node");
            return Err(DmError::RemoteCreateFailed);
        }
        let utils = &self.utils;
        utils.screen_combination_change(external, inner, ScreenCombination::Mirror);
        utils.screen_physical_info_change(inner, external);
        utils.screen_main_position_change(external, inner);
        utils.screen_property_change_notify(Some(&**inner), Some(&**external));
        utils.screen_density_change_notify(Some(&**inner), None);
        utils.set_screen_available_status(inner, true);

        self.call_rs_set_screen_power_status_sync_to_on(SCREEN_ID_FULL);
        Ok(())
    }

    fn handle_recovery_inner_extend_external_main_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        let client = self.client()?;
        self.utils.set_multi_screen_mode_change_tracker(
            TopologyChange::InnerExtendExternalMain.recovery_tracker_name(),
        );
        self.create_external_screen_display_node_only(inner, external, ScreenCombination::Extend);
        if !client.on_create_screen_session_only(
            inner.screen_id(),
            inner.rs_id(),
            &inner.name(),
            inner.is_extend(),
        ) {
            error!("client failed to create screen session");
            return Err(DmError::RemoteCreateFailed);
        }
        let utils = &self.utils;
        utils.screen_combination_change(external, inner, ScreenCombination::Extend);
        utils.screen_extend_position_change(external, inner);
        utils.set_screen_available_status(inner, true);
        self.screen_to_extend_change(client.as_ref(), inner);

        self.call_rs_set_screen_power_status_sync_to_on(SCREEN_ID_FULL);
        Ok(())
    }

    fn handle_recovery_inner_mirror_external_main_change(
        &self,
        inner: &Arc<ScreenSession>,
        external: &Arc<ScreenSession>,
    ) -> Result<(), DmError> {
        self.utils.set_multi_screen_mode_change_tracker(
            TopologyChange::InnerMirrorExternalMain.recovery_tracker_name(),
        );
        self.create_external_screen_display_node_only(inner, external, ScreenCombination::Mirror);
        self.utils
            .screen_combination_change(external, inner, ScreenCombination::Mirror);
        self.utils.set_screen_available_status(inner, true);

        self.call_rs_set_screen_power_status_sync_to_on(SCREEN_ID_FULL);
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Detach and release a screen's display node, then flush.
    pub fn screen_display_node_remove(&self, session: &ScreenSession) {
        if session.display_node().is_some() {
            self.registry.set_screen_offset(session.screen_id(), 0.0, 0.0);
            session.set_display_node_in_tree(false);
            session.release_display_node();
        } else {
            warn!("screen {} has no display node to remove", session.screen_id());
        }
        self.utils.flush_session(session);
    }

    /// Make `session` an extend screen and announce it to the client.
    pub fn screen_to_extend_change(&self, client: &dyn ClientProxy, session: &ScreenSession) {
        self.utils.create_extend_session(session);
        self.utils
            .screen_connection_change(client, session, ScreenEvent::Connected);
    }

    /// Ask the client to create a bare extend session for `session`.
    pub fn notify_client_create_session_only(
        &self,
        client: &dyn ClientProxy,
        session: &ScreenSession,
    ) -> bool {
        session.set_combination(ScreenCombination::Extend);
        client.on_create_screen_session_only(
            session.screen_id(),
            session.rs_id(),
            &session.name(),
            true,
        )
    }

    /// Give the restored screen a display node, mirroring `external` when
    /// `combination` is mirror.
    pub fn create_external_screen_display_node_only(
        &self,
        inner: &ScreenSession,
        external: &ScreenSession,
        combination: ScreenCombination,
    ) {
        let config = if combination == ScreenCombination::Mirror {
            DisplayNodeConfig {
                rs_id: inner.rs_id(),
                is_mirrored: true,
                mirror_node_id: Some(external.display_node().map_or(0, |node| node.id)),
            }
        } else {
            DisplayNodeConfig {
                rs_id: inner.rs_id(),
                is_mirrored: false,
                mirror_node_id: None,
            }
        };
        inner.reuse_display_node(config);
    }

    /// Power a rendering-service screen on synchronously, unless the device
    /// is asleep or the lid covers the built-in panel.
    pub fn call_rs_set_screen_power_status_sync_to_on(&self, rs_id: ScreenId) {
        power_on_sync(self.registry.as_ref(), self.power.as_ref(), rs_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ClientCall, MockServices, RegistryEvent};

    const ALL_COMBINATIONS: [ScreenCombination; 5] = [
        ScreenCombination::Main,
        ScreenCombination::Mirror,
        ScreenCombination::Extend,
        ScreenCombination::Unique,
        ScreenCombination::Virtual,
    ];

    fn manager(mocks: &MockServices) -> MultiScreenPowerChangeManager {
        MultiScreenPowerChangeManager::new(&mocks.services())
    }

    #[test]
    fn test_off_then_on_restores_main_extend() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (a, b) = mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        let a_property = a.property();

        manager
            .on_multi_screen_power_change_request(
                Some(&a),
                Some(&b),
                MultiScreenPowerSwitchType::ScreenSwitchOff,
            )
            .unwrap();

        assert_eq!(
            manager.snapshot(),
            CombinationPair::new(ScreenCombination::Main, ScreenCombination::Extend)
        );
        // The external panel now backs the main session; the built-in panel's
        // session is withdrawn.
        assert_eq!(a.combination(), ScreenCombination::Main);
        assert_eq!(a.rs_id(), 20);
        assert!(!a.is_internal());
        assert_eq!(b.rs_id(), 10);
        assert!(b.is_internal());
        assert!(!b.is_available());
        assert!(a.is_offscreen_rendering());
        assert!(mocks.client.calls().contains(&ClientCall::ExtendDisplayNodeChange {
            main_id: 0,
            extend_id: 20,
        }));

        assert_eq!(mocks.power_scheduler.pending(), 1);
        mocks.power_scheduler.run_pending();
        assert_eq!(
            mocks.registry.rs_power_sync_events(),
            vec![(10, ScreenPowerStatus::Off), (20, ScreenPowerStatus::On)]
        );

        // Built-in panel back on: it now backs session b.
        manager
            .on_multi_screen_power_change_request(
                Some(&b),
                Some(&a),
                MultiScreenPowerSwitchType::ScreenSwitchOn,
            )
            .unwrap();

        assert_eq!(a.combination(), ScreenCombination::Main);
        assert_eq!(a.rs_id(), 10);
        assert!(a.is_internal());
        assert_eq!(a.name(), "inner");
        assert_eq!(a.property(), a_property);
        assert!(a.is_available());
        assert_eq!(b.combination(), ScreenCombination::Extend);
        assert_eq!(b.rs_id(), 20);
        assert!(b.is_extend());
        assert!(b.is_available());
        assert_eq!(
            mocks.registry.rs_power_sync_events().last(),
            Some(&(SCREEN_ID_FULL, ScreenPowerStatus::On))
        );
        assert!(mocks.registry.events().contains(&RegistryEvent::ModeChangeTracker(
            "RecoveryInnerMainExternalExtendChange".into()
        )));
    }

    #[test]
    fn test_off_and_recovery_tables_share_keys() {
        let mut keys = Vec::new();
        for inner in ALL_COMBINATIONS {
            for external in ALL_COMBINATIONS {
                let pair = CombinationPair::new(inner, external);
                if let Some(change) = TopologyChange::for_pair(pair) {
                    assert_eq!(change.pair(), pair);
                    keys.push(pair);
                }
            }
        }
        assert_eq!(keys.len(), 4);
        for key in &keys {
            // Every off topology names one inner and one external main screen.
            assert!(
                (key.inner == ScreenCombination::Main) ^ (key.external == ScreenCombination::Main)
            );
        }
    }

    #[test]
    fn test_remote_failure_keeps_partial_state() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        manager.set_inner_and_external_combination(
            ScreenCombination::Main,
            ScreenCombination::Extend,
        );
        mocks.client.set_fail_extend_node_change(true);

        let result = manager.on_multi_screen_power_change_request(
            Some(&inner),
            Some(&external),
            MultiScreenPowerSwitchType::ScreenSwitchOn,
        );
        assert!(matches!(result, Err(DmError::RemoteCreateFailed)));

        let calls = mocks.client.calls();
        assert!(matches!(calls[0], ClientCall::CreateScreenSessionOnly { id: 0, .. }));
        assert!(matches!(calls[1], ClientCall::ExtendDisplayNodeChange { .. }));
        assert_eq!(calls.len(), 2);
        assert_eq!(inner.combination(), ScreenCombination::Main);
        assert!(inner.is_offscreen_rendering());
        assert!(mocks.registry.rs_power_sync_events().is_empty());
    }

    #[test]
    fn test_null_sessions() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (inner, _) = mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);

        for switch in [
            MultiScreenPowerSwitchType::ScreenSwitchOn,
            MultiScreenPowerSwitchType::ScreenSwitchOff,
            MultiScreenPowerSwitchType::ScreenSwitchExternal,
        ] {
            assert!(matches!(
                manager.on_multi_screen_power_change_request(Some(&inner), None, switch),
                Err(DmError::NullPtr)
            ));
        }
        assert!(matches!(
            manager.handle_screen_off_change(None, Some(&inner)),
            Err(DmError::NullPtr)
        ));
        assert!(matches!(
            manager.on_recovery_screen_mode_by_power_change(None, None),
            Err(DmError::NullPtr)
        ));
        assert!(mocks.registry.events().is_empty());
        assert_eq!(manager.snapshot(), CombinationPair::default());
    }

    #[test]
    fn test_missing_client_proxy() {
        let mocks = MockServices::new();
        mocks.registry.set_client_proxy(None);
        let manager = manager(&mocks);
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);

        let result = manager.on_multi_screen_power_change_request(
            Some(&inner),
            Some(&external),
            MultiScreenPowerSwitchType::ScreenSwitchOff,
        );
        assert!(matches!(result, Err(DmError::NullPtr)));
        assert_eq!(inner.rs_id(), 10);
    }

    #[test]
    fn test_unknown_pairs_are_invalid() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Main);

        let result = manager.on_multi_screen_power_change_request(
            Some(&inner),
            Some(&external),
            MultiScreenPowerSwitchType::ScreenSwitchExternal,
        );
        assert!(matches!(result, Err(DmError::InvalidCalling)));

        // No screen-off happened, so there is nothing to recover.
        let result = manager.on_multi_screen_power_change_request(
            Some(&inner),
            Some(&external),
            MultiScreenPowerSwitchType::ScreenSwitchOn,
        );
        assert!(matches!(result, Err(DmError::InvalidCalling)));
        assert!(!inner.is_offscreen_rendering());
    }

    #[test]
    fn test_external_switch_uses_live_combinations() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Extend, ScreenCombination::Main);

        manager
            .on_multi_screen_power_change_request(
                Some(&inner),
                Some(&external),
                MultiScreenPowerSwitchType::ScreenSwitchExternal,
            )
            .unwrap();

        assert_eq!(manager.snapshot(), CombinationPair::default());
        assert_eq!(external.combination(), ScreenCombination::Main);
        assert_eq!(inner.combination(), ScreenCombination::Extend);
        assert!(!inner.is_available());
        assert_eq!(
            mocks.registry.rs_power_sync_events(),
            vec![(10, ScreenPowerStatus::Off), (20, ScreenPowerStatus::On)]
        );
        assert!(mocks.registry.events().contains(&RegistryEvent::ModeChangeTracker(
            "InnerExtendExternalMainChange".into()
        )));
    }

    #[test]
    fn test_mirror_off_removes_display_node() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Mirror, ScreenCombination::Main);

        manager
            .on_multi_screen_power_change_request(
                Some(&inner),
                Some(&external),
                MultiScreenPowerSwitchType::ScreenSwitchOff,
            )
            .unwrap();
        assert!(inner.display_node().is_none());
        assert_eq!(inner.combination(), ScreenCombination::Mirror);
        assert_eq!(mocks.render.flushes().last(), Some(&vec![inner.render_context()]));

        manager
            .on_multi_screen_power_change_request(
                Some(&inner),
                Some(&external),
                MultiScreenPowerSwitchType::ScreenSwitchOn,
            )
            .unwrap();
        let node = inner.display_node().unwrap();
        assert!(node.config.is_mirrored);
        assert_eq!(node.config.mirror_node_id, external.display_node().map(|n| n.id));
        assert!(inner.is_available());
    }

    #[test]
    fn test_power_on_gates() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);

        mocks.power.set_screen_on(false);
        mocks.registry.set_system_sleep(true);
        manager.call_rs_set_screen_power_status_sync_to_on(20);
        assert!(mocks.registry.rs_power_sync_events().is_empty());

        mocks.registry.set_system_sleep(false);
        mocks.registry.set_laptop_lid_open(false);
        manager.call_rs_set_screen_power_status_sync_to_on(SCREEN_ID_FULL);
        assert!(mocks.registry.rs_power_sync_events().is_empty());

        manager.call_rs_set_screen_power_status_sync_to_on(20);
        assert_eq!(
            mocks.registry.rs_power_sync_events(),
            vec![(20, ScreenPowerStatus::On)]
        );
    }

    #[test]
    fn test_notify_client_create_session_only() {
        let mocks = MockServices::new();
        let manager = manager(&mocks);
        let (_, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Mirror);

        assert!(manager.notify_client_create_session_only(mocks.client.as_ref(), &external));
        assert_eq!(external.combination(), ScreenCombination::Extend);
        assert_eq!(
            mocks.client.calls(),
            vec![ClientCall::CreateScreenSessionOnly {
                id: 20,
                rs_id: 20,
                name: "external".into(),
                is_extend: true,
            }]
        );
    }
}
