//! Primitive session mutations used by multi-screen topology changes.
//!
//! Every operation touches one or two [`ScreenSession`]s and the registry or
//! render adapter. None of them fail: a missing physical session or display
//! node is logged and the step is skipped.

use crate::services::{ClientProxy, RenderCommitAdapter, ScreenRegistry};
use crate::session::{DisplayNodeConfig, ScreenSession};
use crate::types::{
    DisplayChangeEvent, ScreenChangeEvent, ScreenCombination, ScreenEvent,
    ScreenPropertyChangeReason, SessionOption,
};

use log::{error, info, warn};
use std::sync::Arc;

/// Session mutations shared by the multi-screen managers.
#[derive(Clone)]
pub struct MultiScreenChangeUtils {
    registry: Arc<dyn ScreenRegistry>,
    render: Arc<dyn RenderCommitAdapter>,
}

impl MultiScreenChangeUtils {
    /// Create the toolbox over the given registry and render adapter.
    pub fn new(registry: Arc<dyn ScreenRegistry>, render: Arc<dyn RenderCommitAdapter>) -> Self {
        Self { registry, render }
    }

    // =========================================================================
    // Combination and physical identity
    // =========================================================================

    /// Make `inner` the main screen and give `external` `combination`, then
    /// tell the client.
    pub fn screen_combination_change(
        &self,
        inner: &ScreenSession,
        external: &ScreenSession,
        combination: ScreenCombination,
    ) {
        inner.set_combination(ScreenCombination::Main);
        inner.set_is_extend(false);
        external.set_combination(combination);
        external.set_is_extend(true);
        info!(
            "screen {} is main, screen {} is {:?}",
            inner.screen_id(),
            external.screen_id(),
            combination
        );

        match self.registry.client_proxy() {
            Some(client) => {
                client.set_screen_combination(inner.screen_id(), external.screen_id(), combination)
            }
            None => error!("client proxy is null, combination not sent"),
        }
    }

    /// Swap everything that describes the backing panel between two sessions.
    pub fn screen_physical_info_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        self.screen_property_change(inner, external);
        self.exchange_screen_supported_refresh_rate(inner, external);
        self.screen_rs_id_change(inner, external);
        self.screen_name_change(inner, external);
        self.screen_serial_number_change(inner, external);
        self.screen_active_modes_change(inner, external);
        self.set_screen_notify_flag(inner, external);
        info!(
            "physical info swapped: screen {} rs {} {:?}, screen {} rs {} {:?}",
            inner.screen_id(),
            inner.rs_id(),
            inner.name(),
            external.screen_id(),
            external.rs_id(),
            external.name()
        );
    }

    fn physical_pair(
        &self,
        inner: &ScreenSession,
        external: &ScreenSession,
    ) -> Option<(Arc<ScreenSession>, Arc<ScreenSession>)> {
        let inner_phy = self.registry.get_physical_screen_session(inner.rs_id());
        let external_phy = self.registry.get_physical_screen_session(external.rs_id());
        match (inner_phy, external_phy) {
            (Some(i), Some(e)) => Some((i, e)),
            _ => {
                error!(
                    "physical session missing for rs {} or rs {}",
                    inner.rs_id(),
                    external.rs_id()
                );
                None
            }
        }
    }

    /// Give each session the physical property of the other's panel.
    pub fn screen_property_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        let Some((inner_phy, external_phy)) = self.physical_pair(inner, external) else {
            return;
        };
        inner.set_property(external_phy.property());
        external.set_property(inner_phy.property());
    }

    /// Swap supported refresh rates, read from the physical sessions.
    pub fn exchange_screen_supported_refresh_rate(
        &self,
        inner: &ScreenSession,
        external: &ScreenSession,
    ) {
        let Some((inner_phy, external_phy)) = self.physical_pair(inner, external) else {
            return;
        };
        inner.set_supported_refresh_rates(external_phy.supported_refresh_rates());
        external.set_supported_refresh_rates(inner_phy.supported_refresh_rates());
    }

    /// Swap rendering ids and the built-in flag. The registry's id mapping is
    /// updated first, while the sessions still hold their old ids.
    pub fn screen_rs_id_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        self.registry.update_screen_id_manager(inner, external);

        let inner_rs_id = inner.rs_id();
        inner.set_rs_id(external.rs_id());
        external.set_rs_id(inner_rs_id);

        let inner_is_internal = inner.is_internal();
        inner.set_is_internal(external.is_internal());
        external.set_is_internal(inner_is_internal);
    }

    /// Swap names.
    pub fn screen_name_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        let inner_name = inner.name();
        inner.set_name(external.name());
        external.set_name(inner_name);
    }

    /// Swap serial numbers.
    pub fn screen_serial_number_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        let inner_serial = inner.serial_number();
        inner.set_serial_number(external.serial_number());
        external.set_serial_number(inner_serial);
    }

    /// Swap supported modes and active mode ids.
    pub fn screen_active_modes_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        let inner_modes = inner.modes();
        inner.set_modes(external.modes());
        external.set_modes(inner_modes);

        let inner_active = inner.active_id();
        inner.set_active_id(external.active_id());
        external.set_active_id(inner_active);
    }

    /// Mark both sessions' available areas for notification.
    pub fn set_screen_notify_flag(&self, inner: &ScreenSession, external: &ScreenSession) {
        inner.set_available_area_need_notify(true);
        external.set_available_area_need_notify(true);
    }

    // =========================================================================
    // Position and notification
    // =========================================================================

    /// Stack both screens at the origin and publish the new size.
    pub fn screen_main_position_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        for session in [inner, external] {
            session.set_position(0, 0);
            session.property_change(ScreenPropertyChangeReason::RelativePositionChange);
        }
        if inner.display_node().is_some() && external.display_node().is_some() {
            self.registry.set_screen_offset(inner.screen_id(), 0.0, 0.0);
            self.registry.set_screen_offset(external.screen_id(), 0.0, 0.0);
        } else {
            warn!("display node is null, offsets not applied");
        }
        self.render
            .flush_implicit_transaction(&[inner.render_context(), external.render_context()]);
        for session in [inner, external] {
            self.registry
                .notify_display_changed(session.display_info(), DisplayChangeEvent::DisplaySizeChanged);
        }
    }

    /// Apply each screen's start position as its offset.
    pub fn screen_extend_position_change(&self, inner: &ScreenSession, external: &ScreenSession) {
        inner.property_change(ScreenPropertyChangeReason::RelativePositionChange);
        external.property_change(ScreenPropertyChangeReason::RelativePositionChange);
        if inner.display_node().is_some() && external.display_node().is_some() {
            for session in [inner, external] {
                let property = session.property();
                self.registry.set_screen_offset(
                    session.screen_id(),
                    property.start_x as f32,
                    property.start_y as f32,
                );
            }
        } else {
            warn!("display node is null, offsets not applied");
        }
        self.render
            .flush_implicit_transaction(&[inner.render_context(), external.render_context()]);
    }

    /// Commit one session's pending render mutations.
    pub fn flush_session(&self, session: &ScreenSession) {
        self.render
            .flush_implicit_transaction(&[session.render_context()]);
    }

    /// Publish a mode change for each present screen.
    pub fn screen_property_change_notify(
        &self,
        inner: Option<&ScreenSession>,
        external: Option<&ScreenSession>,
    ) {
        for session in [inner, external].into_iter().flatten() {
            session.property_change(ScreenPropertyChangeReason::ChangeMode);
            self.registry
                .notify_screen_changed(session.display_info(), ScreenChangeEvent::ChangeMode);
            self.registry
                .notify_display_changed(session.display_info(), DisplayChangeEvent::DisplaySizeChanged);
        }
    }

    /// Re-apply each present screen's density.
    pub fn screen_density_change_notify(
        &self,
        inner: Option<&ScreenSession>,
        external: Option<&ScreenSession>,
    ) {
        for session in [inner, external].into_iter().flatten() {
            self.registry
                .set_virtual_pixel_ratio(session.screen_id(), session.property().virtual_pixel_ratio);
        }
    }

    /// Publish or withdraw a screen.
    pub fn set_screen_available_status(&self, session: &ScreenSession, available: bool) {
        info!("screen {} available: {}", session.screen_id(), available);
        session.set_available(available);
        if available {
            self.registry.notify_display_create(session.display_info());
        } else {
            self.registry.notify_display_destroy(session.screen_id());
        }
    }

    /// Mark each present screen for off-screen composition.
    pub fn set_external_screen_off_screen_rendering(
        &self,
        inner: Option<&ScreenSession>,
        external: Option<&ScreenSession>,
    ) {
        for session in [inner, external].into_iter().flatten() {
            session.set_offscreen_rendering();
        }
    }

    // =========================================================================
    // Session roles
    // =========================================================================

    /// Turn `session` into a mirror of `main`'s display node.
    pub fn create_mirror_session(&self, main: &ScreenSession, session: &ScreenSession) {
        let Some(node) = main.display_node() else {
            error!("main screen {} has no display node", main.screen_id());
            return;
        };
        session.set_combination(ScreenCombination::Mirror);
        session.set_is_extend(true);
        session.reuse_display_node(DisplayNodeConfig {
            rs_id: session.rs_id(),
            is_mirrored: true,
            mirror_node_id: Some(node.id),
        });
    }

    /// Turn `session` into an extend screen with its own display node.
    pub fn create_extend_session(&self, session: &ScreenSession) {
        session.set_is_extend(true);
        session.set_combination(ScreenCombination::Extend);
        session.reuse_display_node(DisplayNodeConfig {
            rs_id: session.rs_id(),
            is_mirrored: false,
            mirror_node_id: None,
        });
    }

    /// Tell the client a screen connected or disconnected.
    pub fn screen_connection_change(
        &self,
        client: &dyn ClientProxy,
        session: &ScreenSession,
        event: ScreenEvent,
    ) {
        let option = SessionOption {
            rs_id: session.rs_id(),
            name: session.name(),
            is_extend: session.is_extend(),
            screen_id: session.screen_id(),
        };
        client.on_screen_connection_changed(option, event);
    }

    /// Record which topology change is in progress.
    pub fn set_multi_screen_mode_change_tracker(&self, change: &str) {
        self.registry.set_multi_screen_mode_change_tracker(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ClientCall, MockServices, RegistryEvent};

    fn utils(mocks: &MockServices) -> MultiScreenChangeUtils {
        MultiScreenChangeUtils::new(mocks.registry.clone(), mocks.render.clone())
    }

    #[test]
    fn test_physical_info_change_swaps_identity() {
        let mocks = MockServices::new();
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        let inner_property = inner.property();
        let external_property = external.property();

        utils(&mocks).screen_physical_info_change(&inner, &external);

        assert_eq!(inner.rs_id(), 20);
        assert_eq!(external.rs_id(), 10);
        assert!(!inner.is_internal());
        assert!(external.is_internal());
        assert_eq!(inner.name(), "external");
        assert_eq!(external.serial_number(), "SN-INNER");
        assert_eq!(inner.property(), external_property);
        assert_eq!(external.property(), inner_property);
        assert_eq!(inner.supported_refresh_rates(), vec![30, 60]);
        assert_eq!(inner.active_id(), 4);
        assert!(inner.available_area_need_notify());
        assert!(external.available_area_need_notify());
        assert_eq!(
            mocks.registry.events(),
            vec![RegistryEvent::ScreenIdManagerUpdate(0, 20)]
        );
    }

    #[test]
    fn test_property_change_skipped_without_physical_session() {
        let mocks = MockServices::new();
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        external.set_rs_id(99);
        let before = inner.property();

        utils(&mocks).screen_property_change(&inner, &external);
        assert_eq!(inner.property(), before);
    }

    #[test]
    fn test_combination_change_notifies_client() {
        let mocks = MockServices::new();
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Extend, ScreenCombination::Main);

        utils(&mocks).screen_combination_change(&inner, &external, ScreenCombination::Mirror);

        assert_eq!(inner.combination(), ScreenCombination::Main);
        assert!(!inner.is_extend());
        assert_eq!(external.combination(), ScreenCombination::Mirror);
        assert!(external.is_extend());
        assert_eq!(
            mocks.client.calls(),
            vec![ClientCall::SetScreenCombination {
                main_id: 0,
                extend_id: 20,
                combination: ScreenCombination::Mirror,
            }]
        );
    }

    #[test]
    fn test_main_position_change_flushes_once() {
        let mocks = MockServices::new();
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        external.set_position(1260, 0);

        utils(&mocks).screen_main_position_change(&external, &inner);

        assert_eq!(external.property().start_x, 0);
        assert_eq!(
            inner.last_change_reason(),
            Some(ScreenPropertyChangeReason::RelativePositionChange)
        );
        assert_eq!(mocks.render.flushes().len(), 1);
        let events = mocks.registry.events();
        assert!(events.contains(&RegistryEvent::ScreenOffset(20, 0.0, 0.0)));
        assert!(events.contains(&RegistryEvent::DisplayChanged(
            0,
            DisplayChangeEvent::DisplaySizeChanged
        )));
    }

    #[test]
    fn test_extend_position_change_uses_start_position() {
        let mocks = MockServices::new();
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        external.set_position(1260, 0);

        utils(&mocks).screen_extend_position_change(&inner, &external);
        assert!(mocks
            .registry
            .events()
            .contains(&RegistryEvent::ScreenOffset(20, 1260.0, 0.0)));

        mocks.registry.clear_events();
        external.release_display_node();
        utils(&mocks).screen_extend_position_change(&inner, &external);
        assert!(mocks.registry.events().is_empty());
        assert_eq!(mocks.render.flushes().len(), 2);
    }

    #[test]
    fn test_notify_helpers_skip_missing_sessions() {
        let mocks = MockServices::new();
        let (inner, _) = mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        let utils = utils(&mocks);

        utils.screen_property_change_notify(None, None);
        utils.screen_density_change_notify(None, None);
        utils.set_external_screen_off_screen_rendering(None, None);
        assert!(mocks.registry.events().is_empty());

        utils.screen_density_change_notify(Some(&*inner), None);
        utils.set_external_screen_off_screen_rendering(Some(&*inner), None);
        assert_eq!(
            mocks.registry.events(),
            vec![RegistryEvent::VirtualPixelRatio(0, 3.0)]
        );
        assert!(inner.is_offscreen_rendering());
    }

    #[test]
    fn test_mirror_and_extend_sessions() {
        let mocks = MockServices::new();
        let (inner, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        let utils = utils(&mocks);
        let main_node = inner.display_node().unwrap().id;

        utils.create_mirror_session(&inner, &external);
        let node = external.display_node().unwrap();
        assert_eq!(external.combination(), ScreenCombination::Mirror);
        assert!(node.config.is_mirrored);
        assert_eq!(node.config.mirror_node_id, Some(main_node));

        utils.create_extend_session(&external);
        let node = external.display_node().unwrap();
        assert_eq!(external.combination(), ScreenCombination::Extend);
        assert!(!node.config.is_mirrored);

        inner.release_display_node();
        external.set_combination(ScreenCombination::Extend);
        utils.create_mirror_session(&inner, &external);
        assert_eq!(external.combination(), ScreenCombination::Extend);
    }

    #[test]
    fn test_available_status_and_connection() {
        let mocks = MockServices::new();
        let (_, external) =
            mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
        let utils = utils(&mocks);

        utils.set_screen_available_status(&external, false);
        assert!(!external.is_available());
        utils.set_screen_available_status(&external, true);
        assert_eq!(
            mocks.registry.events(),
            vec![
                RegistryEvent::DisplayDestroy(20),
                RegistryEvent::DisplayCreate(20)
            ]
        );

        utils.screen_connection_change(mocks.client.as_ref(), &external, ScreenEvent::Disconnected);
        assert_eq!(
            mocks.client.calls(),
            vec![ClientCall::ScreenConnectionChanged {
                option: SessionOption {
                    rs_id: 20,
                    name: "external".into(),
                    is_extend: true,
                    screen_id: 20,
                },
                event: ScreenEvent::Disconnected,
            }]
        );
    }
}
