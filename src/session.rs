//! Screen session objects shared between the policy, the managers and the registry.

use crate::types::{
    DisplayInfo, DisplayOrientation, FoldDisplayMode, NodeId, Rotation, ScreenCombination,
    ScreenId, ScreenProperty, ScreenPropertyChangeReason, SupportedScreenMode,
};

use parking_lot::Mutex;

/// Handle of the rendering context a session's mutations are committed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderContext(pub ScreenId);

/// Configuration of a render display node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayNodeConfig {
    /// Rendering id of the panel the node draws to.
    pub rs_id: ScreenId,
    /// Whether the node mirrors another node.
    pub is_mirrored: bool,
    /// Node being mirrored, when `is_mirrored`.
    pub mirror_node_id: Option<NodeId>,
}

/// A render display node attached to a screen session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    /// Node id.
    pub id: NodeId,
    /// Node configuration.
    pub config: DisplayNodeConfig,
    /// Whether the node is attached to the composition tree.
    pub in_tree: bool,
}

#[derive(Debug, Clone)]
struct SessionData {
    rs_id: ScreenId,
    name: String,
    serial_number: String,
    combination: ScreenCombination,
    is_extend: bool,
    is_internal: bool,
    available: bool,
    property: ScreenProperty,
    supported_refresh_rates: Vec<u32>,
    modes: Vec<SupportedScreenMode>,
    active_id: i32,
    display_node: Option<DisplayNode>,
    phy_screen_id: ScreenId,
    offscreen_rendering: bool,
    available_area_need_notify: bool,
    last_change_reason: Option<ScreenPropertyChangeReason>,
    last_fold_mode: Option<FoldDisplayMode>,
}

/// Builder-style description used to create a [`ScreenSession`].
#[derive(Debug, Clone, Default)]
pub struct ScreenSessionSpec {
    /// Logical screen id.
    pub screen_id: ScreenId,
    /// Rendering id of the backing panel.
    pub rs_id: ScreenId,
    /// Screen name.
    pub name: String,
    /// Panel serial number.
    pub serial_number: String,
    /// Initial combination.
    pub combination: ScreenCombination,
    /// Whether the screen is the built-in panel.
    pub is_internal: bool,
    /// Initial property.
    pub property: ScreenProperty,
    /// Refresh rates the panel supports.
    pub supported_refresh_rates: Vec<u32>,
    /// Modes the panel supports.
    pub modes: Vec<SupportedScreenMode>,
    /// Active mode id.
    pub active_id: i32,
}

/// A logical screen.
///
/// The logical id never changes; everything else describes the physical
/// panel currently assigned to the role and may be swapped between sessions
/// during a topology change. All mutators synchronize internally.
#[derive(Debug)]
pub struct ScreenSession {
    screen_id: ScreenId,
    data: Mutex<SessionData>,
}

impl ScreenSession {
    /// Create a session from a description.
    pub fn new(spec: ScreenSessionSpec) -> Self {
        let is_extend = matches!(
            spec.combination,
            ScreenCombination::Extend | ScreenCombination::Mirror
        );
        Self {
            screen_id: spec.screen_id,
            data: Mutex::new(SessionData {
                rs_id: spec.rs_id,
                name: spec.name,
                serial_number: spec.serial_number,
                combination: spec.combination,
                is_extend,
                is_internal: spec.is_internal,
                available: true,
                property: spec.property,
                supported_refresh_rates: spec.supported_refresh_rates,
                modes: spec.modes,
                active_id: spec.active_id,
                display_node: None,
                phy_screen_id: spec.screen_id,
                offscreen_rendering: false,
                available_area_need_notify: false,
                last_change_reason: None,
                last_fold_mode: None,
            }),
        }
    }

    /// Logical screen id.
    pub fn screen_id(&self) -> ScreenId {
        self.screen_id
    }

    /// Render context used to flush this session's mutations.
    pub fn render_context(&self) -> RenderContext {
        RenderContext(self.screen_id)
    }

    /// Rendering id of the backing panel.
    pub fn rs_id(&self) -> ScreenId {
        self.data.lock().rs_id
    }

    /// Setter for [`Self::rs_id`].
    pub fn set_rs_id(&self, rs_id: ScreenId) {
        self.data.lock().rs_id = rs_id;
    }

    /// Screen name.
    pub fn name(&self) -> String {
        self.data.lock().name.clone()
    }

    /// Setter for [`Self::name`].
    pub fn set_name(&self, name: String) {
        self.data.lock().name = name;
    }

    /// Panel serial number.
    pub fn serial_number(&self) -> String {
        self.data.lock().serial_number.clone()
    }

    /// Setter for [`Self::serial_number`].
    pub fn set_serial_number(&self, serial_number: String) {
        self.data.lock().serial_number = serial_number;
    }

    /// Current combination.
    pub fn combination(&self) -> ScreenCombination {
        self.data.lock().combination
    }

    /// Setter for [`Self::combination`].
    pub fn set_combination(&self, combination: ScreenCombination) {
        self.data.lock().combination = combination;
    }

    /// Whether the screen extends or mirrors the main screen.
    pub fn is_extend(&self) -> bool {
        self.data.lock().is_extend
    }

    /// Setter for [`Self::is_extend`].
    pub fn set_is_extend(&self, is_extend: bool) {
        self.data.lock().is_extend = is_extend;
    }

    /// Whether the backing panel is the built-in one.
    pub fn is_internal(&self) -> bool {
        self.data.lock().is_internal
    }

    /// Setter for [`Self::is_internal`].
    pub fn set_is_internal(&self, is_internal: bool) {
        self.data.lock().is_internal = is_internal;
    }

    /// Whether the screen is published to display listeners.
    pub fn is_available(&self) -> bool {
        self.data.lock().available
    }

    /// Setter for [`Self::is_available`].
    pub fn set_available(&self, available: bool) {
        self.data.lock().available = available;
    }

    /// Property snapshot.
    pub fn property(&self) -> ScreenProperty {
        self.data.lock().property.clone()
    }

    /// Setter for [`Self::property`].
    pub fn set_property(&self, property: ScreenProperty) {
        self.data.lock().property = property;
    }

    /// Copy fold-controlled geometry (bounds, valid size, refresh rate) from a
    /// physical panel property, keeping orientation and position.
    pub fn update_property_by_fold_control(&self, phy: &ScreenProperty) {
        let mut data = self.data.lock();
        data.property.bounds = phy.bounds;
        data.property.valid_width = phy.bounds.width as u32;
        data.property.valid_height = phy.bounds.height as u32;
        data.property.refresh_rate = phy.refresh_rate;
    }

    /// Set the valid drawing size.
    pub fn set_valid_size(&self, width: u32, height: u32) {
        let mut data = self.data.lock();
        data.property.valid_width = width;
        data.property.valid_height = height;
    }

    /// Set the logical rotation.
    pub fn set_rotation(&self, rotation: Rotation) {
        self.data.lock().property.rotation = rotation;
    }

    /// Set the display orientation.
    pub fn set_display_orientation(&self, orientation: DisplayOrientation) {
        self.data.lock().property.display_orientation = orientation;
    }

    /// Set both start position and xy position.
    pub fn set_position(&self, x: u32, y: u32) {
        let mut data = self.data.lock();
        data.property.start_x = x;
        data.property.start_y = y;
        data.property.x = f64::from(x);
        data.property.y = f64::from(y);
    }

    /// Refresh rates the backing panel supports.
    pub fn supported_refresh_rates(&self) -> Vec<u32> {
        self.data.lock().supported_refresh_rates.clone()
    }

    /// Setter for [`Self::supported_refresh_rates`].
    pub fn set_supported_refresh_rates(&self, rates: Vec<u32>) {
        self.data.lock().supported_refresh_rates = rates;
    }

    /// Modes the backing panel supports.
    pub fn modes(&self) -> Vec<SupportedScreenMode> {
        self.data.lock().modes.clone()
    }

    /// Setter for [`Self::modes`].
    pub fn set_modes(&self, modes: Vec<SupportedScreenMode>) {
        self.data.lock().modes = modes;
    }

    /// Active mode id.
    pub fn active_id(&self) -> i32 {
        self.data.lock().active_id
    }

    /// Setter for [`Self::active_id`].
    pub fn set_active_id(&self, active_id: i32) {
        self.data.lock().active_id = active_id;
    }

    /// Physical screen currently backing a fold session.
    pub fn phy_screen_id(&self) -> ScreenId {
        self.data.lock().phy_screen_id
    }

    /// Setter for [`Self::phy_screen_id`].
    pub fn set_phy_screen_id(&self, id: ScreenId) {
        self.data.lock().phy_screen_id = id;
    }

    /// Attached display node, if any.
    pub fn display_node(&self) -> Option<DisplayNode> {
        self.data.lock().display_node.clone()
    }

    /// Setter for [`Self::display_node`].
    pub fn set_display_node(&self, node: Option<DisplayNode>) {
        self.data.lock().display_node = node;
    }

    /// Create a display node with `config`, or reconfigure the existing one.
    pub fn reuse_display_node(&self, config: DisplayNodeConfig) {
        let mut data = self.data.lock();
        match data.display_node.as_mut() {
            Some(node) => node.config = config,
            None => {
                data.display_node = Some(DisplayNode {
                    id: config.rs_id + 1,
                    config,
                    in_tree: true,
                })
            }
        }
    }

    /// Detach and drop the display node.
    pub fn release_display_node(&self) {
        self.data.lock().display_node = None;
    }

    /// Attach or detach the display node. Returns false when there is no node.
    pub fn set_display_node_in_tree(&self, in_tree: bool) -> bool {
        let mut data = self.data.lock();
        match data.display_node.as_mut() {
            Some(node) => {
                node.in_tree = in_tree;
                true
            }
            None => false,
        }
    }

    /// Whether the screen is marked for off-screen composition.
    pub fn is_offscreen_rendering(&self) -> bool {
        self.data.lock().offscreen_rendering
    }

    /// Mark the screen for off-screen composition.
    pub fn set_offscreen_rendering(&self) {
        self.data.lock().offscreen_rendering = true;
    }

    /// Whether available-area listeners must be notified.
    pub fn available_area_need_notify(&self) -> bool {
        self.data.lock().available_area_need_notify
    }

    /// Setter for [`Self::available_area_need_notify`].
    pub fn set_available_area_need_notify(&self, notify: bool) {
        self.data.lock().available_area_need_notify = notify;
    }

    /// Record a property change for listeners of this session.
    pub fn property_change(&self, reason: ScreenPropertyChangeReason) {
        self.data.lock().last_change_reason = Some(reason);
    }

    /// Apply a fold property change delivered through the client proxy.
    pub fn notify_fold_property_change(
        &self,
        phy: &ScreenProperty,
        reason: ScreenPropertyChangeReason,
        mode: FoldDisplayMode,
    ) {
        self.update_property_by_fold_control(phy);
        let mut data = self.data.lock();
        data.last_change_reason = Some(reason);
        data.last_fold_mode = Some(mode);
    }

    /// Last property-change reason seen by this session.
    pub fn last_change_reason(&self) -> Option<ScreenPropertyChangeReason> {
        self.data.lock().last_change_reason
    }

    /// Display mode attached to the last fold property change.
    pub fn last_fold_mode(&self) -> Option<FoldDisplayMode> {
        self.data.lock().last_fold_mode
    }

    /// Snapshot for display listeners.
    pub fn display_info(&self) -> DisplayInfo {
        let data = self.data.lock();
        DisplayInfo {
            screen_id: self.screen_id,
            rs_id: data.rs_id,
            name: data.name.clone(),
            width: data.property.bounds.width,
            height: data.property.bounds.height,
            rotation: data.property.rotation,
            orientation: data.property.display_orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bounds;

    fn session() -> ScreenSession {
        ScreenSession::new(ScreenSessionSpec {
            screen_id: 0,
            rs_id: 10,
            name: "inner".into(),
            combination: ScreenCombination::Main,
            is_internal: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_reuse_display_node_keeps_id() {
        let s = session();
        s.reuse_display_node(DisplayNodeConfig {
            rs_id: 10,
            is_mirrored: false,
            mirror_node_id: None,
        });
        let id = s.display_node().unwrap().id;

        s.reuse_display_node(DisplayNodeConfig {
            rs_id: 10,
            is_mirrored: true,
            mirror_node_id: Some(99),
        });
        let node = s.display_node().unwrap();
        assert_eq!(node.id, id);
        assert!(node.config.is_mirrored);

        s.release_display_node();
        assert!(!s.set_display_node_in_tree(true));
    }

    #[test]
    fn test_update_property_by_fold_control() {
        let s = session();
        s.set_display_orientation(DisplayOrientation::Landscape);
        let phy = ScreenProperty {
            bounds: Bounds {
                width: 1080.0,
                height: 2504.0,
            },
            refresh_rate: 120,
            ..Default::default()
        };
        s.update_property_by_fold_control(&phy);

        let p = s.property();
        assert_eq!(p.valid_width, 1080);
        assert_eq!(p.valid_height, 2504);
        assert_eq!(p.refresh_rate, 120);
        assert_eq!(p.display_orientation, DisplayOrientation::Landscape);
    }
}
