//! Core display-management types.

/// Logical screen identifier.
pub type ScreenId = u64;

/// Rendering-subsystem node identifier.
pub type NodeId = u64;

/// Logical id of the full (inner, unfolded) screen.
pub const SCREEN_ID_FULL: ScreenId = 0;

/// Logical id of the main (outer, folded) screen.
pub const SCREEN_ID_MAIN: ScreenId = 5;

/// Sensor-derived hinge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FoldStatus {
    /// No sensor reading yet.
    #[default]
    Unknown = 0,
    /// Fully unfolded.
    Expand = 1,
    /// Fully folded.
    Folded = 2,
    /// Partially folded.
    HalfFold = 3,
}

impl FoldStatus {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Expand,
            2 => Self::Folded,
            3 => Self::HalfFold,
            _ => Self::Unknown,
        }
    }
}

/// Logical screen configuration presented to apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FoldDisplayMode {
    /// Not yet determined.
    #[default]
    Unknown = 0,
    /// Full inner screen.
    Full = 1,
    /// Outer screen only.
    Main = 2,
    /// Inner and outer screens as one surface.
    GlobalFull = 4,
    /// Secondary screen powered for cross-device coordination.
    Coordination = 5,
}

impl FoldDisplayMode {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Full,
            2 => Self::Main,
            4 => Self::GlobalFull,
            5 => Self::Coordination,
            _ => Self::Unknown,
        }
    }
}

/// Matches a fold status to the display mode it implies.
///
/// Anything other than expanded, folded or half-folded maps to
/// [`FoldDisplayMode::Unknown`].
pub fn mode_for_fold_status(status: FoldStatus) -> FoldDisplayMode {
    match status {
        FoldStatus::Expand | FoldStatus::HalfFold => FoldDisplayMode::Full,
        FoldStatus::Folded => FoldDisplayMode::Main,
        FoldStatus::Unknown => FoldDisplayMode::Unknown,
    }
}

/// Device posture status published alongside a display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    /// No mapping for the current mode.
    #[default]
    Unknown,
    /// Folded posture.
    Folded,
    /// Expanded posture.
    Expand,
    /// Global-full posture.
    GlobalFull,
}

impl From<FoldDisplayMode> for DeviceStatus {
    fn from(mode: FoldDisplayMode) -> Self {
        match mode {
            FoldDisplayMode::Main => Self::Folded,
            FoldDisplayMode::Full => Self::Expand,
            FoldDisplayMode::GlobalFull => Self::GlobalFull,
            _ => Self::Unknown,
        }
    }
}

/// Why a display-mode change was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayModeChangeReason {
    /// Ordinary sensor or user request.
    #[default]
    Default,
    /// Recovery after a screen-off cycle; the device is not woken.
    Recover,
}

/// Compositional role a screen plays relative to another screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenCombination {
    /// Primary screen.
    #[default]
    Main,
    /// Mirrors the main screen.
    Mirror,
    /// Extends the main screen.
    Extend,
    /// Standalone screen.
    Unique,
    /// Virtual screen.
    Virtual,
}

/// Trigger for a multi-screen power change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiScreenPowerSwitchType {
    /// Inner screen switched back on.
    ScreenSwitchOn,
    /// Inner screen switched off.
    ScreenSwitchOff,
    /// Settings switched to the external screen only.
    ScreenSwitchExternal,
}

/// Physical power state of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenPowerStatus {
    /// Powered on.
    On,
    /// Powered off.
    #[default]
    Off,
}

/// Screen connection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    /// Screen connected.
    Connected,
    /// Screen disconnected.
    Disconnected,
}

/// Why a screen property changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenPropertyChangeReason {
    /// Device folded onto the main screen.
    FoldScreenFolding,
    /// Device expanded onto the full screen.
    FoldScreenExpand,
    /// Multi-screen mode changed.
    ChangeMode,
    /// Relative screen position changed.
    RelativePositionChange,
}

/// Display change event published to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayChangeEvent {
    /// Display size changed.
    DisplaySizeChanged,
}

/// Screen change event published to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenChangeEvent {
    /// Screen mode changed.
    ChangeMode,
}

/// Why the device is being woken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeupReason {
    /// Generic application request.
    Application,
    /// Tent-mode posture change.
    TentModeChange,
}

/// Logical display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayOrientation {
    /// Portrait.
    #[default]
    Portrait,
    /// Landscape.
    Landscape,
    /// Portrait, upside down.
    PortraitInverted,
    /// Landscape, upside down.
    LandscapeInverted,
    /// Orientation not known.
    Unknown,
}

/// Screen rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Rotation0,
    /// 90 degrees.
    Rotation90,
    /// 180 degrees.
    Rotation180,
    /// 270 degrees.
    Rotation270,
}

/// Integer rectangle in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmRect {
    /// Left edge.
    pub pos_x: i32,
    /// Top edge.
    pub pos_y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl DmRect {
    /// Create a rectangle.
    pub const fn new(pos_x: i32, pos_y: i32, width: u32, height: u32) -> Self {
        Self {
            pos_x,
            pos_y,
            width,
            height,
        }
    }
}

/// Screen bounds in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// A supported resolution/refresh combination of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedScreenMode {
    /// Mode id.
    pub id: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Refresh rate in Hz.
    pub refresh_rate: u32,
}

/// Geometry and orientation snapshot of a screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenProperty {
    /// Panel bounds.
    pub bounds: Bounds,
    /// Valid drawing width.
    pub valid_width: u32,
    /// Valid drawing height.
    pub valid_height: u32,
    /// Start position x in the combined coordinate space.
    pub start_x: u32,
    /// Start position y in the combined coordinate space.
    pub start_y: u32,
    /// Position x of the screen.
    pub x: f64,
    /// Position y of the screen.
    pub y: f64,
    /// Logical rotation.
    pub rotation: Rotation,
    /// Rotation reported by the device sensor.
    pub device_rotation: Rotation,
    /// Display orientation.
    pub display_orientation: DisplayOrientation,
    /// Density.
    pub virtual_pixel_ratio: f32,
    /// Current refresh rate in Hz.
    pub refresh_rate: u32,
}

/// Snapshot of a screen published to display listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    /// Logical screen id.
    pub screen_id: ScreenId,
    /// Rendering id of the backing panel.
    pub rs_id: ScreenId,
    /// Screen name.
    pub name: String,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Rotation.
    pub rotation: Rotation,
    /// Orientation.
    pub orientation: DisplayOrientation,
}

/// Refresh-rate voting event sent to the rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRateEvent {
    /// Voter name.
    pub event_name: &'static str,
    /// Whether the vote is active.
    pub event_status: bool,
    /// Minimum refresh rate.
    pub min_refresh_rate: u32,
    /// Maximum refresh rate.
    pub max_refresh_rate: u32,
}

/// Session description passed to the client on connection changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOption {
    /// Rendering id.
    pub rs_id: ScreenId,
    /// Screen name.
    pub name: String,
    /// Whether the screen extends the main screen.
    pub is_extend: bool,
    /// Logical screen id.
    pub screen_id: ScreenId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_fold_status() {
        assert_eq!(mode_for_fold_status(FoldStatus::Expand), FoldDisplayMode::Full);
        assert_eq!(mode_for_fold_status(FoldStatus::Folded), FoldDisplayMode::Main);
        assert_eq!(mode_for_fold_status(FoldStatus::HalfFold), FoldDisplayMode::Full);
        assert_eq!(mode_for_fold_status(FoldStatus::Unknown), FoldDisplayMode::Unknown);
    }

    #[test]
    fn test_repr_round_trip() {
        for mode in [
            FoldDisplayMode::Unknown,
            FoldDisplayMode::Full,
            FoldDisplayMode::Main,
            FoldDisplayMode::GlobalFull,
            FoldDisplayMode::Coordination,
        ] {
            assert_eq!(FoldDisplayMode::from_u8(mode as u8), mode);
        }
        assert_eq!(FoldStatus::from_u8(42), FoldStatus::Unknown);
    }

    #[test]
    fn test_device_status_mapping() {
        assert_eq!(DeviceStatus::from(FoldDisplayMode::Main), DeviceStatus::Folded);
        assert_eq!(DeviceStatus::from(FoldDisplayMode::Full), DeviceStatus::Expand);
        assert_eq!(DeviceStatus::from(FoldDisplayMode::GlobalFull), DeviceStatus::GlobalFull);
        assert_eq!(DeviceStatus::from(FoldDisplayMode::Coordination), DeviceStatus::Unknown);
    }
}
