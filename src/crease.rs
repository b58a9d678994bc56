//! Crease-region geometry of a folding panel.

use crate::error::DmError;
use crate::types::{DisplayOrientation, DmRect, FoldDisplayMode, Rotation, ScreenId, SCREEN_ID_FULL};

use log::{error, info, warn};
use parking_lot::Mutex;

const CREASE_DELIMITERS: [char; 2] = [',', ';'];
const CREASE_RECT_SIZE: usize = 4;

const ALL_CREASE_MODES: [FoldDisplayMode; 2] = [FoldDisplayMode::Main, FoldDisplayMode::Full];

const ALL_ORIENTATIONS: [DisplayOrientation; 4] = [
    DisplayOrientation::Portrait,
    DisplayOrientation::Landscape,
    DisplayOrientation::PortraitInverted,
    DisplayOrientation::LandscapeInverted,
];

fn rotation_for_orientation(orientation: DisplayOrientation) -> Option<Rotation> {
    match orientation {
        DisplayOrientation::Portrait => Some(Rotation::Rotation0),
        DisplayOrientation::Landscape => Some(Rotation::Rotation90),
        DisplayOrientation::PortraitInverted => Some(Rotation::Rotation180),
        DisplayOrientation::LandscapeInverted => Some(Rotation::Rotation270),
        DisplayOrientation::Unknown => None,
    }
}

/// Crease rectangles of one display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FoldCreaseRegion {
    /// Display the rectangles belong to.
    pub display_id: ScreenId,
    /// Crease rectangles; empty when there is no visible crease.
    pub creases: Vec<DmRect>,
}

impl FoldCreaseRegion {
    /// Create a region.
    pub fn new(display_id: ScreenId, creases: Vec<DmRect>) -> Self {
        Self {
            display_id,
            creases,
        }
    }

    /// A region without rectangles.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Crease region for one orientation and display mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldCreaseRegionItem {
    /// Display orientation.
    pub orientation: DisplayOrientation,
    /// Display mode.
    pub mode: FoldDisplayMode,
    /// Region in that posture.
    pub region: FoldCreaseRegion,
}

/// Parse `"x,y,w,h"` into its four values.
///
/// Either delimiter separates values and empty tokens are skipped.
pub fn parse_crease_region(config: &str) -> Result<[i32; 4], DmError> {
    let tokens: Vec<&str> = config
        .split(CREASE_DELIMITERS)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() != CREASE_RECT_SIZE {
        return Err(DmError::InvalidCreaseRegion {
            config: config.to_string(),
            tokens: tokens.len(),
        });
    }
    let mut values = [0i32; CREASE_RECT_SIZE];
    for (value, token) in values.iter_mut().zip(&tokens) {
        *value = token.parse()?;
    }
    let [_, _, width, height] = values;
    if width < 0 || height < 0 {
        return Err(DmError::NegativeCreaseExtent { width, height });
    }
    Ok(values)
}

/// Rotate a portrait-space rectangle inside a `portrait_width` x
/// `portrait_height` parent.
///
/// Returns an empty rectangle when the parent or the rectangle has no area.
pub fn rotate_rect(
    rect: &DmRect,
    portrait_width: u32,
    portrait_height: u32,
    rotation: Rotation,
) -> DmRect {
    if portrait_width == 0 || portrait_height == 0 {
        warn!("rotate rect: empty parent {}x{}", portrait_width, portrait_height);
        return DmRect::default();
    }
    if rect.width == 0 || rect.height == 0 {
        warn!("rotate rect: empty rect {:?}", rect);
        return DmRect::default();
    }

    let (x, y) = (i64::from(rect.pos_x), i64::from(rect.pos_y));
    let (w, h) = (i64::from(rect.width), i64::from(rect.height));
    let (pw, ph) = (i64::from(portrait_width), i64::from(portrait_height));

    let (new_x, new_y, new_w, new_h) = match rotation {
        Rotation::Rotation0 => (x, y, rect.width, rect.height),
        Rotation::Rotation90 => (ph - y - h, x, rect.height, rect.width),
        Rotation::Rotation180 => (pw - x - w, ph - y - h, rect.width, rect.height),
        Rotation::Rotation270 => (y, pw - x - w, rect.height, rect.width),
    };
    DmRect::new(new_x as i32, new_y as i32, new_w, new_h)
}

/// Owns the configured crease rectangle and the live region derived from it.
#[derive(Debug)]
pub struct FoldCreaseRegionController {
    config: String,
    current: FoldCreaseRegion,
    live: Mutex<FoldCreaseRegion>,
}

impl FoldCreaseRegionController {
    /// Create a controller from a `"x,y,w,h"` string captured once.
    pub fn new(config: impl Into<String>) -> Self {
        let mut controller = Self {
            config: config.into(),
            current: FoldCreaseRegion::empty(),
            live: Mutex::new(FoldCreaseRegion::empty()),
        };
        controller.current = controller.fold_crease_region(true);
        controller
    }

    /// The configured string.
    pub fn config(&self) -> &str {
        &self.config
    }

    /// Crease rectangles for the configured region.
    ///
    /// Vertical keeps `(x, y, w, h)`; horizontal swaps the axes to
    /// `(y, x, h, w)`. An invalid config yields no rectangles.
    pub fn fold_crease_region_rect(&self, is_vertical: bool) -> Vec<DmRect> {
        let [x, y, w, h] = match parse_crease_region(&self.config) {
            Ok(values) => values,
            Err(e) => {
                error!("fold crease rect is invalid: {}", e);
                return Vec::new();
            }
        };
        let rect = if is_vertical {
            DmRect::new(x, y, w as u32, h as u32)
        } else {
            DmRect::new(y, x, h as u32, w as u32)
        };
        vec![rect]
    }

    /// Crease region of the full screen.
    pub fn fold_crease_region(&self, is_vertical: bool) -> FoldCreaseRegion {
        FoldCreaseRegion::new(SCREEN_ID_FULL, self.fold_crease_region_rect(is_vertical))
    }

    /// The vertical region computed at construction.
    pub fn current_fold_crease_region(&self) -> FoldCreaseRegion {
        self.current.clone()
    }

    /// Crease region for the given mode and orientation.
    ///
    /// UNKNOWN and MAIN have no visible crease. Portrait orientations use the
    /// vertical rect and landscape ones the horizontal rect.
    pub fn live_crease_region(
        &self,
        mode: FoldDisplayMode,
        orientation: DisplayOrientation,
    ) -> FoldCreaseRegion {
        let mut live = self.live.lock();
        if matches!(mode, FoldDisplayMode::Unknown | FoldDisplayMode::Main) {
            return FoldCreaseRegion::empty();
        }
        *live = match orientation {
            DisplayOrientation::Portrait | DisplayOrientation::PortraitInverted => {
                self.fold_crease_region(true)
            }
            DisplayOrientation::Landscape | DisplayOrientation::LandscapeInverted => {
                self.fold_crease_region(false)
            }
            DisplayOrientation::Unknown => {
                error!("display orientation is invalid");
                return FoldCreaseRegion::empty();
            }
        };
        info!("live crease region {:?}", live.creases);
        live.clone()
    }

    /// Every (orientation, mode) crease region the device can show, for a
    /// full screen of `portrait_width` x `portrait_height` at rotation zero.
    ///
    /// MAIN shows no crease. FULL rotates the configured rectangle into each
    /// of the four orientations.
    pub fn all_crease_region(
        &self,
        portrait_width: u32,
        portrait_height: u32,
    ) -> Vec<FoldCreaseRegionItem> {
        let mut items = Vec::with_capacity(ALL_CREASE_MODES.len() * ALL_ORIENTATIONS.len());
        for mode in ALL_CREASE_MODES {
            for orientation in ALL_ORIENTATIONS {
                let creases = match (mode, rotation_for_orientation(orientation)) {
                    (FoldDisplayMode::Full, Some(rotation)) => {
                        self.crease_rects_for_rotation(portrait_width, portrait_height, rotation)
                    }
                    _ => Vec::new(),
                };
                items.push(FoldCreaseRegionItem {
                    orientation,
                    mode,
                    region: FoldCreaseRegion::new(SCREEN_ID_FULL, creases),
                });
            }
        }
        items
    }

    /// Vertical crease rectangles rotated into `rotation` within a portrait
    /// parent of the given size.
    pub fn crease_rects_for_rotation(
        &self,
        portrait_width: u32,
        portrait_height: u32,
        rotation: Rotation,
    ) -> Vec<DmRect> {
        self.fold_crease_region_rect(true)
            .iter()
            .map(|rect| rotate_rect(rect, portrait_width, portrait_height, rotation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_with_both_delimiters() {
        assert_eq!(parse_crease_region("0;1008,1136;96").unwrap(), [0, 1008, 1136, 96]);
        assert_eq!(parse_crease_region("1, 2,,3,4").unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_crease_region("1,2,3"),
            Err(DmError::InvalidCreaseRegion { tokens: 3, .. })
        ));
        assert!(matches!(
            parse_crease_region("1,2,x,4"),
            Err(DmError::InvalidCreaseToken(_))
        ));
        assert!(matches!(
            parse_crease_region("1,2,-3,4"),
            Err(DmError::NegativeCreaseExtent { width: -3, height: 4 })
        ));
    }

    #[test]
    fn test_live_crease_region() {
        let controller = FoldCreaseRegionController::new("0,1008,1136,96");

        let region = controller.live_crease_region(FoldDisplayMode::Main, DisplayOrientation::Portrait);
        assert!(region.creases.is_empty());

        let region = controller.live_crease_region(FoldDisplayMode::Full, DisplayOrientation::Portrait);
        assert_eq!(region.creases, vec![DmRect::new(0, 1008, 1136, 96)]);

        let region =
            controller.live_crease_region(FoldDisplayMode::Full, DisplayOrientation::LandscapeInverted);
        assert_eq!(region.creases, vec![DmRect::new(1008, 0, 96, 1136)]);

        let region = controller.live_crease_region(FoldDisplayMode::Full, DisplayOrientation::Unknown);
        assert!(region.creases.is_empty());
    }

    #[test]
    fn test_all_crease_region() {
        let controller = FoldCreaseRegionController::new("0,1008,1136,96");
        let items = controller.all_crease_region(2224, 2496);
        assert_eq!(items.len(), 8);

        for item in &items[..4] {
            assert_eq!(item.mode, FoldDisplayMode::Main);
            assert!(item.region.creases.is_empty());
        }
        let full: Vec<_> = items[4..]
            .iter()
            .map(|item| (item.mode, item.orientation, item.region.creases.clone()))
            .collect();
        assert_eq!(
            full,
            vec![
                (
                    FoldDisplayMode::Full,
                    DisplayOrientation::Portrait,
                    vec![DmRect::new(0, 1008, 1136, 96)]
                ),
                (
                    FoldDisplayMode::Full,
                    DisplayOrientation::Landscape,
                    vec![DmRect::new(1392, 0, 96, 1136)]
                ),
                (
                    FoldDisplayMode::Full,
                    DisplayOrientation::PortraitInverted,
                    vec![DmRect::new(1088, 1392, 1136, 96)]
                ),
                (
                    FoldDisplayMode::Full,
                    DisplayOrientation::LandscapeInverted,
                    vec![DmRect::new(1008, 1088, 96, 1136)]
                ),
            ]
        );
        assert!(items.iter().all(|item| item.region.display_id == SCREEN_ID_FULL));
    }

    #[test]
    fn test_crease_rects_for_rotation() {
        let controller = FoldCreaseRegionController::new("0,1008,1136,96");
        assert_eq!(
            controller.crease_rects_for_rotation(1136, 2112, Rotation::Rotation0),
            controller.fold_crease_region_rect(true)
        );
        assert_eq!(
            controller.crease_rects_for_rotation(1136, 2112, Rotation::Rotation90),
            vec![DmRect::new(1008, 0, 96, 1136)]
        );

        let invalid = FoldCreaseRegionController::new("1,2,3");
        assert!(invalid.crease_rects_for_rotation(1136, 2112, Rotation::Rotation90).is_empty());
        assert!(invalid.all_crease_region(1136, 2112).iter().all(|i| i.region.creases.is_empty()));
    }

    #[test]
    fn test_rotate_rect() {
        let rect = DmRect::new(0, 1008, 1136, 96);
        assert_eq!(rotate_rect(&rect, 1136, 2112, Rotation::Rotation0), rect);
        assert_eq!(
            rotate_rect(&rect, 1136, 2112, Rotation::Rotation90),
            DmRect::new(1008, 0, 96, 1136)
        );
        assert_eq!(
            rotate_rect(&rect, 1136, 2112, Rotation::Rotation180),
            DmRect::new(0, 1008, 1136, 96)
        );
        assert_eq!(
            rotate_rect(&rect, 1136, 2112, Rotation::Rotation270),
            DmRect::new(1008, 0, 96, 1136)
        );
        assert_eq!(rotate_rect(&rect, 0, 2112, Rotation::Rotation90), DmRect::default());
    }

    proptest! {
        #[test]
        fn horizontal_is_axis_swap_of_vertical(
            x in 0i32..4096, y in 0i32..4096, w in 0i32..4096, h in 0i32..4096,
        ) {
            let controller = FoldCreaseRegionController::new(format!("{},{},{},{}", x, y, w, h));
            let vertical = controller.fold_crease_region_rect(true);
            let horizontal = controller.fold_crease_region_rect(false);
            prop_assert_eq!(vertical.len(), 1);
            prop_assert_eq!(horizontal.len(), 1);
            prop_assert_eq!(horizontal[0].pos_x, vertical[0].pos_y);
            prop_assert_eq!(horizontal[0].pos_y, vertical[0].pos_x);
            prop_assert_eq!(horizontal[0].width, vertical[0].height);
            prop_assert_eq!(horizontal[0].height, vertical[0].width);
        }

        #[test]
        fn wrong_token_count_is_empty(values in prop::collection::vec(0i32..4096, 0..10)) {
            prop_assume!(values.len() != 4);
            let config = values.iter().map(i32::to_string).collect::<Vec<_>>().join(";");
            let controller = FoldCreaseRegionController::new(config);
            prop_assert!(controller.fold_crease_region_rect(true).is_empty());
            prop_assert!(controller.fold_crease_region_rect(false).is_empty());
        }
    }
}
