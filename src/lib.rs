//! Display-mode control for foldable devices.
//!
//! This crate provides the state machines a display manager uses to drive a
//! foldable phone and its attached screens:
//!
//! - [`FoldScreenPolicy`] moves the device between MAIN (folded, outer
//!   panel), FULL (unfolded, inner panel) and COORDINATION, sequencing panel
//!   power changes on a serial task queue and tracking when a transition is
//!   complete.
//! - [`MultiScreenPowerChangeManager`] hands the display to an external
//!   screen when the built-in panel is switched off, and restores the earlier
//!   main/extend/mirror arrangement when it comes back on.
//! - [`FoldCreaseRegionController`] reports where the hinge crease lies for
//!   the current mode and orientation.
//!
//! Everything outside the state machines (the screen registry, the
//! window-scene client, the render service and the power manager) is reached
//! through the traits in [`DisplayServices`].
//!
//! # Example
//!
//! ```
//! use foldscreen_core::{
//!     MockServices, MultiScreenPowerChangeManager, MultiScreenPowerSwitchType, ScreenCombination,
//! };
//!
//! let mocks = MockServices::new();
//! let (inner, external) =
//!     mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);
//! let manager = MultiScreenPowerChangeManager::new(&mocks.services());
//!
//! // Built-in panel off: the external screen becomes main.
//! manager
//!     .on_multi_screen_power_change_request(
//!         Some(&inner),
//!         Some(&external),
//!         MultiScreenPowerSwitchType::ScreenSwitchOff,
//!     )
//!     .unwrap();
//! assert!(!external.is_available());
//!
//! // Built-in panel back on. It now backs `external`, so the roles swap.
//! manager
//!     .on_multi_screen_power_change_request(
//!         Some(&external),
//!         Some(&inner),
//!         MultiScreenPowerSwitchType::ScreenSwitchOn,
//!     )
//!     .unwrap();
//! assert_eq!(inner.combination(), ScreenCombination::Main);
//! assert_eq!(external.combination(), ScreenCombination::Extend);
//! ```
//!
//! # Testing
//!
//! Use [`MockServices`] to drive the state machines without a display
//! service. Its schedulers are manual: posted tasks run when
//! [`TaskScheduler::run_pending`] is called.

#![warn(missing_docs)]

mod change_utils;
mod config;
mod crease;
mod error;
mod mock;
mod policy;
mod power_change;
mod scheduler;
mod services;
mod session;
mod state;
mod transition;
mod types;

// Re-export public API
pub use change_utils::MultiScreenChangeUtils;
pub use config::{
    get_parameter, parameter_env_key, FoldScreenConfig, CREASE_REGION_PARAMETER,
    DEFAULT_CREASE_REGION, FOLD_TASK_NUM, FOLD_TASK_NUM_ON_BOOT_ANIMATION, MODE_CHANGE_TIMEOUT,
};
pub use crease::{
    parse_crease_region, rotate_rect, FoldCreaseRegion, FoldCreaseRegionController,
    FoldCreaseRegionItem,
};
pub use error::DmError;
pub use mock::{
    ClientCall, MockClientProxy, MockPowerClient, MockRenderCommit, MockScreenRegistry,
    MockServices, RegistryEvent,
};
pub use policy::{FoldScreenPolicy, PolicyVariant};
pub use power_change::{CombinationPair, MultiScreenPowerChangeManager, TopologyChange};
pub use scheduler::TaskScheduler;
pub use services::{ClientProxy, DisplayServices, PowerClient, RenderCommitAdapter, ScreenRegistry};
pub use session::{DisplayNode, DisplayNodeConfig, RenderContext, ScreenSession, ScreenSessionSpec};
pub use state::FoldPolicyState;
pub use transition::{Completion, Generation, ModeChangeTracker, TransitionState};
pub use types::*;
