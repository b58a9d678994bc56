//! Example: Fold and unfold a device, then cycle the built-in panel with an
//! external screen attached.
//!
//! Run with: `RUST_LOG=info cargo run --example fold_transition`

use std::sync::Arc;

use foldscreen_core::{
    DisplayModeChangeReason, DmError, FoldDisplayMode, FoldScreenConfig, FoldScreenPolicy,
    FoldStatus, MockServices, MultiScreenPowerChangeManager, MultiScreenPowerSwitchType,
    ScreenCombination, TaskScheduler,
};

fn main() -> Result<(), DmError> {
    // Initialize logging (optional)
    env_logger::init();

    // Fake collaborators, with a real worker thread for fold power changes
    let mocks = MockServices::fold_device();
    let mut services = mocks.services();
    let scheduler = Arc::new(TaskScheduler::new("fold_screen_power")?);
    services.screen_power_scheduler = scheduler.clone();

    let policy = FoldScreenPolicy::new(
        services,
        FoldScreenConfig::from_system_parameters(),
    );

    // Fold
    policy.send_sensor_result(FoldStatus::Folded);
    scheduler.wait_idle();
    policy.on_first_frame_committed();
    let state = policy.get_state();
    println!(
        "Folded: mode={:?}, screen={}, took {} ms",
        state.current_display_mode, state.screen_id, state.folding_elapsed_ms
    );

    // Unfold
    policy.change_screen_display_mode(FoldDisplayMode::Full, false, DisplayModeChangeReason::Default);
    scheduler.wait_idle();
    policy.on_first_frame_committed();
    println!(
        "Unfolded: mode={:?}, crease={:?}",
        policy.get_screen_display_mode(),
        policy.get_live_crease_region().creases
    );

    // Built-in panel off and on again with an external screen extending it
    let manager = MultiScreenPowerChangeManager::new(&mocks.services());
    let (inner, external) =
        mocks.inner_and_external(ScreenCombination::Main, ScreenCombination::Extend);

    manager.on_multi_screen_power_change_request(
        Some(&inner),
        Some(&external),
        MultiScreenPowerSwitchType::ScreenSwitchOff,
    )?;
    mocks.power_scheduler.run_pending();
    println!(
        "Inner off: main is rs {}, built-in available={}",
        inner.rs_id(),
        external.is_available()
    );

    match manager.on_multi_screen_power_change_request(
        Some(&external),
        Some(&inner),
        MultiScreenPowerSwitchType::ScreenSwitchOn,
    ) {
        Ok(()) => println!(
            "Inner on: {:?} rs {}, {:?} rs {}",
            inner.combination(),
            inner.rs_id(),
            external.combination(),
            external.rs_id()
        ),
        Err(e) => eprintln!("Error recovering screens: {}", e),
    }

    Ok(())
}
