//! Fold-screen configuration.

use log::debug;
use std::time::Duration;

/// System parameter holding the crease rectangle as `"x,y,w,h"`.
pub const CREASE_REGION_PARAMETER: &str = "const.display.foldscreen.crease_region";

/// Default crease region when the parameter is not set.
pub const DEFAULT_CREASE_REGION: &str = "0,0,0,0";

/// Completions expected for a powered fold transition: two power sub-tasks
/// plus the first-frame commit.
pub const FOLD_TASK_NUM: u32 = 3;

/// Completions expected for a transition during boot animation.
pub const FOLD_TASK_NUM_ON_BOOT_ANIMATION: u32 = 1;

/// How long a mode change may run before it is treated as abandoned.
pub const MODE_CHANGE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Static configuration of a fold policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldScreenConfig {
    /// Crease rectangle as `"x,y,w,h"`; `,` and `;` both separate values.
    pub crease_region: String,
    /// Safety-valve deadline for a running mode change.
    pub mode_change_timeout: Duration,
    /// Completions expected for a powered transition.
    pub fold_task_num: u32,
    /// Completions expected for a transition during boot animation.
    pub boot_animation_task_num: u32,
}

impl Default for FoldScreenConfig {
    fn default() -> Self {
        Self {
            crease_region: DEFAULT_CREASE_REGION.to_string(),
            mode_change_timeout: MODE_CHANGE_TIMEOUT,
            fold_task_num: FOLD_TASK_NUM,
            boot_animation_task_num: FOLD_TASK_NUM_ON_BOOT_ANIMATION,
        }
    }
}

impl FoldScreenConfig {
    /// Read the configuration from system parameters.
    ///
    /// The values are captured once; later parameter changes need a new
    /// policy.
    pub fn from_system_parameters() -> Self {
        Self {
            crease_region: get_parameter(CREASE_REGION_PARAMETER, DEFAULT_CREASE_REGION),
            ..Self::default()
        }
    }

    /// Override the crease region.
    pub fn with_crease_region(mut self, region: impl Into<String>) -> Self {
        self.crease_region = region.into();
        self
    }
}

/// Environment variable a dotted parameter key is read from.
///
/// `const.display.foldscreen.crease_region` becomes
/// `CONST_DISPLAY_FOLDSCREEN_CREASE_REGION`.
pub fn parameter_env_key(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

/// Look up a system parameter, falling back to `default`.
pub fn get_parameter(key: &str, default: &str) -> String {
    match std::env::var(parameter_env_key(key)) {
        Ok(value) => {
            debug!("parameter {} = {:?}", key, value);
            value
        }
        Err(_) => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_env_key() {
        assert_eq!(
            parameter_env_key(CREASE_REGION_PARAMETER),
            "CONST_DISPLAY_FOLDSCREEN_CREASE_REGION"
        );
    }

    #[test]
    fn test_missing_parameter_uses_default() {
        assert_eq!(
            get_parameter("test.foldscreen.unset_parameter", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn test_from_system_parameters() {
        let config = FoldScreenConfig::from_system_parameters();
        assert_eq!(
            config.crease_region,
            get_parameter(CREASE_REGION_PARAMETER, DEFAULT_CREASE_REGION)
        );
        assert_eq!(config.mode_change_timeout, MODE_CHANGE_TIMEOUT);
        assert_eq!(config.fold_task_num, FOLD_TASK_NUM);
        assert_eq!(config.boot_animation_task_num, FOLD_TASK_NUM_ON_BOOT_ANIMATION);
    }

    #[test]
    fn test_defaults() {
        let config = FoldScreenConfig::default().with_crease_region("0,1008,1136,96");
        assert_eq!(config.crease_region, "0,1008,1136,96");
        assert_eq!(config.mode_change_timeout, Duration::from_millis(2000));
        assert_eq!(config.fold_task_num, 3);
        assert_eq!(config.boot_animation_task_num, 1);
    }
}
