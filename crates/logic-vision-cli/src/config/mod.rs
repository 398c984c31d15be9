//! Configuration loading and resolution.

use logic_vision::{SynthesisMode, VisionResult};

/// Environment variable consulted for the synthesis mode.
pub const MODE_ENV: &str = "LOGIC_VISION_MODE";

/// Environment variable consulted for the log level.
pub const LOG_ENV: &str = "LOGIC_VISION_LOG";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve the synthesis mode: explicit flag, then `LOGIC_VISION_MODE`, then `reconstruct`.
///
/// Unknown names are rejected rather than falling back to a pass-through.
pub fn resolve_mode(explicit: Option<&str>) -> VisionResult<SynthesisMode> {
    resolve_mode_from(explicit, std::env::var(MODE_ENV).ok().as_deref())
}

fn resolve_mode_from(explicit: Option<&str>, env: Option<&str>) -> VisionResult<SynthesisMode> {
    match explicit.or(env) {
        Some(name) => name.parse(),
        None => Ok(SynthesisMode::default()),
    }
}

/// Resolve the log level: explicit flag, then `LOGIC_VISION_LOG`, then `info`.
pub fn resolve_log_level(explicit: Option<&str>) -> String {
    if let Some(level) = explicit {
        return level.to_string();
    }

    if let Ok(env_level) = std::env::var(LOG_ENV) {
        return env_level;
    }

    DEFAULT_LOG_LEVEL.to_string()
}
