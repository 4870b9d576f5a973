//! Session configuration.

use tracing::warn;

/// Environment variable overriding [`SessionOptions::validate_after_pass`].
pub const VALIDATE_ENV: &str = "XLT_VALIDATE";

/// Knobs for a translation session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Validate a unit's tree after every pass. On in debug builds.
    pub validate_after_pass: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            validate_after_pass: cfg!(debug_assertions),
        }
    }
}

impl SessionOptions {
    /// Defaults, overridden by `XLT_VALIDATE` (`1`/`true`/`0`/`false`).
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(VALIDATE_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let mut options = Self::default();
        match value.map(str::trim) {
            None => {}
            Some("1" | "true") => options.validate_after_pass = true,
            Some("0" | "false") => options.validate_after_pass = false,
            Some(other) => warn!(value = other, "ignoring unrecognized {VALIDATE_ENV}"),
        }
        options
    }
}
