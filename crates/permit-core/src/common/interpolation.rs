//! Token Interpolation
//!
//! Substitutes environment-derived paths for the placeholder tokens a
//! manifest may use as scope values.

use crate::config::PermitConfig;

/// Replaced, as a whole value, by the runtime executable path
pub const EXEC_PATH_TOKEN: &str = "///<exec_path>";

/// Replaced, as a prefix, by the cache root
pub const CACHE_PATH_TOKEN: &str = "///<cache_path>";

/// Resolve a single scope value
///
/// Values that are not tokens come back unchanged, so resolving an already
/// resolved value is a no-op.
///
/// # Example
/// ```ignore
/// // with cache_dir = /home/ada/.cache
/// resolve_token("///<cache_path>/deno/npm", &config);
/// // == "/home/ada/.cache/deno/npm"
/// ```
pub fn resolve_token(value: &str, config: &PermitConfig) -> String {
    if value == EXEC_PATH_TOKEN {
        return config.exec_path.display().to_string();
    }

    if let Some(rest) = value.strip_prefix(CACHE_PATH_TOKEN) {
        return format!("{}{}", config.cache_dir.display(), rest);
    }

    value.to_string()
}
