//! Path Utilities
//!
//! Default locations derived from the home directory.

use std::path::{Path, PathBuf};

/// The runtime's per-user directory (`~/.deno/`)
pub fn deno_dir(home: &Path) -> PathBuf {
    home.join(".deno")
}

/// Canonical install location of the runtime executable (`~/.deno/bin/deno`)
pub fn default_exec_path(home: &Path) -> PathBuf {
    deno_dir(home).join("bin").join("deno")
}

/// Cache root substituted for the cache-path token (`~/.cache`)
pub fn default_cache_dir(home: &Path) -> PathBuf {
    home.join(".cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hang_off_home() {
        let home = Path::new("/home/ada");
        assert_eq!(default_exec_path(home), PathBuf::from("/home/ada/.deno/bin/deno"));
        assert_eq!(default_cache_dir(home), PathBuf::from("/home/ada/.cache"));
    }
}
