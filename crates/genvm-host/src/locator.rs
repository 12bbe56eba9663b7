//! Engine executable locator (§4.2).
//!
//! Given an engine name `E`, search in order:
//! 1. `${E_UPPER}PATH` — a direct path, or a directory containing `E`.
//! 2. `${E_UPPER}_BIN` — same rule.
//! 3. Each colon-separated entry of `PATH`, joined with `E`.
//!
//! The result is cached for the lifetime of the process via [`locate_cached`].

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::errors::SpawnError;

fn is_usable_file(p: &Path) -> bool {
    p.is_file()
}

/// Searches for the engine executable, returning every path tried on failure.
pub fn locate(name: &str) -> Result<PathBuf, SpawnError> {
    let mut searched = Vec::new();
    let upper = name.to_uppercase();

    for env_var in [format!("{upper}PATH"), format!("{upper}_BIN")] {
        let Ok(value) = std::env::var(&env_var) else {
            continue;
        };
        for candidate in [PathBuf::from(&value), PathBuf::from(&value).join(name)] {
            searched.push(candidate.display().to_string());
            if is_usable_file(&candidate) {
                return Ok(candidate);
            }
        }
    }

    let path_var = std::env::var("PATH").unwrap_or_default();
    for dir in path_var.split(':') {
        let candidate = Path::new(dir).join(name);
        searched.push(candidate.display().to_string());
        if is_usable_file(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SpawnError::EngineNotFound {
        name: name.to_string(),
        searched,
    })
}

/// Locates `name`, caching the result for the lifetime of the process.
///
/// The cache key is implicitly "whatever name was looked up first" — the
/// host only ever looks up one engine name (`"genvm"`), so a single
/// [`OnceLock`] suffices; this mirrors `config.py`'s module-level `GENVM`
/// constant, computed once at import time.
pub fn locate_cached(name: &str) -> Result<&'static Path, SpawnError> {
    static CACHE: OnceLock<Result<PathBuf, String>> = OnceLock::new();
    let result = CACHE.get_or_init(|| locate(name).map_err(|e| e.to_string()));
    match result {
        Ok(path) => Ok(path.as_path()),
        Err(msg) => Err(SpawnError::EngineNotFound {
            name: name.to_string(),
            searched: vec![msg.clone()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Exercises all three search tiers within one test function so env var
    /// mutations (shared process-wide state) can't race with other tests.
    #[test]
    fn search_order_and_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let exe_path = dir.path().join("myengine");
        std::fs::File::create(&exe_path)
            .unwrap()
            .write_all(b"#!/bin/sh\n")
            .unwrap();

        // Tier 1: MYENGINEPATH as a direct file path.
        std::env::set_var("MYENGINEPATH", &exe_path);
        std::env::remove_var("MYENGINE_BIN");
        assert_eq!(locate("myengine").unwrap(), exe_path);
        std::env::remove_var("MYENGINEPATH");

        // Tier 1 variant: MYENGINEPATH as a directory containing the name.
        std::env::set_var("MYENGINEPATH", dir.path());
        assert_eq!(locate("myengine").unwrap(), exe_path);
        std::env::remove_var("MYENGINEPATH");

        // Tier 2: MYENGINE_BIN.
        std::env::set_var("MYENGINE_BIN", &exe_path);
        assert_eq!(locate("myengine").unwrap(), exe_path);
        std::env::remove_var("MYENGINE_BIN");

        // Tier 3: PATH.
        let old_path = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", dir.path());
        assert_eq!(locate("myengine").unwrap(), exe_path);
        std::env::set_var("PATH", old_path);
    }

    #[test]
    fn missing_engine_lists_every_path_tried() {
        std::env::remove_var("NOSUCHTHINGPATH");
        std::env::remove_var("NOSUCHTHING_BIN");
        std::env::set_var("PATH", "/nonexistent/dir/one:/nonexistent/dir/two");
        let err = locate("nosuchthing").unwrap_err();
        match err {
            SpawnError::EngineNotFound { searched, .. } => {
                assert!(searched.iter().any(|p| p.contains("dir/one")));
                assert!(searched.iter().any(|p| p.contains("dir/two")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
