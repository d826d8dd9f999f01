use worker::{Env, Error, Result};

use crate::config::{normalize_env_value, Settings};

/// A var or secret binding, normalized. Empty values count as unset.
pub fn env_string(env: &Env, key: &str) -> Option<String> {
    env.var(key)
        .map(|v| v.to_string())
        .or_else(|_| env.secret(key).map(|s| s.to_string()))
        .ok()
        .map(|v| normalize_env_value(&v))
        .filter(|s| !s.is_empty())
}

pub fn load_settings(env: &Env) -> Result<Settings> {
    Settings::from_lookup(|key| env_string(env, key)).map_err(|e| Error::RustError(e.to_string()))
}
