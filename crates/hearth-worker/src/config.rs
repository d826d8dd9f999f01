use thiserror::Error;

use crate::throttle::Rate;

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read from Worker vars/secrets.
#[derive(Clone, Debug)]
pub struct Settings {
    pub jwt_secret: Vec<u8>,
    pub access_token_ttl: i64,
    pub refresh_token_ttl: i64,
    pub password_iterations: u32,
    pub login_rate: Rate,
    pub refresh_rate: Rate,
    pub join_rate: Rate,
    pub admin_token: Option<String>,
}

/// Strip whitespace and one layer of matching quotes.
///
/// Dashboard-entered vars frequently arrive as `"value"`.
pub fn normalize_env_value(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

impl Settings {
    /// Build settings from a key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| normalize_env_value(&v))
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                value: format!("<{} bytes>", jwt_secret.len()),
            });
        }

        Ok(Self {
            jwt_secret: jwt_secret.into_bytes(),
            access_token_ttl: parse_positive(
                "ACCESS_TOKEN_TTL_SECS",
                get("ACCESS_TOKEN_TTL_SECS"),
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl: parse_positive(
                "REFRESH_TOKEN_TTL_SECS",
                get("REFRESH_TOKEN_TTL_SECS"),
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
            password_iterations: parse_positive(
                "PASSWORD_ITERATIONS",
                get("PASSWORD_ITERATIONS"),
                DEFAULT_PASSWORD_ITERATIONS,
            )?,
            login_rate: parse_rate("LOGIN_THROTTLE_RATE", get("LOGIN_THROTTLE_RATE"), "5/min")?,
            refresh_rate: parse_rate("REFRESH_THROTTLE_RATE", get("REFRESH_THROTTLE_RATE"), "10/min")?,
            join_rate: parse_rate("JOIN_THROTTLE_RATE", get("JOIN_THROTTLE_RATE"), "10/min")?,
            admin_token: get("ADMIN_TOKEN"),
        })
    }
}

fn parse_positive<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_rate(key: &'static str, raw: Option<String>, default: &str) -> Result<Rate, ConfigError> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}
