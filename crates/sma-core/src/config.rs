use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration, read from the process environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram application credentials (my.telegram.org)
    pub api_id: i32,
    pub api_hash: String,

    // Files
    pub session_file: PathBuf,
    pub alias_file: PathBuf,

    // Login
    pub phone: Option<String>,

    // Reply chunk size
    pub message_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_id_raw = get("TG_API_ID").and_then(non_empty).ok_or_else(|| {
            Error::Config("TG_API_ID environment variable is required".to_string())
        })?;
        let api_id = api_id_raw.trim().parse::<i32>().map_err(|_| {
            Error::Config(format!("TG_API_ID must be an integer, got {api_id_raw:?}"))
        })?;

        let api_hash = get("TG_API_HASH").and_then(non_empty).ok_or_else(|| {
            Error::Config("TG_API_HASH environment variable is required".to_string())
        })?;

        let session_file = PathBuf::from(
            get("TG_SESSION")
                .and_then(non_empty)
                .unwrap_or_else(|| "user.session".to_string()),
        );
        let alias_file = PathBuf::from(
            get("TG_ALIAS_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| "aliases.json".to_string()),
        );

        let phone = get("TG_PHONE").and_then(non_empty);

        // Telegram rejects texts above 4096 chars.
        let message_limit = parse_num::<usize>(&get, "TG_MESSAGE_LIMIT")?
            .unwrap_or(4096)
            .clamp(64, 4096);

        Ok(Self {
            api_id,
            api_hash: api_hash.trim().to_string(),
            session_file,
            alias_file,
            phone,
            message_limit,
        })
    }
}

fn parse_num<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = get(key).and_then(non_empty) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, value) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, value);
    }
}

/// `KEY=value` pairs from a dotenv file, in file order.
fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter_map(|(k, v)| {
            let key = k.trim();
            (!key.is_empty()).then(|| (key.to_string(), strip_quotes(v.trim()).to_string()))
        })
        .collect()
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
