use anyhow::Context;
use std::{env, path::PathBuf};
use url::Url;

pub const WEBSOCKET_PATH: &str = "/api/websocket";
pub const CREATE_PATH: &str = "/api/create";

const DEFAULT_HOST: &str = "localhost:8080";
const IDENTITY_FILE_NAME: &str = ".tdt-client.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `host[:port]` of the game server.
    pub host: String,
    /// Use `wss`/`https` instead of `ws`/`http`.
    pub secure: bool,
    pub identity_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("TDT_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            secure: env::var("TDT_SECURE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            identity_file: env::var("TDT_IDENTITY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_identity_file()),
        }
    }

    pub fn websocket_url(&self) -> anyhow::Result<Url> {
        let scheme = if self.secure { "wss" } else { "ws" };
        self.url(scheme, WEBSOCKET_PATH)
    }

    pub fn create_url(&self) -> anyhow::Result<Url> {
        let scheme = if self.secure { "https" } else { "http" };
        self.url(scheme, CREATE_PATH)
    }

    fn url(&self, scheme: &str, path: &str) -> anyhow::Result<Url> {
        let raw = format!("{}://{}{}", scheme, self.host, path);
        Url::parse(&raw).with_context(|| format!("invalid server host {:?}", self.host))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_identity_file() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(IDENTITY_FILE_NAME)
}
