// src/config.rs
use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result, bail};
use reqwest::Url;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3000";
pub const DEFAULT_SERVICE_CMD: &str = "node whatsapp-service.js";

/// How to launch the WhatsApp service child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCommand {
    pub program: String,
    pub args: Vec<String>,
    pub dir: Option<PathBuf>,
}

impl ServiceCommand {
    /// Split a whitespace-separated command line into program and arguments.
    pub fn parse(line: &str, dir: Option<PathBuf>) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            bail!("service command is empty");
        };
        Ok(Self {
            program,
            args: parts.collect(),
            dir,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub service_url: Url,
    pub static_dir: PathBuf,
    pub database_path: PathBuf,
    pub service_command: ServiceCommand,
    /// When false the WhatsApp service is expected to be running already.
    pub spawn_service: bool,
}

impl Config {
    /// Read settings from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = var("GATEWAY_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .context("GATEWAY_BIND_ADDR is not a socket address")?;
        let service_url = Url::parse(&var("WHATSAPP_SERVICE_URL", DEFAULT_SERVICE_URL))
            .context("WHATSAPP_SERVICE_URL is not a valid URL")?;
        let service_command = ServiceCommand::parse(
            &var("WHATSAPP_SERVICE_CMD", DEFAULT_SERVICE_CMD),
            lookup("WHATSAPP_SERVICE_DIR").map(PathBuf::from),
        )
        .context("WHATSAPP_SERVICE_CMD")?;
        let spawn_service = match var("GATEWAY_SPAWN_SERVICE", "true").to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => bail!("GATEWAY_SPAWN_SERVICE must be a boolean, got {other:?}"),
        };

        Ok(Self {
            bind_addr,
            service_url,
            static_dir: var("GATEWAY_STATIC_DIR", "static").into(),
            database_path: var("GATEWAY_DATABASE_PATH", "database/app.db").into(),
            service_command,
            spawn_service,
        })
    }
}
