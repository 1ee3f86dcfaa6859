// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_ISSUER_DOMAIN` | Identity provider domain (no scheme) | Required for auth |
//! | `AUTH_AUDIENCE` | Expected token audience (client id) | Required for auth |
//! | `ADMIN_PRINCIPALS` | Delimited administrator allow-list (emails and/or subject ids) | empty |
//! | `DATA_DIR` | Root directory for the JSON blob store | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//!
//! With `AUTH_ISSUER_DOMAIN` or `AUTH_AUDIENCE` unset, every protected
//! endpoint answers 401 `server_misconfigured`; the server still boots
//! so the health endpoints can report the problem.

use std::env;
use std::path::PathBuf;

pub const ISSUER_DOMAIN_ENV: &str = "AUTH_ISSUER_DOMAIN";
pub const AUDIENCE_ENV: &str = "AUTH_AUDIENCE";
pub const ADMIN_PRINCIPALS_ENV: &str = "ADMIN_PRINCIPALS";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub issuer_domain: Option<String>,
    pub audience: Option<String>,
    pub admin_principals: String,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from the environment. Blank values read as
    /// unset.
    pub fn from_env() -> Self {
        Self {
            issuer_domain: non_blank(ISSUER_DOMAIN_ENV),
            audience: non_blank(AUDIENCE_ENV),
            admin_principals: non_blank(ADMIN_PRINCIPALS_ENV).unwrap_or_default(),
            data_dir: non_blank(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            host: non_blank(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: non_blank(PORT_ENV)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

fn non_blank(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
