#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod response;

pub use client::{ApiClient, Credentials, LoginTokens};
pub use config::{ApiConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{Error, Result};

/// Tracing target for backend API calls.
pub const TRACING_TARGET: &str = "homelog_client";

/// Path of the login endpoint.
pub const LOGIN_PATH: &str = "login";

/// Path of the permission listing endpoint.
pub const PERMISSIONS_PATH: &str = "permissions";

/// Path of the access level listing endpoint.
pub const ACCESS_LEVELS_PATH: &str = "access-level-definitions";
