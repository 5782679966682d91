#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for access level catalog operations.
pub const TRACING_TARGET_CATALOG: &str = "homelog_auth::catalog";

/// Tracing target for permission store operations.
pub const TRACING_TARGET_STORE: &str = "homelog_auth::store";

/// Tracing target for permission evaluation.
pub const TRACING_TARGET_EVALUATOR: &str = "homelog_auth::evaluator";

/// Tracing target for token decoding.
pub const TRACING_TARGET_TOKEN: &str = "homelog_auth::token";

/// Tracing target for persisted token storage.
pub const TRACING_TARGET_STORAGE: &str = "homelog_auth::storage";

/// Tracing target for session lifecycle events.
pub const TRACING_TARGET_SESSION: &str = "homelog_auth::session";

mod access_control;
mod error;
mod evaluator;
mod source;

pub mod grant;
pub mod level;
pub mod prelude;
pub mod session;
pub mod storage;
pub mod token;

pub use access_control::AccessControl;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use evaluator::{Decision, PermissionEvaluator};
pub use source::PermissionSource;
