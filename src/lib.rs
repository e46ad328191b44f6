//! Route access rules
//!
//! Evaluates ordered, declarative allow/deny rules against a request path,
//! the user's roles and status, and the outcome of upstream token
//! verification.
//!
//! ## Features
//!
//! - **Regex route patterns** matched against the raw request path
//! - **Case-insensitive role and status constraints**
//! - **Token-exempt rules** for endpoints such as health checks
//! - **Flexible configuration** via TOML/JSON files and environment variables
//!
//! ## Outcomes
//!
//! ```text
//! granted           -> 0
//! deny rule applies -> { "code": 403, "message": "forbidden" }
//! token invalid     -> { "code": 401, "message": "unauthorized" }
//! ```
//!
//! ## Example
//!
//! ```
//! use route_warden::access_control::{AccessRequest, RuleEvaluator, User, Verdict};
//! use route_warden::config::RuleConfig;
//!
//! let evaluator = RuleEvaluator::from_rules(&[
//!     RuleConfig::allow(["/(.*)/ping"]).exempt_from_token(),
//!     RuleConfig::deny(["/", "/(.*)"]).roles(["user"]),
//! ])
//! .unwrap();
//!
//! let request = AccessRequest::new("/api/ping", User::new(["user"]));
//! assert_eq!(evaluator.evaluate(&request), Verdict::Granted);
//! ```

pub mod access_control;
pub mod config;
pub mod error;

// Re-export main types
pub use access_control::{AccessRequest, Denial, RuleEvaluator, User, Verdict};
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
