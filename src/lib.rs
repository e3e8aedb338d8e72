//! mixpath - umbrella-aware path rewriting for mix output
//!
//! Inside an umbrella project mix compiles each app from that app's own
//! directory, so diagnostics say `lib/foo.ex` when the file actually lives at
//! `apps/web/lib/foo.ex`. mixpath runs mix, watches for the `==> app` lines
//! that announce which app is being reported on, and prefixes every
//! path-shaped token with that app's directory.
//!
//! # Core Concepts
//!
//! - **App dictionary**: app name to directory, built by reading every
//!   `apps/*/mix.exs` concurrently ([`umbrella::build_app_dictionary`])
//! - **Rewriter**: line-oriented state machine over the captured output
//!   ([`rewrite::PathRewriter`])
//! - **Mode**: without an `apps` directory mix runs untouched
//!   ([`umbrella::Mode`])
//!
//! # Example Usage
//!
//! ```
//! use mixpath::rewrite::rewrite_output;
//! use mixpath::umbrella::{AppDictionary, AppResolution};
//!
//! let dictionary: AppDictionary = vec![AppResolution {
//!     name: "web".to_string(),
//!     path: "apps/web/".to_string(),
//! }]
//! .into_iter()
//! .collect();
//!
//! let mut out = Vec::new();
//! rewrite_output(&dictionary, b"==> web\nCompiling lib/web.ex\n", &mut out).unwrap();
//! assert_eq!(out, b"==> web\nCompiling apps/web/lib/web.ex\n");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod process;
pub mod rewrite;
pub mod runner;
pub mod umbrella;
pub mod util;

pub use config::{ConfigError, MixpathConfig};
pub use error::MixpathError;
pub use rewrite::PathRewriter;
pub use runner::Runner;
pub use umbrella::{AppDictionary, AppResolution, Mode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
