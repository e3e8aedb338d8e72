//! Context-tracking path rewriting over captured tool output

pub mod patterns;
pub mod rewriter;

pub use patterns::{app_switch, join_prefix, prefix_paths};
pub use rewriter::{rewrite_output, PathRewriter};
