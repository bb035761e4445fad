#![warn(clippy::pedantic)]
// Noisy doc/signature lints — would require annotating hundreds of pub functions
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Intentional casts for sizes/durations throughout the fetch/cache layer
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod orchestrator;
pub mod robots;
pub mod schema;
pub mod tools;
pub mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
