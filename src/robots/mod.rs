pub mod manager;
pub mod rules;

pub use manager::{RobotsManager, RobotsManagerConfig, SourceTag};
pub use rules::RobotsRules;
