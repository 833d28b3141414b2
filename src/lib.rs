pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::adapters::{FixedClock, LocalClock, MeeusEphemeris};
pub use crate::app::{build_router, serve};
pub use crate::core::{image_index::ImageSet, phase::PhaseService};
pub use crate::domain::model::{ErrorBody, PhaseQuery, PhaseResult};
pub use crate::utils::error::{PhaseError, Result};
