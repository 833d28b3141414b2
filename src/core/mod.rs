pub mod image_index;
pub mod phase;

pub use crate::domain::model::{LunarSnapshot, PhaseQuery, PhaseResult};
pub use crate::domain::ports::{Clock, ConfigProvider, Ephemeris};
pub use crate::utils::error::Result;
