// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod ephemeris;

pub use clock::{FixedClock, LocalClock};
pub use ephemeris::MeeusEphemeris;
