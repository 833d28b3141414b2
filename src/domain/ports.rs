use crate::domain::model::LunarSnapshot;
use crate::utils::error::Result;
use chrono::{NaiveDate, NaiveDateTime};

/// Source of lunar illumination and phase instants. All instants are UTC.
pub trait Ephemeris: Send + Sync {
    /// Illuminated fraction of the disk, in percent, at 00:00 UTC of `date`.
    fn illumination(&self, date: NaiveDate) -> Result<f64>;

    /// First new moon strictly after 00:00 UTC of `date`.
    fn next_new_moon(&self, date: NaiveDate) -> Result<NaiveDateTime>;

    /// First full moon strictly after 00:00 UTC of `date`.
    fn next_full_moon(&self, date: NaiveDate) -> Result<NaiveDateTime>;

    fn snapshot(&self, date: NaiveDate) -> Result<LunarSnapshot> {
        let tomorrow = date
            .succ_opt()
            .ok_or_else(|| crate::utils::error::PhaseError::Ephemeris {
                message: format!("no calendar day follows {}", date),
            })?;

        Ok(LunarSnapshot {
            date,
            illumination: self.illumination(date)?,
            next_illumination: self.illumination(tomorrow)?,
            next_new_moon: self.next_new_moon(date)?,
            next_full_moon: self.next_full_moon(date)?,
        })
    }
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_address(&self) -> &str;
    fn flat_errors(&self) -> bool;
    fn image_directory(&self) -> Option<&str>;
    fn image_mount_path(&self) -> &str;
    fn allowed_origins(&self) -> &[String];
}
