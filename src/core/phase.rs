use crate::core::image_index::ImageSet;
use crate::domain::model::{PhaseQuery, PhaseResult};
use crate::domain::ports::{Clock, Ephemeris};
use crate::utils::error::{PhaseError, Result};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct PhaseService<E: Ephemeris, C: Clock> {
    ephemeris: E,
    clock: C,
    images: ImageSet,
}

impl<E: Ephemeris, C: Clock> PhaseService<E, C> {
    pub fn new(ephemeris: E, clock: C, images: ImageSet) -> Self {
        Self {
            ephemeris,
            clock,
            images,
        }
    }

    /// The requested date, or today's when the field is absent or empty.
    pub fn resolve_date(&self, query: &PhaseQuery) -> Result<NaiveDate> {
        match query.date.as_deref() {
            None | Some("") => Ok(self.clock.today()),
            Some(input) => NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| {
                PhaseError::InvalidDate {
                    input: input.to_string(),
                    source,
                }
            }),
        }
    }

    pub fn phase_for(&self, query: &PhaseQuery) -> Result<PhaseResult> {
        let date = self.resolve_date(query)?;
        self.phase_for_date(date)
    }

    pub fn phase_for_date(&self, date: NaiveDate) -> Result<PhaseResult> {
        let snapshot = self.ephemeris.snapshot(date)?;
        let image_number = self
            .images
            .image_index(snapshot.illumination, snapshot.next_illumination)?;

        tracing::debug!(
            %date,
            illumination = snapshot.illumination,
            waxing = snapshot.is_waxing(),
            image_number,
            "Computed moon phase"
        );

        Ok(PhaseResult {
            date: date.format(DATE_FORMAT).to_string(),
            illumination_percentage: snapshot.illumination,
            image_number,
            image_url: self.images.image_url(image_number),
            next_new_moon: snapshot.next_new_moon.format(TIMESTAMP_FORMAT).to_string(),
            next_full_moon: snapshot.next_full_moon.format(TIMESTAMP_FORMAT).to_string(),
        })
    }
}
