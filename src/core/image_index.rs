use crate::utils::error::{PhaseError, Result};

/// Placeholder replaced by the image index in [`ImageSet::url_template`].
pub const INDEX_PLACEHOLDER: &str = "{n}";

/// A pre-rendered collection of phase images and the scales that map
/// illumination onto its indices.
///
/// Waxing images occupy `0..=wax_scale`, waning images start at
/// `wane_offset` (full) and end at `wane_offset + wane_scale` (new).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSet {
    pub wax_scale: f64,
    pub wane_offset: f64,
    pub wane_scale: f64,
    pub min_index: u32,
    pub max_index: u32,
    pub url_template: String,
}

impl ImageSet {
    /// The 224-image PNG set.
    pub fn detailed() -> Self {
        Self {
            wax_scale: 107.0,
            wane_offset: 108.0,
            wane_scale: 115.0,
            min_index: 0,
            max_index: 223,
            url_template: "http://127.0.0.1:8000/moon_images/mp%20({n}).png".to_string(),
        }
    }

    /// The 202-image JPEG set.
    pub fn compact() -> Self {
        Self {
            wax_scale: 100.0,
            wane_offset: 101.0,
            wane_scale: 100.0,
            min_index: 0,
            max_index: 201,
            url_template: "http://127.0.0.1:8000/moon_images/{n}.jpg".to_string(),
        }
    }

    /// Unchecked index for an illumination pair; ties round half to even.
    pub fn raw_index(&self, illumination: f64, next_illumination: f64) -> i64 {
        let fraction = illumination / 100.0;
        let position = if next_illumination > illumination {
            fraction * self.wax_scale
        } else {
            self.wane_offset + (1.0 - fraction) * self.wane_scale
        };

        position.round_ties_even() as i64
    }

    pub fn image_index(&self, illumination: f64, next_illumination: f64) -> Result<u32> {
        let index = self.raw_index(illumination, next_illumination);

        if index < i64::from(self.min_index) || index > i64::from(self.max_index) {
            return Err(PhaseError::ImageIndexOutOfRange {
                index,
                min: self.min_index,
                max: self.max_index,
            });
        }

        Ok(index as u32)
    }

    pub fn image_url(&self, index: u32) -> String {
        self.url_template
            .replace(INDEX_PLACEHOLDER, &index.to_string())
    }
}

impl Default for ImageSet {
    fn default() -> Self {
        Self::detailed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waxing_uses_wax_scale() {
        let images = ImageSet::detailed();

        assert_eq!(images.image_index(0.0, 1.0).unwrap(), 0);
        assert_eq!(images.image_index(25.0, 30.0).unwrap(), 27); // 26.75
        assert_eq!(images.image_index(99.9, 100.0).unwrap(), 107);
    }

    #[test]
    fn test_waning_uses_offset_and_scale() {
        let images = ImageSet::detailed();

        assert_eq!(images.image_index(100.0, 99.0).unwrap(), 108);
        assert_eq!(images.image_index(75.0, 70.0).unwrap(), 137); // 136.75
        assert_eq!(images.image_index(0.0, 0.0).unwrap(), 223);
    }

    #[test]
    fn test_equal_illumination_counts_as_waning() {
        let images = ImageSet::detailed();
        assert_eq!(images.image_index(100.0, 100.0).unwrap(), 108);
    }

    #[test]
    fn test_ties_round_half_to_even() {
        let images = ImageSet::compact();

        // 12.5 and 13.5 both sit on a tie
        assert_eq!(images.raw_index(12.5, 20.0), 12);
        assert_eq!(images.raw_index(13.5, 20.0), 14);
        // 101 + 0.5 * 100 = 151 exactly; 101 + 0.875 * 100 = 188.5
        assert_eq!(images.raw_index(50.0, 40.0), 151);
        assert_eq!(images.raw_index(12.5, 10.0), 188);
    }

    #[test]
    fn test_waxing_index_is_monotonic() {
        let images = ImageSet::detailed();
        let mut previous = 0;

        for step in 0..=1000 {
            let illumination = step as f64 / 10.0;
            let index = images.raw_index(illumination, illumination + 1.0);
            assert!(index >= previous, "{} dropped at {}%", index, illumination);
            previous = index;
        }
    }

    #[test]
    fn test_waning_index_grows_as_illumination_falls() {
        let images = ImageSet::detailed();
        let mut previous = 0;

        for step in (0..=1000).rev() {
            let illumination = step as f64 / 10.0;
            let index = images.raw_index(illumination, illumination - 1.0);
            assert!(index >= previous, "{} dropped at {}%", index, illumination);
            previous = index;
        }
    }

    #[test]
    fn test_index_outside_image_set_is_rejected() {
        let images = ImageSet {
            max_index: 150,
            ..ImageSet::detailed()
        };

        let err = images.image_index(0.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            PhaseError::ImageIndexOutOfRange {
                index: 223,
                min: 0,
                max: 150
            }
        ));
    }

    #[test]
    fn test_image_url_templating() {
        assert_eq!(
            ImageSet::detailed().image_url(42),
            "http://127.0.0.1:8000/moon_images/mp%20(42).png"
        );
        assert_eq!(
            ImageSet::compact().image_url(7),
            "http://127.0.0.1:8000/moon_images/7.jpg"
        );
    }
}
