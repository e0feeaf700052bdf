// ── Occupancy reading ──

use phoenixbad_api::ResponseShape;
use serde::{Deserialize, Serialize};

/// A normalized occupancy snapshot for one area.
///
/// Built once per successful parse + calculate cycle and never mutated.
/// Fields are private so `total == free + occupied` always holds; use
/// [`crate::convert::calculate`] to construct one from raw numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupancyReading {
    free: u32,
    occupied: u32,
    total: u64,
    /// Share of total capacity in use, `0.0..=100.0`; zero when `total` is.
    percentage: f64,
    /// Set when the occupied count is a guess rather than derived.
    approximate: bool,
    /// Which response format the numbers came from.
    shape: ResponseShape,
}

impl OccupancyReading {
    pub(crate) fn new(
        free: u32,
        occupied: u32,
        percentage: f64,
        approximate: bool,
        shape: ResponseShape,
    ) -> Self {
        let total = u64::from(free) + u64::from(occupied);
        let percentage = if total == 0 {
            0.0
        } else {
            percentage.clamp(0.0, 100.0)
        };
        Self {
            free,
            occupied,
            total,
            percentage,
            approximate,
            shape,
        }
    }

    pub fn free(&self) -> u32 {
        self.free
    }

    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn is_approximate(&self) -> bool {
        self.approximate
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    /// `false` when the source only reported an occupied count, in which
    /// case `free` is a placeholder zero.
    pub fn free_known(&self) -> bool {
        self.shape != ResponseShape::BareInteger
    }

    /// Nobody there right now.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// `percentage` as a fraction in `0.0..=1.0`.
    pub fn utilization(&self) -> f64 {
        self.percentage / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_and_percentage_are_bounded() {
        let r = OccupancyReading::new(u32::MAX, 5, 140.0, true, ResponseShape::Widget);
        assert_eq!(r.total(), u64::from(u32::MAX) + 5);
        assert!((r.percentage() - 100.0).abs() < f64::EPSILON);
        assert!((r.utilization() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_shape_in_snake_case() {
        let r = OccupancyReading::new(10, 0, 0.0, false, ResponseShape::LegacyMarkup);
        let json = serde_json::to_value(r).unwrap_or_default();
        assert_eq!(json["shape"], "legacy_markup");
        assert_eq!(json["total"], 10);
        assert!(r.is_empty());
    }

    #[test]
    fn empty_total_forces_zero_percentage() {
        let r = OccupancyReading::new(0, 0, 25.0, false, ResponseShape::Widget);
        assert_eq!(r.total(), 0);
        assert!(r.percentage().abs() < f64::EPSILON);
    }
}
