// ── Raw extraction → domain reading ──
//
// Turns whatever numbers a response carried into a complete
// `OccupancyReading`. The only non-trivial case is the widget format,
// which reports the free count and the occupied share of *total*
// capacity; the occupied count has to be solved for:
//
//     pct = occupied / (free + occupied) * 100
//     occupied = pct * free / (100 - pct)

use phoenixbad_api::{RawExtraction, ResponseShape};
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Area, OccupancyReading};

/// Build an [`OccupancyReading`] from a parsed response.
pub fn calculate(extraction: RawExtraction) -> OccupancyReading {
    match extraction {
        RawExtraction::BareCount { occupied } => from_counts(0, occupied, ResponseShape::BareInteger),
        RawExtraction::Counts { free, occupied } => {
            from_counts(free, occupied, ResponseShape::LegacyMarkup)
        }
        RawExtraction::Percent { free, occupied_pct } => from_percentage(free, occupied_pct),
    }
}

/// Parse a response body captured earlier and normalize it.
pub fn parse_reading(body: &str, area: Area) -> Result<OccupancyReading, CoreError> {
    let extraction = phoenixbad_api::parse(body, area.as_str())?;
    Ok(calculate(extraction))
}

fn from_counts(free: u32, occupied: u32, shape: ResponseShape) -> OccupancyReading {
    let total = u64::from(free) + u64::from(occupied);
    let percentage = if total > 0 {
        f64::from(occupied) / lossless_f64(total) * 100.0
    } else {
        0.0
    };
    OccupancyReading::new(free, occupied, percentage, false, shape)
}

/// The upstream percentage stays authoritative; only `occupied` is derived.
fn from_percentage(free: u32, pct: f64) -> OccupancyReading {
    if pct >= 100.0 {
        // Total capacity is unknowable here; assume it is twice the free count.
        warn!(free, pct, "occupancy at or above 100%, occupied count is approximate");
        return OccupancyReading::new(free, free, pct, true, ResponseShape::Widget);
    }
    let pct = pct.max(0.0);
    let occupied = saturating_round(pct * f64::from(free) / (100.0 - pct));
    OccupancyReading::new(free, occupied, pct, false, ResponseShape::Widget)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn saturating_round(value: f64) -> u32 {
    // `as` saturates at the integer bounds and maps NaN to zero.
    value.round() as u32
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn lossless_f64(value: u64) -> f64 {
    // Sum of two u32 values fits in the 53-bit mantissa.
    value as f64
}
