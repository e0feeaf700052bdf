// ── Response classification and extraction ──
//
// The live visitor endpoint has answered in three incompatible formats over
// time. All of them are kept and tried in a fixed order because the
// upstream has switched between them before and may do so again:
//
//   1. a bare integer (occupied count only)
//   2. legacy markup: a titled <span> with the free count plus an
//      `inner_wrapper visitors` container holding the occupied count
//   3. widget markup: `outer_wrapper` with `data-free`, and an
//      `inner_wrapper` whose inline width is the occupancy percentage

mod markup;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use markup::{Tag, element_text, first_with_attr, matching_close, tags};

static BARE_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer pattern is valid"));

static WIDTH_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[;\s])width\s*:\s*([0-9.]+)\s*%").expect("width pattern is valid")
});

const FREE_ATTR: &str = "data-free";
const OUTER_CLASS: &str = "outer_wrapper";
const INNER_CLASS: &str = "inner_wrapper";
const VISITORS_CLASS: &str = "visitors";

/// Which historical response format a body was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    BareInteger,
    LegacyMarkup,
    Widget,
}

/// The raw numbers pulled out of a response, before any arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawExtraction {
    /// Bare-number endpoint: only the occupied count is known.
    BareCount { occupied: u32 },
    /// Both counts reported directly.
    Counts { free: u32, occupied: u32 },
    /// Free count plus occupancy as a percentage of total capacity.
    Percent { free: u32, occupied_pct: f64 },
}

impl RawExtraction {
    pub fn shape(&self) -> ResponseShape {
        match self {
            Self::BareCount { .. } => ResponseShape::BareInteger,
            Self::Counts { .. } => ResponseShape::LegacyMarkup,
            Self::Percent { .. } => ResponseShape::Widget,
        }
    }
}

/// Decide which format `body` is in without extracting anything.
///
/// A numeric body always wins. Markup is treated as legacy only when it
/// carries the legacy signature and no `data-free` attribute; everything
/// else goes to the widget parser, which reports what is missing.
pub fn classify(body: &str) -> ResponseShape {
    if BARE_INTEGER.is_match(body.trim()) {
        return ResponseShape::BareInteger;
    }
    if first_with_attr(body, FREE_ATTR).is_none() && has_legacy_signature(body) {
        return ResponseShape::LegacyMarkup;
    }
    ResponseShape::Widget
}

/// Parse a response body into a [`RawExtraction`].
///
/// `area` is only used to tag errors and log lines.
pub fn parse(body: &str, area: &str) -> Result<RawExtraction, Error> {
    let shape = classify(body);
    debug!(area, ?shape, "classified response");
    match shape {
        ResponseShape::BareInteger => parse_bare_integer(body.trim(), area),
        ResponseShape::LegacyMarkup => parse_legacy(body, area),
        ResponseShape::Widget => parse_widget(body, area),
    }
}

fn has_legacy_signature(body: &str) -> bool {
    tags(body, "span").any(|t| t.attr("title").is_some()) || visitors_container(body).is_some()
}

fn visitors_container(body: &str) -> Option<Tag> {
    tags(body, "div").find(|t| t.has_class(INNER_CLASS) && t.has_class(VISITORS_CLASS))
}

fn parse_bare_integer(trimmed: &str, area: &str) -> Result<RawExtraction, Error> {
    let malformed = || Error::MalformedNumber {
        area: area.into(),
        field: "visitor count",
        value: trimmed.into(),
    };
    let value: i64 = trimmed.parse().map_err(|_| malformed())?;
    let occupied = u32::try_from(value).map_err(|_| malformed())?;
    Ok(RawExtraction::BareCount { occupied })
}

// ── Legacy markup ────────────────────────────────────────────────────

fn parse_legacy(body: &str, area: &str) -> Result<RawExtraction, Error> {
    let container = visitors_container(body).ok_or_else(|| Error::MissingField {
        area: area.into(),
        field: "visitors container",
    })?;
    let container_end = matching_close(body, &container).unwrap_or(body.len());
    let inside = container.start..container_end;

    let occupied_span = tags(body, "span")
        .find(|t| t.attr("title").is_some() && t.start >= container.end && t.start < container_end);
    let free_span = tags(body, "span")
        .find(|t| t.attr("title").is_some() && !inside.contains(&t.start))
        .ok_or_else(|| Error::MissingField {
            area: area.into(),
            field: "free count span",
        })?;

    let free = span_count(body, &free_span, area, "free count")?;
    let occupied = match occupied_span {
        Some(span) => span_count(body, &span, area, "occupied count")?,
        None => 0,
    };
    Ok(RawExtraction::Counts { free, occupied })
}

/// Count held by a titled span: its text, else its title, else zero.
fn span_count(body: &str, span: &Tag, area: &str, field: &'static str) -> Result<u32, Error> {
    let text = element_text(body, span);
    let raw = if text.is_empty() {
        span.attr("title").unwrap_or_default().trim().to_owned()
    } else {
        text
    };
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| Error::MalformedNumber {
        area: area.into(),
        field,
        value: raw,
    })
}

// ── Widget markup ────────────────────────────────────────────────────

fn parse_widget(body: &str, area: &str) -> Result<RawExtraction, Error> {
    let outer = tags(body, "div")
        .find(|t| t.has_class(OUTER_CLASS))
        .or_else(|| first_with_attr(body, FREE_ATTR))
        .ok_or_else(|| Error::MissingField {
            area: area.into(),
            field: "outer_wrapper container",
        })?;

    let free: u32 = outer
        .attr(FREE_ATTR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::MissingField {
            area: area.into(),
            field: "data-free attribute",
        })?;

    let outer_close = matching_close(body, &outer).unwrap_or(body.len());
    let Some(inner) = tags(body, "div")
        .skip_while(|t| t.start < outer.end)
        .take_while(|t| t.start < outer_close)
        .find(|t| t.has_class(INNER_CLASS))
    else {
        debug!(area, "no inner_wrapper, reporting zero occupancy");
        return Ok(RawExtraction::Percent { free, occupied_pct: 0.0 });
    };

    let style = inner.attr("style").unwrap_or_default();
    let Some(width) = WIDTH_PERCENT.captures(style).and_then(|c| c.get(1)) else {
        debug!(area, "no width percentage, reporting zero occupancy");
        return Ok(RawExtraction::Percent { free, occupied_pct: 0.0 });
    };

    let occupied_pct: f64 = width.as_str().parse().map_err(|_| Error::MalformedNumber {
        area: area.into(),
        field: "width percentage",
        value: width.as_str().into(),
    })?;
    Ok(RawExtraction::Percent { free, occupied_pct })
}
