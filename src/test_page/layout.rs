//! Geometry of the maintenance test page.
//!
//! Units are PostScript points, the canvas is A4 at 72 dpi.

use std::ops::RangeInclusive;

use chrono::{DateTime, TimeZone};
use rand::Rng;

pub const CANVAS_WIDTH: u32 = 595;
pub const CANVAS_HEIGHT: u32 = 842;
pub const PATTERN_WIDTH: u32 = 300;
pub const PATTERN_HEIGHT: u32 = 50;
pub const MARGIN: u32 = 20;
pub const LABEL_POINT_SIZE: u32 = 12;
/// Height of the label line rendered under the bars.
pub const LABEL_HEIGHT: u32 = 16;

// The label line must fit in the clearance below the bars.
const _: () = assert!(LABEL_HEIGHT <= MARGIN);

/// Bars of the pattern, left to right.
pub const STRIPE_COLORS: [&str; 4] = ["cyan", "magenta", "yellow", "black"];

const LABEL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A test page: the color bars plus label, and where they go on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPage {
    pub x: u32,
    pub y: u32,
    pub label: String,
}

impl TestPage {
    /// Place the pattern at a random spot so successive pages exercise different nozzles.
    pub fn random<R: Rng, Tz: TimeZone>(rng: &mut R, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let (x_range, y_range) = placement_bounds();
        Self {
            x: rng.gen_range(x_range),
            y: rng.gen_range(y_range),
            label: label_for(now),
        }
    }

    pub fn stripe_width() -> u32 {
        PATTERN_WIDTH / STRIPE_COLORS.len() as u32
    }
}

/// Allowed top-left corners of the pattern block.
///
/// The block keeps a margin on every side plus one more margin of clearance to the
/// right of and below the bars, which is where the label goes.
pub fn placement_bounds() -> (RangeInclusive<u32>, RangeInclusive<u32>) {
    (
        MARGIN..=CANVAS_WIDTH - PATTERN_WIDTH - 2 * MARGIN,
        MARGIN..=CANVAS_HEIGHT - PATTERN_HEIGHT - 2 * MARGIN,
    )
}

pub fn label_for<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Maintenance: {}", now.format(LABEL_TIMESTAMP_FORMAT))
}
