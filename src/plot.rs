// SPDX: CC0-1.0

//! Turns `y = f(x)` into drawable polylines that never bridge an asymptote.

use crate::{
    discont::{find_discontinuities, ScanOptions},
    grid,
    roots::{find_roots, RootOptions},
    Number, Point,
};
use core::{fmt, num::NonZeroU32, ops::Range};
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowErr {
    NonFinite(Axis),
    Degenerate(Axis),
}

impl fmt::Display for WindowErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite(axis) => write!(f, "{axis} range must be finite"),
            Self::Degenerate(axis) => write!(f, "{axis} min must be less than {axis} max"),
        }
    }
}

impl std::error::Error for WindowErr {}

/// The region of function space that is mapped onto the pixel grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateWindow {
    x: Range<Number>,
    y: Range<Number>,
}

impl CoordinateWindow {
    pub fn new(x: Range<Number>, y: Range<Number>) -> Result<Self, WindowErr> {
        for (axis, range) in [(Axis::X, &x), (Axis::Y, &y)] {
            if !(range.start.is_finite() && range.end.is_finite()) {
                return Err(WindowErr::NonFinite(axis));
            }
            if !(range.start < range.end) || !(range.end - range.start).is_finite() {
                return Err(WindowErr::Degenerate(axis));
            }
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &Range<Number> {
        &self.x
    }

    pub fn y(&self) -> &Range<Number> {
        &self.y
    }

    pub fn width(&self) -> Number {
        self.x.end - self.x.start
    }

    pub fn height(&self) -> Number {
        self.y.end - self.y.start
    }

    /// Function space to pixel space; pixel `y` grows downward.
    pub fn to_pixel(&self, p: Point<Number>, size: PixelSize) -> Point<Number> {
        Point {
            x: (p.x - self.x.start) / self.width() * size.width(),
            y: (self.y.end - p.y) / self.height() * size.height(),
        }
    }

    pub fn from_pixel(&self, px: Point<Number>, size: PixelSize) -> Point<Number> {
        Point {
            x: self.x.start + px.x / size.width() * self.width(),
            y: self.y.end - px.y / size.height() * self.height(),
        }
    }
}

impl fmt::Display for CoordinateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("x range", &self.x)
            .field("y range", &self.y)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSize {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl PixelSize {
    fn width(&self) -> Number {
        Number::from(self.width.get())
    }

    fn height(&self) -> Number {
        Number::from(self.height.get())
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Clone, Debug)]
pub struct PlotOptions {
    /// A change in `y` larger than this fraction of the window height between
    /// neighbouring pixels starts a new segment.
    pub max_jump: Number,
    /// How far (as a fraction of the window height) the curve may leave the
    /// window before it is cut. This is looser than clipping at the window
    /// edge so that steep branches still reach the border; `0.0` clips
    /// strictly.
    pub slack: Number,
    pub scan: ScanOptions,
    pub roots: RootOptions,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            max_jump: 1.0,
            slack: 1.0,
            scan: ScanOptions::default(),
            roots: RootOptions::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotPoint {
    /// In function space.
    pub at: Point<Number>,
    /// In pixel space.
    pub px: Point<Number>,
}

/// One unbroken polyline, ordered by increasing `x`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotSegment {
    pub points: Vec<PlotPoint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Plot {
    pub segments: Vec<PlotSegment>,
    pub x_intercepts: Vec<Number>,
    pub y_intercept: Option<Number>,
    pub discontinuities: Vec<Number>,
}

pub fn plot<F>(mut f: F, window: &CoordinateWindow, size: PixelSize, opts: &PlotOptions) -> Plot
where
    F: FnMut(Number) -> Option<Number>,
{
    let discontinuities = find_discontinuities(&mut f, window.x.clone(), &opts.scan);

    let columns = size.width.get() as usize;
    let step = window.width() / size.width();
    // rounding of the reported poles counts too
    let tol = step.max(opts.scan.resolution());
    let near_pole = |x: Number| discontinuities.iter().any(|d| (x - d).abs() < tol);

    let h = window.height();
    let visible = (window.y.start - opts.slack * h)..=(window.y.end + opts.slack * h);
    let max_jump = opts.max_jump * h;

    let mut segments = Vec::new();
    let mut cur: Vec<PlotPoint> = Vec::new();
    let flush = |cur: &mut Vec<PlotPoint>, segments: &mut Vec<PlotSegment>| {
        if cur.len() >= 2 {
            segments.push(PlotSegment {
                points: core::mem::take(cur),
            });
        } else {
            cur.clear();
        }
    };

    for x in grid(&window.x, columns) {
        let y = if near_pole(x) {
            None
        } else {
            f(x).filter(|y| visible.contains(y))
        };
        let Some(y) = y else {
            flush(&mut cur, &mut segments);
            continue;
        };
        if cur.last().is_some_and(|last| (y - last.at.y).abs() > max_jump) {
            flush(&mut cur, &mut segments);
        }
        let at = Point { x, y };
        cur.push(PlotPoint {
            at,
            px: window.to_pixel(at, size),
        });
    }
    flush(&mut cur, &mut segments);

    let y_intercept = if window.x.start <= 0.0 && 0.0 <= window.x.end && !near_pole(0.0) {
        f(0.0)
    } else {
        None
    };
    let x_intercepts: Vec<Number> = find_roots(&mut f, window.x.clone(), &opts.roots)
        .into_iter()
        .map(|root| root.x)
        .filter(|x| !near_pole(*x))
        .collect();

    debug!(
        "plotted {} segment(s), {} x-intercept(s), {} discontinuit(ies) at {size}",
        segments.len(),
        x_intercepts.len(),
        discontinuities.len()
    );

    Plot {
        segments,
        x_intercepts,
        y_intercept,
        discontinuities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;

    fn size(width: u32, height: u32) -> PixelSize {
        PixelSize {
            width: NonZeroU32::new(width).unwrap(),
            height: NonZeroU32::new(height).unwrap(),
        }
    }

    fn draw(src: &str) -> Plot {
        let f = Expression::new(src).unwrap();
        let window = CoordinateWindow::new(-10.0..10.0, -10.0..10.0).unwrap();
        plot(f.sampler(), &window, size(400, 400), &PlotOptions::default())
    }

    #[test]
    fn window_validation() {
        assert_eq!(
            CoordinateWindow::new(1.0..1.0, 0.0..1.0),
            Err(WindowErr::Degenerate(Axis::X))
        );
        assert_eq!(
            CoordinateWindow::new(0.0..1.0, 0.0..Number::INFINITY),
            Err(WindowErr::NonFinite(Axis::Y))
        );
        assert_eq!(
            CoordinateWindow::new(0.0..1.0, Number::NAN..1.0),
            Err(WindowErr::NonFinite(Axis::Y))
        );
        assert_eq!(
            CoordinateWindow::new(-Number::MAX..Number::MAX, 0.0..1.0),
            Err(WindowErr::Degenerate(Axis::X))
        );
    }

    #[test]
    fn pixel_mapping_corners() {
        let window = CoordinateWindow::new(-10.0..10.0, -5.0..5.0).unwrap();
        let size = size(200, 100);
        assert_eq!(
            window.to_pixel(Point { x: -10.0, y: 5.0 }, size),
            Point { x: 0.0, y: 0.0 }
        );
        assert_eq!(
            window.to_pixel(Point { x: 10.0, y: -5.0 }, size),
            Point { x: 200.0, y: 100.0 }
        );
        assert_eq!(
            window.to_pixel(Point { x: 0.0, y: 0.0 }, size),
            Point { x: 100.0, y: 50.0 }
        );
    }

    #[test]
    fn line_is_one_segment() {
        let plot = draw("x/2 + 1");
        assert_eq!(plot.segments.len(), 1);
        assert_eq!(plot.segments[0].points.len(), 401);
        assert_eq!(plot.y_intercept, Some(1.0));
        assert_eq!(plot.x_intercepts.len(), 1);
        assert!((plot.x_intercepts[0] + 2.0).abs() < 1e-6);
        assert!(plot.discontinuities.is_empty());
    }

    #[test]
    fn hyperbola_splits_at_pole() {
        let plot = draw("1/x");
        assert_eq!(plot.segments.len(), 2);
        assert_eq!(plot.y_intercept, None);
        assert!(plot.x_intercepts.is_empty());
        assert_eq!(plot.discontinuities, [0.0]);
        assert!(plot.segments[0].points.iter().all(|p| p.at.x < 0.0));
        assert!(plot.segments[1].points.iter().all(|p| p.at.x > 0.0));
    }

    #[test]
    fn rational_with_zero_and_pole() {
        // zero at -1/2, pole at 2/3, y-intercept -1/2
        let plot = draw("(2x+1)/(3x-2)");
        assert_eq!(plot.segments.len(), 2);
        assert_eq!(plot.discontinuities, [0.67]);
        assert_eq!(plot.y_intercept, Some(-0.5));
        assert_eq!(plot.x_intercepts.len(), 1);
        assert!((plot.x_intercepts[0] + 0.5).abs() < 1e-5);
    }

    #[test]
    fn segments_stay_off_poles_and_increase() {
        let plot = draw("1/((x-1)(x+4.5))");
        assert_eq!(plot.discontinuities, [-4.5, 1.0]);
        for segment in &plot.segments {
            for pair in segment.points.windows(2) {
                assert!(pair[0].at.x < pair[1].at.x);
            }
            for p in &segment.points {
                for d in &plot.discontinuities {
                    assert!((p.at.x - d).abs() >= 0.05);
                }
            }
        }
    }

    #[test]
    fn undefined_region_is_skipped() {
        let plot = draw("x^0.5");
        assert_eq!(plot.segments.len(), 1);
        assert!(plot.segments[0].points.iter().all(|p| p.at.x >= 0.0));
        assert_eq!(plot.y_intercept, Some(0.0));
    }

    #[test]
    fn curve_leaving_the_window_is_cut() {
        // only |x| <= sqrt(30) stays within the slack band
        let plot = draw("x^2");
        assert_eq!(plot.segments.len(), 1);
        let points = &plot.segments[0].points;
        assert!(points.iter().all(|p| p.at.y <= 30.0));
        assert!(points.first().unwrap().at.x > -5.5);
        assert!(points.last().unwrap().at.x < 5.5);
    }

    #[test]
    fn zero_slack_clips_at_the_window() {
        let f = Expression::new("x^2").unwrap();
        let window = CoordinateWindow::new(-10.0..10.0, -10.0..10.0).unwrap();
        let opts = PlotOptions {
            slack: 0.0,
            ..PlotOptions::default()
        };
        let plot = plot(f.sampler(), &window, size(400, 400), &opts);
        assert_eq!(plot.segments.len(), 1);
        let points = &plot.segments[0].points;
        assert!(points.iter().all(|p| p.at.y <= 10.0));
        assert!(points.first().unwrap().at.x > -3.2);
        assert!(points.last().unwrap().at.x < 3.2);
    }

    #[test]
    fn window_errors_chain_into_anyhow() {
        use anyhow::Context;

        let err = CoordinateWindow::new(0.0..1.0, 2.0..2.0)
            .context("bad window")
            .unwrap_err();
        let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
        assert_eq!(chain, ["bad window", "y min must be less than y max"]);
    }
}
