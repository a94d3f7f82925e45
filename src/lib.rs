// SPDX: CC0-1.0

pub mod discont;
pub mod eval;
pub mod expr;
pub mod lex;
pub mod parse;
pub mod plot;
pub mod roots;
pub mod shell;
pub mod stdlib;

use core::{num::NonZeroU32, ops::Range};
use expr::{Expression, Outcome};
use plot::{CoordinateWindow, PixelSize, Plot, PlotOptions};
use roots::RootOptions;

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// `f(x)`, or `None` where `f` is undefined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub x: Number,
    pub y: Option<Number>,
}

pub fn is_valid_interval(range: &Range<Number>) -> bool {
    range.start.is_finite() && range.end.is_finite() && range.start < range.end
}

/// `steps + 1` evenly spaced points from `range.start` to exactly `range.end`.
pub(crate) fn grid(range: &Range<Number>, steps: usize) -> impl Iterator<Item = Number> {
    let Range { start, end } = *range;
    let step = (end - start) / steps as Number;
    (0..=steps).map(move |i| {
        if i == steps {
            end
        } else {
            start + step * i as Number
        }
    })
}

/// `src` at `x`, or `None` if `src` is not a valid expression or is
/// undefined at `x`.
pub fn evaluate(src: &str, x: Number) -> Option<Number> {
    Outcome::of(src, x, Number::INFINITY).value()
}

/// Either the zeros of one expression or where two expressions meet.
#[derive(Clone, Copy, Debug)]
pub enum Roots<'a> {
    Single(&'a str),
    Pair(&'a str, &'a str),
}

/// Ascending `x` of every root (or intersection) in `[min, max]`. Invalid
/// expressions have none.
pub fn find_roots(of: Roots<'_>, min: Number, max: Number) -> Vec<Number> {
    let opts = RootOptions::default();
    let found = match of {
        Roots::Single(f) => match Expression::new(f) {
            Ok(f) => roots::find_roots(f.sampler(), min..max, &opts),
            Err(_) => Vec::new(),
        },
        Roots::Pair(f, g) => match (Expression::new(f), Expression::new(g)) {
            (Ok(f), Ok(g)) => roots::find_intersections(f.sampler(), g.sampler(), min..max, &opts),
            _ => Vec::new(),
        },
    };
    found.into_iter().map(|root| root.x).collect()
}

pub fn find_discontinuities(src: &str, min: Number, max: Number) -> Vec<Number> {
    match Expression::new(src) {
        Ok(f) => discont::find_discontinuities(f.sampler(), min..max, &Default::default()),
        Err(_) => Vec::new(),
    }
}

/// Plot data for `src`; empty when `src` is invalid or a dimension is zero.
pub fn plot(src: &str, window: &CoordinateWindow, width: u32, height: u32) -> Plot {
    let size = NonZeroU32::new(width)
        .zip(NonZeroU32::new(height))
        .map(|(width, height)| PixelSize { width, height });
    match (Expression::new(src), size) {
        (Ok(f), Some(size)) => plot::plot(f.sampler(), window, size, &PlotOptions::default()),
        _ => Plot {
            segments: Vec::new(),
            x_intercepts: Vec::new(),
            y_intercept: None,
            discontinuities: Vec::new(),
        },
    }
}
