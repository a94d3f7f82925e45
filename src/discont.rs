// SPDX: CC0-1.0

//! Numeric search for vertical asymptotes.
//!
//! This is a sampling heuristic, not a symbolic analysis of the denominator:
//! a pole narrower than the sampling step can be missed, and a steep but
//! continuous stretch can be reported as a pole.

use crate::{grid, is_valid_interval, Number, Sample};
use core::ops::Range;
use log::{debug, trace};

#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Number of sampling steps across the interval.
    pub samples: usize,
    /// Largest tolerated change in `f` per unit of `x` between neighbouring
    /// samples; anything steeper counts as a pole.
    pub jump: Number,
    /// Rounds spent narrowing down a pole suspected between two samples.
    pub refine: u32,
    /// Decimal places the results are rounded to.
    pub precision: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            samples: 500,
            jump: 1000.0,
            refine: 30,
            precision: 2,
        }
    }
}

impl ScanOptions {
    /// Smallest distance between two distinct reported values.
    pub fn resolution(&self) -> Number {
        Number::powi(10.0, -(self.precision as i32))
    }

    fn round(&self, x: Number) -> Number {
        let scale = Number::powi(10.0, self.precision as i32);
        // `+ 0.0` turns -0.0 into 0.0
        (x * scale).round() / scale + 0.0
    }
}

/// Approximate `x` of every vertical asymptote in `interval`, ascending and
/// rounded to `opts.precision` decimals.
pub fn find_discontinuities<F>(mut f: F, interval: Range<Number>, opts: &ScanOptions) -> Vec<Number>
where
    F: FnMut(Number) -> Option<Number>,
{
    if !is_valid_interval(&interval) || opts.samples == 0 {
        return Vec::new();
    }
    let width = interval.end - interval.start;
    let step = width / opts.samples as Number;
    let merge = width / 50.0;
    let threshold = opts.jump * step;

    let mut found = Vec::new();
    // first and last `x` of the current run of undefined samples
    let mut gap: Option<(Number, Number)> = None;
    let close_gap = |gap: &mut Option<(Number, Number)>, found: &mut Vec<Number>| {
        if let Some((first, last)) = gap.take() {
            // a long run is a hole in the domain, not a pole
            if last - first < merge {
                found.push(first + (last - first) / 2.0);
            } else {
                trace!("domain gap [{first}, {last}]");
            }
        }
    };

    let mut prev: Option<Sample> = None;
    for x in grid(&interval, opts.samples) {
        let cur = Sample { x, y: f(x) };
        match cur.y {
            None => {
                gap = Some(match gap {
                    Some((first, _)) => (first, x),
                    None => (x, x),
                });
            }
            Some(fb) => {
                close_gap(&mut gap, &mut found);
                if let Some(Sample { x: a, y: Some(fa) }) = prev {
                    if (fb - fa).abs() > threshold || fa * fb < 0.0 {
                        trace!("suspect [{a}, {x}]: {fa} -> {fb}");
                        if let Some(pole) = locate_pole(&mut f, (a, fa), (x, fb), step, opts.refine)
                        {
                            found.push(pole);
                        }
                    }
                }
            }
        }
        prev = Some(cur);
    }
    close_gap(&mut gap, &mut found);

    found.retain(|x| interval.start <= *x && *x <= interval.end);
    found.sort_by(Number::total_cmp);
    found.dedup_by(|b, a| (*b - *a).abs() < merge);
    let mut found: Vec<Number> = found.into_iter().map(|x| opts.round(x)).collect();
    found.dedup();
    debug!(
        "{} discontinuit{} in [{}, {}]",
        found.len(),
        if found.len() == 1 { "y" } else { "ies" },
        interval.start,
        interval.end
    );
    found
}

/// Looks for a pole near the suspicious pair `a`, `b` by maximising `|f|`
/// over the pair widened by one `step` on each side (ternary search).
///
/// A zero crossing or a steep but continuous stretch peaks at the edge of
/// that window instead, and is rejected.
fn locate_pole<F>(
    f: &mut F,
    (a, fa): (Number, Number),
    (b, fb): (Number, Number),
    step: Number,
    rounds: u32,
) -> Option<Number>
where
    F: FnMut(Number) -> Option<Number>,
{
    let (mut lo, mut hi) = (a - step, b + step);
    let edge = [f(lo), f(hi), Some(fa), Some(fb)]
        .into_iter()
        .flatten()
        .fold(0.0, |acc: Number, y| acc.max(y.abs()));

    for _ in 0..rounds {
        let third = (hi - lo) / 3.0;
        let (m1, m2) = (lo + third, hi - third);
        let Some(f1) = f(m1) else {
            return Some(m1);
        };
        let Some(f2) = f(m2) else {
            return Some(m2);
        };
        if f1.abs() < f2.abs() {
            lo = m1;
        } else {
            hi = m2;
        }
    }

    let x = lo + (hi - lo) / 2.0;
    match f(x) {
        None => Some(x),
        Some(y) if y.abs() > 2.0 * edge => Some(x),
        Some(y) => {
            trace!("no pole near {x}: |f| = {}, edge = {edge}", y.abs());
            None
        }
    }
}
