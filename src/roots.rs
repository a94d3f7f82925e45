// SPDX: CC0-1.0

//! Root and intersection finding by sign-change sampling and bisection.

use crate::{grid, is_valid_interval, Number, Sample};
use core::ops::Range;
use log::{debug, trace};

#[derive(Clone, Debug)]
pub struct RootOptions {
    /// Distance between samples when scanning for sign changes.
    pub step: Number,
    /// Bisection rounds per bracket.
    pub iterations: u32,
    /// Bisection stops early once `|f(mid)|` is below this.
    pub epsilon: Number,
    /// A refined root is only accepted when `|f(root)|` is below this.
    pub residual: Number,
    /// Roots closer than this fraction of the interval width are merged.
    pub separation: Number,
    /// Upper bound on samples per scan. Wider intervals sample more coarsely
    /// and bisect for longer instead.
    pub max_samples: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            step: 0.05,
            iterations: 20,
            epsilon: 1e-6,
            residual: 1e-3,
            separation: 0.01,
            max_samples: 4000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Root {
    pub x: Number,
    /// `0` for a root, the shared value `f(x) = g(x)` for an intersection.
    pub y: Number,
}

/// Finds the zeros of `f` in `interval`, ascending.
pub fn find_roots<F>(f: F, interval: Range<Number>, opts: &RootOptions) -> Vec<Root>
where
    F: FnMut(Number) -> Option<Number>,
{
    find_zeros(f, interval, opts)
        .into_iter()
        .map(|x| Root { x, y: 0.0 })
        .collect()
}

/// Finds where `f` and `g` meet in `interval`, ascending.
pub fn find_intersections<F, G>(
    mut f: F,
    mut g: G,
    interval: Range<Number>,
    opts: &RootOptions,
) -> Vec<Root>
where
    F: FnMut(Number) -> Option<Number>,
    G: FnMut(Number) -> Option<Number>,
{
    let zeros = find_zeros(|x| Some(f(x)? - g(x)?), interval, opts);
    zeros
        .into_iter()
        .filter_map(|x| Some(Root { x, y: f(x)? }))
        .collect()
}

fn find_zeros<F>(mut f: F, interval: Range<Number>, opts: &RootOptions) -> Vec<Number>
where
    F: FnMut(Number) -> Option<Number>,
{
    if !is_valid_interval(&interval) || !(opts.step > 0.0) || opts.max_samples == 0 {
        return Vec::new();
    }
    let width = interval.end - interval.start;
    let step = opts.step.max(width / opts.max_samples as Number);
    let steps = ((width / step).ceil().max(1.0) as usize).min(opts.max_samples);
    // narrow coarse brackets down as far as `opts.step` would have
    let rounds = opts.iterations + (step / opts.step).log2().ceil().max(0.0) as u32;

    let mut found = Vec::new();
    let mut prev: Option<Sample> = None;
    for x in grid(&interval, steps) {
        let cur = Sample { x, y: f(x) };
        match (prev, cur.y) {
            (_, Some(y)) if y == 0.0 => found.push(x),
            (
                Some(Sample {
                    x: a,
                    y: Some(fa),
                }),
                Some(fb),
            ) if fa != 0.0 && fa.signum() != fb.signum() => {
                trace!("bracket [{a}, {x}]");
                if let Some(root) = bisect(&mut f, a, fa, x, rounds, opts) {
                    found.push(root);
                }
            }
            // at least one side undefined: never a root
            _ => {}
        }
        prev = Some(cur);
    }

    found.sort_by(Number::total_cmp);
    let min_gap = opts.separation * width;
    found.dedup_by(|b, a| (*b - *a).abs() < min_gap);
    debug!("{} root(s) in [{}, {}]", found.len(), interval.start, interval.end);
    found
}

/// Halves `[a, b]` around the sign change. `None` when the bracket straddles
/// an undefined point or the result does not actually vanish (a pole).
fn bisect<F>(
    f: &mut F,
    mut a: Number,
    mut fa: Number,
    mut b: Number,
    rounds: u32,
    opts: &RootOptions,
) -> Option<Number>
where
    F: FnMut(Number) -> Option<Number>,
{
    let mut mid = a + (b - a) / 2.0;
    for _ in 0..rounds {
        mid = a + (b - a) / 2.0;
        let fm = f(mid)?;
        if fm.abs() < opts.epsilon {
            return Some(mid);
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    let residual = f(mid)?.abs();
    if residual < opts.residual {
        Some(mid)
    } else {
        trace!("rejected {mid}: |f| = {residual}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;

    fn roots(src: &str, interval: Range<Number>) -> Vec<Number> {
        let f = Expression::new(src).unwrap();
        find_roots(f.sampler(), interval, &RootOptions::default())
            .into_iter()
            .map(|root| root.x)
            .collect()
    }

    fn approx(actual: &[Number], expected: &[Number], tol: Number) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn linear_root() {
        approx(&roots("x-2", -10.0..10.0), &[2.0], 1e-6);
    }

    #[test]
    fn quadratic_roots_are_sorted() {
        approx(&roots("x^2 - 2", -10.0..10.0), &[-2f64.sqrt(), 2f64.sqrt()], 1e-5);
        approx(&roots("(x+3)(x-1)(x-7)", -10.0..10.0), &[-3.0, 1.0, 7.0], 1e-5);
    }

    #[test]
    fn rational_root_but_not_pole() {
        // zero at -1/2, pole at 2/3
        approx(&roots("(2x+1)/(3x-2)", -10.0..10.0), &[-0.5], 1e-5);
        assert!(roots("1/x", -10.0..10.0).is_empty());
        assert!(roots("1/(x-0.013)", -10.0..10.0).is_empty());
    }

    #[test]
    fn nothing_to_find() {
        assert!(roots("x^2 + 1", -10.0..10.0).is_empty());
        assert!(roots("x-20", -10.0..10.0).is_empty());
        // undefined everywhere
        assert!(roots("(0-1-x^2)^0.5", -10.0..10.0).is_empty());
    }

    #[test]
    fn invalid_intervals_are_empty() {
        assert!(roots("x", 1.0..1.0).is_empty());
        assert!(roots("x", 1.0..-1.0).is_empty());
        assert!(roots("x", Number::NAN..1.0).is_empty());
        let f = Expression::new("x").unwrap();
        let opts = RootOptions {
            step: 0.0,
            ..RootOptions::default()
        };
        assert!(find_roots(f.sampler(), -1.0..1.0, &opts).is_empty());
    }

    #[test]
    fn double_root_on_sample_is_reported_once() {
        approx(&roots("(x-1)^2 * (x+1)", -10.0..10.0), &[-1.0, 1.0], 1e-5);
    }

    #[test]
    fn intersection_of_two_lines() {
        let f = Expression::new("2x+1").unwrap();
        let g = Expression::new("3x-2").unwrap();
        let meet = find_intersections(
            f.sampler(),
            g.sampler(),
            -10.0..10.0,
            &RootOptions::default(),
        );
        assert_eq!(meet.len(), 1);
        assert!((meet[0].x - 3.0).abs() < 1e-6);
        assert!((meet[0].y - 7.0).abs() < 1e-5);
    }

    #[test]
    fn close_roots_are_merged() {
        // zeros at 1 and 1.12, closer than 1% of the width
        let found = roots("(x-1)(x-1.12)", -10.0..10.0);
        approx(&found, &[1.0], 1e-3);

        let f = Expression::new("(x-1)(x-1.12)").unwrap();
        let opts = RootOptions {
            separation: 0.0,
            ..RootOptions::default()
        };
        let both: Vec<Number> = find_roots(f.sampler(), -10.0..10.0, &opts)
            .into_iter()
            .map(|root| root.x)
            .collect();
        approx(&both, &[1.0, 1.12], 1e-3);
    }

    #[test]
    fn wide_interval_is_sampled_a_bounded_number_of_times() {
        let f = Expression::new("x-2").unwrap();
        let mut sample = f.sampler();
        let mut calls = 0usize;
        let opts = RootOptions::default();
        let found = find_roots(
            |x| {
                calls += 1;
                sample(x)
            },
            -1e7..1e7,
            &opts,
        );
        approx(&found.iter().map(|root| root.x).collect::<Vec<_>>(), &[2.0], 1e-6);
        // one scan plus one bracket
        assert!(calls <= opts.max_samples + 1 + 64, "{calls} samples");
    }
}
