// SPDX: CC0-1.0

use core::num::NonZeroU32;
use rational_plot::{
    evaluate, find_discontinuities, find_roots,
    plot::{self, CoordinateWindow, PixelSize},
    Number, Point, Roots,
};

fn window() -> CoordinateWindow {
    CoordinateWindow::new(-10.0..10.0, -10.0..10.0).unwrap()
}

#[test]
fn division_by_zero_is_undefined() {
    assert_eq!(evaluate("1/x", 0.0), None);
}

#[test]
fn evaluates_rational_function() {
    assert_eq!(evaluate("(x+1)/(x-2)", 3.0), Some(4.0));
}

#[test]
fn root_of_a_line() {
    let roots = find_roots(Roots::Single("x-2"), -10.0, 10.0);
    assert_eq!(roots.len(), 1);
    assert!((roots[0] - 2.0).abs() < 1e-6);
}

#[test]
fn asymptote_of_a_hyperbola() {
    let found = find_discontinuities("1/(x-2)", -10.0, 10.0);
    assert_eq!(found.len(), 1);
    assert!((found[0] - 2.0).abs() <= 0.02);
}

#[test]
fn intersection_of_two_lines() {
    let roots = find_roots(Roots::Pair("2x+1", "3x-2"), -10.0, 10.0);
    assert_eq!(roots.len(), 1);
    assert!((roots[0] - 3.0).abs() < 1e-6);
}

#[test]
fn plot_of_one_over_x() {
    let plot = rational_plot::plot("1/x", &window(), 400, 400);
    assert_eq!(plot.segments.len(), 2);
    assert_eq!(plot.y_intercept, None);
    assert!(plot.x_intercepts.is_empty());
}

#[test]
fn invalid_input_never_panics() {
    for src in ["", "x +", "(x", "sin(x)", "x; drop", "2 3", "x = 1", "1..2", "))((", "π"] {
        for x in [-1.0, 0.0, 1.0, Number::NAN] {
            assert_eq!(evaluate(src, x), None, "{src:?} at {x}");
        }
        assert!(find_roots(Roots::Single(src), -10.0, 10.0).is_empty());
        assert!(find_roots(Roots::Pair("x", src), -10.0, 10.0).is_empty());
        assert!(find_discontinuities(src, -10.0, 10.0).is_empty());
        assert!(rational_plot::plot(src, &window(), 100, 100)
            .segments
            .is_empty());
    }
}

#[test]
fn evaluation_is_repeatable() {
    for src in ["(2x+1)/(3x-2)", "x^2 - 4", "1/(x^2 - 1)"] {
        for x in [-3.5, -1.0, 0.0, 0.25, 2.0 / 3.0, 7.0] {
            assert_eq!(evaluate(src, x), evaluate(src, x));
        }
    }
}

#[test]
fn roots_vanish() {
    for src in ["x^2 - 2", "(2x+1)/(3x-2)", "x^3 - 4x + 1", "(x-1)(x+2)/(x-3)", "1/x"] {
        for root in find_roots(Roots::Single(src), -10.0, 10.0) {
            let y = evaluate(src, root).unwrap();
            assert!(y.abs() < 1e-3, "{src} at {root} is {y}");
        }
    }
}

#[test]
fn segments_increase_and_avoid_poles_and_intercepts_avoid_poles() {
    let size = PixelSize {
        width: NonZeroU32::new(640).unwrap(),
        height: NonZeroU32::new(480).unwrap(),
    };
    let tol = window().width() / 640.0;
    for src in ["(x-1)(x+2)/(x-3)", "1/(x^2 - 4)", "x/(x+5.5)", "(x^2-1)/(x-1)"] {
        let f = rational_plot::expr::Expression::new(src).unwrap();
        let plot = plot::plot(f.sampler(), &window(), size, &Default::default());
        for segment in &plot.segments {
            for pair in segment.points.windows(2) {
                assert!(pair[0].at.x < pair[1].at.x, "{src}");
            }
            for p in &segment.points {
                for d in &plot.discontinuities {
                    assert!((p.at.x - d).abs() >= tol, "{src}: {p:?} near {d}");
                }
            }
        }
        for x in &plot.x_intercepts {
            for d in &plot.discontinuities {
                assert!((x - d).abs() >= tol, "{src}: intercept {x} near {d}");
            }
        }
    }
}

#[test]
fn pixel_mapping_round_trips() {
    let window = CoordinateWindow::new(-3.7..12.1, -0.5..250.0).unwrap();
    let size = PixelSize {
        width: NonZeroU32::new(733).unwrap(),
        height: NonZeroU32::new(419).unwrap(),
    };
    for (x, y) in [(-3.7, -0.5), (0.0, 0.0), (1.234, 99.9), (12.1, 250.0), (20.0, -40.0)] {
        let p = Point { x, y };
        let back = window.from_pixel(window.to_pixel(p, size), size);
        assert!((back.x - x).abs() < 1e-9, "{p:?} -> {back:?}");
        assert!((back.y - y).abs() < 1e-9, "{p:?} -> {back:?}");
    }
}
