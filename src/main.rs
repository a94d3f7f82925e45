// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use core::num::NonZeroU32;
use log::{debug, info};
use rational_plot::{
    discont,
    expr::{Expression, Outcome},
    plot::{self, CoordinateWindow, PixelSize, PlotOptions},
    roots,
    shell::{self, Command},
    Number,
};
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::{self, Child, ExitCode},
};

/// Values larger than this are reported as out of range by `eval`.
const OVERFLOW_BOUND: Number = 1e6;

fn output_filename(now: DateTime<Local>, ext: &str) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        ext
    )
}

fn main() -> ExitCode {
    env_logger::init();
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    f: Option<Expression>,
    g: Option<Expression>,
    win: CoordinateWindow,
    size: PixelSize,
    opts: PlotOptions,
    gnuplot: Option<Child>,
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State {
        f: Expression::new("1/(x-2)").ok(),
        g: None,
        win: CoordinateWindow::new(-10.0..10.0, -10.0..10.0)
            .context("default window is invalid")?,
        size: PixelSize {
            width: NonZeroU32::new(800).context("zero default width")?,
            height: NonZeroU32::new(600).context("zero default height")?,
        },
        opts: PlotOptions::default(),
        gnuplot: None,
    };
    info!("starting with window {}", state.win);

    let mut stdout = BufWriter::new(stdout());
    loop {
        match state.f {
            Some(ref f) => writeln!(stdout, "f(x) = {f}")?,
            None => writeln!(stdout, "f(x) is not set")?,
        }
        if let Some(ref g) = state.g {
            writeln!(stdout, "g(x) = {g}")?;
        }

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => {
                    if let Some(f) = read_expr(&mut stdout, "f(x) = ")? {
                        state.f = Some(f);
                    }
                }

                Command::SetOther => {
                    if let Some(g) = read_expr(&mut stdout, "g(x) = ")? {
                        state.g = Some(g);
                    }
                }

                Command::PrintProg => {
                    if let Some(ref f) = state.f {
                        shell::dump_program(&mut stdout, f.program(), format_args!("program"))?;
                    } else {
                        shell::expr_undefined(&mut stdout, "f")?;
                    }
                }

                Command::Eval => eval_at(&mut stdout, &state)?,

                Command::Roots => print_roots(&mut stdout, &state)?,

                Command::Intersect => print_intersections(&mut stdout, &state)?,

                Command::Asymptotes => print_asymptotes(&mut stdout, &state)?,

                Command::Plot => plot_expr(&mut stdout, &mut state)?,

                Command::SetWin => set_win(&mut stdout, &mut state)?,
            }
        } else if let Some(cmd) = Command::suggest(&try_cmd) {
            writeln!(stdout, r#"Unknown command, did you mean "{}"?"#, cmd.name())?;
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;

    if let Some(mut child) = state.gnuplot.take() {
        child.kill().context("failed to kill gnuplot child")?;
    }
    Ok(())
}

/// Prompts for an expression. `None` if the input was blank or did not compile.
fn read_expr<W: Write>(mut out: W, prompt: &str) -> anyhow::Result<Option<Expression>> {
    let input = shell::input(&mut out, prompt)?;
    if input.is_empty() {
        return Ok(None);
    }
    match Expression::new(input) {
        Ok(expr) => {
            debug!("compiled {expr} into {} operations", expr.program().ops().len());
            Ok(Some(expr))
        }
        Err(err) => {
            shell::report_parse_err(&mut out, &err)?;
            Ok(None)
        }
    }
}

fn eval_at<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let Some(ref f) = state.f else {
        shell::expr_undefined(&mut out, "f")?;
        return Ok(());
    };
    if let Ok(Some(x)) = shell::read_fromstr::<_, Number>(&mut out, "x = ", true)? {
        let outcome = Outcome::classify(f.eval(x), OVERFLOW_BOUND);
        writeln!(out, "f({x}) = {outcome}")?;
    }
    Ok(())
}

fn print_roots<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let Some(ref f) = state.f else {
        shell::expr_undefined(&mut out, "f")?;
        return Ok(());
    };
    let found = roots::find_roots(f.sampler(), state.win.x().clone(), &state.opts.roots);
    if found.is_empty() {
        writeln!(out, "no roots in {:?}", state.win.x())?;
    }
    for root in found {
        writeln!(out, "x = {}", root.x)?;
    }
    Ok(())
}

fn print_intersections<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let (Some(f), Some(g)) = (&state.f, &state.g) else {
        if state.f.is_none() {
            shell::expr_undefined(&mut out, "f")?;
        } else {
            shell::expr_undefined(&mut out, "g")?;
            writeln!(out, r#"note: set it with "{}""#, Command::SetOther.name())?;
        }
        return Ok(());
    };
    let found = roots::find_intersections(
        f.sampler(),
        g.sampler(),
        state.win.x().clone(),
        &state.opts.roots,
    );
    if found.is_empty() {
        writeln!(out, "no intersections in {:?}", state.win.x())?;
    }
    for root in found {
        writeln!(out, "({}, {})", root.x, root.y)?;
    }
    Ok(())
}

fn print_asymptotes<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let Some(ref f) = state.f else {
        shell::expr_undefined(&mut out, "f")?;
        return Ok(());
    };
    let found =
        discont::find_discontinuities(f.sampler(), state.win.x().clone(), &state.opts.scan);
    if found.is_empty() {
        writeln!(out, "no vertical asymptotes in {:?}", state.win.x())?;
    }
    for x in found {
        writeln!(out, "x = {x}")?;
    }
    Ok(())
}

fn set_win<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "win = {:#}, size = {}", state.win, state.size)?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to skip")?;

    let mut x = state.win.x().clone();
    let mut y = state.win.y().clone();
    for (name, dst) in [
        ("x min", &mut x.start),
        ("x max", &mut x.end),
        ("y min", &mut y.start),
        ("y max", &mut y.end),
    ] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }
    match CoordinateWindow::new(x, y) {
        Ok(win) => state.win = win,
        Err(err) => {
            writeln!(out, "error: {err}")?;
            return Ok(());
        }
    }

    writeln!(out, "note: pixel sizes must be nonzero integers")?;
    for (name, dst) in [
        ("width", &mut state.size.width),
        ("height", &mut state.size.height),
    ] {
        match shell::read_fromstr::<_, NonZeroU32>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    Ok(())
}

fn plot_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let Some(ref f) = state.f else {
        shell::expr_undefined(&mut out, "f")?;
        return Ok(());
    };

    // set up gnuplot
    if let Some(mut old_child) = state.gnuplot.take() {
        old_child
            .kill()
            .context("failed to kill previous gnuplot child")?;
    }
    let now = Local::now();
    let data_path = output_filename(now, "data");
    let gnuplot_path = output_filename(now, "gnuplot");
    let svg_path = output_filename(now, "svg");
    let mut data = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .context("failed to open output data file")?,
    );
    let mut gnuplot = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&gnuplot_path)
            .context("failed to open output gnuplot file")?,
    );

    let plot = plot::plot(f.sampler(), &state.win, state.size, &state.opts);
    if plot.segments.is_empty() {
        writeln!(out, "note: f(x) = {f} has no visible points in this window")?;
    }

    // data blocks are separated by two blank lines and addressed by `index`
    let mut blocks: Vec<String> = Vec::new();
    if !plot.segments.is_empty() {
        for segment in &plot.segments {
            for p in &segment.points {
                writeln!(data, "{} {}", p.at.x, p.at.y)
                    .context("failed to write to output data file")?;
            }
            // single blank line: lift the pen
            writeln!(data)?;
        }
        writeln!(data)?;
        blocks.push(format!(
            r#"with lines lw 2 lc '#27422e' title "f(x) = {f}" noenhanced"#
        ));
    }
    if !plot.x_intercepts.is_empty() {
        for x in &plot.x_intercepts {
            writeln!(data, "{x} 0")?;
        }
        writeln!(data)?;
        writeln!(data)?;
        blocks.push(String::from(
            r#"with points pt 7 lc '#b5452b' title "x-intercepts""#,
        ));
    }
    if let Some(y) = plot.y_intercept {
        writeln!(data, "0 {y}")?;
        writeln!(data)?;
        writeln!(data)?;
        blocks.push(String::from(
            r#"with points pt 6 lc '#2b5fb5' title "y-intercept""#,
        ));
    }
    data.flush()?;
    data.get_mut().sync_data()?;
    drop(data);

    writeln!(out, "evaluation ok")?;
    for x in &plot.discontinuities {
        writeln!(out, "asymptote: x = {x}")?;
    }
    for x in &plot.x_intercepts {
        writeln!(out, "x-intercept: ({x}, 0)")?;
    }
    if let Some(y) = plot.y_intercept {
        writeln!(out, "y-intercept: (0, {y})")?;
    }

    writeln!(gnuplot, "reset")?;
    writeln!(gnuplot, "set term push")?;
    // set output info
    writeln!(
        gnuplot,
        "set terminal svg size {width},{height} enhanced",
        width = state.size.width,
        height = state.size.height
    )?;
    writeln!(gnuplot, "set output '{svg_path}'")?;

    // set window
    let win = &state.win;
    writeln!(
        gnuplot,
        "set xrange[{min}:{max}]",
        min = win.x().start,
        max = win.x().end
    )?;
    writeln!(
        gnuplot,
        "set yrange[{min}:{max}]",
        min = win.y().start,
        max = win.y().end
    )?;

    // configure appearence
    writeln!(gnuplot, r#"set title "{data_path}""#)?;
    writeln!(gnuplot, "set title noenhanced")?;
    writeln!(gnuplot, r#"set xlabel "x""#)?;
    writeln!(gnuplot, r#"set ylabel "y""#)?;
    writeln!(gnuplot, "set tics out nomirror")?;
    writeln!(gnuplot, "set xzeroaxis")?;
    writeln!(gnuplot, "set yzeroaxis")?;
    writeln!(gnuplot, "set key out vertical top right")?;
    writeln!(gnuplot, r#"set key title "Key""#)?;

    // asymptotes
    for x in &plot.discontinuities {
        writeln!(
            gnuplot,
            "set arrow from {x},{min} to {x},{max} nohead dashtype 2 lc '#aa3333'",
            min = win.y().start,
            max = win.y().end
        )?;
    }

    if blocks.is_empty() {
        // still show the (empty) axes
        writeln!(gnuplot, "plot NaN notitle")?;
    } else {
        let parts: Vec<String> = blocks
            .iter()
            .enumerate()
            .map(|(idx, style)| {
                let file = if idx == 0 { data_path.as_str() } else { "" };
                format!("'{file}' index {idx} {style}")
            })
            .collect();
        writeln!(gnuplot, "plot {}", parts.join(", \\\n  "))?;
    }

    // display window
    writeln!(gnuplot, "set term pop")?;
    writeln!(gnuplot, "replot")?;

    // done with the file
    gnuplot.flush()?;
    gnuplot.get_mut().sync_data()?;
    drop(gnuplot);

    // spawn gnuplot and provide the path to the file
    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(&gnuplot_path);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    let child = cmd
        .spawn()
        .context("failed to spawn gnuplot (is it installed and in $PATH?)")?;
    info!("gnuplot started on {gnuplot_path}");

    state.gnuplot = Some(child);
    Ok(())
}
