// SPDX: CC0-1.0

use crate::{
    eval::Program,
    lex::{LexErrTyp, SubStr, TokTyp},
    parse::{ParseErr, ParseErrTyp},
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    SetOther,
    PrintProg,
    Eval,
    Roots,
    Intersect,
    Asymptotes,
    Plot,
    SetWin,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::SetOther,
            Self::Eval,
            Self::Roots,
            Self::Intersect,
            Self::Asymptotes,
            Self::Plot,
            Self::SetWin,
            Self::PrintProg,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set f(x)",
            Self::SetOther => "set g(x), the curve that 'intersect' compares f against",
            Self::PrintProg => "print program compiled from f(x) (for debugging)",
            Self::Eval => "evaluate f at a point",
            Self::Roots => "find where f(x) = 0 in the window",
            Self::Intersect => "find where f(x) = g(x) in the window",
            Self::Asymptotes => "find vertical asymptotes of f in the window",
            Self::Plot => "plot f with gnuplot",
            Self::SetWin => "set window parameters",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::SetOther => "compare",
            Self::PrintProg => "prog",
            Self::Eval => "eval",
            Self::Roots => "roots",
            Self::Intersect => "intersect",
            Self::Asymptotes => "asymptotes",
            Self::Plot => "plot",
            Self::SetWin => "window",
        }
    }

    /// The command whose name `s` most resembles, if any is close enough.
    pub fn suggest(s: &str) -> Option<Command> {
        Self::exhaustive()
            .iter()
            .map(|c| (strsim::normalized_damerau_levenshtein(s, c.name()), *c))
            .filter(|(sim, _)| *sim > 0.5)
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, c)| c)
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        // zero-width spans (implicit `*`) still get a marker
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

pub fn dump_program<W: Write>(
    mut out: W,
    prog: &Program,
    title: core::fmt::Arguments,
) -> io::Result<()> {
    writeln!(out, "{title}: ")?;
    if prog.ops().len() == 0 {
        writeln!(out, "  (empty)")?;
    }
    for op in prog.ops() {
        writeln!(out, "  {op}")?;
    }
    Ok(())
}

/// Underlines where compiling an expression failed, plus a hint if we have one.
pub fn report_parse_err<W: Write>(mut out: W, err: &ParseErr) -> io::Result<()> {
    writeln!(out)?;
    underline(&mut out, &err.loc)?;
    writeln!(out, "parse error: {}", err.typ)?;
    match err.typ {
        ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => writeln!(
            out,
            "note: available tokens are numbers, the variable x, and symbols +-*/^()"
        )?,
        ParseErrTyp::LexErr(LexErrTyp::Unsupported(typ)) => match typ {
            TokTyp::Var
            | TokTyp::Number
            | TokTyp::Op(_)
            | TokTyp::OpenParen
            | TokTyp::CloseParen => {}

            TokTyp::XGreater | TokTyp::XLess => {
                writeln!(out, "note: expected an expression but found an inequality")?
            }
            TokTyp::XEqual => writeln!(
                out,
                "note: expected an expression but found an equation; enter only the right-hand side"
            )?,
            TokTyp::XPipe => writeln!(out, "note: absolute value is not supported")?,
            TokTyp::XComma => writeln!(out, "note: use '.' as the decimal separator")?,
            TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly => writeln!(out, "note: group with '(' and ')' instead")?,
        },
        ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,
        ParseErrTyp::MissingOperator => writeln!(
            out,
            "note: numbers next to each other need an operator, for example '2*3'"
        )?,
        ParseErrTyp::ParenMismatch | ParseErrTyp::MissingOperand | ParseErrTyp::Empty => {}
    }
    Ok(())
}

pub fn expr_undefined<W: Write>(mut out: W, name: &str) -> io::Result<()> {
    writeln!(out, "error: {name}(x) is not set")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;

    #[test]
    fn command_names_round_trip() {
        for c in Command::exhaustive() {
            assert_eq!(c.name().parse::<Command>(), Ok(*c));
        }
        assert!("plto".parse::<Command>().is_err());
    }

    #[test]
    fn suggests_close_commands_only() {
        assert_eq!(Command::suggest("plto"), Some(Command::Plot));
        assert_eq!(Command::suggest("asymptote"), Some(Command::Asymptotes));
        assert_eq!(Command::suggest("zzzzzzzz"), None);
    }

    #[test]
    fn underlines_error_location() {
        let err = Expression::new("2x = 3").unwrap_err();
        let mut out = Vec::new();
        report_parse_err(&mut out, &err).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("2x = 3\n   ^\n"), "{out}");
        assert!(out.contains("equation"), "{out}");
    }
}
