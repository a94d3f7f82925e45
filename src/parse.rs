// SPDX: CC0-1.0

// implementation of shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm)

use crate::{
    eval::{Associativity, Operation, OperationTyp, OperatorTyp, Program},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};

#[derive(Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    MissingOperand,
    MissingOperator,
    Empty,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::MissingOperand => write!(f, "operator is missing an operand"),
            Self::MissingOperator => write!(f, "values without an operator between them"),
            Self::Empty => write!(f, "empty expression"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at column {}", self.typ, self.loc.start() + 1)
    }
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    OpenParen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

impl ShuntOp {
    fn into_output(self) -> Option<Operation> {
        match self.typ {
            ShuntOpTyp::Operator(typ) => Some(Operation {
                typ: OperationTyp::Operator(typ),
                loc: self.loc,
            }),
            ShuntOpTyp::OpenParen => None,
        }
    }
}

/// Moves operators to the output up to and including the nearest `(`.
/// Returns whether a `(` was found.
fn pop_until_paren(ops: &mut Vec<ShuntOp>, out: &mut Vec<Operation>) -> bool {
    while let Some(op) = ops.pop() {
        match op.into_output() {
            Some(op) => out.push(op),
            None => return true,
        }
    }
    false
}

/// Checks that every operator has its operands and exactly one value is left.
fn check_arity(out: &[Operation], src: &SubStr) -> Result<(), ParseErr> {
    let mut depth = 0usize;
    for op in out {
        match op.typ {
            OperationTyp::Val(_) | OperationTyp::Var => depth += 1,
            OperationTyp::Operator(typ) => {
                let arity = typ.fun().1.arity;
                if depth < arity {
                    return Err(ParseErr {
                        typ: ParseErrTyp::MissingOperand,
                        loc: op.loc.clone(),
                    });
                }
                depth = depth - arity + 1;
            }
        }
    }
    match depth {
        0 => Err(ParseErr {
            typ: ParseErrTyp::Empty,
            loc: src.clone(),
        }),
        1 => Ok(()),
        _ => Err(ParseErr {
            typ: ParseErrTyp::MissingOperator,
            loc: src.clone(),
        }),
    }
}

pub fn parse(lex: Lexer<'_>, src: &SubStr) -> Result<Program, ParseErr> {
    let mut out: Vec<Operation> = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack

    for tok in lex {
        let tok = tok?;
        match tok.typ {
            TokTyp::Number => {
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::ParseNum(err),
                            loc: tok.loc,
                        })
                    }
                };
                out.push(Operation {
                    typ: OperationTyp::Val(num),
                    loc: tok.loc,
                });
            }

            TokTyp::Var => out.push(Operation {
                typ: OperationTyp::Var,
                loc: tok.loc,
            }),

            TokTyp::Op(o1) => {
                // a prefix operator has nothing on its left to bind to yet
                while !o1.is_prefix() {
                    let Some(ShuntOp {
                        typ: ShuntOpTyp::Operator(o2),
                        ..
                    }) = ops.last()
                    else {
                        break;
                    };
                    let o2 = *o2;
                    if (o2.precedence() > o1.precedence())
                        || ((o1.precedence() == o2.precedence())
                            && (o1.associativity() == Associativity::Left))
                    {
                        if let Some(op) = ops.pop().and_then(ShuntOp::into_output) {
                            out.push(op);
                        }
                    } else {
                        break;
                    }
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
            }

            TokTyp::OpenParen => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen,
                    loc: tok.loc,
                });
            }

            TokTyp::CloseParen => {
                if !pop_until_paren(&mut ops, &mut out) {
                    return Err(ParseErr {
                        typ: ParseErrTyp::ParenMismatch,
                        loc: tok.loc,
                    });
                }
            }

            TokTyp::XGreater
            | TokTyp::XLess
            | TokTyp::XEqual
            | TokTyp::XPipe
            | TokTyp::XComma
            | TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly => {
                // the lexer reports these as errors
                return Err(ParseErr {
                    typ: ParseErrTyp::LexErr(LexErrTyp::Unsupported(tok.typ)),
                    loc: tok.loc,
                });
            }
        }
    }

    while let Some(op) = ops.pop() {
        let loc = op.loc.clone();
        match op.into_output() {
            Some(op) => out.push(op),
            None => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ParenMismatch,
                    loc,
                })
            }
        }
    }

    check_arity(&out, src)?;
    Ok(Program::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval;
    use std::sync::Arc;

    fn compile(src: &str) -> Result<Program, ParseErr> {
        let src = Arc::new(String::from(src));
        parse(Lexer::new(&src), &SubStr::all(Arc::clone(&src)))
    }

    fn run(src: &str, x: Number) -> Number {
        let prog = compile(src).unwrap();
        eval::eval(&prog, x, &mut Vec::new()).unwrap()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(run("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(run("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(run("8 / 4 / 2", 0.0), 1.0);
        assert_eq!(run("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(run("2 ^ 3 ^ 2", 0.0), 512.0);
    }

    #[test]
    fn unary_signs() {
        assert_eq!(run("-x^2", 3.0), -9.0);
        assert_eq!(run("2^-1", 0.0), 0.5);
        assert_eq!(run("2*-x", 3.0), -6.0);
        assert_eq!(run("-x*3", 2.0), -6.0);
        assert_eq!(run("--x", 2.0), 2.0);
        assert_eq!(run("+x - -1", 2.0), 3.0);
        assert_eq!(run("-2^2 + 1", 0.0), -3.0);
    }

    #[test]
    fn implicit_products() {
        assert_eq!(run("2x+1", 3.0), 7.0);
        assert_eq!(run("2(x+1)", 3.0), 8.0);
        assert_eq!(run("(x+1)(x-1)", 3.0), 8.0);
        assert_eq!(run("3x^2", 2.0), 12.0);
        assert_eq!(run("(2x+1)/(3x-2)", 1.0), 3.0);
    }

    #[test]
    fn paren_mismatch() {
        let err = compile("(x + 1").unwrap_err();
        assert!(matches!(err.typ, ParseErrTyp::ParenMismatch));
        assert_eq!(err.loc.start(), 0);

        let err = compile("x + 1)").unwrap_err();
        assert!(matches!(err.typ, ParseErrTyp::ParenMismatch));
        assert_eq!(err.loc.start(), 5);
    }

    #[test]
    fn bad_numbers_and_empty_input() {
        let err = compile("1.2.3 * x").unwrap_err();
        assert!(matches!(err.typ, ParseErrTyp::ParseNum(_)));
        assert_eq!(err.loc.get(), "1.2.3");

        assert!(matches!(compile("   ").unwrap_err().typ, ParseErrTyp::Empty));
        assert!(matches!(compile("()").unwrap_err().typ, ParseErrTyp::Empty));
    }

    #[test]
    fn operand_counts_checked_at_compile_time() {
        let err = compile("x +").unwrap_err();
        assert!(matches!(err.typ, ParseErrTyp::MissingOperand));
        assert_eq!(err.loc.get(), "+");

        assert!(matches!(
            compile("* x").unwrap_err().typ,
            ParseErrTyp::MissingOperand
        ));
        assert!(matches!(
            compile("2 3").unwrap_err().typ,
            ParseErrTyp::MissingOperator
        ));
    }
}
