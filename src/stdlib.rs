// SPDX: CC0-1.0

use crate::Number;

// arity is checked by `eval::eval` before any of these are called

pub fn neg(args: &[Number]) -> Number {
    -args[0]
}

pub fn pos(args: &[Number]) -> Number {
    args[0]
}

pub fn add(args: &[Number]) -> Number {
    args[0] + args[1]
}

pub fn sub(args: &[Number]) -> Number {
    args[0] - args[1]
}

pub fn mul(args: &[Number]) -> Number {
    args[0] * args[1]
}

pub fn div(args: &[Number]) -> Number {
    let [x, y] = [args[0], args[1]];
    if y == 0.0 {
        // 0/0 and x/0 are both undefined, never a signed infinity
        Number::NAN
    } else {
        x / y
    }
}

pub fn exp(args: &[Number]) -> Number {
    let [x, exp] = [args[0], args[1]];
    x.powf(exp)
}
