//! Operator algebra on [`NamedFunc`].
//!
//! Arithmetic uses `std::ops`. Comparisons and logical connectives return new functions rather
//! than `bool`, so they are methods; `&` and `|` are shorthand for [`NamedFunc::and`] and
//! [`NamedFunc::or`].

use std::ops::{
    Add, AddAssign, BitAnd, BitOr, Div, DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Sub,
    SubAssign,
};

use crate::foundation::error::ExprResult;
use crate::func::apply::{self, from_bool, truthy};
use crate::func::named::NamedFunc;

fn binary_name(a: &str, symbol: &str, b: &str) -> String {
    format!("({a}){symbol}({b})")
}

impl<R: ?Sized + 'static> NamedFunc<R> {
    fn combine<Op>(&self, rhs: &NamedFunc<R>, symbol: &str, op: Op) -> NamedFunc<R>
    where
        Op: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        NamedFunc::from_evaluator(
            binary_name(self.name(), symbol, rhs.name()),
            apply::binary(self.evaluator(), rhs.evaluator(), op),
        )
    }

    fn combine_assign<Op>(&mut self, rhs: &NamedFunc<R>, symbol: &str, op: Op)
    where
        Op: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        let name = binary_name(self.name(), symbol, rhs.name());
        let eval = apply::binary(self.evaluator(), rhs.evaluator(), op);
        self.replace(name, eval);
    }

    fn prefixed<Op>(&self, symbol: &str, op: Op) -> NamedFunc<R>
    where
        Op: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        NamedFunc::from_evaluator(
            format!("{symbol}({})", self.name()),
            apply::unary(self.evaluator(), op),
        )
    }

    /// Unary plus: same values, name wrapped as `+(...)`.
    pub fn plus(&self) -> NamedFunc<R> {
        NamedFunc::from_evaluator(format!("+({})", self.name()), self.evaluator().clone())
    }

    /// `1` where the two operands are equal, `0` otherwise.
    pub fn equal(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        self.combine(&rhs.into(), "==", |a, b| from_bool(a == b))
    }

    /// `1` where the two operands differ, `0` otherwise.
    pub fn not_equal(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        self.combine(&rhs.into(), "!=", |a, b| from_bool(a != b))
    }

    /// `1` where `self > rhs`.
    pub fn greater(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        self.combine(&rhs.into(), ">", |a, b| from_bool(a > b))
    }

    /// `1` where `self < rhs`.
    pub fn less(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        self.combine(&rhs.into(), "<", |a, b| from_bool(a < b))
    }

    /// `1` where `self >= rhs`.
    pub fn greater_equal(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        self.combine(&rhs.into(), ">=", |a, b| from_bool(a >= b))
    }

    /// `1` where `self <= rhs`.
    pub fn less_equal(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        self.combine(&rhs.into(), "<=", |a, b| from_bool(a <= b))
    }

    /// Short-circuiting logical AND.
    ///
    /// A falsy scalar `self` never evaluates a vector `rhs` and yields an empty vector. A vector
    /// `self` evaluates a scalar `rhs` at most once per record, and only if some entry is truthy.
    ///
    /// [`NamedFunc::or`] with a truthy scalar `self` still evaluates a vector `rhs` to size its
    /// all-ones result, so the two are not De Morgan duals here: with `s = 0` and `v = [1, 1]`,
    /// `!(s && v)` is `[]` while `!s || !v` is `[1, 1]`.
    pub fn and(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        let rhs = rhs.into();
        NamedFunc::from_evaluator(
            binary_name(self.name(), "&&", rhs.name()),
            apply::logical_and(self.evaluator(), rhs.evaluator()),
        )
    }

    /// Short-circuiting logical OR.
    ///
    /// A vector `self` evaluates a scalar `rhs` at most once per record, and only if some entry
    /// is falsy.
    pub fn or(&self, rhs: impl Into<NamedFunc<R>>) -> NamedFunc<R> {
        let rhs = rhs.into();
        NamedFunc::from_evaluator(
            binary_name(self.name(), "||", rhs.name()),
            apply::logical_or(self.evaluator(), rhs.evaluator()),
        )
    }

    /// Entry `index` of this vector function, as a scalar function.
    ///
    /// Fails with `ShapeMismatch` when `self` is scalar or `index` is a vector. Indices outside
    /// the per-record vector fail at evaluation time with `IndexOutOfRange`.
    pub fn at(&self, index: impl Into<NamedFunc<R>>) -> ExprResult<NamedFunc<R>> {
        let index = index.into();
        let name = format!("({})[{}]", self.name(), index.name());
        let eval = apply::index(self.evaluator(), index.evaluator(), &name)?;
        Ok(NamedFunc::from_evaluator(name, eval))
    }
}

macro_rules! arith_ops {
    ($($trait:ident $method:ident $assign:ident $assign_method:ident $symbol:literal $op:expr;)*) => {$(
        impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> $trait<T> for NamedFunc<R> {
            type Output = NamedFunc<R>;

            fn $method(mut self, rhs: T) -> NamedFunc<R> {
                self.combine_assign(&rhs.into(), $symbol, $op);
                self
            }
        }

        impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> $trait<T> for &NamedFunc<R> {
            type Output = NamedFunc<R>;

            fn $method(self, rhs: T) -> NamedFunc<R> {
                self.combine(&rhs.into(), $symbol, $op)
            }
        }

        impl<R: ?Sized + 'static> $trait<NamedFunc<R>> for f64 {
            type Output = NamedFunc<R>;

            fn $method(self, rhs: NamedFunc<R>) -> NamedFunc<R> {
                NamedFunc::constant(self).combine(&rhs, $symbol, $op)
            }
        }

        impl<R: ?Sized + 'static> $trait<&NamedFunc<R>> for f64 {
            type Output = NamedFunc<R>;

            fn $method(self, rhs: &NamedFunc<R>) -> NamedFunc<R> {
                NamedFunc::constant(self).combine(rhs, $symbol, $op)
            }
        }

        impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> $assign<T> for NamedFunc<R> {
            fn $assign_method(&mut self, rhs: T) {
                self.combine_assign(&rhs.into(), $symbol, $op);
            }
        }
    )*};
}

arith_ops! {
    Add add AddAssign add_assign "+" |a: f64, b: f64| a + b;
    Sub sub SubAssign sub_assign "-" |a: f64, b: f64| a - b;
    Mul mul MulAssign mul_assign "*" |a: f64, b: f64| a * b;
    Div div DivAssign div_assign "/" |a: f64, b: f64| a / b;
    Rem rem RemAssign rem_assign "%" |a: f64, b: f64| a % b;
}

impl<R: ?Sized + 'static> Neg for NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn neg(self) -> NamedFunc<R> {
        -&self
    }
}

impl<R: ?Sized + 'static> Neg for &NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn neg(self) -> NamedFunc<R> {
        self.prefixed("-", |x| -x)
    }
}

impl<R: ?Sized + 'static> Not for NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn not(self) -> NamedFunc<R> {
        !&self
    }
}

impl<R: ?Sized + 'static> Not for &NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn not(self) -> NamedFunc<R> {
        self.prefixed("!", |x| from_bool(!truthy(x)))
    }
}

impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> BitAnd<T> for NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn bitand(self, rhs: T) -> NamedFunc<R> {
        self.and(rhs)
    }
}

impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> BitAnd<T> for &NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn bitand(self, rhs: T) -> NamedFunc<R> {
        self.and(rhs)
    }
}

impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> BitOr<T> for NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn bitor(self, rhs: T) -> NamedFunc<R> {
        self.or(rhs)
    }
}

impl<R: ?Sized + 'static, T: Into<NamedFunc<R>>> BitOr<T> for &NamedFunc<R> {
    type Output = NamedFunc<R>;

    fn bitor(self, rhs: T) -> NamedFunc<R> {
        self.or(rhs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/func/ops.rs"]
mod tests;
