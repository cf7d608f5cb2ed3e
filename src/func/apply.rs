//! Evaluator composition.
//!
//! Every function here takes operand evaluators and returns a new evaluator that captures them.
//! Shapes are resolved once, at construction; the returned closures only combine values.

use std::sync::Arc;

use crate::foundation::error::{ExprError, ExprResult};
use crate::func::named::Evaluator;

#[inline]
pub(crate) fn truthy(x: f64) -> bool {
    x != 0.0
}

#[inline]
pub(crate) fn from_bool(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Apply `op` to the result of `f`, element-wise for vectors.
pub(crate) fn unary<R, Op>(f: &Evaluator<R>, op: Op) -> Evaluator<R>
where
    R: ?Sized + 'static,
    Op: Fn(f64) -> f64 + Send + Sync + 'static,
{
    match f {
        Evaluator::Scalar(f) => {
            let f = Arc::clone(f);
            Evaluator::Scalar(Arc::new(move |r: &R| -> ExprResult<f64> {
                Ok(op(f(r)?))
            }))
        }
        Evaluator::Vector(f) => {
            let f = Arc::clone(f);
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let mut v = f(r)?;
                for x in &mut v {
                    *x = op(*x);
                }
                Ok(v)
            }))
        }
    }
}

/// Combine two evaluators with `op`, broadcasting scalars over vectors.
///
/// Two vectors are combined over the shorter length; trailing entries of the longer one are
/// dropped.
pub(crate) fn binary<R, Op>(a: &Evaluator<R>, b: &Evaluator<R>, op: Op) -> Evaluator<R>
where
    R: ?Sized + 'static,
    Op: Fn(f64, f64) -> f64 + Send + Sync + 'static,
{
    match (a, b) {
        (Evaluator::Scalar(fa), Evaluator::Scalar(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Scalar(Arc::new(move |r: &R| -> ExprResult<f64> {
                let sa = fa(r)?;
                let sb = fb(r)?;
                Ok(op(sa, sb))
            }))
        }
        (Evaluator::Scalar(fa), Evaluator::Vector(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let sa = fa(r)?;
                let mut vb = fb(r)?;
                for x in &mut vb {
                    *x = op(sa, *x);
                }
                Ok(vb)
            }))
        }
        (Evaluator::Vector(fa), Evaluator::Scalar(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let mut va = fa(r)?;
                let sb = fb(r)?;
                for x in &mut va {
                    *x = op(*x, sb);
                }
                Ok(va)
            }))
        }
        (Evaluator::Vector(fa), Evaluator::Vector(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let va = fa(r)?;
                let vb = fb(r)?;
                Ok(zip_truncating(&va, &vb, &op))
            }))
        }
    }
}

fn zip_truncating(va: &[f64], vb: &[f64], op: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    if va.len() != vb.len() {
        tracing::debug!(
            left = va.len(),
            right = vb.len(),
            "vector operands differ in length; truncating to the shorter"
        );
    }
    va.iter().zip(vb).map(|(&x, &y)| op(x, y)).collect()
}

/// Logical AND that skips operands whose value cannot change the result.
pub(crate) fn logical_and<R>(a: &Evaluator<R>, b: &Evaluator<R>) -> Evaluator<R>
where
    R: ?Sized + 'static,
{
    match (a, b) {
        (Evaluator::Scalar(fa), Evaluator::Scalar(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Scalar(Arc::new(move |r: &R| -> ExprResult<f64> {
                Ok(from_bool(truthy(fa(r)?) && truthy(fb(r)?)))
            }))
        }
        (Evaluator::Scalar(fa), Evaluator::Vector(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                if !truthy(fa(r)?) {
                    // No entry can pass; `b` is never evaluated.
                    return Ok(Vec::new());
                }
                fb(r)
            }))
        }
        (Evaluator::Vector(fa), Evaluator::Scalar(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let va = fa(r)?;
                let mut sb: Option<bool> = None;
                let mut out = Vec::with_capacity(va.len());
                for x in va {
                    let pass = if truthy(x) {
                        match sb {
                            Some(b) => b,
                            None => {
                                let b = truthy(fb(r)?);
                                sb = Some(b);
                                b
                            }
                        }
                    } else {
                        false
                    };
                    out.push(from_bool(pass));
                }
                Ok(out)
            }))
        }
        (Evaluator::Vector(_), Evaluator::Vector(_)) => {
            binary(a, b, |x, y| from_bool(truthy(x) && truthy(y)))
        }
    }
}

/// Logical OR that skips operands whose value cannot change the result.
pub(crate) fn logical_or<R>(a: &Evaluator<R>, b: &Evaluator<R>) -> Evaluator<R>
where
    R: ?Sized + 'static,
{
    match (a, b) {
        (Evaluator::Scalar(fa), Evaluator::Scalar(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Scalar(Arc::new(move |r: &R| -> ExprResult<f64> {
                Ok(from_bool(truthy(fa(r)?) || truthy(fb(r)?)))
            }))
        }
        (Evaluator::Scalar(fa), Evaluator::Vector(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let sa = truthy(fa(r)?);
                let vb = fb(r)?;
                if sa {
                    // Only the length of `b` matters here.
                    return Ok(vec![1.0; vb.len()]);
                }
                Ok(vb)
            }))
        }
        (Evaluator::Vector(fa), Evaluator::Scalar(fb)) => {
            let (fa, fb) = (Arc::clone(fa), Arc::clone(fb));
            Evaluator::Vector(Arc::new(move |r: &R| -> ExprResult<Vec<f64>> {
                let va = fa(r)?;
                let mut sb: Option<bool> = None;
                let mut out = Vec::with_capacity(va.len());
                for x in va {
                    let pass = if truthy(x) {
                        true
                    } else {
                        match sb {
                            Some(b) => b,
                            None => {
                                let b = truthy(fb(r)?);
                                sb = Some(b);
                                b
                            }
                        }
                    };
                    out.push(from_bool(pass));
                }
                Ok(out)
            }))
        }
        (Evaluator::Vector(_), Evaluator::Vector(_)) => {
            binary(a, b, |x, y| from_bool(truthy(x) || truthy(y)))
        }
    }
}

/// Scalar evaluator reading entry `idx(r)` of `vec(r)`.
///
/// `name` labels out-of-range errors raised at evaluation time.
pub(crate) fn index<R>(
    vec: &Evaluator<R>,
    idx: &Evaluator<R>,
    name: &str,
) -> ExprResult<Evaluator<R>>
where
    R: ?Sized + 'static,
{
    let vec = match vec {
        Evaluator::Vector(f) => Arc::clone(f),
        Evaluator::Scalar(_) => {
            return Err(ExprError::shape_mismatch(format!(
                "cannot index scalar in '{name}'"
            )));
        }
    };
    let idx = match idx {
        Evaluator::Scalar(f) => Arc::clone(f),
        Evaluator::Vector(_) => {
            return Err(ExprError::shape_mismatch(format!(
                "cannot use a vector as index in '{name}'"
            )));
        }
    };
    let name = name.to_owned();
    Ok(Evaluator::Scalar(Arc::new(move |r: &R| -> ExprResult<f64> {
        let v = vec(r)?;
        let i = idx(r)?;
        let out_of_range = || ExprError::IndexOutOfRange {
            name: name.clone(),
            index: i,
            len: v.len(),
        };
        if !(i.is_finite() && i >= 0.0) {
            return Err(out_of_range());
        }
        v.get(i as usize).copied().ok_or_else(out_of_range)
    })))
}

#[cfg(test)]
#[path = "../../tests/unit/func/apply.rs"]
mod tests;
