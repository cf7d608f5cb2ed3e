use std::fmt;
use std::sync::Arc;

use crate::expression::compile::Compiler;
use crate::foundation::error::{ExprError, ExprResult};
use crate::record::EventRecord;

/// Compiled per-record function returning one number.
pub type ScalarFn<R> = Arc<dyn Fn(&R) -> ExprResult<f64> + Send + Sync>;

/// Compiled per-record function returning one number per sub-entry.
pub type VectorFn<R> = Arc<dyn Fn(&R) -> ExprResult<Vec<f64>> + Send + Sync>;

/// Return shape of a [`NamedFunc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// One value per record.
    Scalar,
    /// Ordered values per record.
    Vector,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::Vector => f.write_str("vector"),
        }
    }
}

/// The single compiled evaluator held by a [`NamedFunc`].
pub enum Evaluator<R: ?Sized> {
    /// Scalar-valued evaluator.
    Scalar(ScalarFn<R>),
    /// Vector-valued evaluator.
    Vector(VectorFn<R>),
}

impl<R: ?Sized> Evaluator<R> {
    /// Shape produced by this evaluator.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) => Shape::Scalar,
            Self::Vector(_) => Shape::Vector,
        }
    }
}

impl<R: ?Sized> Clone for Evaluator<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Scalar(f) => Self::Scalar(Arc::clone(f)),
            Self::Vector(f) => Self::Vector(Arc::clone(f)),
        }
    }
}

/// An expression's canonical text paired with its compiled evaluator.
///
/// Operators on `NamedFunc` build new values whose evaluators call the operands' evaluators,
/// so a deep expression is compiled once and then evaluated per record without re-parsing.
/// Evaluation only reads captured closures and the passed record, which makes an unmutated
/// value safe to evaluate from many threads at once.
pub struct NamedFunc<R: ?Sized = dyn EventRecord> {
    name: String,
    eval: Evaluator<R>,
}

impl<R: ?Sized> Clone for NamedFunc<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            eval: self.eval.clone(),
        }
    }
}

impl<R: ?Sized + 'static> NamedFunc<R> {
    /// Scalar-valued function from a hand-written evaluator.
    pub fn scalar(
        name: impl Into<String>,
        f: impl Fn(&R) -> ExprResult<f64> + Send + Sync + 'static,
    ) -> Self {
        Self::from_evaluator(name, Evaluator::Scalar(Arc::new(f)))
    }

    /// Vector-valued function from a hand-written evaluator.
    pub fn vector(
        name: impl Into<String>,
        f: impl Fn(&R) -> ExprResult<Vec<f64>> + Send + Sync + 'static,
    ) -> Self {
        Self::from_evaluator(name, Evaluator::Vector(Arc::new(f)))
    }

    /// Function ignoring the record and returning `x`, named by its literal text.
    ///
    /// Very large or small magnitudes use exponent form. Non-finite values are named by an
    /// arithmetic expression producing them (`(1/0)`, `(-1/0)`, `(0/0)`), so every constant
    /// name compiles back to the same value.
    pub fn constant(x: f64) -> Self {
        Self::scalar(constant_name(x), move |_: &R| Ok(x))
    }

    /// Pair an existing evaluator with a name.
    pub fn from_evaluator(name: impl Into<String>, eval: Evaluator<R>) -> Self {
        let mut name = name.into();
        clean_name(&mut name);
        Self { name, eval }
    }

    /// Replace the evaluator with a scalar one.
    pub fn set_scalar_fn(
        &mut self,
        f: impl Fn(&R) -> ExprResult<f64> + Send + Sync + 'static,
    ) -> &mut Self {
        self.eval = Evaluator::Scalar(Arc::new(f));
        self
    }

    /// Replace the evaluator with a vector one.
    pub fn set_vector_fn(
        &mut self,
        f: impl Fn(&R) -> ExprResult<Vec<f64>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.eval = Evaluator::Vector(Arc::new(f));
        self
    }
}

impl<R: EventRecord + ?Sized + 'static> NamedFunc<R> {
    /// Leaf reading the record value `name` with the given shape.
    ///
    /// A record lacking the value fails with [`ExprError::MissingVariable`] at evaluation time.
    pub fn variable(name: &str, shape: Shape) -> Self {
        let key = name.to_owned();
        match shape {
            Shape::Scalar => Self::scalar(name, move |r: &R| {
                r.scalar(&key)
                    .ok_or_else(|| ExprError::missing_variable(key.as_str()))
            }),
            Shape::Vector => Self::vector(name, move |r: &R| {
                r.vector(&key)
                    .map(<[f64]>::to_vec)
                    .ok_or_else(|| ExprError::missing_variable(key.as_str()))
            }),
        }
    }

    /// Compile expression text, resolving identifiers through `compiler`.
    pub fn from_expression(text: &str, compiler: &Compiler<R>) -> ExprResult<Self> {
        compiler.compile(text)
    }
}

impl<R: ?Sized> NamedFunc<R> {
    /// Canonical text of the expression.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename without touching the evaluator. Whitespace is stripped.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        clean_name(&mut self.name);
        self
    }

    /// Install `eval` when present; `None` keeps the current evaluator.
    pub fn set_evaluator(&mut self, eval: Option<Evaluator<R>>) -> &mut Self {
        if let Some(eval) = eval {
            self.eval = eval;
        }
        self
    }

    /// Current evaluator.
    pub fn evaluator(&self) -> &Evaluator<R> {
        &self.eval
    }

    /// Scalar evaluator, if this function is scalar-valued.
    pub fn scalar_fn(&self) -> Option<&ScalarFn<R>> {
        match &self.eval {
            Evaluator::Scalar(f) => Some(f),
            Evaluator::Vector(_) => None,
        }
    }

    /// Vector evaluator, if this function is vector-valued.
    pub fn vector_fn(&self) -> Option<&VectorFn<R>> {
        match &self.eval {
            Evaluator::Vector(f) => Some(f),
            Evaluator::Scalar(_) => None,
        }
    }

    /// Return shape.
    pub fn shape(&self) -> Shape {
        self.eval.shape()
    }

    /// Whether the evaluator is scalar-valued.
    pub fn is_scalar(&self) -> bool {
        matches!(self.eval, Evaluator::Scalar(_))
    }

    /// Whether the evaluator is vector-valued.
    pub fn is_vector(&self) -> bool {
        matches!(self.eval, Evaluator::Vector(_))
    }

    /// Evaluate as a scalar. Fails with [`ExprError::InvalidShape`] on a vector function.
    pub fn eval_scalar(&self, record: &R) -> ExprResult<f64> {
        match &self.eval {
            Evaluator::Scalar(f) => f(record),
            Evaluator::Vector(_) => Err(ExprError::invalid_shape(&self.name, Shape::Scalar)),
        }
    }

    /// Evaluate as a vector. Fails with [`ExprError::InvalidShape`] on a scalar function.
    pub fn eval_vector(&self, record: &R) -> ExprResult<Vec<f64>> {
        match &self.eval {
            Evaluator::Vector(f) => f(record),
            Evaluator::Scalar(_) => Err(ExprError::invalid_shape(&self.name, Shape::Vector)),
        }
    }

    /// Overwrite name and evaluator together.
    pub(crate) fn replace(&mut self, name: String, eval: Evaluator<R>) {
        self.name = name;
        self.eval = eval;
    }
}

impl<R: ?Sized> fmt::Display for NamedFunc<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<R: ?Sized> fmt::Debug for NamedFunc<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedFunc")
            .field("name", &self.name)
            .field("shape", &self.shape())
            .finish()
    }
}

impl<R: ?Sized + 'static> From<f64> for NamedFunc<R> {
    fn from(x: f64) -> Self {
        Self::constant(x)
    }
}

impl<R: ?Sized> From<&NamedFunc<R>> for NamedFunc<R> {
    fn from(f: &NamedFunc<R>) -> Self {
        f.clone()
    }
}

fn constant_name(x: f64) -> String {
    if x.is_nan() {
        return "(0/0)".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "(1/0)" } else { "(-1/0)" }.to_owned();
    }
    let mag = x.abs();
    if mag != 0.0 && !(1e-6..1e16).contains(&mag) {
        format!("{x:e}")
    } else {
        format!("{x}")
    }
}

fn clean_name(name: &mut String) {
    name.retain(|c| !c.is_whitespace());
}

#[cfg(test)]
#[path = "../../tests/unit/func/named.rs"]
mod tests;
