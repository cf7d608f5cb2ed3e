//! `eventexpr` compiles selection and plotting expressions once and evaluates them per event.
//!
//! The central type is [`NamedFunc`]: a canonical expression name paired with exactly one
//! evaluator, either scalar (one number per event) or vector (one number per sub-object such as
//! a jet or a muon). Values compose through ordinary Rust operators:
//!
//! - Arithmetic (`+ - * / %`, unary `-`) broadcasts scalars against vectors.
//! - Comparisons (`greater`, `less_equal`, ...) produce `1.0`/`0.0`.
//! - Logical [`NamedFunc::and`] / [`NamedFunc::or`] (also `&` / `|`) short-circuit.
//! - [`NamedFunc::at`] indexes a vector with a scalar.
//!
//! Text expressions go through [`Compiler`], which resolves identifiers against a [`Schema`] and
//! user-registered functions. [`any_true`] and [`all_rows_any_true`] reduce evaluated vectors to
//! a pass/fail decision, and the `batch` functions run a compiled value over many records,
//! optionally on a rayon pool.
//!
//! Evaluators compare floats exactly and treat any non-zero value as true.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod batch;
mod expression;
mod foundation;
mod func;
mod record;
mod schema;

pub use crate::batch::{EvalThreading, count_passing, eval_scalar_batch, eval_vector_batch};
pub use crate::expression::compile::Compiler;
pub use crate::foundation::error::{ExprError, ExprResult};
pub use crate::func::aggregate::{all_rows_any_true, any_true};
pub use crate::func::named::{Evaluator, NamedFunc, ScalarFn, Shape, VectorFn};
pub use crate::record::{EventRecord, MapRecord, RecordValue};
pub use crate::schema::Schema;
