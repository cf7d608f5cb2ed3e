use rayon::prelude::*;

use crate::foundation::error::{ExprError, ExprResult};
use crate::func::aggregate::all_rows_any_true;
use crate::func::apply::truthy;
use crate::func::named::{NamedFunc, Shape};
use crate::record::EventRecord;

/// How a batch of records is spread over threads.
#[derive(Clone, Debug)]
pub struct EvalThreading {
    /// Evaluate on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Records handed to the pool per round. `0` is treated as `1`.
    pub chunk_size: usize,
    /// Pool size; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for EvalThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 4096,
            threads: None,
        }
    }
}

/// Evaluate a scalar function on every record, keeping record order.
#[tracing::instrument(skip_all, fields(name = func.name(), records = records.len()))]
pub fn eval_scalar_batch<T>(
    func: &NamedFunc,
    records: &[T],
    threading: &EvalThreading,
) -> ExprResult<Vec<f64>>
where
    T: EventRecord + Sync + 'static,
{
    if !func.is_scalar() {
        return Err(ExprError::invalid_shape(func.name(), Shape::Scalar));
    }
    run(records, threading, |r| func.eval_scalar(r))
}

/// Evaluate a vector function on every record, keeping record order.
#[tracing::instrument(skip_all, fields(name = func.name(), records = records.len()))]
pub fn eval_vector_batch<T>(
    func: &NamedFunc,
    records: &[T],
    threading: &EvalThreading,
) -> ExprResult<Vec<Vec<f64>>>
where
    T: EventRecord + Sync + 'static,
{
    if !func.is_vector() {
        return Err(ExprError::invalid_shape(func.name(), Shape::Vector));
    }
    run(records, threading, |r| func.eval_vector(r))
}

/// Number of records passing every cut.
///
/// Scalar cuts must be truthy. Vector cuts must share at least one index that is truthy in all
/// of them. With no cuts every record passes.
#[tracing::instrument(skip_all, fields(cuts = cuts.len(), records = records.len()))]
pub fn count_passing<T>(
    cuts: &[NamedFunc],
    records: &[T],
    threading: &EvalThreading,
) -> ExprResult<usize>
where
    T: EventRecord + Sync + 'static,
{
    let passed = run(records, threading, |r| passes(cuts, r))?;
    let n = passed.into_iter().filter(|&p| p).count();
    tracing::debug!(passed = n, "selection applied");
    Ok(n)
}

fn passes(cuts: &[NamedFunc], record: &(dyn EventRecord + 'static)) -> ExprResult<bool> {
    let mut rows = Vec::new();
    for cut in cuts {
        if cut.is_scalar() {
            if !truthy(cut.eval_scalar(record)?) {
                return Ok(false);
            }
        } else {
            rows.push(cut.eval_vector(record)?);
        }
    }
    Ok(rows.is_empty() || all_rows_any_true(&rows))
}

fn run<T, O, F>(records: &[T], threading: &EvalThreading, f: F) -> ExprResult<Vec<O>>
where
    T: Sync,
    O: Send,
    F: Fn(&T) -> ExprResult<O> + Sync,
{
    if !threading.parallel {
        return records.iter().map(&f).collect();
    }

    let pool = build_thread_pool(threading.threads)?;
    let mut out = Vec::with_capacity(records.len());
    for chunk in records.chunks(normalized_chunk_size(threading.chunk_size)) {
        let mut part = pool.install(|| chunk.par_iter().map(&f).collect::<ExprResult<Vec<O>>>())?;
        out.append(&mut part);
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> ExprResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ExprError::config(
            "eval threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ExprError::config(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../tests/unit/batch.rs"]
mod tests;
