use crate::func::apply::truthy;

/// Whether any entry of an evaluated vector is truthy.
pub fn any_true(v: &[f64]) -> bool {
    v.iter().any(|&x| truthy(x))
}

/// Whether some entry index is truthy in every vector at once.
///
/// Typically each vector is one selection evaluated on the same record, so this answers "does
/// any object pass all cuts". Indices beyond the end of any vector never pass. An empty list
/// yields `false`.
pub fn all_rows_any_true<V: AsRef<[f64]>>(rows: &[V]) -> bool {
    let Some(first) = rows.first() else {
        return false;
    };
    (0..first.as_ref().len()).any(|ix| {
        rows.iter()
            .all(|row| row.as_ref().get(ix).is_some_and(|&x| truthy(x)))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/func/aggregate.rs"]
mod tests;
