use std::collections::BTreeMap;

use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::expression::parser::parse_expr;
use crate::foundation::error::{ExprError, ExprResult};
use crate::func::named::NamedFunc;
use crate::record::EventRecord;
use crate::schema::Schema;

/// Turns expression text into a [`NamedFunc`] built from the operator algebra.
///
/// Identifiers resolve to registered functions first, then to schema variables.
pub struct Compiler<R: ?Sized = dyn EventRecord> {
    schema: Schema,
    functions: BTreeMap<String, NamedFunc<R>>,
}

impl<R: ?Sized> Clone for Compiler<R> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            functions: self.functions.clone(),
        }
    }
}

impl<R: EventRecord + ?Sized + 'static> Compiler<R> {
    /// Compiler resolving identifiers against `schema` only.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            functions: BTreeMap::new(),
        }
    }

    /// Schema used for identifier lookup.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Make `func` available to expressions under `name`, shadowing any schema variable.
    pub fn register(&mut self, name: impl Into<String>, func: NamedFunc<R>) -> ExprResult<()> {
        let name = name.into();
        if !crate::schema::is_identifier(&name) {
            return Err(ExprError::config(format!(
                "function name '{name}' is not a valid identifier"
            )));
        }
        self.functions.insert(name, func);
        Ok(())
    }

    /// Compile `text`; the result is named by the text with whitespace removed.
    #[tracing::instrument(skip(self))]
    pub fn compile(&self, text: &str) -> ExprResult<NamedFunc<R>> {
        let ast = parse_expr(text)?;
        let mut func = self.lower(&ast)?;
        func.set_name(text);
        tracing::debug!(name = func.name(), shape = %func.shape(), "compiled expression");
        Ok(func)
    }

    fn lower(&self, expr: &Expr) -> ExprResult<NamedFunc<R>> {
        Ok(match expr {
            Expr::Number(v) => NamedFunc::constant(*v),
            Expr::Bool(b) => {
                let mut f = NamedFunc::constant(if *b { 1.0 } else { 0.0 });
                f.set_name(if *b { "true" } else { "false" });
                f
            }
            Expr::Ident(name) => self.resolve(name)?,
            Expr::Unary { op, expr } => {
                let e = self.lower(expr)?;
                match op {
                    UnaryOp::Neg => -e,
                    UnaryOp::Plus => e.plus(),
                    UnaryOp::Not => !e,
                }
            }
            Expr::Binary { op, left, right } => {
                let l = self.lower(left)?;
                let r = self.lower(right)?;
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Mod => l % r,
                    BinaryOp::Eq => l.equal(r),
                    BinaryOp::Ne => l.not_equal(r),
                    BinaryOp::Lt => l.less(r),
                    BinaryOp::Le => l.less_equal(r),
                    BinaryOp::Gt => l.greater(r),
                    BinaryOp::Ge => l.greater_equal(r),
                    BinaryOp::And => l.and(r),
                    BinaryOp::Or => l.or(r),
                }
            }
            Expr::Index { base, index } => {
                let b = self.lower(base)?;
                let i = self.lower(index)?;
                b.at(i)?
            }
        })
    }

    fn resolve(&self, name: &str) -> ExprResult<NamedFunc<R>> {
        if let Some(f) = self.functions.get(name) {
            let mut f = f.clone();
            f.set_name(name);
            return Ok(f);
        }
        match self.schema.shape_of(name) {
            Some(shape) => Ok(NamedFunc::variable(name, shape)),
            None => Err(ExprError::missing_variable(name)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/compile.rs"]
mod tests;
