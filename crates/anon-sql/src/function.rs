//! Schema extraction from masking function calls.

use crate::error::SqlError;
use sqlparser::ast::{
    Expr, Function, FunctionArguments, Ident, ObjectNamePart, SelectItem, SetExpr, Statement,
    visit_expressions,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use std::ops::ControlFlow;

/// Extract the schema of a function call, see [`FunctionCallAnalyzer::extract_schema`].
pub fn extract_schema(call: Option<&str>) -> Result<Option<String>, SqlError> {
    FunctionCallAnalyzer::new().extract_schema(call)
}

/// A function invoked by a masking call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalledFunction {
    /// Schema qualifier, `""` when unqualified.
    pub schema: String,
    /// The function name as written.
    pub name: String,
}

impl CalledFunction {
    fn of(function: &Function) -> Self {
        Self {
            schema: function_schema(function),
            name: function.name.to_string(),
        }
    }
}

/// Parses the function call text found in `MASKED WITH FUNCTION` labels.
#[derive(Debug)]
pub struct FunctionCallAnalyzer {
    dialect: PostgreSqlDialect,
}

impl Clone for FunctionCallAnalyzer {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Default for FunctionCallAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionCallAnalyzer {
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }

    /// The schema part of a function call.
    ///
    /// The text is parsed as the target of a `SELECT`, so it may carry an
    /// alias. A name with exactly two parts yields the first one, folded to
    /// lowercase unless quoted. Any other name yields `""`.
    ///
    /// `None` in gives `None` out.
    pub fn extract_schema(&self, call: Option<&str>) -> Result<Option<String>, SqlError> {
        let Some(call) = call else {
            return Ok(None);
        };
        if call.trim().is_empty() {
            return Err(SqlError::EmptyFunctionCall);
        }

        let function = self.parse_call(call)?;
        let schema = function_schema(&function);
        tracing::debug!(call, schema = %schema, "function schema extracted");
        Ok(Some(schema))
    }

    /// Every function `call` invokes: the call itself first, then the calls
    /// nested in its arguments.
    ///
    /// Subqueries are rejected, they can reach any relation.
    pub fn called_functions(&self, call: &str) -> Result<Vec<CalledFunction>, SqlError> {
        if call.trim().is_empty() {
            return Err(SqlError::EmptyFunctionCall);
        }

        let invalid = || SqlError::InvalidFunctionCall {
            call: call.to_string(),
        };

        let function = self.parse_call(call)?;
        if matches!(function.args, FunctionArguments::Subquery(_)) {
            return Err(invalid());
        }
        let mut called = vec![CalledFunction::of(&function)];
        let flow = visit_expressions(&function, |expr| match expr {
            Expr::Subquery(_) | Expr::Exists { .. } | Expr::InSubquery { .. } => {
                ControlFlow::Break(())
            }
            Expr::Function(nested) if matches!(nested.args, FunctionArguments::Subquery(_)) => {
                ControlFlow::Break(())
            }
            Expr::Function(nested) => {
                called.push(CalledFunction::of(nested));
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        });
        if flow.is_break() {
            tracing::debug!(call, "function call contains a subquery");
            return Err(invalid());
        }
        Ok(called)
    }

    /// Parse `call` as the single target of a `SELECT`.
    ///
    /// Nothing may follow the target: no `FROM`, `WHERE` or any other clause.
    pub fn parse_call(&self, call: &str) -> Result<Function, SqlError> {
        let invalid = || SqlError::InvalidFunctionCall {
            call: call.to_string(),
        };

        let sql = format!("SELECT {call}");
        let mut statements = Parser::parse_sql(&self.dialect, &sql).map_err(|e| {
            tracing::debug!(call, error = %e, "function call does not parse");
            invalid()
        })?;
        if statements.len() != 1 {
            return Err(invalid());
        }

        let Statement::Query(query) = statements.remove(0) else {
            return Err(invalid());
        };
        let rendered = query.to_string();
        let SetExpr::Select(select) = *query.body else {
            return Err(invalid());
        };
        let select = *select;
        let [item] = <[SelectItem; 1]>::try_from(select.projection).map_err(|_| invalid())?;

        // any clause besides the target shows up in the rendered query
        if rendered != format!("SELECT {item}") {
            tracing::debug!(call, "function call carries extra clauses");
            return Err(invalid());
        }

        let expr = match item {
            SelectItem::UnnamedExpr(expr) => expr,
            SelectItem::ExprWithAlias { expr, .. } => expr,
            _ => return Err(invalid()),
        };
        match expr {
            Expr::Function(function) => Ok(function),
            _ => Err(invalid()),
        }
    }
}

/// A name with exactly two parts yields the first one, anything else `""`.
fn function_schema(function: &Function) -> String {
    match function.name.0.as_slice() {
        [schema, _] => name_part(schema),
        _ => String::new(),
    }
}

fn name_part(part: &ObjectNamePart) -> String {
    match part {
        ObjectNamePart::Identifier(ident) => fold_identifier(ident),
        other => other.to_string(),
    }
}

/// PostgreSQL folds unquoted identifiers to lowercase.
fn fold_identifier(ident: &Ident) -> String {
    if ident.quote_style.is_some() {
        ident.value.clone()
    } else {
        ident.value.to_ascii_lowercase()
    }
}
