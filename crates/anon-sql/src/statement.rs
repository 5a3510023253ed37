//! Statement classification.

use crate::error::SqlError;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use std::fmt;

/// Command type of an analyzed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Select,
    Insert,
    Update,
    Delete,
    Utility(UtilityKind),
}

/// Utility statements the masking hook tells apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityKind {
    Explain,
    Truncate,
    Copy,
    Other,
}

impl CommandKind {
    pub fn is_utility(&self) -> bool {
        matches!(self, CommandKind::Utility(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Select => "SELECT",
            CommandKind::Insert => "INSERT",
            CommandKind::Update => "UPDATE",
            CommandKind::Delete => "DELETE",
            CommandKind::Utility(UtilityKind::Explain) => "EXPLAIN",
            CommandKind::Utility(UtilityKind::Truncate) => "TRUNCATE",
            CommandKind::Utility(UtilityKind::Copy) => "COPY",
            CommandKind::Utility(UtilityKind::Other) => "UTILITY",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps query strings to the command kind of each statement.
#[derive(Debug)]
pub struct StatementClassifier {
    dialect: PostgreSqlDialect,
}

impl Clone for StatementClassifier {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Default for StatementClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementClassifier {
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }

    /// Parse a SQL string into statements.
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, SqlError> {
        Parser::parse_sql(&self.dialect, sql).map_err(|e| SqlError::ParseError(e.to_string()))
    }

    /// Command kind of every statement in `sql`, in order.
    pub fn classify(&self, sql: &str) -> Result<Vec<CommandKind>, SqlError> {
        let statements = self.parse(sql)?;
        Ok(statements.iter().map(|stmt| self.command_kind(stmt)).collect())
    }

    /// Command kind of a parsed statement.
    pub fn command_kind(&self, stmt: &Statement) -> CommandKind {
        match stmt {
            Statement::Query(_) => CommandKind::Select,
            Statement::Insert { .. } => CommandKind::Insert,
            Statement::Update { .. } => CommandKind::Update,
            Statement::Delete(_) => CommandKind::Delete,
            Statement::Explain { .. } | Statement::ExplainTable { .. } => {
                CommandKind::Utility(UtilityKind::Explain)
            }
            Statement::Truncate { .. } => CommandKind::Utility(UtilityKind::Truncate),
            Statement::Copy { .. } => CommandKind::Utility(UtilityKind::Copy),
            _ => CommandKind::Utility(UtilityKind::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(sql: &str) -> Vec<CommandKind> {
        StatementClassifier::new().classify(sql).unwrap()
    }

    #[test]
    fn test_dml() {
        assert_eq!(classify("SELECT * FROM people"), vec![CommandKind::Select]);
        assert_eq!(
            classify("INSERT INTO people (name) VALUES ('bruce')"),
            vec![CommandKind::Insert]
        );
        assert_eq!(
            classify("UPDATE people SET name = 'bruce' WHERE id = 1"),
            vec![CommandKind::Update]
        );
        assert_eq!(
            classify("DELETE FROM people WHERE id = 1"),
            vec![CommandKind::Delete]
        );
    }

    #[test]
    fn test_utility() {
        assert_eq!(
            classify("EXPLAIN SELECT * FROM people"),
            vec![CommandKind::Utility(UtilityKind::Explain)]
        );
        assert_eq!(
            classify("TRUNCATE people"),
            vec![CommandKind::Utility(UtilityKind::Truncate)]
        );
        assert_eq!(
            classify("COPY people TO STDOUT"),
            vec![CommandKind::Utility(UtilityKind::Copy)]
        );
        assert_eq!(
            classify("CREATE TABLE t (id INT)"),
            vec![CommandKind::Utility(UtilityKind::Other)]
        );
        assert_eq!(
            classify("SET search_path TO anon"),
            vec![CommandKind::Utility(UtilityKind::Other)]
        );
    }

    #[test]
    fn test_multiple_statements() {
        assert_eq!(
            classify("SELECT 1; TRUNCATE people"),
            vec![
                CommandKind::Select,
                CommandKind::Utility(UtilityKind::Truncate)
            ]
        );
    }

    #[test]
    fn test_parse_error() {
        let err = StatementClassifier::new()
            .classify("SELEC * FROM people")
            .unwrap_err();
        assert!(matches!(err, SqlError::ParseError(_)));
        assert_eq!(err.sqlstate(), "42601");
    }

    #[test]
    fn test_display() {
        assert_eq!(CommandKind::Utility(UtilityKind::Truncate).to_string(), "TRUNCATE");
        assert!(CommandKind::Utility(UtilityKind::Copy).is_utility());
        assert!(!CommandKind::Select.is_utility());
    }
}
