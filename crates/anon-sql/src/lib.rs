//! # anon-sql
//!
//! SQL analysis used by the anon label authority.
//!
//! This crate provides:
//! - [`extract_schema`]: the schema part of a masking function call such as
//!   `anon.fake_city()`, as written in a `MASKED WITH FUNCTION` label
//! - [`FunctionCallAnalyzer::called_functions`]: every function a masking call
//!   invokes, nested calls included
//! - [`StatementClassifier`]: the command kind of each statement of a query
//!   string, which the masking hook uses to pick its behavior
//!
//! Both parse with `sqlparser` and the PostgreSQL dialect.
//!
//! | Call text            | Schema          |
//! |----------------------|-----------------|
//! | `anon.fake_city()`   | `Some("anon")`  |
//! | `fake_city()`        | `Some("")`      |
//! | `"Anon".f(x) AS y`   | `Some("Anon")`  |
//! | `1 + 1`              | error           |

pub mod error;
pub mod function;
pub mod statement;

pub use error::SqlError;
pub use function::{CalledFunction, FunctionCallAnalyzer, extract_schema};
pub use statement::{CommandKind, StatementClassifier, UtilityKind};
