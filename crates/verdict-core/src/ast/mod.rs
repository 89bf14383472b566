//! Abstract Syntax Tree (AST) definitions for verdict
//!
//! This module contains the AST node definitions for:
//! - Condition expressions
//! - Action statements
//! - Parsed rule definitions (before semantic checks)

pub mod action;
pub mod expression;
pub mod operator;
pub mod rule;

pub use action::Action;
pub use expression::{Expression, UnaryOperator};
pub use operator::Operator;
pub use rule::{Clause, RuleDefinition};
