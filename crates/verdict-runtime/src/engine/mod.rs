//! Expression evaluation engine

pub mod evaluator;
mod operators;

pub use evaluator::ExpressionEvaluator;
