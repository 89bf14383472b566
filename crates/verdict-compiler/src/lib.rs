//! Verdict Compiler - rule sources to rule sets
//!
//! This crate compiles parsed rule definitions into immutable, versioned
//! rule sets, with semantic analysis and constant folding on the way.

pub mod compiler;
pub mod error;
pub mod optimizer;
pub mod semantic;

// Re-export main types
pub use compiler::{CompilerOptions, RuleCompiler};
pub use error::{CompilationReport, CompileError, Diagnostic, Result};

// Re-export semantic types
pub use semantic::{SemanticAnalyzer, TypeChecker, TypeInfo};

// Re-export optimizer types
pub use optimizer::ConstantFolder;
