//! Main compiler
//!
//! Compiles a batch of rule sources into one immutable [`RuleSet`].
//! Compilation is all-or-nothing: every source is parsed and analyzed, and a
//! single diagnostic anywhere in the batch means no rule set is produced.

use crate::error::{CompilationReport, Diagnostic};
use crate::optimizer::ConstantFolder;
use crate::semantic::SemanticAnalyzer;
use tracing::{debug, info, warn};
use verdict_core::ast::RuleDefinition;
use verdict_core::source::Location;
use verdict_core::{Rule, RuleSet, RuleSource};

/// Compiler options
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Enable semantic analysis
    pub enable_semantic_analysis: bool,
    /// Enable constant folding optimization
    pub enable_constant_folding: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            enable_semantic_analysis: true,
            enable_constant_folding: true,
        }
    }
}

/// Compiles rule sources into rule sets
#[derive(Debug, Clone, Default)]
pub struct RuleCompiler {
    options: CompilerOptions,
}

impl RuleCompiler {
    /// Create a new compiler instance with default options
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    /// Create a new compiler instance with custom options
    pub fn with_options(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile `sources` into the rule set `name` at `version`.
    ///
    /// Rules keep their declaration order: sources in the given order, rules
    /// in source order within each.
    pub fn compile(
        &self,
        name: &str,
        version: u64,
        sources: &[RuleSource],
    ) -> Result<RuleSet, CompilationReport> {
        let mut report = CompilationReport::new();
        let mut parsed: Vec<(&str, Vec<RuleDefinition>)> = Vec::with_capacity(sources.len());

        // Parse every source, even after a failure, to report all diagnostics
        for source in sources {
            match verdict_parser::parse_source(source) {
                Ok(definitions) => {
                    debug!(source = %source.name, format = %source.format, rules = definitions.len(), "parsed rule source");
                    parsed.push((source.name.as_str(), definitions));
                }
                Err(errors) => {
                    for error in errors {
                        report.push(Diagnostic::new(
                            source.name.clone(),
                            error.location(),
                            error.message(),
                        ));
                    }
                }
            }
        }

        if self.options.enable_semantic_analysis {
            let mut analyzer = SemanticAnalyzer::new();
            for (source, definitions) in &parsed {
                for definition in definitions {
                    for (location, error) in analyzer.analyze_rule(source, definition) {
                        report.push(Diagnostic::new(
                            *source,
                            location,
                            format!("rule '{}': {}", definition.name, error),
                        ));
                    }
                }
            }
        }

        if !report.is_empty() {
            warn!(
                rule_set = name,
                diagnostics = report.len(),
                sources = ?report.sources(),
                "rule compilation failed"
            );
            return Err(report);
        }

        let folder = ConstantFolder::new();
        let rules: Vec<Rule> = parsed
            .into_iter()
            .flat_map(|(source, definitions)| {
                definitions.into_iter().map(move |definition| (source, definition))
            })
            .map(|(source, definition)| {
                let definition = if self.options.enable_constant_folding {
                    folder.fold_rule(definition)
                } else {
                    definition
                };
                Rule::from_definition(definition, source)
            })
            .collect();

        let rule_set = RuleSet::new(name, version, rules)
            .map_err(|e| CompilationReport::single(Diagnostic::new(name, Location::Source, e.to_string())))?;

        info!(
            rule_set = name,
            version,
            rules = rule_set.len(),
            sources = sources.len(),
            "compiled rule set"
        );

        Ok(rule_set)
    }
}
