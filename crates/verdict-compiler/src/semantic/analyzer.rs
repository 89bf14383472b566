//! Semantic analyzer
//!
//! Checks parsed rules before they are compiled: names, assignment targets
//! and expression types. Every violation is reported, not just the first.

use crate::error::CompileError;
use crate::semantic::type_checker::{TypeChecker, TypeInfo};
use std::collections::HashMap;
use verdict_core::ast::{Action, RuleDefinition};
use verdict_core::source::Location;

/// Semantic analyzer for one compilation batch
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    type_checker: TypeChecker,
    /// Rule names seen so far in the batch, with the source that declared them
    seen_rules: HashMap<String, String>,
}

impl SemanticAnalyzer {
    /// Create a new semantic analyzer
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a rule declared in `source`, returning every violation found
    /// with the location of the clause or action it concerns
    pub fn analyze_rule(
        &mut self,
        source: &str,
        rule: &RuleDefinition,
    ) -> Vec<(Location, CompileError)> {
        let mut errors = Vec::new();

        if rule.name.trim().is_empty() {
            errors.push((
                rule.location,
                CompileError::InvalidRule("Rule name cannot be empty".to_string()),
            ));
        } else if let Some(first_source) = self.seen_rules.get(&rule.name) {
            errors.push((
                rule.location,
                CompileError::DuplicateRule {
                    name: rule.name.clone(),
                    first_source: first_source.clone(),
                },
            ));
        } else {
            self.seen_rules.insert(rule.name.clone(), source.to_string());
        }

        for clause in &rule.clauses {
            match self.type_checker.check_expression(&clause.expression) {
                Ok(clause_type) if !clause_type.is_boolean() => {
                    errors.push((
                        clause.location,
                        CompileError::TypeError(format!(
                            "Condition must be boolean, found {}",
                            clause_type.name()
                        )),
                    ));
                }
                Ok(_) => {}
                Err(e) => errors.push((clause.location, e)),
            }
        }

        for (index, action) in rule.actions.iter().enumerate() {
            if let Err(e) = self.analyze_action(action) {
                errors.push((rule.action_location(index), e));
            }
        }

        errors
    }

    /// Analyze a single action
    fn analyze_action(&self, action: &Action) -> Result<(), CompileError> {
        match action {
            Action::Assign { field, value } => {
                if !field.is_writable() {
                    return Err(CompileError::ReadOnlyAssignment(field.name().to_string()));
                }
                let value_type = self.type_checker.check_expression(value)?;
                if matches!(value_type, TypeInfo::Array(_))
                    || !value_type.is_assignable_to(field.field_type())
                {
                    return Err(CompileError::TypeError(format!(
                        "Cannot assign a {} value to {} field '{}'",
                        value_type.name(),
                        field.field_type(),
                        field
                    )));
                }
                Ok(())
            }
        }
    }
}
