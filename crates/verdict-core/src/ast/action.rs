//! Action statements executed when a rule fires

use super::expression::Expression;
use crate::types::FactField;
use serde::{Deserialize, Serialize};

/// A single action statement.
///
/// Compound assignments (`+=`, `-=`) are desugared by the parser into a plain
/// assignment whose value reads the target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// `field = value`
    Assign { field: FactField, value: Expression },
}

impl Action {
    pub fn assign(field: FactField, value: Expression) -> Self {
        Action::Assign { field, value }
    }

    /// Field written by this action
    pub fn target(&self) -> FactField {
        match self {
            Action::Assign { field, .. } => *field,
        }
    }
}
