//! Request/Response types for DecisionEngine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verdict_compiler::{CompilationReport, Diagnostic};
use verdict_core::Fact;
use verdict_runtime::InferenceOutcome;

use crate::reload::ReloadSummary;

/// Result of evaluating one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    /// Identifier of the evaluated transaction, for correlating batch results
    pub transaction_id: String,

    /// Final status (APPROVED, REJECTED, PENDING_REVIEW, or PENDING when no
    /// rule decided)
    pub status: Option<String>,

    pub risk_score: Option<i64>,

    /// Rules in firing order
    pub fired_rules: Vec<String>,

    /// Human-readable reasons; the rejection reason when one was set
    pub reasons: Vec<String>,

    pub rules_fired: usize,

    pub processing_time_micros: u64,

    /// Tier the rules were selected by (`ALL` when unrestricted)
    pub tier: String,

    /// Name and version of the rule set evaluated against
    pub rule_set: String,
    pub rule_set_version: u64,

    /// Fact state after inference
    pub fact: Fact,
}

impl EvaluationResponse {
    pub(crate) fn from_outcome(
        outcome: InferenceOutcome,
        tier: &str,
        rule_set: &str,
        rule_set_version: u64,
        processing_time_micros: u64,
    ) -> Self {
        let fired_rules = outcome.fired_rule_names();
        let fact = outcome.final_fact;
        let reasons = fact.rejection_reason.iter().cloned().collect();

        Self {
            transaction_id: fact.id.clone(),
            status: fact.status.clone(),
            risk_score: fact.risk_score,
            fired_rules,
            reasons,
            rules_fired: outcome.rules_fired,
            processing_time_micros,
            tier: tier.to_string(),
            rule_set: rule_set.to_string(),
            rule_set_version,
            fact,
        }
    }
}

/// Result of an upload, delete or reload request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadOutcome {
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Version of the dynamic set now active
    pub version: Option<u64>,
}

impl ReloadOutcome {
    pub(crate) fn from_reload(
        result: std::result::Result<ReloadSummary, CompilationReport>,
        active_version: Option<u64>,
    ) -> Self {
        match result {
            Ok(summary) => Self {
                ok: true,
                diagnostics: Vec::new(),
                version: Some(summary.version),
            },
            Err(report) => Self {
                ok: false,
                diagnostics: report.diagnostics,
                version: active_version,
            },
        }
    }
}

/// Stored rule sources and the active dynamic set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListing {
    pub names: Vec<String>,
    /// When the active dynamic set was published
    pub active_version: Option<DateTime<Utc>>,
}

/// One result of a batch evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub transaction_id: String,
    pub response: Option<EvaluationResponse>,
    pub error: Option<String>,
}

impl BatchEntry {
    pub(crate) fn new(transaction_id: String, result: crate::error::Result<EvaluationResponse>) -> Self {
        match result {
            Ok(response) => Self {
                transaction_id,
                response: Some(response),
                error: None,
            },
            Err(e) => Self {
                transaction_id,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }
}
