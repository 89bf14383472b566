//! Integration tests for verdict-runtime
//!
//! Rule sets are compiled from narrative sources so the tests exercise the
//! same path the engine uses.

use std::sync::Arc;
use verdict_compiler::RuleCompiler;
use verdict_core::{Fact, RuleSet, RuleSource, Tier};
use verdict_runtime::{
    evaluate, RefirePolicy, RuntimeError, SessionConfig, TierSelection, TierSelector,
};

const TIERED: &str = r#"
package com.rulesengine.rules.low

rule "low-small-amount"
when
    amount < 100
then
    status = "APPROVED";
end
"#;

const CHAINED: &str = r#"
package com.rulesengine.rules.high

rule "large-amount"
when
    amount > 10000
then
    risk_score += 50
end

rule "high-risk-country"
when
    country in ["HIGH_RISK_COUNTRY_1", "HIGH_RISK_COUNTRY_2"]
then
    risk_score += 30
end

rule "reject-high-risk"
when
    risk_score >= 70
then
    status = "REJECTED"
    rejection_reason = "risk score too high"
end
"#;

fn compile(sources: &[(&str, &str)]) -> RuleSet {
    let sources: Vec<RuleSource> = sources
        .iter()
        .map(|(name, text)| RuleSource::narrative(*name, *text))
        .collect();
    RuleCompiler::new().compile("static", 1, &sources).unwrap()
}

fn prepared(fact: Fact) -> Fact {
    let mut fact = fact;
    fact.prepare_for_evaluation();
    fact
}

// ========== Scenarios ==========

#[test]
fn test_low_tier_approves_small_amount() {
    let set = compile(&[("low.rules", TIERED), ("high.rules", CHAINED)]);
    let fact = prepared(Fact::new("tx-a").with_amount(50.0).with_country("USA"));

    let rules = TierSelector::select(Some("LOW"), &set);
    let outcome = evaluate(fact, rules, SessionConfig::default()).unwrap();

    assert_eq!(outcome.final_fact.status.as_deref(), Some("APPROVED"));
    assert_eq!(outcome.fired_rule_names(), vec!["low-small-amount"]);
    assert_eq!(outcome.rules_fired, 1);
}

#[test]
fn test_chained_rules_fire_in_dependency_order() {
    let set = compile(&[("low.rules", TIERED), ("high.rules", CHAINED)]);
    let fact = prepared(
        Fact::new("tx-b")
            .with_amount(15000.0)
            .with_country("HIGH_RISK_COUNTRY_1"),
    );

    let rules = TierSelector::select(Some("ALL"), &set);
    let outcome = evaluate(fact, rules, SessionConfig::default()).unwrap();

    assert_eq!(
        outcome.fired_rule_names(),
        vec!["large-amount", "high-risk-country", "reject-high-risk"]
    );
    assert_eq!(outcome.final_fact.status.as_deref(), Some("REJECTED"));
    assert_eq!(outcome.final_fact.risk_score, Some(80));
    let steps: Vec<usize> = outcome.trace.iter().map(|r| r.step).collect();
    assert_eq!(steps, vec![0, 1, 2]);
}

// ========== Properties ==========

#[test]
fn test_tier_isolation() {
    let set = compile(&[("low.rules", TIERED), ("high.rules", CHAINED)]);
    let low = TierSelector::select(Some("LOW"), &set);
    assert!(low.iter().all(|rule| rule.tier == Tier::Low));
    assert!(TierSelector::select(Some("MEDIUM"), &set).is_empty());
    assert_eq!(
        TierSelector::select_resolved(TierSelection::Tier(Tier::High), &set).len(),
        3
    );
}

#[test]
fn test_empty_subset_fires_nothing() {
    let set = compile(&[("low.rules", TIERED)]);
    let fact = prepared(Fact::new("tx").with_amount(50.0));
    let outcome = evaluate(
        fact.clone(),
        TierSelector::select(Some("MEDIUM"), &set),
        SessionConfig::default(),
    )
    .unwrap();
    assert_eq!(outcome.rules_fired, 0);
    assert_eq!(outcome.final_fact, fact);
}

#[test]
fn test_unmatched_fact_is_unchanged() {
    let set = compile(&[("low.rules", TIERED), ("high.rules", CHAINED)]);
    let fact = prepared(Fact::new("tx").with_amount(500.0).with_country("USA"));
    let outcome = evaluate(fact.clone(), set.rules(), SessionConfig::default()).unwrap();
    assert!(outcome.trace.is_empty());
    assert_eq!(outcome.final_fact, fact);
}

#[test]
fn test_missing_amount_matches_nothing() {
    let set = compile(&[("low.rules", TIERED)]);
    let outcome = evaluate(prepared(Fact::new("tx")), set.rules(), SessionConfig::default()).unwrap();
    assert_eq!(outcome.rules_fired, 0);
}

#[test]
fn test_determinism() {
    let set = compile(&[("low.rules", TIERED), ("high.rules", CHAINED)]);
    let fact = prepared(
        Fact::new("tx")
            .with_amount(20000.0)
            .with_country("HIGH_RISK_COUNTRY_2"),
    );

    let first = evaluate(fact.clone(), set.rules(), SessionConfig::default()).unwrap();
    for _ in 0..20 {
        let again = evaluate(fact.clone(), set.rules(), SessionConfig::default()).unwrap();
        assert_eq!(again, first);
    }
}

#[tokio::test]
async fn test_concurrent_sessions_share_rule_set() {
    let set = Arc::new(compile(&[("low.rules", TIERED), ("high.rules", CHAINED)]));

    let mut handles = Vec::new();
    for i in 0..32 {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            let amount = if i % 2 == 0 { 15000.0 } else { 50.0 };
            let fact = prepared(
                Fact::new(format!("tx-{i}"))
                    .with_amount(amount)
                    .with_country("HIGH_RISK_COUNTRY_1"),
            );
            evaluate(fact, set.rules(), SessionConfig::default()).unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.final_fact.id, format!("tx-{i}"));
        if i % 2 == 0 {
            assert_eq!(outcome.final_fact.risk_score, Some(80));
            assert_eq!(outcome.final_fact.status.as_deref(), Some("REJECTED"));
        } else {
            assert_eq!(
                outcome.fired_rule_names(),
                vec!["low-small-amount", "high-risk-country"]
            );
            assert_eq!(outcome.final_fact.risk_score, Some(30));
        }
    }
}

// ========== Runaway and errors ==========

const OSCILLATING: &str = r#"
rule "raise"
when
    risk_score < 10
then
    risk_score = 20
end

rule "lower"
when
    risk_score >= 10
then
    risk_score = 0
end
"#;

#[test]
fn test_runaway_reports_recent_rules() {
    let set = compile(&[("loop.rules", OSCILLATING)]);
    let config = SessionConfig::default().with_max_iterations(50);
    let err = evaluate(prepared(Fact::new("tx")), set.rules(), config).unwrap_err();

    match err {
        RuntimeError::Runaway(runaway) => {
            assert_eq!(runaway.limit, 50);
            assert_eq!(runaway.recent_rules.len(), 10);
            assert_eq!(runaway.recent_rules.last().map(String::as_str), Some("lower"));
        }
        other => panic!("expected runaway, got {other:?}"),
    }
}

#[test]
fn test_fire_once_terminates_oscillation() {
    let set = compile(&[("loop.rules", OSCILLATING)]);
    let config = SessionConfig::default().with_refire_policy(RefirePolicy::Once);
    let outcome = evaluate(prepared(Fact::new("tx")), set.rules(), config).unwrap();
    assert_eq!(outcome.fired_rule_names(), vec!["raise", "lower"]);
    assert_eq!(outcome.final_fact.risk_score, Some(0));
}

#[test]
fn test_division_by_zero_aborts_session() {
    let source = r#"
rule "ratio"
when
    amount / failed_transactions_last_month > 100
then
    status = "PENDING_REVIEW"
end
"#;
    let set = compile(&[("ratio.rules", source)]);
    let fact = prepared(
        Fact::new("tx")
            .with_amount(500.0)
            .with_field(verdict_core::FactField::FailedTransactionsLastMonth, 0i64),
    );
    let err = evaluate(fact, set.rules(), SessionConfig::default()).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Evaluation {
            rule: "ratio".to_string(),
            message: "Division by zero".to_string(),
        }
    );
}
