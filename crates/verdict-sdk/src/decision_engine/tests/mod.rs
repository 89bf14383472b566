//! Unit tests for DecisionEngine

use super::*;
use crate::builder::DecisionEngineBuilder;
use crate::config::EngineConfig;
use std::sync::Arc;
use verdict_core::Fact;
use verdict_repository::MemorySourceStore;

async fn engine() -> DecisionEngine {
    DecisionEngineBuilder::new()
        .with_source_store(Arc::new(MemorySourceStore::new()))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_engine_creation() {
    let engine = engine().await;
    assert!(engine.repository().get(crate::STATIC_RULE_SET).is_some());
    assert!(engine.repository().get(crate::DECISION_TABLE_RULE_SET).is_some());
    assert!(!engine.reload_manager().has_active_set());
}

#[tokio::test]
async fn test_low_tier_small_amount() {
    let engine = engine().await;
    let fact = Fact::new("tx-1").with_amount(50.0).with_country("USA");

    let response = engine.evaluate(fact, Some("LOW")).unwrap();
    assert_eq!(response.transaction_id, "tx-1");
    assert_eq!(response.status.as_deref(), Some("APPROVED"));
    assert_eq!(response.fired_rules, vec!["low-small-amount"]);
    assert_eq!(response.risk_score, Some(0));
    assert_eq!(response.tier, "LOW");
    assert!(response.reasons.is_empty());
}

#[tokio::test]
async fn test_low_tier_rejects_non_positive_amount() {
    let engine = engine().await;

    for amount in [-5.0, 0.0] {
        let fact = Fact::new("tx-neg").with_amount(amount);
        let response = engine.evaluate(fact, Some("LOW")).unwrap();
        assert_eq!(response.fired_rules, vec!["low-invalid-amount"]);
        assert_eq!(response.status.as_deref(), Some("REJECTED"));
        assert_eq!(response.reasons, vec!["Transaction amount must be positive"]);
    }
}

#[tokio::test]
async fn test_all_tiers_chain_to_rejection() {
    let engine = engine().await;
    let fact = Fact::new("tx-2")
        .with_amount(15000.0)
        .with_country("HIGH_RISK_COUNTRY_1");

    let response = engine.evaluate(fact, Some("ALL")).unwrap();
    assert_eq!(
        response.fired_rules,
        vec!["high-large-amount", "high-risk-country", "high-risk-reject"]
    );
    assert_eq!(response.status.as_deref(), Some("REJECTED"));
    assert_eq!(response.risk_score, Some(80));
    assert_eq!(response.rules_fired, 3);
    assert_eq!(
        response.reasons,
        vec!["Risk score exceeds the rejection threshold"]
    );
}

#[tokio::test]
async fn test_medium_tier_ignores_other_tiers() {
    let engine = engine().await;
    let fact = Fact::new("tx-3")
        .with_amount(15000.0)
        .with_country("HIGH_RISK_COUNTRY_1");

    let response = engine.evaluate(fact, Some("MEDIUM")).unwrap();
    assert!(response.fired_rules.is_empty());
    assert_eq!(response.status.as_deref(), Some("PENDING"));
}

#[tokio::test]
async fn test_incoming_status_is_reset() {
    let engine = engine().await;
    let mut fact = Fact::new("tx-4").with_amount(500.0);
    fact.status = Some("APPROVED".to_string());

    let response = engine.evaluate(fact, None).unwrap();
    assert_eq!(response.status.as_deref(), Some("PENDING"));
    assert_eq!(response.tier, "ALL");
}

#[tokio::test]
async fn test_decision_tables() {
    let engine = engine().await;
    let fact = Fact::new("tx-5")
        .with_amount(25000.0)
        .with_country("HIGH_RISK_COUNTRY_2")
        .with_field(verdict_core::FactField::TransactionType, "TRANSFER");

    let response = engine.evaluate_decision_table(fact).unwrap();
    assert_eq!(
        response.fired_rules,
        vec!["high-risk-country", "large-transfer", "reject-high-risk-score"]
    );
    assert_eq!(response.status.as_deref(), Some("REJECTED"));
    assert_eq!(response.risk_score, Some(70));
    assert_eq!(response.rule_set, crate::DECISION_TABLE_RULE_SET);

    let gold = Fact::new("tx-6").with_amount(800.0).with_account_tier("GOLD");
    let response = engine.evaluate_decision_table(gold).unwrap();
    assert_eq!(response.fired_rules, vec!["gold-auto-approve"]);
    assert_eq!(response.status.as_deref(), Some("APPROVED"));
}

#[tokio::test]
async fn test_dynamic_absent_until_uploaded() {
    let engine = engine().await;
    let err = engine.evaluate_dynamic(Fact::new("tx")).unwrap_err();
    assert!(err.is_not_found());

    let outcome = engine
        .upload(
            "review.rules",
            b"rule \"review-large\"\nwhen\namount > 1000\nthen\nstatus = \"PENDING_REVIEW\"\nend\n",
        )
        .await
        .unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.version, Some(1));

    let response = engine
        .evaluate_dynamic(Fact::new("tx").with_amount(2000.0))
        .unwrap();
    assert_eq!(response.status.as_deref(), Some("PENDING_REVIEW"));
    assert_eq!(response.rule_set_version, 1);
}

#[tokio::test]
async fn test_batch_tags_each_result() {
    let config = EngineConfig::new().with_batch_concurrency(4);
    let engine = DecisionEngineBuilder::new()
        .with_config(config)
        .with_source_store(Arc::new(MemorySourceStore::new()))
        .build()
        .await
        .unwrap();

    let facts: Vec<Fact> = (0..20)
        .map(|i| {
            let amount = if i % 2 == 0 { 50.0 } else { 15000.0 };
            Fact::new(format!("tx-{i}"))
                .with_amount(amount)
                .with_country("HIGH_RISK_COUNTRY_1")
        })
        .collect();

    let entries = engine.evaluate_batch(facts, Some("ALL")).await.unwrap();
    assert_eq!(entries.len(), 20);

    for entry in entries {
        let index: usize = entry.transaction_id.trim_start_matches("tx-").parse().unwrap();
        let response = entry.response.unwrap();
        assert_eq!(response.transaction_id, entry.transaction_id);
        if index % 2 == 0 {
            assert_eq!(response.status.as_deref(), Some("APPROVED"));
        } else {
            assert_eq!(response.status.as_deref(), Some("REJECTED"));
        }
    }
}

#[tokio::test]
async fn test_batch_against_decision_tables() {
    let engine = engine().await;
    let facts = vec![
        Fact::new("transfer")
            .with_amount(25000.0)
            .with_country("HIGH_RISK_COUNTRY_2")
            .with_field(verdict_core::FactField::TransactionType, "TRANSFER"),
        Fact::new("gold").with_amount(800.0).with_account_tier("GOLD"),
    ];

    let mut entries = engine
        .evaluate_batch_in(crate::DECISION_TABLE_RULE_SET, facts, None)
        .await
        .unwrap();
    entries.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));

    let gold = entries[0].response.as_ref().unwrap();
    assert_eq!(gold.fired_rules, vec!["gold-auto-approve"]);
    assert_eq!(gold.rule_set, crate::DECISION_TABLE_RULE_SET);

    let transfer = entries[1].response.as_ref().unwrap();
    assert_eq!(transfer.status.as_deref(), Some("REJECTED"));
    assert_eq!(transfer.risk_score, Some(70));

    let err = engine
        .evaluate_batch_in("missing", vec![Fact::new("x")], None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
