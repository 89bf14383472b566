//! Unit tests for rule source parsers
//!
//! Tests narrative sources, decision tables and format dispatch.

use verdict_core::ast::{Action, Expression, Operator};
use verdict_core::source::Location;
use verdict_core::{FactField, RuleSource, Tier, Value};
use verdict_parser::*;

// =============================================================================
// Narrative Parser Tests
// =============================================================================

const TIERED: &str = r#"
package com.rulesengine.rules.medium

rule "medium-foreign-currency"
    salience 5
    when
        currency != "USD"
        amount >= 1000
    then
        risk_score += 20
        rejection_reason = "foreign currency"
end

rule "medium-escalate"
    tier HIGH
    when
        risk_score >= 20 and not is_vip
    then
        status = "PENDING_REVIEW";
end
"#;

#[test]
fn test_parse_tiered_source() {
    let rules = NarrativeParser::parse(TIERED).unwrap();
    assert_eq!(rules.len(), 2);

    assert_eq!(rules[0].tier, Tier::Medium);
    assert_eq!(rules[0].priority, 5);
    assert_eq!(rules[0].actions.len(), 2);
    assert_eq!(rules[0].actions[1].target(), FactField::RejectionReason);

    // per-rule override beats the package
    assert_eq!(rules[1].tier, Tier::High);
    assert_eq!(rules[1].priority, 0);
    assert_eq!(rules[1].location, Location::Line(14));
}

#[test]
fn test_condition_shape() {
    let rules = NarrativeParser::parse(TIERED).unwrap();
    assert_eq!(
        rules[0].condition(),
        Expression::binary(
            Expression::binary(
                Expression::field(FactField::Currency),
                Operator::Ne,
                Expression::literal("USD"),
            ),
            Operator::And,
            Expression::binary(
                Expression::field(FactField::Amount),
                Operator::Ge,
                Expression::literal(1000.0),
            ),
        )
    );
}

#[test]
fn test_unknown_tier_reported() {
    let errors = NarrativeParser::parse("rule \"x\"\ntier URGENT\nthen\nstatus = \"A\"\nend\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location(), Location::Line(2));
    assert!(errors[0].message().contains("URGENT"));
}

#[test]
fn test_stray_text_outside_rule() {
    let errors = NarrativeParser::parse("amount > 5\n").unwrap_err();
    assert_eq!(errors[0].location(), Location::Line(1));

    let errors = NarrativeParser::parse("end\n").unwrap_err();
    assert_eq!(errors[0].message(), "'end' without a matching 'rule'");
}

#[test]
fn test_next_rule_recovers_from_missing_end() {
    let source = "rule \"a\"\nwhen\namount > 1\nthen\nstatus = \"A\"\nrule \"b\"\nthen\nstatus = \"B\"\nend\n";
    let errors = NarrativeParser::parse(source).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location(), Location::Line(1));
    assert!(errors[0].message().contains("missing 'end'"));
}

#[test]
fn test_action_requires_assignment() {
    assert!(NarrativeParser::parse_action("status == \"A\"").is_err());
    assert!(NarrativeParser::parse_action("= 5").is_err());
    assert_eq!(
        NarrativeParser::parse_action("risk_score -= 10").unwrap(),
        Action::assign(
            FactField::RiskScore,
            Expression::binary(
                Expression::field(FactField::RiskScore),
                Operator::Sub,
                Expression::literal(10.0),
            ),
        )
    );
}

// =============================================================================
// Decision Table Parser Tests
// =============================================================================

#[test]
fn test_decision_table_typed_cells() {
    let table = "\
name,tier,salience,when is_vip ==,when user_age <,then status,then risk_score
vip,HIGH,7,true,,APPROVED,0
young,,,,21,PENDING_REVIEW,40
";
    let rules = DecisionTableParser::parse(table).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].tier, Tier::High);
    assert_eq!(rules[0].priority, 7);
    assert_eq!(
        rules[0].condition(),
        Expression::binary(
            Expression::field(FactField::IsVip),
            Operator::Eq,
            Expression::literal(true),
        )
    );
    assert_eq!(
        rules[1].actions[1],
        Action::assign(FactField::RiskScore, Expression::literal(40.0))
    );
}

#[test]
fn test_decision_table_quoted_text_cells() {
    let table = "name,when merchant_id starts_with,then rejection_reason\nm,\"\"\"M-1\"\"\",\"blocked, merchant\"\n";
    let rules = DecisionTableParser::parse(table).unwrap();
    assert_eq!(
        rules[0].condition(),
        Expression::binary(
            Expression::field(FactField::MerchantId),
            Operator::StartsWith,
            Expression::literal("M-1"),
        )
    );
    assert_eq!(
        rules[0].actions[0],
        Action::assign(FactField::RejectionReason, Expression::literal("blocked, merchant"))
    );
}

#[test]
fn test_decision_table_bad_boolean_and_list() {
    let table = "name,when is_vip ==,when amount in,then status\na,maybe,,X\nb,,1|two,Y\nc,,1|2,Z\n";
    let errors = DecisionTableParser::parse(table).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].location(), Location::Row(2));
    assert_eq!(errors[1].location(), Location::Row(3));
}

#[test]
fn test_empty_table_is_an_error() {
    let errors = DecisionTableParser::parse("# only a comment\n").unwrap_err();
    assert_eq!(errors[0].location(), Location::Source);
}

// =============================================================================
// Format Dispatch Tests
// =============================================================================

#[test]
fn test_parse_source_dispatches_on_format() -> anyhow::Result<()> {
    let table = RuleSource::decision_table("t.csv", "name,then status\nall,APPROVED\n");
    let rules = parse_source(&table).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    assert_eq!(rules[0].condition(), Expression::literal(Value::Bool(true)));

    let narrative = RuleSource::narrative("n.rules", "rule r\nthen\nstatus = \"A\"\nend\n");
    let rules = parse_source(&narrative).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    assert_eq!(rules[0].name, "r");
    Ok(())
}
