//! Rule packs compiled into the engine

use verdict_core::RuleSource;

/// Tiered narrative rules, selected per request by tier
pub const STATIC_RULE_SET: &str = "static";
/// Built-in decision tables
pub const DECISION_TABLE_RULE_SET: &str = "decision-table";
/// Rules compiled from the hot-reloaded rules directory
pub const DYNAMIC_RULE_SET: &str = "dynamic";

const TIER_PACKS: [(&str, &str); 3] = [
    (
        "low-complexity.rules",
        include_str!("../rules/tiers/low-complexity.rules"),
    ),
    (
        "medium-complexity.rules",
        include_str!("../rules/tiers/medium-complexity.rules"),
    ),
    (
        "high-complexity.rules",
        include_str!("../rules/tiers/high-complexity.rules"),
    ),
];

const DECISION_TABLES: [(&str, &str); 3] = [
    (
        "transaction-rules.csv",
        include_str!("../rules/decision-tables/transaction-rules.csv"),
    ),
    (
        "country-risk-rules.csv",
        include_str!("../rules/decision-tables/country-risk-rules.csv"),
    ),
    (
        "account-tier-rules.csv",
        include_str!("../rules/decision-tables/account-tier-rules.csv"),
    ),
];

/// Sources of the `static` rule set, low tier first
pub fn static_sources() -> Vec<RuleSource> {
    TIER_PACKS
        .iter()
        .map(|(name, text)| RuleSource::narrative(*name, *text))
        .collect()
}

/// Sources of the `decision-table` rule set
pub fn decision_table_sources() -> Vec<RuleSource> {
    DECISION_TABLES
        .iter()
        .map(|(name, text)| RuleSource::decision_table(*name, *text))
        .collect()
}
