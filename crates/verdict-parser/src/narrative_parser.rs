//! Narrative rule parser
//!
//! Parses `rule "..." when ... then ... end` sources into rule definitions.
//!
//! ```text
//! package LOW
//!
//! rule "low-small-amount"
//!     salience 10
//!     when
//!         amount < 100
//!     then
//!         status = "APPROVED";
//! end
//! ```
//!
//! Condition lines are AND-ed; a line ending in `&&`/`||`/`and`/`or` or
//! with unbalanced brackets continues on the next line. Actions are one per
//! line: `field = expr`, `field += expr`, `field -= expr`.

use crate::error::{ParseError, Result};
use crate::expression_parser::ExpressionParser;
use tracing::debug;
use verdict_core::ast::{Action, Clause, Expression, Operator, RuleDefinition};
use verdict_core::source::Location;
use verdict_core::Tier;

/// Narrative rule parser
pub struct NarrativeParser;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Header,
    When,
    Then,
}

/// A rule being assembled line by line
struct PendingRule {
    name: String,
    line: usize,
    tier: Tier,
    priority: i32,
    section: Section,
    clauses: Vec<Clause>,
    actions: Vec<(Action, usize)>,
    /// Condition text carried over to the next line, with its first line
    continuation: Option<(usize, String)>,
    failed: bool,
}

impl PendingRule {
    fn new(name: String, line: usize, tier: Tier) -> Self {
        Self {
            name,
            line,
            tier,
            priority: 0,
            section: Section::Header,
            clauses: Vec::new(),
            actions: Vec::new(),
            continuation: None,
            failed: false,
        }
    }

    fn finish(self) -> RuleDefinition {
        self.actions.into_iter().fold(
            RuleDefinition::from_clauses(self.name, self.clauses, Location::Line(self.line))
                .with_tier(self.tier)
                .with_priority(self.priority),
            |rule, (action, line)| rule.with_action_at(action, Location::Line(line)),
        )
    }
}

impl NarrativeParser {
    /// Parse every rule in a source.
    ///
    /// Errors do not stop the parse: the rule containing an error is dropped
    /// and parsing resumes, so all errors of the source are returned at once.
    pub fn parse(text: &str) -> std::result::Result<Vec<RuleDefinition>, Vec<ParseError>> {
        let mut rules = Vec::new();
        let mut errors = Vec::new();
        let mut package_tier = Tier::General;
        let mut current: Option<PendingRule> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            let keyword = first_word(line);

            // `rule` and `end` are recovery points regardless of state
            if keyword == "rule" {
                if let Some(open) = current.take() {
                    errors.push(
                        ParseError::syntax(format!("rule '{}' is missing 'end'", open.name))
                            .at(Location::Line(open.line)),
                    );
                }
                match parse_rule_name(line) {
                    Ok(name) => current = Some(PendingRule::new(name, line_no, package_tier)),
                    Err(e) => {
                        errors.push(e.at(Location::Line(line_no)));
                        // Keep the block so its `end` is consumed quietly
                        let mut skipped = PendingRule::new(String::new(), line_no, package_tier);
                        skipped.failed = true;
                        current = Some(skipped);
                    }
                }
                continue;
            }

            if keyword == "end" && line.trim_end_matches(';') == "end" {
                match current.take() {
                    Some(mut open) => {
                        if let Some((start, text)) = open.continuation.take() {
                            open.failed = true;
                            errors.push(
                                ParseError::InvalidExpression(format!(
                                    "Incomplete condition: {}",
                                    text
                                ))
                                .at(Location::Line(start)),
                            );
                        }
                        if !open.failed {
                            rules.push(open.finish());
                        }
                    }
                    None => errors.push(
                        ParseError::syntax("'end' without a matching 'rule'")
                            .at(Location::Line(line_no)),
                    ),
                }
                continue;
            }

            let Some(open) = current.as_mut() else {
                match parse_top_level(line) {
                    Ok(Some(tier)) => package_tier = tier,
                    Ok(None) => {}
                    Err(e) => errors.push(e.at(Location::Line(line_no))),
                }
                continue;
            };

            if let Err(e) = Self::parse_rule_line(open, line, line_no) {
                open.failed = true;
                errors.push(e.at(Location::Line(line_no)));
            }
        }

        if let Some(open) = current {
            errors.push(
                ParseError::syntax(format!("rule '{}' is missing 'end'", open.name))
                    .at(Location::Line(open.line)),
            );
        }

        debug!(rules = rules.len(), errors = errors.len(), "parsed narrative source");

        if errors.is_empty() {
            Ok(rules)
        } else {
            Err(errors)
        }
    }

    fn parse_rule_line(rule: &mut PendingRule, line: &str, line_no: usize) -> Result<()> {
        if rule.continuation.is_none() {
            match line {
                "when" => {
                    if rule.section != Section::Header {
                        return Err(ParseError::syntax("unexpected 'when'"));
                    }
                    rule.section = Section::When;
                    return Ok(());
                }
                "then" => {
                    if rule.section == Section::Then {
                        return Err(ParseError::syntax("unexpected 'then'"));
                    }
                    rule.section = Section::Then;
                    return Ok(());
                }
                _ => {}
            }
        }

        match rule.section {
            Section::Header => Self::parse_attribute(rule, line),
            Section::When => {
                let (start, text) = match rule.continuation.take() {
                    Some((start, mut text)) => {
                        text.push(' ');
                        text.push_str(line);
                        (start, text)
                    }
                    None => (line_no, line.to_string()),
                };
                if continues(&text) {
                    rule.continuation = Some((start, text));
                    return Ok(());
                }
                let condition = ExpressionParser::parse(&text).map_err(|e| e.at(Location::Line(start)))?;
                rule.clauses.push(Clause::new(condition, Location::Line(start)));
                Ok(())
            }
            Section::Then => {
                let action = Self::parse_action(line.trim_end_matches(';'))?;
                rule.actions.push((action, line_no));
                Ok(())
            }
        }
    }

    /// `salience <n>`, `priority <n>` or `tier <name>` before `when`
    fn parse_attribute(rule: &mut PendingRule, line: &str) -> Result<()> {
        let line = line.trim_end_matches(';');
        let keyword = first_word(line);
        let value = line[keyword.len()..].trim();

        match keyword {
            "salience" | "priority" => {
                rule.priority = value.parse::<i32>().map_err(|_| ParseError::InvalidValue {
                    field: keyword.to_string(),
                    message: format!("expected an integer, got '{}'", value),
                })?;
                Ok(())
            }
            "tier" => {
                rule.tier = Tier::parse(value.trim_matches('"')).ok_or_else(|| {
                    ParseError::InvalidValue {
                        field: "tier".to_string(),
                        message: format!("unknown tier '{}'", value),
                    }
                })?;
                Ok(())
            }
            _ => Err(ParseError::syntax(format!(
                "expected 'salience', 'tier', 'when' or 'then', found '{}'",
                line
            ))),
        }
    }

    /// Parse one action statement: `field = expr`, `field += expr`, `field -= expr`
    pub fn parse_action(statement: &str) -> Result<Action> {
        let statement = statement.trim();
        let target_len = statement
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(statement.len());
        let (target, rest) = statement.split_at(target_len);
        if target.is_empty() {
            return Err(ParseError::syntax(format!(
                "expected an assignment, found '{}'",
                statement
            )));
        }
        let field = ExpressionParser::resolve_field(target)?;
        let rest = rest.trim_start();

        let (compound, value) = if let Some(value) = rest.strip_prefix("+=") {
            (Some(Operator::Add), value)
        } else if let Some(value) = rest.strip_prefix("-=") {
            (Some(Operator::Sub), value)
        } else if let Some(value) = rest.strip_prefix('=').filter(|v| !v.starts_with('=')) {
            (None, value)
        } else {
            return Err(ParseError::syntax(format!(
                "expected '=', '+=' or '-=' after '{}'",
                target
            )));
        };

        let value = ExpressionParser::parse(value)?;
        let value = match compound {
            Some(op) => Expression::binary(Expression::field(field), op, value),
            None => value,
        };

        Ok(Action::assign(field, value))
    }
}

/// Handle a line outside any rule: `package`, `import`, `dialect`.
///
/// Returns the tier selected by a `package` line.
fn parse_top_level(line: &str) -> Result<Option<Tier>> {
    let line = line.trim_end_matches(';');
    let keyword = first_word(line);
    let value = line[keyword.len()..].trim();

    match keyword {
        "package" => {
            if value.is_empty() {
                return Err(ParseError::syntax("'package' requires a name"));
            }
            Ok(Some(Tier::parse(value).unwrap_or(Tier::General)))
        }
        "import" | "dialect" => Ok(None),
        _ => Err(ParseError::syntax(format!(
            "expected 'package' or 'rule', found '{}'",
            line
        ))),
    }
}

/// `rule "name"` or `rule name`
fn parse_rule_name(line: &str) -> Result<String> {
    let rest = line["rule".len()..].trim();
    let name = if let Some(quoted) = rest.strip_prefix('"') {
        quoted
            .strip_suffix('"')
            .ok_or_else(|| ParseError::syntax("unterminated rule name"))?
    } else {
        rest
    };

    if name.trim().is_empty() {
        return Err(ParseError::syntax("rule name must not be empty"));
    }
    Ok(name.to_string())
}

fn first_word(line: &str) -> &str {
    line.split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .unwrap_or("")
}

/// Drop `//` and `#` comments that are outside string literals
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    for i in 0..bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'#' if !in_string => return &line[..i],
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
    }
    line
}

/// True when a condition continues on the next line
fn continues(text: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    for byte in text.bytes() {
        match byte {
            b'"' => in_string = !in_string,
            b'(' | b'[' if !in_string => depth += 1,
            b')' | b']' if !in_string => depth -= 1,
            _ => {}
        }
    }
    if depth > 0 {
        return true;
    }

    let trimmed = text.trim_end();
    trimmed.ends_with("&&")
        || trimmed.ends_with("||")
        || trimmed.ends_with(',')
        || matches!(trimmed.rsplit(char::is_whitespace).next(), Some("and" | "or"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::{FactField, Value};

    #[test]
    fn test_parse_single_rule() {
        let source = r#"
package LOW

rule "low-small-amount"
    salience 10
    when
        amount < 100
    then
        status = "APPROVED";
end
"#;
        let rules = NarrativeParser::parse(source).unwrap();
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name, "low-small-amount");
        assert_eq!(rule.tier, Tier::Low);
        assert_eq!(rule.priority, 10);
        assert_eq!(rule.location, Location::Line(4));
        assert_eq!(
            rule.actions,
            vec![Action::assign(FactField::Status, Expression::literal("APPROVED"))]
        );
    }

    #[test]
    fn test_conditions_are_conjoined() {
        let source = r#"
rule "two"
when
    amount > 10
    country == "US"
then
    risk_score += 5
end
"#;
        let rules = NarrativeParser::parse(source).unwrap();
        assert!(matches!(
            rules[0].condition(),
            Expression::Binary { op: Operator::And, .. }
        ));
        assert_eq!(rules[0].tier, Tier::General);
        let clause_lines: Vec<Location> = rules[0].clauses.iter().map(|c| c.location).collect();
        assert_eq!(clause_lines, vec![Location::Line(4), Location::Line(5)]);
        assert_eq!(rules[0].action_location(0), Location::Line(7));
    }

    #[test]
    fn test_compound_assignment_desugars() {
        let action = NarrativeParser::parse_action("risk_score += 50").unwrap();
        assert_eq!(
            action,
            Action::assign(
                FactField::RiskScore,
                Expression::binary(
                    Expression::field(FactField::RiskScore),
                    Operator::Add,
                    Expression::literal(50.0)
                )
            )
        );
    }

    #[test]
    fn test_multi_line_condition() {
        let source = "rule \"multi\"\nwhen\n  country in [\"A\",\n    \"B\"] &&\n  amount > 1\nthen\n  status = \"REJECTED\"\nend\n";
        let rules = NarrativeParser::parse(source).unwrap();
        match &rules[0].condition() {
            Expression::Binary { left, op, .. } => {
                assert_eq!(*op, Operator::And);
                assert!(matches!(
                    left.as_ref(),
                    Expression::Binary { right, .. }
                        if **right == Expression::literal(Value::Array(vec![Value::from("A"), Value::from("B")]))
                ));
            }
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn test_comments_and_imports_ignored() {
        let source = r#"
// header comment
package com.rulesengine.rules.high;
import com.rulesengine.model.Transaction;

rule "reason" # trailing comment
when
    amount > 10000 // big
then
    rejection_reason = "amount // too high"
end
"#;
        let rules = NarrativeParser::parse(source).unwrap();
        assert_eq!(rules[0].tier, Tier::High);
        assert_eq!(
            rules[0].actions[0],
            Action::assign(
                FactField::RejectionReason,
                Expression::literal("amount // too high")
            )
        );
    }

    #[test]
    fn test_errors_are_collected_across_rules() {
        let source = r#"
rule "bad-condition"
when
    amount >> 5
then
    status = "X"
end

rule "good"
when
    amount > 5
then
    status = "Y"
end

rule "bad-action"
when
    amount > 5
then
    balance = 3
end
"#;
        let errors = NarrativeParser::parse(source).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].location(), Location::Line(4));
        assert_eq!(errors[1].location(), Location::Line(20));
        assert_eq!(errors[1].message(), "Unknown field: balance");
    }

    #[test]
    fn test_missing_end_reported_at_rule_line() {
        let source = "rule \"open\"\nwhen\n  amount > 1\nthen\n  status = \"A\"\n";
        let errors = NarrativeParser::parse(source).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location(), Location::Line(1));
    }

    #[test]
    fn test_invalid_salience() {
        let source = "rule \"r\"\nsalience high\nwhen\nthen\nend\n";
        let errors = NarrativeParser::parse(source).unwrap_err();
        assert_eq!(errors[0].location(), Location::Line(2));
    }

    #[test]
    fn test_rule_without_conditions_always_matches() {
        let rules = NarrativeParser::parse("rule always\nthen\nstatus = \"A\"\nend").unwrap();
        assert_eq!(rules[0].name, "always");
        assert_eq!(rules[0].condition(), Expression::literal(true));
    }
}
