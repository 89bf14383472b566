//! Decision table parser
//!
//! A decision table is a CSV file. The header row declares the columns:
//!
//! | header              | meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `name`              | rule name (required)                      |
//! | `tier`              | tier of the row's rule (optional)         |
//! | `priority`/`salience` | salience of the row's rule (optional)   |
//! | `when <field> <op>` | condition `<field> <op> <cell>`           |
//! | `then <field>`      | action `<field> = <cell>`                 |
//! | `then <field> +=`   | action `<field> += <cell>` (also `-=`)    |
//!
//! Every data row becomes one rule. Empty condition cells are skipped and
//! empty outcome cells assign nothing. Cells of `in`/`not_in` columns are
//! `|`-separated lists. A row with more cells than the header is rejected.

use crate::error::{ParseError, Result};
use crate::expression_parser::ExpressionParser;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;
use verdict_core::ast::{Action, Clause, Expression, Operator, RuleDefinition};
use verdict_core::source::Location;
use verdict_core::{FactField, FieldType, Tier, Value};

/// Decision table parser
pub struct DecisionTableParser;

#[derive(Debug, Clone)]
enum Column {
    Name,
    Tier,
    Priority,
    Condition { field: FactField, op: Operator },
    Outcome { field: FactField, compound: Option<Operator> },
}

impl DecisionTableParser {
    /// Parse every row of a table.
    ///
    /// A broken header fails the whole table; broken rows are reported one
    /// error per row and do not stop the remaining rows from being checked.
    pub fn parse(text: &str) -> std::result::Result<Vec<RuleDefinition>, Vec<ParseError>> {
        // One record per line; `#` lines and blank lines are skipped
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            });

        let (header_row, header_line) = lines.next().ok_or_else(|| {
            vec![ParseError::Table("missing header row".to_string()).at(Location::Source)]
        })?;
        let columns = Self::read_record(header_line)
            .and_then(|header| Self::parse_header(&header))
            .map_err(|e| vec![e.at(Location::Row(header_row))])?;

        let mut rules = Vec::new();
        let mut errors = Vec::new();

        for (row, line) in lines {
            let record = match Self::read_record(line) {
                Ok(record) => record,
                Err(e) => {
                    errors.push(e.at(Location::Row(row)));
                    continue;
                }
            };
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            match Self::parse_row(&columns, &record, row) {
                Ok(rule) => rules.push(rule),
                Err(row_errors) => {
                    errors.extend(row_errors.into_iter().map(|e| e.at(Location::Row(row))))
                }
            }
        }

        debug!(rules = rules.len(), errors = errors.len(), "parsed decision table");

        if errors.is_empty() {
            Ok(rules)
        } else {
            Err(errors)
        }
    }

    fn read_record(line: &str) -> Result<StringRecord> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(line.as_bytes());

        match reader.records().next() {
            Some(record) => Ok(record?),
            None => Ok(StringRecord::new()),
        }
    }

    fn parse_header(header: &StringRecord) -> Result<Vec<Column>> {
        let columns = header
            .iter()
            .map(Self::parse_column)
            .collect::<Result<Vec<_>>>()?;

        if !columns.iter().any(|c| matches!(c, Column::Name)) {
            return Err(ParseError::Table("missing 'name' column".to_string()));
        }
        if !columns.iter().any(|c| matches!(c, Column::Outcome { .. })) {
            return Err(ParseError::Table(
                "at least one 'then <field>' column is required".to_string(),
            ));
        }
        Ok(columns)
    }

    fn parse_column(title: &str) -> Result<Column> {
        let words: Vec<&str> = title.split_whitespace().collect();
        let lowered: Vec<String> = words.iter().map(|w| w.to_ascii_lowercase()).collect();
        let lowered: Vec<&str> = lowered.iter().map(String::as_str).collect();

        match lowered.as_slice() {
            ["name"] => Ok(Column::Name),
            ["tier"] => Ok(Column::Tier),
            ["priority"] | ["salience"] => Ok(Column::Priority),
            ["when", _, _] => Ok(Column::Condition {
                field: ExpressionParser::resolve_field(words[1])?,
                op: Self::parse_condition_operator(words[2])?,
            }),
            ["then", _] => Ok(Column::Outcome {
                field: ExpressionParser::resolve_field(words[1])?,
                compound: None,
            }),
            ["then", _, "+="] => Ok(Column::Outcome {
                field: ExpressionParser::resolve_field(words[1])?,
                compound: Some(Operator::Add),
            }),
            ["then", _, "-="] => Ok(Column::Outcome {
                field: ExpressionParser::resolve_field(words[1])?,
                compound: Some(Operator::Sub),
            }),
            _ => Err(ParseError::Table(format!("unrecognized column '{}'", title))),
        }
    }

    fn parse_condition_operator(op: &str) -> Result<Operator> {
        match op {
            "==" | "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "in" => Ok(Operator::In),
            "not_in" => Ok(Operator::NotIn),
            "contains" => Ok(Operator::Contains),
            "starts_with" => Ok(Operator::StartsWith),
            "ends_with" => Ok(Operator::EndsWith),
            _ => Err(ParseError::InvalidOperator(op.to_string())),
        }
    }

    /// Build the rule of one data row, reporting every bad cell
    fn parse_row(
        columns: &[Column],
        record: &StringRecord,
        row: usize,
    ) -> std::result::Result<RuleDefinition, Vec<ParseError>> {
        let mut name = None;
        let mut tier = Tier::General;
        let mut priority = 0;
        let mut clauses = Vec::new();
        let mut actions = Vec::new();
        let mut errors = Vec::new();

        if record.len() > columns.len() {
            errors.push(ParseError::Table(format!(
                "row has {} cells but the header declares {} columns",
                record.len(),
                columns.len()
            )));
        }

        for (column, cell) in columns.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            let parsed = match column {
                Column::Name => {
                    name = Some(cell.to_string());
                    Ok(())
                }
                Column::Tier => Tier::parse(cell)
                    .map(|parsed| tier = parsed)
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: "tier".to_string(),
                        message: format!("unknown tier '{}'", cell),
                    }),
                Column::Priority => cell
                    .parse::<i32>()
                    .map(|parsed| priority = parsed)
                    .map_err(|_| ParseError::InvalidValue {
                        field: "priority".to_string(),
                        message: format!("expected an integer, got '{}'", cell),
                    }),
                Column::Condition { field, op } => {
                    Self::parse_condition_cell(*field, *op, cell).map(|value| {
                        clauses.push(Clause::new(
                            Expression::binary(
                                Expression::field(*field),
                                *op,
                                Expression::literal(value),
                            ),
                            Location::Row(row),
                        ))
                    })
                }
                Column::Outcome { field, compound } => {
                    Self::parse_cell(*field, cell).map(|value| {
                        let value = Expression::literal(value);
                        let value = match compound {
                            Some(op) => Expression::binary(Expression::field(*field), *op, value),
                            None => value,
                        };
                        actions.push(Action::assign(*field, value));
                    })
                }
            };
            if let Err(e) = parsed {
                errors.push(e);
            }
        }

        let Some(name) = name else {
            errors.push(ParseError::Table("row has no rule name".to_string()));
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(actions.into_iter().fold(
            RuleDefinition::from_clauses(name, clauses, Location::Row(row))
                .with_tier(tier)
                .with_priority(priority),
            |rule, action| rule.with_action(action),
        ))
    }

    fn parse_condition_cell(field: FactField, op: Operator, cell: &str) -> Result<Value> {
        if op.is_membership() {
            cell.split('|')
                .map(|item| Self::parse_cell(field, item.trim()))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        } else {
            Self::parse_cell(field, cell)
        }
    }

    /// Interpret a cell according to the type of the column's field
    fn parse_cell(field: FactField, cell: &str) -> Result<Value> {
        if cell == "null" {
            return Ok(Value::Null);
        }
        let unquoted = cell
            .strip_prefix('"')
            .and_then(|c| c.strip_suffix('"'))
            .unwrap_or(cell);

        match field.field_type() {
            FieldType::Text => Ok(Value::String(unquoted.to_string())),
            FieldType::Integer | FieldType::Decimal => unquoted
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| ParseError::InvalidValue {
                    field: field.name().to_string(),
                    message: format!("expected a number, got '{}'", cell),
                }),
            FieldType::Boolean => match unquoted.to_ascii_lowercase().as_str() {
                "true" | "yes" => Ok(Value::Bool(true)),
                "false" | "no" => Ok(Value::Bool(false)),
                _ => Err(ParseError::InvalidValue {
                    field: field.name().to_string(),
                    message: format!("expected true or false, got '{}'", cell),
                }),
            },
        }
    }
}
