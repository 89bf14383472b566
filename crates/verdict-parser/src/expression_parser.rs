//! Expression parser
//!
//! Parses condition and action-value strings into Expression AST nodes.
//!
//! Supported syntax:
//! - Fact fields: `amount`, `risk_score`, `is_vip`
//! - Literals: `42`, `3.14`, `"string"`, `true`, `false`, `null`
//! - Lists: `["US", "CA"]` (right-hand side of `in` / `not_in`)
//! - Logical operators: `||` / `or`, `&&` / `and`, `!` / `not`
//! - Keyword operators: `in`, `not_in`, `contains`, `starts_with`, `ends_with`
//! - Comparison: `>`, `<`, `>=`, `<=`, `==`, `!=`
//! - Arithmetic: `+`, `-`, `*`, `/`, `%`, unary `-`
//! - Parentheses for grouping: `(a + b) * c`
//!
//! Binary levels are found by scanning right to left for the lowest
//! precedence operator outside of strings, parentheses and brackets, which
//! keeps every binary operator left-associative.

use crate::error::{ParseError, Result};
use verdict_core::ast::{Expression, Operator, UnaryOperator};
use verdict_core::{FactField, Value};

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> Result<Expression> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ParseError::InvalidExpression("Empty expression".to_string()));
        }

        Self::parse_expression(input)
    }

    /// Resolve a rule-source identifier to a fact field
    pub fn resolve_field(name: &str) -> Result<FactField> {
        FactField::from_name(name.trim()).ok_or_else(|| ParseError::UnknownField(name.trim().to_string()))
    }

    /// Parse a complete expression (handles binary operators with precedence)
    fn parse_expression(input: &str) -> Result<Expression> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::InvalidExpression(
                "Missing operand".to_string(),
            ));
        }

        // Logical OR (lowest precedence)
        if let Some(split) = Self::split_by_operator(input, &["||"])
            .or_else(|| Self::split_by_keyword_operator(input, &["or"]))
        {
            return Self::binary(split);
        }

        // Logical AND
        if let Some(split) = Self::split_by_operator(input, &["&&"])
            .or_else(|| Self::split_by_keyword_operator(input, &["and"]))
        {
            return Self::binary(split);
        }

        // Keyword negation binds looser than comparisons: `not amount > 5`
        if let Some(rest) = Self::strip_keyword_prefix(input, "not") {
            return Ok(Expression::unary(
                UnaryOperator::Not,
                Self::parse_expression(rest)?,
            ));
        }

        // Membership and string operators
        if let Some(split) = Self::split_by_keyword_operator(
            input,
            &["not_in", "in", "contains", "starts_with", "ends_with"],
        ) {
            return Self::binary(split);
        }

        // Comparison
        if let Some(split) =
            Self::split_by_operator(input, &["==", "!=", "<=", ">=", "<", ">"])
        {
            return Self::binary(split);
        }

        // Additive
        if let Some(split) = Self::split_by_operator(input, &["+", "-"]) {
            return Self::binary(split);
        }

        // Multiplicative
        if let Some(split) = Self::split_by_operator(input, &["*", "/", "%"]) {
            return Self::binary(split);
        }

        Self::parse_primary(input)
    }

    fn binary((left, op, right): (&str, &str, &str)) -> Result<Expression> {
        let op = Self::parse_operator(op)?;
        Ok(Expression::binary(
            Self::parse_expression(left)?,
            op,
            Self::parse_expression(right)?,
        ))
    }

    /// Parse a primary expression
    fn parse_primary(input: &str) -> Result<Expression> {
        let input = input.trim();

        if let Some(rest) = input.strip_prefix('!') {
            return Ok(Expression::unary(
                UnaryOperator::Not,
                Self::parse_primary(rest)?,
            ));
        }

        // Number literals, including negative ones
        if let Ok(num) = input.parse::<f64>() {
            if num.is_finite() {
                return Ok(Expression::literal(Value::Number(num)));
            }
        }

        if let Some(rest) = input.strip_prefix('-') {
            return Ok(Expression::unary(
                UnaryOperator::Negate,
                Self::parse_primary(rest)?,
            ));
        }

        if Self::is_wrapped(input, b'(', b')') {
            return Self::parse_expression(&input[1..input.len() - 1]);
        }

        if Self::is_wrapped(input, b'[', b']') {
            return Self::parse_list(&input[1..input.len() - 1]);
        }

        if let Some(s) = Self::string_literal(input) {
            return Ok(Expression::literal(Value::String(s.to_string())));
        }

        match input {
            "true" => return Ok(Expression::literal(Value::Bool(true))),
            "false" => return Ok(Expression::literal(Value::Bool(false))),
            "null" => return Ok(Expression::literal(Value::Null)),
            _ => {}
        }

        if Self::is_identifier(input) {
            return Ok(Expression::field(Self::resolve_field(input)?));
        }

        Err(ParseError::InvalidExpression(format!("Cannot parse: {}", input)))
    }

    /// Parse the inside of a `[...]` list literal
    fn parse_list(inner: &str) -> Result<Expression> {
        let mut items = Vec::new();
        if inner.trim().is_empty() {
            return Ok(Expression::literal(Value::Array(items)));
        }

        let mask = Self::top_level_mask(inner);
        let mut start = 0;
        for (i, byte) in inner.bytes().enumerate() {
            if byte == b',' && mask[i] {
                items.push(Self::parse_list_item(&inner[start..i])?);
                start = i + 1;
            }
        }
        items.push(Self::parse_list_item(&inner[start..])?);

        Ok(Expression::literal(Value::Array(items)))
    }

    fn parse_list_item(item: &str) -> Result<Value> {
        match Self::parse_expression(item)? {
            Expression::Literal(value) => Ok(value),
            _ => Err(ParseError::InvalidExpression(format!(
                "List elements must be literals: {}",
                item.trim()
            ))),
        }
    }

    /// Split input by binary operator (respecting strings, parentheses and brackets)
    fn split_by_operator<'a>(
        input: &'a str,
        operators: &[&str],
    ) -> Option<(&'a str, &'a str, &'a str)> {
        let mask = Self::top_level_mask(input);
        let bytes = input.as_bytes();

        // Scan from right to left to handle left-to-right associativity
        for i in (0..bytes.len()).rev() {
            if !mask[i] {
                continue;
            }
            for &op in operators {
                if !bytes[i..].starts_with(op.as_bytes()) {
                    continue;
                }
                let end = i + op.len();
                // Make sure it's not part of another operator
                let is_valid = (i == 0 || !Self::is_operator_char(bytes[i - 1] as char))
                    && (end >= bytes.len() || !Self::is_operator_char(bytes[end] as char));
                if !is_valid {
                    continue;
                }

                let left = input[..i].trim();
                // `+` / `-` in prefix position is a sign, not a binary operator
                if matches!(op, "+" | "-")
                    && (left.is_empty()
                        || left.ends_with(|c: char| Self::is_operator_char(c))
                        || Self::ends_with_keyword(left))
                {
                    continue;
                }

                return Some((left, &input[i..end], input[end..].trim()));
            }
        }

        None
    }

    /// Split input by keyword operator (respecting word boundaries)
    fn split_by_keyword_operator<'a>(
        input: &'a str,
        operators: &[&str],
    ) -> Option<(&'a str, &'a str, &'a str)> {
        let mask = Self::top_level_mask(input);
        let bytes = input.as_bytes();

        for i in (0..bytes.len()).rev() {
            if !mask[i] {
                continue;
            }
            for &op in operators {
                if !bytes[i..].starts_with(op.as_bytes()) {
                    continue;
                }
                let end = i + op.len();
                let boundary_before = i == 0 || matches!(bytes[i - 1], b' ' | b'\t' | b')' | b']' | b'"');
                let boundary_after =
                    end >= bytes.len() || matches!(bytes[end], b' ' | b'\t' | b'(' | b'[' | b'"');

                if boundary_before && boundary_after {
                    return Some((input[..i].trim(), &input[i..end], input[end..].trim()));
                }
            }
        }

        None
    }

    /// For every byte: true when it sits outside strings, parentheses and brackets
    fn top_level_mask(input: &str) -> Vec<bool> {
        let mut mask = Vec::with_capacity(input.len());
        let mut depth = 0i32;
        let mut in_string = false;

        for byte in input.bytes() {
            match byte {
                b'"' => in_string = !in_string,
                b'(' | b'[' if !in_string => depth += 1,
                b')' | b']' if !in_string => depth -= 1,
                _ => {}
            }
            mask.push(!in_string && depth == 0 && byte != b'"');
        }

        mask
    }

    /// True when `open` at the start is closed by `close` at the very end
    fn is_wrapped(input: &str, open: u8, close: u8) -> bool {
        let bytes = input.as_bytes();
        if bytes.len() < 2 || bytes[0] != open || bytes[bytes.len() - 1] != close {
            return false;
        }

        let mut depth = 0i32;
        let mut in_string = false;
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'"' => in_string = !in_string,
                b if b == open && !in_string => depth += 1,
                b if b == close && !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return i == bytes.len() - 1;
                    }
                }
                _ => {}
            }
        }

        false
    }

    fn string_literal(input: &str) -> Option<&str> {
        let inner = input.strip_prefix('"')?.strip_suffix('"')?;
        if inner.contains('"') {
            None
        } else {
            Some(inner)
        }
    }

    fn strip_keyword_prefix<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
        let rest = input.strip_prefix(keyword)?;
        if rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            Some(rest.trim())
        } else {
            None
        }
    }

    fn ends_with_keyword(left: &str) -> bool {
        let last = left.rsplit(char::is_whitespace).next().unwrap_or(left);
        matches!(
            last,
            "and" | "or" | "not" | "in" | "not_in" | "contains" | "starts_with" | "ends_with"
        )
    }

    fn is_identifier(input: &str) -> bool {
        let mut chars = input.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Check if a character is part of an operator
    fn is_operator_char(c: char) -> bool {
        matches!(
            c,
            '=' | '!' | '<' | '>' | '&' | '|' | '+' | '-' | '*' | '/' | '%'
        )
    }

    /// Parse an operator string
    fn parse_operator(op: &str) -> Result<Operator> {
        match op {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Le),
            ">=" => Ok(Operator::Ge),
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" => Ok(Operator::Mul),
            "/" => Ok(Operator::Div),
            "%" => Ok(Operator::Mod),
            "&&" | "and" => Ok(Operator::And),
            "||" | "or" => Ok(Operator::Or),
            "contains" => Ok(Operator::Contains),
            "starts_with" => Ok(Operator::StartsWith),
            "ends_with" => Ok(Operator::EndsWith),
            "in" => Ok(Operator::In),
            "not_in" => Ok(Operator::NotIn),
            _ => Err(ParseError::InvalidOperator(op.to_string())),
        }
    }
}
