//! The transaction fact evaluated by a session
//!
//! A `Fact` is plain owned data. Each inference session takes its own copy,
//! so no two sessions ever observe the same instance.

use crate::error::{CoreError, Result};
use crate::types::{FactField, FieldType, Value};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Status assigned to every fact before rules run
pub const STATUS_PENDING: &str = "PENDING";

/// A financial transaction with a fixed, known schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// PURCHASE, WITHDRAWAL, TRANSFER, ...
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub merchant_id: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub risk_score: Option<i64>,
    /// PENDING, APPROVED, REJECTED, PENDING_REVIEW
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub user_age: Option<i64>,
    #[serde(default)]
    pub account_age_days: Option<i64>,
    #[serde(default)]
    pub monthly_transaction_volume: Option<f64>,
    #[serde(default)]
    pub failed_transactions_last_month: Option<i64>,
    #[serde(default, rename = "isVIP")]
    pub is_vip: Option<bool>,
    /// BRONZE, SILVER, GOLD, PLATINUM
    #[serde(default)]
    pub account_tier: Option<String>,
}

impl Fact {
    /// Create a fact with only an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_account_tier(mut self, tier: impl Into<String>) -> Self {
        self.account_tier = Some(tier.into());
        self
    }

    pub fn with_risk_score(mut self, score: i64) -> Self {
        self.risk_score = Some(score);
        self
    }

    pub fn with_vip(mut self, is_vip: bool) -> Self {
        self.is_vip = Some(is_vip);
        self
    }

    /// Set any field through the typed setter, panicking on a type mismatch.
    ///
    /// Intended for fixtures; rule actions go through [`Fact::set`].
    pub fn with_field(mut self, field: FactField, value: impl Into<Value>) -> Self {
        if let Err(e) = self.assign(field, value.into()) {
            panic!("invalid fixture value for {}: {}", field, e);
        }
        self
    }

    /// Reset evaluation state: status becomes PENDING and a missing risk
    /// score starts at zero.
    pub fn prepare_for_evaluation(&mut self) {
        self.status = Some(STATUS_PENDING.to_string());
        if self.risk_score.is_none() {
            self.risk_score = Some(0);
        }
    }

    /// Read a field as a runtime value
    pub fn get(&self, field: FactField) -> Value {
        match field {
            FactField::Id => Value::String(self.id.clone()),
            FactField::UserId => self.user_id.clone().into(),
            FactField::Amount => self.amount.into(),
            FactField::Currency => self.currency.clone().into(),
            FactField::TransactionType => self.transaction_type.clone().into(),
            FactField::Timestamp => self
                .timestamp
                .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S").to_string())
                .into(),
            FactField::MerchantId => self.merchant_id.clone().into(),
            FactField::Country => self.country.clone().into(),
            FactField::RiskScore => self.risk_score.into(),
            FactField::Status => self.status.clone().into(),
            FactField::RejectionReason => self.rejection_reason.clone().into(),
            FactField::UserAge => self.user_age.into(),
            FactField::AccountAgeDays => self.account_age_days.into(),
            FactField::MonthlyTransactionVolume => self.monthly_transaction_volume.into(),
            FactField::FailedTransactionsLastMonth => self.failed_transactions_last_month.into(),
            FactField::IsVip => self.is_vip.into(),
            FactField::AccountTier => self.account_tier.clone().into(),
        }
    }

    /// Write a field from a rule action.
    ///
    /// Read-only fields are rejected; `null` clears an optional field.
    pub fn set(&mut self, field: FactField, value: Value) -> Result<()> {
        if !field.is_writable() {
            return Err(CoreError::ReadOnlyField(field.name().to_string()));
        }
        self.assign(field, value)
    }

    fn assign(&mut self, field: FactField, value: Value) -> Result<()> {
        match field.field_type() {
            FieldType::Text => {
                let text = coerce_text(field, value)?;
                match field {
                    FactField::Id => self.id = text.unwrap_or_default(),
                    FactField::UserId => self.user_id = text,
                    FactField::Currency => self.currency = text,
                    FactField::TransactionType => self.transaction_type = text,
                    FactField::Timestamp => {
                        self.timestamp = match text {
                            Some(raw) => Some(
                                NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S")
                                    .map_err(|e| CoreError::InvalidValue(e.to_string()))?,
                            ),
                            None => None,
                        }
                    }
                    FactField::MerchantId => self.merchant_id = text,
                    FactField::Country => self.country = text,
                    FactField::Status => self.status = text,
                    FactField::RejectionReason => self.rejection_reason = text,
                    FactField::AccountTier => self.account_tier = text,
                    _ => unreachable!("non-text field {} typed as text", field),
                }
            }
            FieldType::Integer => {
                let number = coerce_number(field, value)?.map(|n| n.round() as i64);
                match field {
                    FactField::RiskScore => self.risk_score = number,
                    FactField::UserAge => self.user_age = number,
                    FactField::AccountAgeDays => self.account_age_days = number,
                    FactField::FailedTransactionsLastMonth => {
                        self.failed_transactions_last_month = number
                    }
                    _ => unreachable!("non-integer field {} typed as integer", field),
                }
            }
            FieldType::Decimal => {
                let number = coerce_number(field, value)?;
                match field {
                    FactField::Amount => self.amount = number,
                    FactField::MonthlyTransactionVolume => self.monthly_transaction_volume = number,
                    _ => unreachable!("non-decimal field {} typed as decimal", field),
                }
            }
            FieldType::Boolean => {
                self.is_vip = match value {
                    Value::Bool(b) => Some(b),
                    Value::Null => None,
                    other => return Err(mismatch(field, &other)),
                }
            }
        }
        Ok(())
    }
}

fn coerce_text(field: FactField, value: Value) -> Result<Option<String>> {
    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => Err(mismatch(field, &other)),
    }
}

fn coerce_number(field: FactField, value: Value) -> Result<Option<f64>> {
    match value {
        Value::Number(n) => Ok(Some(n)),
        Value::Null => Ok(None),
        other => Err(mismatch(field, &other)),
    }
}

fn mismatch(field: FactField, value: &Value) -> CoreError {
    CoreError::TypeError(format!(
        "cannot assign {} to {} field '{}'",
        value.type_name(),
        field.field_type(),
        field.name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_for_evaluation() {
        let mut fact = Fact::new("tx-1");
        fact.prepare_for_evaluation();
        assert_eq!(fact.status.as_deref(), Some("PENDING"));
        assert_eq!(fact.risk_score, Some(0));

        let mut scored = Fact::new("tx-2").with_risk_score(40);
        scored.prepare_for_evaluation();
        assert_eq!(scored.risk_score, Some(40));
    }

    #[test]
    fn test_get_absent_field_is_null() {
        let fact = Fact::new("tx-1");
        assert_eq!(fact.get(FactField::Amount), Value::Null);
        assert_eq!(fact.get(FactField::Id), Value::String("tx-1".to_string()));
    }

    #[test]
    fn test_set_rounds_integer_fields() {
        let mut fact = Fact::new("tx-1");
        fact.set(FactField::RiskScore, Value::Number(79.6)).unwrap();
        assert_eq!(fact.risk_score, Some(80));
    }

    #[test]
    fn test_set_rejects_type_mismatch() {
        let mut fact = Fact::new("tx-1");
        let err = fact
            .set(FactField::Amount, Value::String("lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, CoreError::TypeError(_)));
    }

    #[test]
    fn test_set_rejects_read_only() {
        let mut fact = Fact::new("tx-1");
        let err = fact
            .set(FactField::Id, Value::String("other".to_string()))
            .unwrap_err();
        assert_eq!(err, CoreError::ReadOnlyField("id".to_string()));
    }

    #[test]
    fn test_null_clears_optional_field() {
        let mut fact = Fact::new("tx-1").with_country("USA");
        fact.set(FactField::Country, Value::Null).unwrap();
        assert!(fact.country.is_none());
    }

    #[test]
    fn test_json_uses_transaction_field_names() {
        let json = r#"{
            "id": "tx-9",
            "amount": 15000,
            "country": "HIGH_RISK_COUNTRY_1",
            "isVIP": true,
            "accountTier": "GOLD",
            "timestamp": "2024-03-01T10:15:00"
        }"#;
        let fact: Fact = serde_json::from_str(json).unwrap();
        assert_eq!(fact.amount, Some(15000.0));
        assert_eq!(fact.is_vip, Some(true));
        assert_eq!(fact.account_tier.as_deref(), Some("GOLD"));
        assert_eq!(
            fact.get(FactField::Timestamp),
            Value::String("2024-03-01T10:15:00".to_string())
        );
    }
}
