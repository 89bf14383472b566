//! Field schema of the transaction fact
//!
//! Rules may only reference the fields listed here. The schema is fixed for
//! this domain, so it is modelled as an enum rather than a runtime map.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    Text,
    /// Whole number (assignments round to nearest)
    Integer,
    /// Decimal amount
    Decimal,
    /// Boolean flag
    Boolean,
}

impl FieldType {
    /// Returns true if values of this type are numbers at runtime
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A field of the transaction fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactField {
    Id,
    UserId,
    Amount,
    Currency,
    TransactionType,
    Timestamp,
    MerchantId,
    Country,
    RiskScore,
    Status,
    RejectionReason,
    UserAge,
    AccountAgeDays,
    MonthlyTransactionVolume,
    FailedTransactionsLastMonth,
    IsVip,
    AccountTier,
}

impl FactField {
    /// Every field, in schema order
    pub const ALL: [FactField; 17] = [
        FactField::Id,
        FactField::UserId,
        FactField::Amount,
        FactField::Currency,
        FactField::TransactionType,
        FactField::Timestamp,
        FactField::MerchantId,
        FactField::Country,
        FactField::RiskScore,
        FactField::Status,
        FactField::RejectionReason,
        FactField::UserAge,
        FactField::AccountAgeDays,
        FactField::MonthlyTransactionVolume,
        FactField::FailedTransactionsLastMonth,
        FactField::IsVip,
        FactField::AccountTier,
    ];

    /// Name used in rule sources
    pub fn name(&self) -> &'static str {
        match self {
            FactField::Id => "id",
            FactField::UserId => "user_id",
            FactField::Amount => "amount",
            FactField::Currency => "currency",
            FactField::TransactionType => "transaction_type",
            FactField::Timestamp => "timestamp",
            FactField::MerchantId => "merchant_id",
            FactField::Country => "country",
            FactField::RiskScore => "risk_score",
            FactField::Status => "status",
            FactField::RejectionReason => "rejection_reason",
            FactField::UserAge => "user_age",
            FactField::AccountAgeDays => "account_age_days",
            FactField::MonthlyTransactionVolume => "monthly_transaction_volume",
            FactField::FailedTransactionsLastMonth => "failed_transactions_last_month",
            FactField::IsVip => "is_vip",
            FactField::AccountTier => "account_tier",
        }
    }

    /// Look up a field by its rule-source name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FactField::Amount | FactField::MonthlyTransactionVolume => FieldType::Decimal,
            FactField::RiskScore
            | FactField::UserAge
            | FactField::AccountAgeDays
            | FactField::FailedTransactionsLastMonth => FieldType::Integer,
            FactField::IsVip => FieldType::Boolean,
            _ => FieldType::Text,
        }
    }

    /// Identity and arrival time cannot be rewritten by rule actions
    pub fn is_writable(&self) -> bool {
        !matches!(self, FactField::Id | FactField::Timestamp)
    }
}

impl fmt::Display for FactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
