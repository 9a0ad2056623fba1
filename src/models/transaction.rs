//! Defines the transaction types, the core domain types of the application.

use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, models::DatabaseID};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Whether a transaction records incoming or outgoing value.
///
/// The type is independent of the sign of the transaction amount: a
/// negative amount on a credit is still a credit.
///
/// The wire and storage literals are `"Receita"` (credit) and `"Despesa"`
/// (debit); anything else is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Incoming value, e.g. a salary payment.
    #[serde(rename = "Receita")]
    Credit,
    /// Outgoing value, e.g. a grocery purchase.
    #[serde(rename = "Despesa")]
    Debit,
}

impl TransactionType {
    /// The literal used for this type on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "Receita",
            TransactionType::Debit => "Despesa",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Receita" => Ok(TransactionType::Credit),
            "Despesa" => Ok(TransactionType::Debit),
            other => Err(Error::InvalidTransactionType(other.to_string())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            TransactionType::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
        })
    }
}

/// A financial event: money was either spent or earned on a date.
///
/// A `Transaction` always belongs to exactly one user and carries the ID
/// that the store assigned to it on creation. To describe a transaction
/// that has not been stored yet, use [NewTransaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: DatabaseID,
    #[serde(with = "iso_date")]
    date: Date,
    description: String,
    category: String,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
}

impl Transaction {
    /// Create a transaction record from its id and field values.
    ///
    /// This does not store the transaction, see
    /// [TransactionStore::add](crate::stores::TransactionStore::add).
    pub fn new(id: DatabaseID, new_transaction: NewTransaction) -> Self {
        Self {
            id,
            date: new_transaction.date,
            description: new_transaction.description,
            category: new_transaction.category,
            amount: new_transaction.amount,
            transaction_type: new_transaction.transaction_type,
        }
    }

    /// The ID of the transaction, unique within the owning user's
    /// transactions.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// When the transaction happened.
    pub fn date(&self) -> &Date {
        &self.date
    }

    /// A text description of what the transaction was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// A free-text category that groups similar transactions.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The amount of money spent or earned in this transaction.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether the transaction is a credit or a debit.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }
}

/// The field values for a transaction that has not been assigned an ID yet.
///
/// This is the JSON request body for creating and updating transactions.
/// Strings are stored as-is, including empty strings; the date and the
/// type literal are validated during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free-text category that groups similar transactions.
    pub category: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is a credit or a debit.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}
