//! Order domain entity: the persisted record of one transfer.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    /// Sent as a JSON number; accepted as a number or a string.
    #[serde(serialize_with = "amount_as_number")]
    #[schema(value_type = f64, example = 100.0)]
    pub amount: BigDecimal,
    pub payee: Uuid,
    pub payer: Uuid,
    pub created_at: DateTime<Utc>,
    /// Carried by the schema; nothing in this service sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed_at: Option<DateTime<Utc>>,
}

fn amount_as_number<S: Serializer>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    // Goes through the decimal string so 100.10 stays 100.1, not 100.09999.
    let value: f64 = amount
        .to_string()
        .parse()
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_f64(value)
}

impl Order {
    pub fn new(amount: BigDecimal, payer: Uuid, payee: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            payee,
            payer,
            created_at: Utc::now(),
            reversed_at: None,
        }
    }
}
