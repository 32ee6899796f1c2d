//! Typed views of the two contract tables.
//!
//! Rows come back as plain [`Value`] vectors; these types decode them when
//! the statement selected the columns in `COLUMNS` order.
use crate::core::db::Value;
use crate::core::{Result, StorekeeperError};
use chrono::{NaiveDate, NaiveDateTime};

/// A shop registered to use the bot, keyed by its Telegram user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub telegram_id: i64,
    pub store_name: String,
    pub expiration_date: Option<NaiveDate>,
    pub is_admin: bool,
}

impl Subscriber {
    pub const COLUMNS: &'static str = "telegram_id, store_name, expiration_date, is_admin";

    /// Parameters for `INSERT INTO subscriber_store (COLUMNS) VALUES ($1, $2, $3, $4)`.
    pub fn to_params(&self) -> Vec<Value> {
        vec![
            self.telegram_id.into(),
            self.store_name.clone().into(),
            self.expiration_date.into(),
            self.is_admin.into(),
        ]
    }
}

impl TryFrom<&[Value]> for Subscriber {
    type Error = StorekeeperError;

    fn try_from(row: &[Value]) -> Result<Self> {
        let [telegram_id, store_name, expiration_date, is_admin] = expect_columns::<4>(row, "subscriber_store")?;
        Ok(Subscriber {
            telegram_id: required(telegram_id, "telegram_id", Value::as_i64)?,
            store_name: required(store_name, "store_name", |v| v.as_str().map(str::to_string))?,
            expiration_date: optional(expiration_date, "expiration_date", Value::as_date)?,
            // NULL means the column default, which is false.
            is_admin: optional(is_admin, "is_admin", Value::as_bool)?.unwrap_or(false),
        })
    }
}

/// One stock count logged by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub id: i64,
    pub telegram_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub recorded_at: Option<NaiveDateTime>,
}

impl InventoryRecord {
    pub const COLUMNS: &'static str = "id, telegram_id, product_name, quantity, recorded_at";
}

impl TryFrom<&[Value]> for InventoryRecord {
    type Error = StorekeeperError;

    fn try_from(row: &[Value]) -> Result<Self> {
        let [id, telegram_id, product_name, quantity, recorded_at] = expect_columns::<5>(row, "inventory_record")?;
        Ok(InventoryRecord {
            id: required(id, "id", Value::as_i64)?,
            telegram_id: optional(telegram_id, "telegram_id", Value::as_i64)?,
            product_name: required(product_name, "product_name", |v| v.as_str().map(str::to_string))?,
            quantity: required(quantity, "quantity", Value::as_i64)?,
            recorded_at: optional(recorded_at, "recorded_at", Value::as_timestamp)?,
        })
    }
}

fn expect_columns<'a, const N: usize>(row: &'a [Value], table: &str) -> Result<&'a [Value; N]> {
    row.try_into().map_err(|_| {
        StorekeeperError::Decode(format!(
            "{} row has {} columns, expected {}",
            table,
            row.len(),
            N
        ))
    })
}

fn required<T>(value: &Value, column: &str, convert: impl Fn(&Value) -> Option<T>) -> Result<T> {
    if value.is_null() {
        return Err(StorekeeperError::Decode(format!("{} is NULL", column)));
    }
    convert(value).ok_or_else(|| {
        StorekeeperError::Decode(format!("{} has unexpected type {}", column, value.type_name()))
    })
}

fn optional<T>(value: &Value, column: &str, convert: impl Fn(&Value) -> Option<T>) -> Result<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    required(value, column, convert).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_from_postgres_row() {
        let row = vec![
            Value::Int(123456789),
            Value::Text("Bodega Sur".to_string()),
            Value::Date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            Value::Bool(true),
        ];
        let subscriber = Subscriber::try_from(row.as_slice()).unwrap();
        assert_eq!(subscriber.telegram_id, 123456789);
        assert_eq!(subscriber.store_name, "Bodega Sur");
        assert_eq!(subscriber.expiration_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert!(subscriber.is_admin);
    }

    #[test]
    fn test_subscriber_from_sqlite_row() {
        let row = vec![
            Value::Int(7),
            Value::Text("Kiosko".to_string()),
            Value::Null,
            Value::Int(0),
        ];
        let subscriber = Subscriber::try_from(row.as_slice()).unwrap();
        assert_eq!(subscriber.expiration_date, None);
        assert!(!subscriber.is_admin);
    }

    #[test]
    fn test_inventory_record_from_sqlite_row() {
        let row = vec![
            Value::Int(1),
            Value::Int(7),
            Value::Text("Arroz 1kg".to_string()),
            Value::Int(24),
            Value::Text("2025-02-14 09:15:00".to_string()),
        ];
        let record = InventoryRecord::try_from(row.as_slice()).unwrap();
        assert_eq!(record.telegram_id, Some(7));
        assert_eq!(record.quantity, 24);
        assert_eq!(
            record.recorded_at,
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap().and_hms_opt(9, 15, 0)
        );
    }

    #[test]
    fn test_decode_errors() {
        let short = vec![Value::Int(1)];
        match Subscriber::try_from(short.as_slice()) {
            Err(StorekeeperError::Decode(msg)) => assert!(msg.contains("expected 4")),
            other => panic!("Expected Decode error, got {:?}", other),
        }

        let null_name = vec![Value::Int(1), Value::Null, Value::Null, Value::Null];
        match Subscriber::try_from(null_name.as_slice()) {
            Err(StorekeeperError::Decode(msg)) => assert!(msg.contains("store_name is NULL")),
            other => panic!("Expected Decode error, got {:?}", other),
        }

        let wrong_type = vec![
            Value::Text("x".to_string()),
            Value::Int(1),
            Value::Text("p".to_string()),
            Value::Int(1),
            Value::Null,
        ];
        match InventoryRecord::try_from(wrong_type.as_slice()) {
            Err(StorekeeperError::Decode(msg)) => assert!(msg.contains("id has unexpected type text")),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_subscriber_params_follow_columns() {
        let subscriber = Subscriber {
            telegram_id: 5,
            store_name: "Tienda".to_string(),
            expiration_date: None,
            is_admin: false,
        };
        assert_eq!(
            subscriber.to_params(),
            vec![Value::Int(5), Value::Text("Tienda".to_string()), Value::Null, Value::Bool(false)]
        );
    }
}
