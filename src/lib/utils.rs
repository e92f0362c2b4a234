use std::str::FromStr;

use chrono::NaiveDate;
use im::OrdMap;
use rust_decimal::Decimal;

use crate::error::RowError;
use crate::types::MonetaryAmount;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait OrDefault<K, V> {
    fn get_or_default(&self, item: &K) -> V;
}

impl<K, V> OrDefault<K, V> for OrdMap<K, V>
where
    K: Ord + Clone,
    V: Default + Clone,
{
    fn get_or_default(&self, item: &K) -> V {
        match self.get(item) {
            Some(v) => v.clone(),
            None => V::default(),
        }
    }
}

pub fn parse_amount(field: &'static str, text: &str) -> Result<MonetaryAmount, RowError> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(MonetaryAmount::new)
        .map_err(|_| RowError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

/// A strictly positive whole number.
pub fn parse_count(field: &'static str, text: &str) -> Result<u32, RowError> {
    match text.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(RowError::InvalidInteger {
            field,
            value: text.to_string(),
        }),
    }
}

pub fn parse_date(field: &'static str, text: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| RowError::InvalidDate {
        field,
        value: text.to_string(),
    })
}
