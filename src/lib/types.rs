use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::RowError;

#[derive(Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Clone)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Calendar year-month bucket, rendered as `YYYY-MM`.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Copy)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Debug)]
pub struct MonetaryAmount(Decimal);

impl MonetaryAmount {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.0.checked_mul(rhs.0).map(Self)
    }
}

impl From<u32> for MonetaryAmount {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

/// One data line of a delimited source, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Line in the source file, used only for diagnostics.
    pub line: u64,
    fields: HashMap<String, String>,
    // columns whose bytes were not valid UTF-8
    undecodable: HashSet<String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self {
            line,
            fields,
            undecodable: HashSet::new(),
        }
    }

    pub fn with_undecodable(mut self, names: HashSet<String>) -> Self {
        self.undecodable = names;
        self
    }

    pub fn from_pairs<'a>(line: u64, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            line,
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, field: &'static str) -> Result<&str, RowError> {
        if self.undecodable.contains(field) {
            return Err(RowError::InvalidUtf8(field));
        }
        self.fields
            .get(field)
            .map(String::as_str)
            .ok_or(RowError::MissingField(field))
    }

    /// Checks that every name in `fields` is present, reporting the first absent one.
    pub fn require(&self, fields: &[&'static str]) -> Result<(), RowError> {
        fields.iter().try_for_each(|&field| self.get(field).map(|_| ()))
    }
}

/// A reservation row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRecord {
    pub reservation_id: String,
    pub property_id: String,
    pub owner_id: OwnerId,
    pub tenant_id: String,
    /// Kept as the source text; it is only checked to be a valid date.
    pub reservation_date: String,
    /// Source text, written back unchanged.
    pub stay_days_text: String,
    pub stay_days: u32,
    pub daily_rate: MonetaryAmount,
    pub discount: MonetaryAmount,
    pub surcharge: MonetaryAmount,
    pub commission_rate: MonetaryAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingRecord {
    pub reservation_id: String,
    pub property_id: String,
    pub owner_id: OwnerId,
    pub tenant_id: String,
    pub reservation_date: String,
    pub stay_days: String,
    pub total_amount: MonetaryAmount,
    pub commission_amount: MonetaryAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerMonthAggregate {
    pub owner_id: OwnerId,
    pub month: Month,
    pub total_amount: MonetaryAmount,
}

/// A row skipped by a stage and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: u64,
    pub reservation_id: Option<String>,
    pub error: RowError,
}

/// Output of one pass: the records produced and the rows that were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Batch<T> {
    pub fn accept(&mut self, record: T) {
        self.records.push(record);
    }

    pub fn reject(&mut self, raw: &RawRecord, error: RowError) {
        let reservation_id = raw.get("ID_RESERVA").ok().map(str::to_string);
        warn!(
            line = raw.line,
            reservation = reservation_id.as_deref().unwrap_or("?"),
            "skipping row: {}",
            error
        );
        self.rejected.push(RejectedRow {
            line: raw.line,
            reservation_id,
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Batch, Month, RawRecord};
    use crate::error::RowError;

    #[test]
    fn month_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(Month::from_date(date).to_string(), "2024-03");
    }

    #[test]
    fn months_order_chronologically() {
        let earlier = Month::from_date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        let later = Month::from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn require_reports_first_missing_field() {
        let raw = RawRecord::from_pairs(2, [("A", "1"), ("C", "3")]);
        assert_eq!(raw.require(&["A", "B", "C", "D"]), Err(RowError::MissingField("B")));
        assert_eq!(raw.require(&["A", "C"]), Ok(()));
    }

    #[test]
    fn undecodable_field_is_reported_by_name() {
        let raw = RawRecord::from_pairs(3, [("ID_RESERVA", "7"), ("ID_LOCADOR", "L1")])
            .with_undecodable(["ID_LOCATARIO".to_string()].into_iter().collect());

        assert_eq!(raw.get("ID_LOCATARIO"), Err(RowError::InvalidUtf8("ID_LOCATARIO")));
        assert_eq!(raw.require(&["ID_RESERVA", "ID_LOCATARIO"]), Err(RowError::InvalidUtf8("ID_LOCATARIO")));
        assert_eq!(raw.get("ID_LOCADOR"), Ok("L1"));
    }

    #[test]
    fn reject_keeps_reservation_id_when_present() {
        let mut batch: Batch<()> = Batch::default();
        let raw = RawRecord::from_pairs(4, [("ID_RESERVA", "R9")]);
        batch.reject(&raw, RowError::MissingField("DESCONTO"));

        assert!(batch.records.is_empty());
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].line, 4);
        assert_eq!(batch.rejected[0].reservation_id.as_deref(), Some("R9"));
    }
}
