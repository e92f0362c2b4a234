use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use ::serde::{Serialize, Serializer};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::types::{BillingRecord, OwnerMonthAggregate, RawRecord};

pub const DELIMITER: u8 = b';';

fn plain_decimal<S: Serializer>(x: &Decimal, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(x)
}

#[derive(Debug, Serialize)]
pub struct BillingRowEntity<'a> {
    #[serde(rename = "ID_RESERVA")]
    reservation_id: &'a str,
    #[serde(rename = "ID_PROPRIEDADE")]
    property_id: &'a str,
    #[serde(rename = "ID_LOCADOR")]
    owner_id: &'a str,
    #[serde(rename = "ID_LOCATARIO")]
    tenant_id: &'a str,
    #[serde(rename = "DATA_RESERVA")]
    reservation_date: &'a str,
    #[serde(rename = "DIAS_HOSPEDAGEM")]
    stay_days: &'a str,
    #[serde(rename = "VALOR_TOTAL", serialize_with = "plain_decimal")]
    total_amount: Decimal,
    #[serde(rename = "VALOR_COMISSAO", serialize_with = "plain_decimal")]
    commission_amount: Decimal,
}

impl<'a> BillingRowEntity<'a> {
    pub fn from_record(record: &'a BillingRecord) -> Self {
        Self {
            reservation_id: &record.reservation_id,
            property_id: &record.property_id,
            owner_id: record.owner_id.value(),
            tenant_id: &record.tenant_id,
            reservation_date: &record.reservation_date,
            stay_days: &record.stay_days,
            total_amount: record.total_amount.value(),
            commission_amount: record.commission_amount.value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OwnerMonthRowEntity<'a> {
    #[serde(rename = "ID_LOCADOR")]
    owner_id: &'a str,
    #[serde(rename = "MES")]
    month: String,
    #[serde(rename = "VALOR_TOTAL", serialize_with = "plain_decimal")]
    total_amount: Decimal,
}

impl<'a> OwnerMonthRowEntity<'a> {
    pub fn from_aggregate(aggregate: &'a OwnerMonthAggregate) -> Self {
        Self {
            owner_id: aggregate.owner_id.value(),
            month: aggregate.month.to_string(),
            total_amount: aggregate.total_amount.value(),
        }
    }
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::SourceNotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })
}

/// Reads every data line of a `;`-separated source into header-keyed records.
///
/// Short lines are kept; their absent trailing columns are simply not in the
/// record. Values past the end of the header are dropped. A value that is not
/// valid UTF-8 is kept out of the record and reported when a stage asks for it.
pub fn parse_records<R: Read>(source: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(source);
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut rows: Vec<RawRecord> = Vec::new();
    for row in reader.byte_records() {
        let record = row?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let mut fields = HashMap::new();
        let mut undecodable = HashSet::new();
        for (name, value) in headers.iter().zip(record.iter()) {
            match std::str::from_utf8(value) {
                Ok(text) => {
                    fields.insert(name.clone(), text.to_string());
                }
                Err(_) => {
                    undecodable.insert(name.clone());
                }
            }
        }
        rows.push(RawRecord::new(line, fields).with_undecodable(undecodable));
    }

    Ok(rows)
}

pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file = open_source(path)?;
    debug!(path = %path.display(), "reading records");
    parse_records(file)
}

/// Writes records with a header taken from the first record's field names.
/// An empty slice produces no output at all, not even a header.
pub fn serialize_records<W: Write, T: Serialize>(sink: W, records: &[T]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(sink);

    for record in records {
        wtr.serialize(record)?
    }

    wtr.flush()?;
    Ok(records.len())
}

pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    debug!(path = %path.display(), count = records.len(), "writing records");
    let file = File::create(path)?;
    serialize_records(file, records)
}

pub fn write_billing(path: &Path, records: &[BillingRecord]) -> Result<usize> {
    let rows: Vec<BillingRowEntity> = records.iter().map(BillingRowEntity::from_record).collect();
    write_records(path, &rows)
}

pub fn write_owner_months(path: &Path, aggregates: &[OwnerMonthAggregate]) -> Result<usize> {
    let rows: Vec<OwnerMonthRowEntity> = aggregates
        .iter()
        .map(OwnerMonthRowEntity::from_aggregate)
        .collect();
    write_records(path, &rows)
}
