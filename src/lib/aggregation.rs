use im::OrdMap;

use crate::error::RowError;
use crate::types::{Batch, MonetaryAmount, Month, OwnerId, OwnerMonthAggregate, RawRecord};
use crate::utils::{parse_amount, parse_date, OrDefault};

pub const BILLING_FIELDS: [&str; 8] = [
    "ID_RESERVA",
    "ID_PROPRIEDADE",
    "ID_LOCADOR",
    "ID_LOCATARIO",
    "DATA_RESERVA",
    "DIAS_HOSPEDAGEM",
    "VALOR_TOTAL",
    "VALOR_COMISSAO",
];

type OwnerMonthKey = (OwnerId, Month);

/// The part of a billing row the aggregation needs.
struct BillingEntry {
    key: OwnerMonthKey,
    total: MonetaryAmount,
}

fn parse_billing_entry(raw: &RawRecord) -> Result<BillingEntry, RowError> {
    raw.require(&BILLING_FIELDS)?;

    let date = parse_date("DATA_RESERVA", raw.get("DATA_RESERVA")?)?;
    let owner = OwnerId::new(raw.get("ID_LOCADOR")?);
    let total = parse_amount("VALOR_TOTAL", raw.get("VALOR_TOTAL")?)?;

    Ok(BillingEntry {
        key: (owner, Month::from_date(date)),
        total,
    })
}

fn accumulate(
    totals: &OrdMap<OwnerMonthKey, MonetaryAmount>,
    entry: BillingEntry,
) -> Result<OrdMap<OwnerMonthKey, MonetaryAmount>, RowError> {
    let sum = totals
        .get_or_default(&entry.key)
        .checked_add(entry.total)
        .ok_or(RowError::ArithmeticOverflow("VALOR_TOTAL"))?;
    Ok(totals.update(entry.key, sum))
}

// Used for testing
fn aggregate_with_init<I>(
    init_totals: OrdMap<OwnerMonthKey, MonetaryAmount>,
    records: I,
) -> Batch<OwnerMonthAggregate>
where
    I: IntoIterator<Item = RawRecord>,
{
    let (totals, mut batch) = records.into_iter().fold(
        (init_totals, Batch::default()),
        |(totals, mut batch), raw| {
            match parse_billing_entry(&raw).and_then(|entry| accumulate(&totals, entry)) {
                Ok(next) => (next, batch),
                Err(e) => {
                    batch.reject(&raw, e);
                    (totals, batch)
                }
            }
        },
    );

    // OrdMap iterates in key order, so output is sorted by owner then month.
    batch.records = totals
        .into_iter()
        .map(|((owner_id, month), total_amount)| OwnerMonthAggregate {
            owner_id,
            month,
            total_amount,
        })
        .collect();
    batch
}

// public interface
pub fn aggregate_by_owner_month<I>(records: I) -> Batch<OwnerMonthAggregate>
where
    I: IntoIterator<Item = RawRecord>,
{
    aggregate_with_init(OrdMap::new(), records)
}
