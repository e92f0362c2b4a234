use crate::error::RowError;
use crate::types::{BillingRecord, Batch, MonetaryAmount, OwnerId, RawRecord, ReservationRecord};
use crate::utils::{parse_amount, parse_count, parse_date};

pub const RESERVATION_FIELDS: [&str; 10] = [
    "ID_RESERVA",
    "ID_PROPRIEDADE",
    "ID_LOCADOR",
    "ID_LOCATARIO",
    "DATA_RESERVA",
    "DIAS_HOSPEDAGEM",
    "VALOR_DIARIA",
    "DESCONTO",
    "ACRECIMOS",
    "COMISSAO",
];

// Every field is checked for presence before any of them is parsed, so a row
// that is both incomplete and malformed reports the missing field.
fn parse_reservation(raw: &RawRecord) -> Result<ReservationRecord, RowError> {
    raw.require(&RESERVATION_FIELDS)?;

    let reservation_date = raw.get("DATA_RESERVA")?;
    parse_date("DATA_RESERVA", reservation_date)?;
    let stay_days = raw.get("DIAS_HOSPEDAGEM")?;

    Ok(ReservationRecord {
        reservation_id: raw.get("ID_RESERVA")?.to_string(),
        property_id: raw.get("ID_PROPRIEDADE")?.to_string(),
        owner_id: OwnerId::new(raw.get("ID_LOCADOR")?),
        tenant_id: raw.get("ID_LOCATARIO")?.to_string(),
        reservation_date: reservation_date.to_string(),
        stay_days_text: stay_days.to_string(),
        stay_days: parse_count("DIAS_HOSPEDAGEM", stay_days)?,
        daily_rate: parse_amount("VALOR_DIARIA", raw.get("VALOR_DIARIA")?)?,
        discount: parse_amount("DESCONTO", raw.get("DESCONTO")?)?,
        surcharge: parse_amount("ACRECIMOS", raw.get("ACRECIMOS")?)?,
        commission_rate: parse_amount("COMISSAO", raw.get("COMISSAO")?)?,
    })
}

/// total = stay_days * daily_rate + surcharge - discount
/// commission = total * commission_rate
///
/// No rounding is applied; the decimal scale is whatever the arithmetic yields.
fn bill_reservation(reservation: ReservationRecord) -> Result<BillingRecord, RowError> {
    let total_amount = MonetaryAmount::from(reservation.stay_days)
        .checked_mul(reservation.daily_rate)
        .and_then(|t| t.checked_add(reservation.surcharge))
        .and_then(|t| t.checked_sub(reservation.discount))
        .ok_or(RowError::ArithmeticOverflow("VALOR_TOTAL"))?;

    let commission_amount = total_amount
        .checked_mul(reservation.commission_rate)
        .ok_or(RowError::ArithmeticOverflow("VALOR_COMISSAO"))?;

    Ok(BillingRecord {
        reservation_id: reservation.reservation_id,
        property_id: reservation.property_id,
        owner_id: reservation.owner_id,
        tenant_id: reservation.tenant_id,
        reservation_date: reservation.reservation_date,
        stay_days: reservation.stay_days_text,
        total_amount,
        commission_amount,
    })
}

// public interface
pub fn compute_billing<I>(records: I) -> Batch<BillingRecord>
where
    I: IntoIterator<Item = RawRecord>,
{
    records.into_iter().fold(Batch::default(), |mut batch, raw| {
        match parse_reservation(&raw).and_then(bill_reservation) {
            Ok(record) => batch.accept(record),
            Err(e) => batch.reject(&raw, e),
        }
        batch
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::compute_billing;
    use crate::error::RowError;
    use crate::types::{MonetaryAmount, OwnerId, RawRecord};

    fn amount(text: &str) -> MonetaryAmount {
        MonetaryAmount::new(Decimal::from_str(text).unwrap())
    }

    fn reservation(line: u64, overrides: &[(&'static str, &'static str)]) -> RawRecord {
        let mut fields = vec![
            ("ID_RESERVA", "1"),
            ("ID_PROPRIEDADE", "P1"),
            ("ID_LOCADOR", "L1"),
            ("ID_LOCATARIO", "T1"),
            ("DATA_RESERVA", "2024-03-10"),
            ("DIAS_HOSPEDAGEM", "3"),
            ("VALOR_DIARIA", "100.0"),
            ("DESCONTO", "10.0"),
            ("ACRECIMOS", "5.0"),
            ("COMISSAO", "0.1"),
        ];
        for (key, value) in overrides {
            match fields.iter_mut().find(|(k, _)| k == key) {
                Some(field) => field.1 = *value,
                None => fields.push((*key, *value)),
            }
        }
        RawRecord::from_pairs(line, fields)
    }

    fn without(line: u64, missing: &str) -> RawRecord {
        let full = reservation(line, &[]);
        let pairs: Vec<(&str, &str)> = super::RESERVATION_FIELDS
            .iter()
            .filter(|f| **f != missing)
            .map(|f| (*f, full.get(*f).unwrap()))
            .collect();
        RawRecord::from_pairs(line, pairs)
    }

    #[test]
    fn computes_total_and_commission() {
        let batch = compute_billing(vec![reservation(2, &[])]);

        assert!(batch.rejected.is_empty());
        let record = &batch.records[0];
        assert_eq!(record.total_amount, amount("295.0"));
        assert_eq!(record.commission_amount, amount("29.5"));
    }

    #[test]
    fn carries_identifiers_through() {
        let batch = compute_billing(vec![reservation(2, &[("ID_RESERVA", "R-77")])]);
        let record = &batch.records[0];

        assert_eq!(record.reservation_id, "R-77");
        assert_eq!(record.property_id, "P1");
        assert_eq!(record.owner_id, OwnerId::new("L1"));
        assert_eq!(record.tenant_id, "T1");
        assert_eq!(record.reservation_date, "2024-03-10");
        assert_eq!(record.stay_days, "3");
    }

    #[test]
    fn stay_days_text_is_written_back_unchanged() {
        let batch = compute_billing(vec![reservation(2, &[("DIAS_HOSPEDAGEM", " +3 ")])]);
        let record = &batch.records[0];

        assert_eq!(record.stay_days, " +3 ");
        assert_eq!(record.total_amount, amount("295.0"));
    }

    #[test]
    fn zero_night_stay_is_rejected() {
        let batch = compute_billing(vec![reservation(2, &[("DIAS_HOSPEDAGEM", "0")])]);

        assert!(batch.records.is_empty());
        assert_eq!(
            batch.rejected[0].error,
            RowError::InvalidInteger {
                field: "DIAS_HOSPEDAGEM",
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn discount_can_exceed_charges() {
        let batch = compute_billing(vec![reservation(
            2,
            &[("DIAS_HOSPEDAGEM", "1"), ("DESCONTO", "150"), ("ACRECIMOS", "0")],
        )]);
        assert_eq!(batch.records[0].total_amount, amount("-50"));
        assert_eq!(batch.records[0].commission_amount, amount("-5"));
    }

    #[test]
    fn decimal_arithmetic_is_exact() {
        let batch = compute_billing(vec![reservation(
            2,
            &[
                ("DIAS_HOSPEDAGEM", "3"),
                ("VALOR_DIARIA", "0.1"),
                ("DESCONTO", "0"),
                ("ACRECIMOS", "0.2"),
                ("COMISSAO", "0.15"),
            ],
        )]);
        assert_eq!(batch.records[0].total_amount, amount("0.5"));
        assert_eq!(batch.records[0].commission_amount, amount("0.075"));
    }

    #[test]
    fn each_missing_field_rejects_the_row() {
        for field in super::RESERVATION_FIELDS {
            let batch = compute_billing(vec![without(2, field)]);
            assert!(batch.records.is_empty(), "{} should be required", field);
            assert_eq!(batch.rejected[0].error, RowError::MissingField(field));
        }
    }

    #[test]
    fn missing_field_wins_over_malformed_value() {
        let raw = RawRecord::from_pairs(
            2,
            super::RESERVATION_FIELDS
                .iter()
                .filter(|f| **f != "COMISSAO")
                .map(|f| (*f, if *f == "VALOR_DIARIA" { "abc" } else { "1" })),
        );
        let batch = compute_billing(vec![raw]);
        assert_eq!(batch.rejected[0].error, RowError::MissingField("COMISSAO"));
    }

    #[test]
    fn malformed_values_are_rejected_with_their_kind() {
        let batch = compute_billing(vec![
            reservation(2, &[("VALOR_DIARIA", "cem")]),
            reservation(3, &[("DIAS_HOSPEDAGEM", "three")]),
            reservation(4, &[("DATA_RESERVA", "2024-13-01")]),
            reservation(5, &[("COMISSAO", "")]),
        ]);

        assert!(batch.records.is_empty());
        let errors: Vec<RowError> = batch.rejected.into_iter().map(|r| r.error).collect();
        assert_eq!(
            errors,
            vec![
                RowError::InvalidNumber {
                    field: "VALOR_DIARIA",
                    value: "cem".to_string()
                },
                RowError::InvalidInteger {
                    field: "DIAS_HOSPEDAGEM",
                    value: "three".to_string()
                },
                RowError::InvalidDate {
                    field: "DATA_RESERVA",
                    value: "2024-13-01".to_string()
                },
                RowError::InvalidNumber {
                    field: "COMISSAO",
                    value: "".to_string()
                },
            ]
        );
    }

    #[test]
    fn bad_rows_do_not_affect_neighbours() {
        let batch = compute_billing(vec![
            reservation(2, &[("ID_RESERVA", "1")]),
            reservation(3, &[("ID_RESERVA", "2"), ("DESCONTO", "n/a")]),
            reservation(4, &[("ID_RESERVA", "3")]),
        ]);

        let ids: Vec<&str> = batch.records.iter().map(|r| r.reservation_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].line, 3);
        assert_eq!(batch.rejected[0].reservation_id.as_deref(), Some("2"));
    }

    #[test]
    fn overflow_rejects_the_row() {
        let batch = compute_billing(vec![reservation(
            2,
            &[
                ("DIAS_HOSPEDAGEM", "4000000000"),
                ("VALOR_DIARIA", "79228162514264337593543950335"),
            ],
        )]);
        assert!(batch.records.is_empty());
        assert_eq!(
            batch.rejected[0].error,
            RowError::ArithmeticOverflow("VALOR_TOTAL")
        );
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = compute_billing(Vec::<RawRecord>::new());
        assert!(batch.records.is_empty());
        assert!(batch.rejected.is_empty());
    }
}
