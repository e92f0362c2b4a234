use std::{collections::HashMap, fs, path::Path};

use serde::Serialize;
use tempfile::TempDir;

#[derive(Serialize)]
struct OwnerMonthRow {
    #[serde(rename = "ID_LOCADOR")]
    owner: &'static str,
    #[serde(rename = "MES")]
    month: &'static str,
    #[serde(rename = "VALOR_TOTAL")]
    total: &'static str,
}

#[derive(Serialize)]
struct BillingRow {
    #[serde(rename = "ID_RESERVA")]
    reservation: &'static str,
    #[serde(rename = "ID_PROPRIEDADE")]
    property: &'static str,
    #[serde(rename = "ID_LOCADOR")]
    owner: &'static str,
    #[serde(rename = "ID_LOCATARIO")]
    tenant: &'static str,
    #[serde(rename = "DATA_RESERVA")]
    date: &'static str,
    #[serde(rename = "DIAS_HOSPEDAGEM")]
    days: &'static str,
    #[serde(rename = "VALOR_TOTAL")]
    total: &'static str,
    #[serde(rename = "VALOR_COMISSAO")]
    commission: &'static str,
}

// Only used during testing so no need to return result
fn to_csv<T: Serialize>(rows: Vec<T>) -> String {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(vec![]);
    for r in rows {
        wtr.serialize(r).unwrap();
    }
    wtr.flush().unwrap();
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

/// Expected owner/month output: `[owner, month, total]` per row.
pub fn create_csv(rows: Vec<[&'static str; 3]>) -> String {
    to_csv(
        rows.into_iter()
            .map(|r| OwnerMonthRow {
                owner: r[0],
                month: r[1],
                total: r[2],
            })
            .collect(),
    )
}

/// Expected billing output, one array per row in ledger column order.
pub fn create_billing_csv(rows: Vec<[&'static str; 8]>) -> String {
    to_csv(
        rows.into_iter()
            .map(|r| BillingRow {
                reservation: r[0],
                property: r[1],
                owner: r[2],
                tenant: r[3],
                date: r[4],
                days: r[5],
                total: r[6],
                commission: r[7],
            })
            .collect(),
    )
}

// Keyed by the first two columns, which is unique for owner/month output
fn split_to_dict(csv: &str) -> HashMap<String, String> {
    csv.lines()
        .skip(1) // ignore row titles
        .filter(|line| !line.is_empty())
        .map(|line| {
            let key: Vec<&str> = line.split(';').take(2).collect();
            (key.join(";"), line.to_string())
        })
        .collect()
}

// Ordering of aggregate rows is not part of the output contract. This is used
// to keep tests independent of it.
pub fn assert_unsorted_eq(s1: &str, s2: &str) {
    assert_eq!(
        s1.lines().next(),
        s2.lines().next(),
        "csvs do not share a header"
    );
    let sut1 = split_to_dict(s1);
    let sut2 = split_to_dict(s2);
    if sut1.len() != sut2.len() {
        panic!("csvs do not contain the same number of rows");
    }

    sut1.iter().for_each(|(k, v)| {
        let maybe_sut2_row = sut2.get(k);
        match maybe_sut2_row {
            Some(row) => assert_eq!(row, v),
            None => panic!("row {} not found in both csvs", k),
        }
    })
}

/// A temporary directory that is removed when dropped.
pub fn temp_workspace() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Writes `contents` to `relative` under `root`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn read_output(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}
