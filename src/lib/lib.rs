mod aggregation;
mod billing;
mod config;
mod error;
mod io;
mod types;
mod utils;

use std::{fs, path::Path};

use tracing::info;

pub use aggregation::{aggregate_by_owner_month, BILLING_FIELDS};
pub use billing::{compute_billing, RESERVATION_FIELDS};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result, RowError};
pub use io::{parse_records, read_records, write_billing, write_owner_months};
pub use types::{
    Batch, BillingRecord, MonetaryAmount, Month, OwnerId, OwnerMonthAggregate, RawRecord,
    RejectedRow, ReservationRecord,
};

/// Row counts for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub read: usize,
    pub written: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub billing: StageReport,
    pub aggregation: StageReport,
}

pub fn run_billing_stage(input: &Path, output: &Path) -> Result<StageReport> {
    let rows = read_records(input)?;
    let read = rows.len();

    let batch = compute_billing(rows);
    let written = write_billing(output, &batch.records)?;

    let report = StageReport {
        read,
        written,
        rejected: batch.rejected.len(),
    };
    info!(
        read = report.read,
        written = report.written,
        rejected = report.rejected,
        "billing stage finished"
    );
    Ok(report)
}

pub fn run_aggregation_stage(input: &Path, output: &Path) -> Result<StageReport> {
    let rows = read_records(input)?;
    let read = rows.len();

    let batch = aggregate_by_owner_month(rows);
    let written = write_owner_months(output, &batch.records)?;

    let report = StageReport {
        read,
        written,
        rejected: batch.rejected.len(),
    };
    info!(
        read = report.read,
        written = report.written,
        rejected = report.rejected,
        "owner/month aggregation finished"
    );
    Ok(report)
}

/// Creates the working directories, then runs billing followed by aggregation.
///
/// Aggregation reads the billing output, so it only starts once billing has
/// written and closed its file. A missing reservations file stops the run
/// before anything is written.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    for dir in config.directories() {
        fs::create_dir_all(dir)?;
    }

    let billing = run_billing_stage(&config.reservations_path, &config.billing_path)?;
    let aggregation = run_aggregation_stage(&config.billing_path, &config.owner_month_path)?;

    Ok(PipelineReport {
        billing,
        aggregation,
    })
}
