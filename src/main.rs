use std::process;

use pms_billing_lib::{run_pipeline, PipelineConfig};
use tracing::{error, info, Level};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig::default();
    match run_pipeline(&config) {
        Ok(report) => {
            info!(
                reservations = report.billing.read,
                billed = report.billing.written,
                owner_months = report.aggregation.written,
                "done"
            );
            process::exit(0);
        }
        Err(e) => {
            error!("an error occurred: {}", e);
            process::exit(1);
        }
    }
}
