use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "file/bd";
pub const OUTPUT_DIR: &str = "file/saida";
pub const RESERVATIONS_FILE: &str = "bd_entrada.csv";
pub const BILLING_FILE: &str = "bd_faturamento.csv";
pub const OWNER_MONTH_FILE: &str = "bd_faturamento_locador.csv";

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub reservations_path: PathBuf,
    pub billing_path: PathBuf,
    pub owner_month_path: PathBuf,
}

impl PipelineConfig {
    /// The standard layout placed under `base`.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let data_dir = base.join(DATA_DIR);
        let output_dir = base.join(OUTPUT_DIR);
        Self {
            reservations_path: data_dir.join(RESERVATIONS_FILE),
            billing_path: output_dir.join(BILLING_FILE),
            owner_month_path: output_dir.join(OWNER_MONTH_FILE),
            data_dir,
            output_dir,
        }
    }

    pub fn directories(&self) -> [&Path; 2] {
        [&self.data_dir, &self.output_dir]
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::rooted_at("")
    }
}
