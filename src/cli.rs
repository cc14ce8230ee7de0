use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-pxvalidator",
    version,
    about = "Cross-checks proteomics identification results against their peak files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a submission descriptor, mzIdentML or mzTab file
    Validate(ValidateArgs),
    /// Print the spectrum id and file format accession tables
    Cv,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("assay")
        .required(true)
        .args(["px", "mzid", "mztab"])
))]
pub struct ValidateArgs {
    #[arg(long, help = "submission.px descriptor to validate")]
    pub px: Option<PathBuf>,

    #[arg(long, help = "mzIdentML file to validate (.mzid or .mzid.gz)")]
    pub mzid: Option<PathBuf>,

    #[arg(long, help = "mzTab file to validate")]
    pub mztab: Option<PathBuf>,

    #[arg(long, help = "Peak file or directory of peak files (repeatable)")]
    pub peak: Vec<PathBuf>,

    #[arg(long, help = "Peak files or directories separated by ##")]
    pub peaks: Option<String>,

    #[arg(long, default_value_t = false)]
    pub skip_peak_validation: bool,

    #[arg(long, help = "Write the text report to this file")]
    pub report_file: Option<PathBuf>,

    #[arg(long, help = "Write the JSON report to this file")]
    pub json: Option<PathBuf>,

    #[arg(long, help = "Directory for decompressed .gz inputs (default: beside the archive)")]
    pub unpack_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(long, help = "Abort the run after this many seconds")]
    pub timeout_secs: Option<u64>,

    #[arg(
        long,
        default_value_t = false,
        help = "Keep the compiled identifications as <input>.compiled.json"
    )]
    pub keep_intermediate: bool,
}
