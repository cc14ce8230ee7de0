use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use kira_pxvalidator::cli::{Cli, Commands, ValidateArgs};
use kira_pxvalidator::cv::{FILE_FORMAT_TABLE, ID_FORMAT_TABLE};
use kira_pxvalidator::io;
use kira_pxvalidator::validators::{
    Collaborators, InputSelection, ValidationTarget, build_validator,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => run_validate(args)?,
        Commands::Cv => print_cv_tables(),
    }

    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let selection = InputSelection {
        px: args.px,
        mzid: args.mzid,
        mztab: args.mztab,
        peak: args.peak,
        peaks: args.peaks,
        skip_peak_validation: args.skip_peak_validation,
        unpack_dir: args.unpack_dir,
        threads: args.threads,
        timeout: args.timeout_secs.map(Duration::from_secs),
        keep_intermediate: args.keep_intermediate,
    };
    let target = ValidationTarget::from_selection(&selection)?;

    let validator = build_validator(&selection, Collaborators::default())?;
    tracing::info!(validator = validator.name(), "validation started");
    let report = validator.validate()?;

    let text = report.to_string();
    print!("{}", text);
    if let Some(path) = &args.report_file {
        io::write_text_report(path, &text)?;
    }
    if let Some(path) = &args.json {
        io::json_writer::write_json(path, target.path(), target.format(), &report)?;
    }
    tracing::info!(
        valid = report.is_valid(),
        errors = report.error_count(),
        "validation finished"
    );
    Ok(())
}

fn print_cv_tables() {
    println!("spectrum id formats:");
    for (accession, format) in ID_FORMAT_TABLE {
        println!("{}\t{}", accession, format);
    }
    println!("spectrum file formats:");
    for (accession, format) in FILE_FORMAT_TABLE {
        println!("{}\t{}", accession, format);
    }
}
