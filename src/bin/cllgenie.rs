use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use cll_genie::config::{CllConfig, LymphotrackConfig};
use cll_genie::lymphotrack::{self, ConditionFilter, FilterParams};
use cll_genie::report::{build_report, ReportPayload};
use cll_genie::submission::{schema, JsonFileStore, SubmissionResult, SubmissionStore};
use cll_genie::vquest::extract::extract_submission;

#[derive(Parser)]
#[command(name = "cllgenie")]
#[command(
    about = "IGHV mutation-status analysis for CLL diagnostics",
    long_about = "Parses IMGT/V-QUEST and Lymphotrack exports, classifies somatic hypermutation status, resolves CLL subset membership, and composes the Swedish clinical report text."
)]
struct Cli {
    /// Log verbosity level
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long, global = true)]
    append_log: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a submission from an IMGT/V-QUEST excel-export directory
    Extract {
        /// Directory containing 11_Parameters.txt, 1_Summary.txt and 6_Junction.txt.
        #[arg(long, required = true)]
        vquest_dir: String,
        /// Write the submission JSON to this path instead of a store.
        #[arg(long)]
        out: Option<String>,
        /// Root directory of the submission store.
        #[arg(long)]
        store_root: Option<String>,
        /// Sample identifier within the store.
        #[arg(long)]
        sample_id: Option<String>,
        /// Submission identifier within the store.
        #[arg(long)]
        submission_id: Option<String>,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Compose the clinical report for an extracted submission
    Report {
        /// Path to a submission JSON file (alternative to the store options).
        #[arg(long)]
        submission: Option<String>,
        /// Root directory of the submission store.
        #[arg(long)]
        store_root: Option<String>,
        /// Sample identifier within the store.
        #[arg(long)]
        sample_id: Option<String>,
        /// Submission identifier within the store.
        #[arg(long)]
        submission_id: Option<String>,
        /// Prefix for output files. Output files will be named <prefix>.report.txt and <prefix>.report.json.
        #[arg(long, required = true)]
        out_prefix: String,
        /// Path to configuration JSON file (hypermutation cutoffs).
        #[arg(long)]
        config: Option<String>,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Filter a Lymphotrack TSV export and write the surviving reads as FASTA
    Lymphotrack {
        /// Lymphotrack TSV export file.
        #[arg(long, required = true)]
        tsv: String,
        /// Prefix for output files. Output files will be named <prefix>.filtered.fasta and <prefix>.metadata.json.
        #[arg(long, required = true)]
        out_prefix: String,
        /// Minimum "% total reads" a read must reach to be kept.
        #[arg(long)]
        cutoff: Option<f64>,
        /// Keep only reads whose in-frame call matches.
        #[arg(long, value_enum, default_value_t = ConditionFilter::Both)]
        in_frame: ConditionFilter,
        /// Keep only reads whose no-stop-codon call matches.
        #[arg(long, value_enum, default_value_t = ConditionFilter::Both)]
        no_stop_codon: ConditionFilter,
        /// Path to configuration JSON file (header row, default cutoff).
        #[arg(long)]
        config: Option<String>,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Print JSON Schema for the submission format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

// Helper to check output paths and create directories
fn check_output_paths(
    prefix: &str,
    suffixes: &[&str],
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(prefix);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }

    if !force {
        for suffix in suffixes {
            let p = format!("{}{}", prefix, suffix);
            if Path::new(&p).exists() {
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!(
                        "Output file {} already exists. Use --force to overwrite.",
                        p
                    ),
                )));
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<CllConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(CllConfig::load(path)?),
        None => Ok(CllConfig::default()),
    }
}

fn store_ids<'a>(
    store_root: &'a Option<String>,
    sample_id: &'a Option<String>,
    submission_id: &'a Option<String>,
) -> Option<(&'a str, &'a str, &'a str)> {
    match (store_root, sample_id, submission_id) {
        (Some(root), Some(sample), Some(submission)) => {
            Some((root.as_str(), sample.as_str(), submission.as_str()))
        }
        _ => None,
    }
}

fn load_submission(
    submission: &Option<String>,
    store_root: &Option<String>,
    sample_id: &Option<String>,
    submission_id: &Option<String>,
) -> Result<SubmissionResult, Box<dyn std::error::Error>> {
    if let Some(path) = submission {
        let file = std::fs::File::open(path)
            .map_err(|e| format!("Could not open submission file {}: {}", path, e))?;
        return Ok(serde_json::from_reader(std::io::BufReader::new(file))?);
    }
    if let Some((root, sample, submission)) = store_ids(store_root, sample_id, submission_id) {
        let store = JsonFileStore::new(root);
        return match store.load(sample, submission)? {
            Some(result) => Ok(result),
            None => Err(format!(
                "No submission {} for sample {} in store {}",
                submission, sample, root
            )
            .into()),
        };
    }
    Err("Provide either --submission or --store-root with --sample-id and --submission-id".into())
}

fn write_report(
    payload: &ReportPayload,
    out_prefix: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let txt_path = format!("{}.report.txt", out_prefix);
    std::fs::write(&txt_path, &payload.summary)?;
    info!("Report text written to {}", txt_path);

    let json_path = format!("{}.report.json", out_prefix);
    let file = std::fs::File::create(&json_path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), payload)?;
    info!("Report payload written to {}", json_path);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        }
        .unwrap_or_else(|e| panic!("Could not open log file '{}': {}", path, e));
        log_builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    log_builder.init();

    match &cli.command {
        Commands::Extract {
            vquest_dir,
            out,
            store_root,
            sample_id,
            submission_id,
            force,
        } => {
            let result = match extract_submission(Path::new(vquest_dir)) {
                Ok(result) => result,
                Err(e) => {
                    error!("Error extracting {}: {}", vquest_dir, e);
                    return;
                }
            };
            info!(
                "Extracted {} sequence records from {}",
                result.records.len(),
                vquest_dir
            );

            if schema::should_validate() {
                match serde_json::to_value(&result) {
                    Ok(value) => {
                        if let Err(e) = schema::validate(&value) {
                            error!("Submission failed schema validation: {}", e);
                            return;
                        }
                    }
                    Err(e) => {
                        error!("Error serializing submission: {}", e);
                        return;
                    }
                }
            }

            if let Some((root, sample, submission)) =
                store_ids(store_root, sample_id, submission_id)
            {
                let store = JsonFileStore::new(root);
                if !force {
                    match store.load(sample, submission) {
                        Ok(Some(_)) => {
                            error!(
                                "Submission {} for sample {} already exists. Use --force to overwrite.",
                                submission, sample
                            );
                            return;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            error!("Error reading store: {}", e);
                            return;
                        }
                    }
                }
                if let Err(e) = store.save(sample, submission, &result) {
                    error!("Error saving submission: {}", e);
                }
            } else if let Some(out) = out {
                if !force && Path::new(out).exists() {
                    error!("Output file {} already exists. Use --force to overwrite.", out);
                    return;
                }
                let file = match std::fs::File::create(out) {
                    Ok(file) => file,
                    Err(e) => {
                        error!("Error creating {}: {}", out, e);
                        return;
                    }
                };
                if let Err(e) =
                    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &result)
                {
                    error!("Error writing submission: {}", e);
                } else {
                    info!("Submission written to {}", out);
                }
            } else {
                error!("Provide either --out or --store-root with --sample-id and --submission-id");
            }
        }
        Commands::Report {
            submission,
            store_root,
            sample_id,
            submission_id,
            out_prefix,
            config,
            force,
        } => {
            if let Err(e) =
                check_output_paths(out_prefix, &[".report.txt", ".report.json"], *force)
            {
                error!("{}", e);
                return;
            }
            let config = match load_config(config.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    error!("Error loading config: {}", e);
                    return;
                }
            };
            let result =
                match load_submission(submission, store_root, sample_id, submission_id) {
                    Ok(result) => result,
                    Err(e) => {
                        error!("{}", e);
                        return;
                    }
                };
            match build_report(&result, &config.cutoffs) {
                Ok(Some(payload)) => {
                    if let Err(e) = write_report(&payload, out_prefix) {
                        error!("Error writing report: {}", e);
                        return;
                    }
                    println!("{}", payload.summary);
                }
                Ok(None) => {
                    warn!("No report available: submission has no analyzed sequences");
                }
                Err(e) => error!("Error composing report: {}", e),
            }
        }
        Commands::Lymphotrack {
            tsv,
            out_prefix,
            cutoff,
            in_frame,
            no_stop_codon,
            config,
            force,
        } => {
            if let Err(e) =
                check_output_paths(out_prefix, &[".filtered.fasta", ".metadata.json"], *force)
            {
                error!("{}", e);
                return;
            }
            let lt_config: LymphotrackConfig = match load_config(config.as_deref()) {
                Ok(config) => config.lymphotrack,
                Err(e) => {
                    error!("Error loading config: {}", e);
                    return;
                }
            };
            let sheet = match lymphotrack::read_sheet_file(Path::new(tsv), lt_config.header_row) {
                Ok(sheet) => sheet,
                Err(e) => {
                    error!("Error reading {}: {}", tsv, e);
                    return;
                }
            };
            let params = FilterParams {
                cutoff: cutoff.unwrap_or(lt_config.filtration_cutoff),
                in_frame: *in_frame,
                no_stop_codon: *no_stop_codon,
            };
            let reads = lymphotrack::filter_reads(&sheet, &params);
            info!(
                "{} of {} reads passed filtration",
                reads.len(),
                sheet.reads.len()
            );

            let fasta_path = format!("{}.filtered.fasta", out_prefix);
            if let Err(e) = std::fs::write(&fasta_path, lymphotrack::to_fasta(&reads)) {
                error!("Error writing {}: {}", fasta_path, e);
                return;
            }
            info!("Filtered reads written to {}", fasta_path);

            let meta_path = format!("{}.metadata.json", out_prefix);
            match serde_json::to_string_pretty(&sheet.metadata) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&meta_path, json) {
                        error!("Error writing {}: {}", meta_path, e);
                    } else {
                        info!("Run metadata written to {}", meta_path);
                    }
                }
                Err(e) => error!("Error serializing metadata: {}", e),
            }
        }
        Commands::Schema { output } => {
            let schema = schema::schema_json_pretty();
            if let Some(path) = output {
                if let Err(e) = std::fs::write(path, &schema) {
                    error!("Error writing schema: {}", e);
                } else {
                    info!("Schema written to {}", path);
                }
            } else {
                println!("{}", schema);
            }
        }
    }
}
