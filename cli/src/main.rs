//! contract-check CLI - contract compliance checker

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use contract_check::report::{self, CheckReport, JsonFormat};
use contract_check::rules::CHECKLIST;
use contract_check::{
    extract_document, ContractCheck, ContractProfile, ExtractOptions, NormalizeOptions, Normalizer,
    TextClassifier,
};

#[derive(Parser)]
#[command(name = "contract-check")]
#[command(version)]
#[command(about = "Check contracts against a compliance checklist", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Contract file (DOCX, PDF, JPG, PNG)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    check: CheckArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a contract and print the report
    Check {
        /// Contract file (DOCX, PDF, JPG, PNG)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        args: CheckArgs,
    },

    /// Print the extracted text of a document
    Text {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print text as extracted, without normalization
        #[arg(long)]
        raw: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// List the rule checklist
    Rules,

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct CheckArgs {
    /// Attachment filename supplied with the contract (repeatable)
    #[arg(short, long = "attachment", value_name = "NAME")]
    attachments: Vec<String>,

    /// Contract profile JSON (company, tax ID, limits, word lists)
    #[arg(long, value_name = "JSON")]
    profile: Option<PathBuf>,

    /// Trained classifier directory
    #[arg(
        long,
        value_name = "DIR",
        env = "CONTRACT_CHECK_MODEL",
        default_value = "./trained_model"
    )]
    model: PathBuf,

    /// Skip paragraph classification
    #[arg(long)]
    no_classify: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Compact JSON (with --json)
    #[arg(long)]
    compact: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Compose Unicode (NFC) before checking
    #[arg(long)]
    nfc: bool,

    #[command(flatten)]
    ocr: OcrArgs,
}

#[derive(Args, Clone)]
struct OcrArgs {
    /// tesseract executable
    #[arg(
        long,
        value_name = "PATH",
        env = "CONTRACT_CHECK_TESSERACT",
        default_value = "tesseract"
    )]
    tesseract: PathBuf,

    /// pdftoppm executable
    #[arg(
        long,
        value_name = "PATH",
        env = "CONTRACT_CHECK_PDFTOPPM",
        default_value = "pdftoppm"
    )]
    pdftoppm: PathBuf,

    /// OCR languages
    #[arg(long, value_name = "LANGS", default_value = "rus+eng")]
    lang: String,

    /// Page render resolution for scanned PDFs
    #[arg(long, value_name = "N", default_value = "300")]
    dpi: u32,
}

impl OcrArgs {
    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new()
            .with_tesseract(&self.tesseract)
            .with_pdftoppm(&self.pdftoppm)
            .with_languages(&self.lang)
            .with_dpi(self.dpi)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Check { input, args }) => cmd_check(&input, &args),
        Some(Commands::Text {
            input,
            raw,
            output,
            ocr,
        }) => cmd_text(&input, raw, output.as_deref(), &ocr),
        Some(Commands::Rules) => {
            cmd_rules();
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: check if input is provided
            if let Some(input) = cli.input {
                cmd_check(&input, &cli.check)
            } else {
                println!("{}", "Usage: contract-check <FILE>".yellow());
                println!("       contract-check --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_check(input: &Path, args: &CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let profile = match &args.profile {
        Some(path) => ContractProfile::from_json_file(path)?,
        None => ContractProfile::default(),
    };

    let pb = spinner("Loading classifier...");
    let report = load_classifier(args).and_then(|classifier| {
        let mut builder = ContractCheck::new()
            .with_profile(profile)
            .with_extract_options(args.ocr.extract_options())
            .with_normalize_options(NormalizeOptions::new().with_compose_unicode(args.nfc))
            .with_available_files(args.attachments.as_slice());
        if let Some(classifier) = classifier.as_deref() {
            builder = builder.with_classifier(classifier);
        }

        pb.set_message(format!("Checking {}...", input.display()));
        builder.check(input)
    });
    pb.finish_and_clear();
    let report = report?;

    let rendered = if args.json {
        let format = if args.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        report::to_json(&report, format)?
    } else {
        report::to_text(&report)
    };

    if let Some(path) = &args.output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", rendered);
    }

    if !args.json {
        print_summary(&report);
    }
    Ok(())
}

#[cfg(feature = "bert")]
fn load_classifier(args: &CheckArgs) -> contract_check::Result<Option<Box<dyn TextClassifier>>> {
    if args.no_classify {
        return Ok(None);
    }
    let classifier = contract_check::BertClassifier::load(&args.model)?;
    Ok(Some(Box::new(classifier)))
}

#[cfg(not(feature = "bert"))]
fn load_classifier(args: &CheckArgs) -> contract_check::Result<Option<Box<dyn TextClassifier>>> {
    if !args.no_classify {
        log::warn!(
            "Built without the bert feature; skipping classification ({})",
            args.model.display()
        );
    }
    Ok(None)
}

fn print_summary(report: &CheckReport) {
    let failed = report.rules.failed();
    println!();
    if failed.is_empty() {
        println!("{}", "All applicable rules passed".green().bold());
    } else {
        let keys: Vec<&str> = failed.iter().map(|id| id.key()).collect();
        println!(
            "{} {}",
            format!("{} rule(s) failed:", failed.len()).red().bold(),
            keys.join(", ")
        );
    }
}

fn cmd_text(
    input: &Path,
    raw: bool,
    output: Option<&Path>,
    ocr: &OcrArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = spinner("Extracting text...");
    let document = extract_document(input, &ocr.extract_options());
    pb.finish_and_clear();
    let document = document?;

    let text = if raw {
        document.text
    } else {
        Normalizer::default().normalize(&document.text)
    };

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {} ({})", "Saved to".green(), path.display(), document.format);
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_rules() {
    println!("{}", "Rule Checklist".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for rule in CHECKLIST {
        println!("{} {}", format!("{:<20}", rule.id.key()).bold(), rule.description);
    }
}

fn cmd_version() {
    println!(
        "{} {}",
        "contract-check".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Contract compliance checker");
    println!();
    println!(
        "Classifier: {}",
        if cfg!(feature = "bert") {
            "BERT (candle)"
        } else {
            "disabled"
        }
    );
}
