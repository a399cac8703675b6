//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_export_adapter::{CsvExportAdapter, DEFAULT_EXPORT_PATH};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::http_document_adapter::{DEFAULT_DOCUMENT_URL, HttpDocumentAdapter};
use crate::adapters::oplab_adapter::OplabAdapter;
use crate::adapters::sqlite_store_adapter::SqliteStoreAdapter;
use crate::domain::aggregate::{self, AggregationResult};
use crate::domain::delta::{self, DeltaReport};
use crate::domain::error::B3MarginError;
use crate::domain::extract::Extractor;
use crate::domain::instrument::InstrumentRules;
use crate::domain::money::format_brl;
use crate::ports::config_port::ConfigPort;
use crate::ports::document_port::DocumentPort;
use crate::ports::store_port::MarginStorePort;

#[derive(Parser, Debug)]
#[command(name = "b3margin", about = "B3 options margin tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the margin table and rebuild the store and CSV export
    Fetch {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the document URL
        #[arg(long)]
        url: Option<String>,
        /// Read the document from a local text file instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Compute the margin commitment of a position file
    Margin {
        position_file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compute the aggregate delta of a position file
    Delta {
        position_file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Fetch { config, url, file } => run_fetch(config.as_ref(), url, file),
        Command::Margin {
            position_file,
            config,
        } => run_margin(&position_file, config.as_ref()),
        Command::Delta {
            position_file,
            config,
        } => run_delta(&position_file, config.as_ref()),
    }
}

/// Load the INI config, or built-in defaults when no path is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => FileConfigAdapter::from_file(p).map_err(|e| {
            let err = B3MarginError::ConfigParse {
                file: p.display().to_string(),
                reason: e.to_string(),
            };
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }),
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn open_store(config: &dyn ConfigPort) -> Result<SqliteStoreAdapter, ExitCode> {
    SqliteStoreAdapter::from_config(config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn read_position_file(path: &PathBuf) -> Result<String, ExitCode> {
    fs::read_to_string(path).map_err(|e| {
        let err = B3MarginError::PositionFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_fetch(
    config_path: Option<&PathBuf>,
    url_override: Option<String>,
    file_override: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 1: obtain the document text.
    let text = if let Some(file) = file_override {
        eprintln!("Reading margin table from {}", file.display());
        match fs::read_to_string(&file) {
            Ok(t) => t,
            Err(e) => {
                let err = B3MarginError::DocumentFetch {
                    url: file.display().to_string(),
                    reason: e.to_string(),
                };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
        }
    } else {
        let url = url_override
            .unwrap_or_else(|| config.get_string_or("document", "url", DEFAULT_DOCUMENT_URL));
        eprintln!("Fetching margin table from {url}");
        let http = match HttpDocumentAdapter::new() {
            Ok(h) => h,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        };
        match http.fetch_text(&url) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        }
    };

    // Stage 2: extract records.
    let marker = config.get_string_or("document", "currency_marker", "R$");
    let records = Extractor::new(&marker).extract(&text);
    if records.is_empty() {
        eprintln!("warning: no margin records found in document; store left unchanged");
        return ExitCode::SUCCESS;
    }
    eprintln!("{} records extracted", records.len());

    // Stage 3: replace the store snapshot.
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Err(e) = store.replace_all(&records) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }

    // Stage 4: mirror the snapshot to the flat export.
    let export_path = config.get_string_or("export", "path", DEFAULT_EXPORT_PATH);
    if let Err(e) = CsvExportAdapter::new(&export_path).write(&records) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }

    eprintln!("Margin store and {export_path} updated");
    ExitCode::SUCCESS
}

fn run_margin(position_file: &PathBuf, config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let positions_text = match read_position_file(position_file) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let rules = InstrumentRules::from_config(&config);
    let result = match aggregate::aggregate(&positions_text, &store, &rules) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    if let Ok(Some(stamp)) = store.last_updated() {
        eprintln!("Margin snapshot from {}", stamp.to_rfc3339());
    }
    for skip in &result.skipped {
        eprintln!(
            "warning: line {} skipped '{}' ({})",
            skip.line_number, skip.content, skip.reason
        );
    }

    print!("{}", render_margin_report(&result));
    ExitCode::SUCCESS
}

fn run_delta(position_file: &PathBuf, config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let positions_text = match read_position_file(position_file) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let market_data = match OplabAdapter::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let report = delta::aggregate_delta(&positions_text, &market_data);
    for (line_number, reason) in &report.skipped {
        eprintln!("warning: line {line_number} skipped ({reason})");
    }

    print!("{}", render_delta_report(&report));
    ExitCode::SUCCESS
}

/// Render the margin audit rows, the call/put subtotal block, and the total.
pub fn render_margin_report(result: &AggregationResult) -> String {
    let mut out = String::from("Margin breakdown\n");
    for line in &result.lines {
        let note = if line.margin_missing {
            "  [margin not found]"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {:<12} {:>8}  unit R$ {:>12}  line R$ {:>14}{}\n",
            line.symbol,
            line.quantity,
            format_brl(line.unit_margin),
            format_brl(line.line_margin),
            note,
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(62)));
    out.push_str(&format!(
        "Calls subtotal   R$ {:>14}\n",
        format_brl(result.call_subtotal)
    ));
    out.push_str(&format!(
        "Puts subtotal    R$ {:>14}\n",
        format_brl(result.put_subtotal)
    ));
    out.push_str(&format!("{}\n", "-".repeat(62)));
    out.push_str(&format!(
        "Total margin     R$ {:>14}\n",
        format_brl(result.total)
    ));
    out
}

/// Render the per-position delta rows and the portfolio total.
pub fn render_delta_report(report: &DeltaReport) -> String {
    let mut out = String::from("Delta breakdown\n");
    for line in &report.lines {
        let quote = match &line.quote {
            Some(q) => format!(
                "  (price {:.2}, strike {:.2}, vol {:.2}%)",
                q.price, q.strike, q.volatility
            ),
            None => String::new(),
        };
        out.push_str(&format!(
            "  {:<12} {:>8}  delta {:>8.4}  position {:>12.2}{}\n",
            line.symbol, line.quantity, line.delta, line.position_delta, quote,
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(62)));
    out.push_str(&format!("Total delta: {:.2}\n", report.total_delta));
    out
}
