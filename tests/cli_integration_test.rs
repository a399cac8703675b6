//! CLI helper integration tests: config loading from real INI files on disk
//! and report rendering over the full aggregation pipeline.

mod common;

use b3margin::adapters::sqlite_store_adapter::SqliteStoreAdapter;
use b3margin::cli;
use b3margin::domain::aggregate;
use b3margin::domain::instrument::{InstrumentRules, OptionSide};
use b3margin::ports::config_port::ConfigPort;
use b3margin::ports::store_port::MarginStorePort;
use common::*;

const VALID_INI: &str = r#"
[sqlite]
path = margem.db

[export]
path = margem.csv

[document]
url = https://example.com/margens
currency_marker = R$

[instrument]
root_len = 4
call_letters = A-L
put_letters = M-X

[oplab]
base_url = https://api.oplab.com.br/v3/market
access_token = test-token
irate = 15
"#;

#[test]
fn load_config_reads_ini_from_disk() {
    let file = write_temp_file(VALID_INI);
    let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();

    assert_eq!(config.get_string("sqlite", "path"), Some("margem.db".into()));
    assert_eq!(
        config.get_string("document", "url"),
        Some("https://example.com/margens".into())
    );
    assert_eq!(
        config.get_string("oplab", "access_token"),
        Some("test-token".into())
    );
}

#[test]
fn load_config_without_path_uses_defaults() {
    let config = cli::load_config(None).unwrap();
    assert_eq!(config.get_string("sqlite", "path"), None);
    assert_eq!(
        config.get_string_or("document", "currency_marker", "R$"),
        "R$"
    );
}

#[test]
fn load_config_missing_file_is_an_error() {
    let path = std::path::PathBuf::from("/nonexistent/b3margin.ini");
    assert!(cli::load_config(Some(&path)).is_err());
}

#[test]
fn instrument_rules_from_ini_file() {
    let file = write_temp_file(VALID_INI);
    let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();
    let rules = InstrumentRules::from_config(&config);

    assert_eq!(rules.classify("PETRB120"), Some(OptionSide::Call));
    assert_eq!(rules.classify("PETRN120"), Some(OptionSide::Put));
    assert_eq!(rules.classify("PETR4"), None);
}

#[test]
fn margin_report_over_full_pipeline() {
    let store = SqliteStoreAdapter::in_memory().unwrap();
    store
        .replace_all(&[record("PETR4", "0,10"), record("PETRB120", "1.500,00")])
        .unwrap();

    let result = aggregate::aggregate(
        "100;PETR4 # long stock\n-5;PETRB120\nten;VALE3\n",
        &store,
        &InstrumentRules::default(),
    )
    .unwrap();
    let rendered = cli::render_margin_report(&result);

    assert!(rendered.contains("Total margin     R$      -7.490,00"));
    assert!(rendered.contains("Calls subtotal   R$      -7.500,00"));
    assert!(rendered.contains("Puts subtotal    R$           0,00"));
    // The malformed line is reported out-of-band, not in the table.
    assert!(!rendered.contains("VALE3"));
    assert_eq!(result.skipped.len(), 1);
}

#[test]
fn warning_row_renders_flag_over_pipeline() {
    let store = SqliteStoreAdapter::in_memory().unwrap();
    store.replace_all(&[record("PETR4", "0,10")]).unwrap();

    let result = aggregate::aggregate(
        "10;PETRB999\n",
        &store,
        &InstrumentRules::default(),
    )
    .unwrap();
    let rendered = cli::render_margin_report(&result);

    assert!(rendered.contains("PETRB999"));
    assert!(rendered.contains("[margin not found]"));
}
