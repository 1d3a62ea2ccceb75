use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tabload_api::{InsertSql, KindRegistry};
use tabload_engine::{BatchLoader, LoadConfig, ParseErrorSet};
use tabload_format_csv::{DelimitedParser, Dialect};
use tabload_storage_sqlite::SqliteConnection;

use crate::config::Cli;
use crate::error::CliError;

/// Read the configuration, then load on a blocking task until it ends or
/// Ctrl+C arrives.
pub async fn run(cli: &Cli) -> Result<u64, CliError> {
    let mut config = LoadConfig::load(&cli.config)?;
    cli.apply(&mut config);
    tracing::info!(config = %cli.config.display(), table = %config.table, "loaded config");

    let task = tokio::task::spawn_blocking(move || load_blocking(&config));
    tokio::select! {
        joined = task => joined?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::warn!("interrupted, abandoning load");
            Err(CliError::Interrupted)
        }
    }
}

pub fn load_blocking(config: &LoadConfig) -> Result<u64, CliError> {
    let schema = config.schema(&KindRegistry::default())?;
    let dialect: Dialect = match &config.csv {
        Some(options) => options.clone().try_into()?,
        None => Dialect::default(),
    };
    let parser = DelimitedParser::new(schema, dialect);

    let mut loader = BatchLoader::with_chunk_size(config.chunk_size()?);
    if config.quote_identifiers {
        loader = loader.with_builder(InsertSql::quoted());
    }

    let conn = rusqlite::Connection::open(&config.database).map_err(|source| CliError::Open {
        path: config.database.clone(),
        source,
    })?;
    let source = open_source(config.source.as_deref())?;

    if !config.atomic {
        return Ok(loader.load(&SqliteConnection::new(&conn), &config.table, &parser, source)?);
    }

    let tx = conn.unchecked_transaction().map_err(CliError::Transaction)?;
    let result = loader.load(&SqliteConnection::new(&tx), &config.table, &parser, source);
    match result {
        Ok(inserted) => {
            tx.commit().map_err(CliError::Transaction)?;
            Ok(inserted)
        }
        Err(e) => {
            match tx.rollback() {
                Ok(()) => tracing::warn!(table = %config.table, "transaction rolled back"),
                Err(re) => tracing::error!(error = %re, "rollback failed"),
            }
            Err(e.into())
        }
    }
}

fn open_source(path: Option<&Path>) -> Result<Box<dyn BufRead>, CliError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Source { path: path.to_path_buf(), source })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Print every rejected row, in input order.
pub fn report(errors: &ParseErrorSet, json: bool) {
    for e in errors {
        if json {
            let line = serde_json::json!({
                "row": e.row(),
                "column": e.column(),
                "raw": e.raw(),
                "reason": e.reason(),
                "error": e.error().to_string(),
            });
            println!("{line}");
        } else {
            eprintln!("{e}");
        }
    }
}
