use std::path::PathBuf;

use clap::Parser;

use tabload_engine::LoadConfig;

#[derive(Parser, Debug)]
#[command(name = "tabload", about = "Load delimited text into a SQLite table")]
pub struct Cli {
    /// Path to TOML load description.
    #[arg(long, default_value = "load.toml", env = "TABLOAD_CONFIG")]
    pub config: PathBuf,

    /// Rows per executed batch.
    #[arg(long, allow_hyphen_values = true)]
    pub chunk_size: Option<i64>,

    /// Input file; `-` reads stdin.
    #[arg(long)]
    pub source: Option<PathBuf>,

    #[arg(long)]
    pub table: Option<String>,

    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Report rejected rows as JSON lines on stdout.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Command-line values win over the file.
    pub fn apply(&self, config: &mut LoadConfig) {
        if let Some(size) = self.chunk_size {
            config.chunk_size = Some(size);
        }
        if let Some(source) = &self.source {
            config.source = (source.as_os_str() != "-").then(|| source.clone());
        }
        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "database = \"a.db\"\ntable = \"t\"\nsource = \"in.csv\"\nchunk_size = 10\ncolumns = []\n";

    #[test]
    fn flags_override_file() {
        let cli = Cli::try_parse_from([
            "tabload", "--config", "x.toml", "--chunk-size", "-1", "--table", "other", "--source", "-",
        ])
        .unwrap();
        let mut config = LoadConfig::parse(FILE).unwrap();
        cli.apply(&mut config);

        assert_eq!(config.chunk_size, Some(-1));
        assert_eq!(config.table, "other");
        assert!(config.source.is_none());
        assert_eq!(config.database, PathBuf::from("a.db"));
    }

    #[test]
    fn file_values_kept_without_flags() {
        let cli = Cli::try_parse_from(["tabload", "--config", "x.toml"]).unwrap();
        let mut config = LoadConfig::parse(FILE).unwrap();
        cli.apply(&mut config);

        assert_eq!(config.chunk_size, Some(10));
        assert_eq!(config.source, Some(PathBuf::from("in.csv")));
        assert!(!cli.json);
    }
}
