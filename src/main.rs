use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use core_utilities::data::{loader, sqlite};
use core_utilities::{os, KeywordFile, KeywordOptions, Table};

#[derive(Parser)]
#[command(name = "core-utils", version, about = "Read keyword files, count text and dump tabular data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value following KEYWORDS in a keyword file
    Keyword {
        file: PathBuf,
        keywords: String,
        #[arg(long = "as", value_enum, default_value_t = ValueKind::Sentence)]
        kind: ValueKind,
        /// Treat `#` tokens as part of the value
        #[arg(long)]
        keep_comments: bool,
        #[arg(long, default_value_t = '#')]
        comment_marker: char,
    },
    /// Print line, word and byte counts of a file
    Count { file: PathBuf },
    /// List a directory, optionally filtered by extension
    List {
        dir: PathBuf,
        #[arg(long)]
        extension: Option<String>,
    },
    /// Print selected columns of a .csv or .parquet file
    Columns {
        file: PathBuf,
        #[arg(required = true)]
        headers: Vec<String>,
        /// Print the table as JSON instead of tab-separated rows
        #[arg(long)]
        json: bool,
    },
    /// Run a read-only SQL query against a SQLite database
    Query {
        db: PathBuf,
        sql: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    Sentence,
    String,
    Double,
    Float,
    Integer,
    StringList,
    DoubleList,
    FloatList,
    IntegerList,
}

fn join<T: ToString>(values: &[T], sep: &str) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

fn read_keyword(doc: &KeywordFile, keywords: &str, kind: ValueKind) -> core_utilities::Result<String> {
    Ok(match kind {
        ValueKind::Sentence => doc.read_sentence(keywords)?,
        ValueKind::String => doc.read_string(keywords)?,
        ValueKind::Double => doc.read_double(keywords)?.to_string(),
        ValueKind::Float => doc.read_float(keywords)?.to_string(),
        ValueKind::Integer => doc.read_integer(keywords)?.to_string(),
        ValueKind::StringList => join(&doc.read_string_list(keywords)?, " "),
        ValueKind::DoubleList => join(&doc.read_double_list(keywords)?, " "),
        ValueKind::FloatList => join(&doc.read_float_list(keywords)?, " "),
        ValueKind::IntegerList => join(&doc.read_integer_list(keywords)?, " "),
    })
}

fn print_table(table: &Table, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table).context("serialising table")?);
        return Ok(());
    }
    println!("{}", table.column_names().join("\t"));
    for i in 0..table.len() {
        if let Some(row) = table.row(i) {
            println!("{}", join(&row, "\t"));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Keyword {
            file,
            keywords,
            kind,
            keep_comments,
            comment_marker,
        } => {
            let options = KeywordOptions {
                strip_comments: !keep_comments,
                comment_marker,
            };
            let doc = KeywordFile::with_options(&file, options)?;
            let value = read_keyword(&doc, &keywords, kind)
                .with_context(|| format!("reading '{keywords}'"))?;
            println!("{value}");
        }
        Command::Count { file } => {
            let lines = os::file_line_count(&file)?;
            let words = os::file_word_count(&file)?;
            let bytes = os::file_size(&file)?;
            println!("{lines} {words} {bytes} {}", file.display());
        }
        Command::List { dir, extension } => {
            for name in os::list_contents(&dir, extension.as_deref())? {
                println!("{name}");
            }
        }
        Command::Columns { file, headers, json } => {
            let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
            let table = loader::read_table(&file, &headers)
                .with_context(|| format!("loading {}", file.display()))?;
            print_table(&table, json)?;
        }
        Command::Query { db, sql, json } => {
            let table = sqlite::query_sqlite(&db, &sql, [])
                .with_context(|| format!("querying {}", db.display()))?;
            print_table(&table, json)?;
        }
    }

    Ok(())
}
