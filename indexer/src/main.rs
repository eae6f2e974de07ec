use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ftsearch::{AutocompleteSuggestion, DocumentAdapter, JsonAdapter, Pipeline, SearchEngine, SearchQuery, SearchResult};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

mod load;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index JSON documents in memory and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    input: String,
    /// Integer field holding the document id
    #[arg(long, default_value = "id")]
    id_field: String,
    /// Fields to leave out of the index
    #[arg(long)]
    ignore: Vec<String>,
    /// Index literal words instead of stems
    #[arg(long, default_value_t = false)]
    no_stem: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents matching a query
    Search {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        /// Only match these fields (comma-separated)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
    /// Suggest indexed tokens starting with a prefix
    Autocomplete {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
    /// Print document and token counts
    Stats {
        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    total_hits: usize,
    results: Vec<SearchResult>,
}

#[derive(Serialize)]
struct AutocompleteOutput {
    query: String,
    suggestions: Vec<AutocompleteSuggestion>,
}

#[derive(Serialize)]
struct StatsOutput {
    size: usize,
    token_count: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Search { index, query, fields, k } => {
            let fts = build_index(&index)?;
            let mut q = SearchQuery::new(query.clone());
            if let Some(fields) = fields {
                q = q.select(fields);
            }
            let mut results = fts.search(q)?;
            let total_hits = results.len();
            results.truncate(k);
            serde_json::to_string_pretty(&SearchOutput { query, total_hits, results })?
        }
        Commands::Autocomplete { index, query, k } => {
            let fts = build_index(&index)?;
            let mut suggestions = fts.autocomplete(&query);
            suggestions.truncate(k);
            serde_json::to_string_pretty(&AutocompleteOutput { query, suggestions })?
        }
        Commands::Stats { index } => {
            let fts = build_index(&index)?;
            serde_json::to_string_pretty(&StatsOutput { size: fts.size(), token_count: fts.token_count() })?
        }
    };
    println!("{output}");
    Ok(())
}

fn build_index(args: &IndexArgs) -> Result<SearchEngine<JsonAdapter>> {
    let adapter = args
        .ignore
        .iter()
        .fold(JsonAdapter::new(args.id_field.clone()), |adapter, field| adapter.ignore(field.clone()));
    let pipeline = if args.no_stem { Pipeline::literal() } else { Pipeline::standard() };
    let mut fts = SearchEngine::new(adapter, pipeline);

    let mut skipped = 0usize;
    for file in load::input_files(Path::new(&args.input)) {
        for doc in load::read_documents(&file)? {
            let doc_id = fts.adapter().doc_id(&doc).with_context(|| format!("reading document id in {}", file.display()))?;
            if fts.contains(doc_id) {
                tracing::warn!(doc_id, file = %file.display(), "duplicate document id, skipping");
                skipped += 1;
                continue;
            }
            fts.add(&doc).with_context(|| format!("indexing document {doc_id} from {}", file.display()))?;
        }
    }

    tracing::info!(num_docs = fts.size(), num_tokens = fts.token_count(), skipped, "ingested documents");
    Ok(fts)
}
