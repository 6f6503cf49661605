//! biasguard CLI
//!
//! Screens interview feedback for biased language and manages the term library.
//!
//! ```bash
//! # Analyse text, or pipe it in
//! biasguard analyze "Great energy, very young team player"
//! cat feedback.txt | biasguard --db bias.duckdb analyze --save interview_feedback:42
//!
//! # Manage a persistent library
//! biasguard --db bias.duckdb seed
//! biasguard --db bias.duckdb import terms.json
//! biasguard --db bias.duckdb deactivate 12
//! ```
//!
//! `analyze` exits 0 for clean text, 1 for warnings only, 2 when blocking terms
//! were found. Errors exit 3.

mod display;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use biasguard_core::config::DEFAULT_TERM_CACHE_TTL_SECS;
use biasguard_core::{
    AnalysisResult, BiasDetector, BiasTerm, DetectorConfig, SaveGate, SubjectRef, default_terms,
};
use biasguard_store::{DuckStore, MemoryStore, read_terms_file};

#[derive(Parser)]
#[command(name = "biasguard", version)]
#[command(about = "Detect biased language in interview feedback", long_about = None)]
struct Cli {
    /// Persistent DuckDB store. Without it the library is held in memory.
    #[arg(long, env = "BIASGUARD_DB", global = true)]
    db: Option<PathBuf>,

    /// JSON term library to use instead of the built-in one (in-memory mode only).
    #[arg(long, env = "BIASGUARD_TERMS", global = true)]
    terms: Option<PathBuf>,

    /// Seconds a loaded term library is reused before reloading.
    #[arg(long, env = "BIASGUARD_CACHE_TTL", global = true, default_value_t = DEFAULT_TERM_CACHE_TTL_SECS)]
    cache_ttl: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse feedback text
    Analyze {
        /// Text to analyse (reads stdin if not provided)
        text: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Save the result against a subject, e.g. interview_feedback:42
        #[arg(long, value_name = "TYPE:ID")]
        save: Option<SubjectRef>,

        /// Record that the author acknowledged the warnings
        #[arg(long, requires = "save")]
        acknowledge: bool,
    },

    /// List every term in the library
    Terms {
        #[arg(long)]
        json: bool,
    },

    /// Import terms from a JSON file (requires --db)
    Import { file: PathBuf },

    /// Load the built-in library (requires --db)
    Seed,

    /// Deactivate a term by id (requires --db)
    Deactivate { id: i64 },

    /// Show the saved analysis for a subject
    Show {
        #[arg(value_name = "TYPE:ID")]
        subject: SubjectRef,

        #[arg(long)]
        json: bool,
    },
}

/// The configured store plus a detector over it.
struct App {
    backend: Backend,
    detector: BiasDetector,
}

enum Backend {
    Duck(Arc<DuckStore>),
    Memory(Arc<MemoryStore>),
}

impl App {
    fn open(cli: &Cli) -> Result<Self> {
        let config = DetectorConfig {
            term_cache_ttl_secs: cli.cache_ttl,
        };

        let (backend, detector) = if let Some(path) = &cli.db {
            if cli.terms.is_some() {
                warn!("--terms is ignored when --db is set");
            }
            let store = Arc::new(
                DuckStore::open_persistent(path)
                    .with_context(|| format!("failed to open store at {}", path.display()))?,
            );
            let detector = BiasDetector::new(store.clone(), store.clone(), &config);
            (Backend::Duck(store), detector)
        } else {
            let terms = match &cli.terms {
                Some(path) => read_terms_file(path)
                    .with_context(|| format!("failed to load terms from {}", path.display()))?,
                None => default_terms(),
            };
            let store = Arc::new(MemoryStore::with_terms(terms));
            let detector = BiasDetector::new(store.clone(), store.clone(), &config);
            (Backend::Memory(store), detector)
        };

        Ok(Self { backend, detector })
    }

    fn duck(&self, command: &str) -> Result<&DuckStore> {
        match &self.backend {
            Backend::Duck(store) => Ok(store),
            Backend::Memory(_) => bail!("`{command}` needs a persistent store; pass --db"),
        }
    }

    fn all_terms(&self) -> Result<Vec<BiasTerm>> {
        Ok(match &self.backend {
            Backend::Duck(store) => store.all_terms()?,
            Backend::Memory(store) => store.all_terms()?,
        })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let app = App::open(&cli)?;

    match cli.command {
        Commands::Analyze {
            text,
            json,
            save,
            acknowledge,
        } => analyze(&app, text, json, save, acknowledge),
        Commands::Terms { json } => {
            let terms = app.all_terms()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&terms)?);
            } else {
                display::print_terms(&terms);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Import { file } => {
            let store = app.duck("import")?;
            let terms = read_terms_file(&file)
                .with_context(|| format!("failed to load terms from {}", file.display()))?;
            let count = store.import_terms(&terms)?;
            app.detector.invalidate_terms();
            println!("imported {count} term(s)");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Seed => {
            let store = app.duck("seed")?;
            let count = store.import_terms(&default_terms())?;
            app.detector.invalidate_terms();
            println!("seeded {count} built-in term(s)");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Deactivate { id } => {
            app.duck("deactivate")?.deactivate_term(id)?;
            app.detector.invalidate_terms();
            println!("deactivated term {id}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { subject, json } => {
            let Some(stored) = app.detector.get_analysis(&subject)? else {
                bail!("no saved analysis for {subject}");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&stored)?);
            } else {
                display::print_stored(&stored);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn analyze(
    app: &App,
    text: Option<String>,
    json: bool,
    save: Option<SubjectRef>,
    acknowledge: bool,
) -> Result<ExitCode> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read from stdin")?;
            buffer
        }
    };

    let result = app.detector.analyze(&text)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display::print_analysis(&result);
    }

    if let Some(subject) = save {
        let saved_with_warnings = match result.gate() {
            SaveGate::Blocked => bail!(
                "refusing to save {subject}: {} blocking term(s) must be removed first",
                result.blocking_flags
            ),
            SaveGate::RequiresAcknowledgement => true,
            SaveGate::Allowed => false,
        };
        if matches!(app.backend, Backend::Memory(_)) {
            warn!("saving to the in-memory store; the analysis is lost on exit");
        }
        app.detector
            .save_result(&subject, &result, saved_with_warnings, acknowledge)?;
        info!(subject = %subject, "analysis saved");
    }

    Ok(ExitCode::from(exit_status(&result)))
}

fn exit_status(result: &AnalysisResult) -> u8 {
    match result.gate() {
        SaveGate::Allowed => 0,
        SaveGate::RequiresAcknowledgement => 1,
        SaveGate::Blocked => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_analyze_with_save() {
        let cli = Cli::try_parse_from([
            "biasguard",
            "analyze",
            "some text",
            "--save",
            "interview_feedback:42",
            "--acknowledge",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                text,
                save,
                acknowledge,
                json,
            } => {
                assert_eq!(text.as_deref(), Some("some text"));
                assert_eq!(save, Some(SubjectRef::new("interview_feedback", 42)));
                assert!(acknowledge);
                assert!(!json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn malformed_subject_is_rejected() {
        assert!(Cli::try_parse_from(["biasguard", "show", "interview_feedback"]).is_err());
        assert!(Cli::try_parse_from(["biasguard", "show", "interview_feedback:abc"]).is_err());
    }

    #[test]
    fn acknowledge_requires_save() {
        assert!(Cli::try_parse_from(["biasguard", "analyze", "text", "--acknowledge"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["biasguard", "terms", "--cache-ttl", "5", "--db", "x.duckdb"])
                .unwrap();
        assert_eq!(cli.cache_ttl, 5);
        assert_eq!(cli.db, Some(PathBuf::from("x.duckdb")));
    }

    #[test]
    fn memory_backend_rejects_admin_commands() {
        let cli = Cli::try_parse_from(["biasguard", "seed"]).unwrap();
        let app = App {
            backend: Backend::Memory(Arc::new(MemoryStore::with_terms(default_terms()))),
            detector: {
                let store = Arc::new(MemoryStore::new());
                BiasDetector::new(store.clone(), store, &DetectorConfig::default())
            },
        };
        assert!(matches!(cli.command, Commands::Seed));
        assert!(app.duck("seed").is_err());
        assert!(!app.all_terms().unwrap().is_empty());
    }

    #[test]
    fn exit_codes_follow_gate() {
        let mut result = AnalysisResult::empty();
        assert_eq!(exit_status(&result), 0);
        result.warning_flags = 1;
        assert_eq!(exit_status(&result), 1);
        result.blocking_flags = 1;
        assert_eq!(exit_status(&result), 2);
    }
}
