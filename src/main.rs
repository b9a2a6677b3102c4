use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use caseflow_assistant::{
    assistant::{claim_lister_for, Assistant},
    config::Config,
    qa::HttpQaClient,
    records::{RecordStore, SqliteRecordStore},
    search::{LexicalIndex, SimilarityIndex},
    state::{Mode, WorkflowState},
};

/// Mode-routed case and claim assistant.
#[derive(Parser, Debug)]
#[command(name = "caseflow-assistant", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run a single question through the workflow and print the answer
    Ask {
        /// Mode to run in: chat, similarity, or qc
        #[arg(long, default_value = "chat")]
        mode: Mode,

        /// The question, identifier, or text query to process
        question: String,
    },

    /// Start an interactive session (the default)
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Caseflow assistant starting..."
    );

    // Initialize record storage
    let store: Arc<dyn RecordStore> = match SqliteRecordStore::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            Arc::new(s)
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };

    // Build the similarity index over the stored records
    let index: Arc<dyn SimilarityIndex> = match LexicalIndex::from_store(store.as_ref()).await {
        Ok(i) => {
            info!(
                cases = i.case_count(),
                claims = i.claim_count(),
                "Similarity index built"
            );
            Arc::new(i)
        }
        Err(e) => {
            error!(error = %e, "Failed to build similarity index");
            return Err(e.into());
        }
    };

    // Initialize the QA client
    let engine = match HttpQaClient::new(&config.qa, config.request.clone()) {
        Ok(c) => {
            info!(base_url = %config.qa.base_url, "QA client initialized");
            Arc::new(c)
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize QA client");
            return Err(e.into());
        }
    };

    let claims = claim_lister_for(config.qc.claim_source, Arc::clone(&store));

    let assistant = match Assistant::new(store, index, engine, claims, &config) {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "Failed to assemble workflow graph");
            return Err(e.into());
        }
    };

    match cli.command {
        Some(Commands::Ask { mode, question }) => {
            let state = assistant.run_workflow(&question, mode).await;
            println!("{}", render_answer(&state));
        }
        Some(Commands::Repl) | None => run_repl(&assistant).await?,
    }

    Ok(())
}

const REPL_HELP: &str = "\
Commands:
  :mode chat|similarity|qc   switch the active mode
  :help                      show this help
  :quit                      exit
Anything else is sent to the assistant in the active mode.";

/// Interactive loop. Questions are refused until a mode is set.
async fn run_repl(assistant: &Assistant) -> anyhow::Result<()> {
    println!("Caseflow assistant. Set a mode with :mode chat|similarity|qc, then ask away.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut mode: Option<Mode> = None;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            println!("Please enter a question.");
            continue;
        }

        if let Some(command) = input.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match parts.next() {
                Some("mode") => match parts.next() {
                    Some(raw) => match raw.parse::<Mode>() {
                        Ok(m) => {
                            mode = Some(m);
                            println!("Mode set to {}.", m);
                        }
                        Err(e) => println!("{}", e),
                    },
                    None => println!("Usage: :mode chat|similarity|qc"),
                },
                Some("help") => println!("{}", REPL_HELP),
                Some("quit") | Some("exit") => break,
                _ => println!("Unknown command; :help lists the available ones."),
            }
            continue;
        }

        let Some(mode) = mode else {
            println!("No mode set. Use :mode chat|similarity|qc first.");
            continue;
        };

        let state = assistant.run_workflow(input, mode).await;
        println!("{}", render_answer(&state));
    }

    Ok(())
}

/// Render the final state for the terminal. Similarity tables get a heading
/// so they stand apart from plain one-line answers.
fn render_answer(state: &WorkflowState) -> String {
    if state.mode == Mode::Similarity && !state.retrieved_results().is_empty() {
        format!("### Similar records\n\n{}", state.answer_text())
    } else {
        state.answer_text().to_string()
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        caseflow_assistant::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        caseflow_assistant::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
