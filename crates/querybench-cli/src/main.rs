//! querybench CLI: terminal workbench for a natural-language-to-SQL assistant

use clap::{ArgAction, Parser, Subcommand};
use querybench_engine::{
    evaluate, Config, EvalError, EvalOptions, EvalReport, HistoryStore, UpdateEvent,
};
use std::path::Path;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// SQL assistant workbench with TUI
#[derive(Parser)]
#[command(name = "querybench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (the default when no command is given)
    Tui,

    /// Initialize the .querybench directory and config
    Init,

    /// Check the assistant command and configured paths
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the assistant against the ground-truth corpus
    Eval {
        /// Evaluate at most this many cases
        #[arg(long)]
        limit: Option<usize>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved conversation threads
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

const DATA_DIR: &str = ".querybench";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        None | Some(Commands::Tui) => cmd_tui(),
        Some(Commands::Init) => cmd_init(),
        Some(Commands::Doctor { json }) => cmd_doctor(json),
        Some(Commands::Eval { limit, json }) => cmd_eval(limit, json),
        Some(Commands::History { json }) => cmd_history(json),
    }
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("tokio runtime")
}

/// Print the error and exit nonzero.
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn cmd_tui() {
    let workspace = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => fail(format_args!("cannot determine working directory: {e}")),
    };
    if let Err(e) = runtime().block_on(querybench_tui::run_tui(&workspace)) {
        fail(e);
    }
}

fn cmd_init() {
    let data_dir = Path::new(DATA_DIR);

    if let Err(e) = std::fs::create_dir_all(data_dir.join("history")) {
        fail(format_args!("cannot create {}: {e}", data_dir.display()));
    }

    let config_path = data_dir.join("config.json");
    let config = if config_path.exists() {
        println!("Keeping existing config at {}", config_path.display());
        match Config::load(&config_path) {
            Ok(c) => c,
            Err(e) => fail(e),
        }
    } else {
        let config = Config::default();
        match config.save(&config_path) {
            Ok(()) => println!("Wrote {}", config_path.display()),
            Err(e) => fail(e),
        }
        config
    };

    // Starter corpus so `querybench eval` has something to run against
    let ground_truth = &config.evaluation.ground_truth_path;
    if !ground_truth.exists() {
        let template = "User Input|Ground Truth SQL\n\
                        How many users are there?|SELECT COUNT(*) FROM users\n";
        if let Err(e) = std::fs::write(ground_truth, template) {
            fail(format_args!("cannot write ground truth template: {e}"));
        }
        println!("Wrote {}", ground_truth.display());
    }

    match config.assistant.resolve_command() {
        Some(path) => println!(
            "Assistant '{}' found at {}",
            config.assistant.name,
            path.display()
        ),
        None => println!(
            "Warning: assistant '{}' not found on PATH",
            config.assistant.name
        ),
    }

    println!("\nWorkspace initialized.");
    println!("Edit {} to point at your corpus and schema", config_path.display());
}

fn cmd_doctor(json: bool) {
    let config_path = Path::new(DATA_DIR).join("config.json");
    let config_exists = config_path.exists();
    let config = Config::load(&config_path).unwrap_or_default();

    let assistant_path = config.assistant.resolve_command();
    let ground_truth_exists = config.evaluation.ground_truth_path.exists();
    let schema_exists = config.schema_path.as_ref().map(|p| p.exists());

    if json {
        let output = serde_json::json!({
            "config_exists": config_exists,
            "assistant": config.assistant.name,
            "assistant_path": assistant_path.as_ref().map(|p| p.display().to_string()),
            "ground_truth_path": config.evaluation.ground_truth_path.display().to_string(),
            "ground_truth_exists": ground_truth_exists,
            "schema_exists": schema_exists,
        });
        println!("{}", serde_json::to_string_pretty(&output).expect("doctor JSON"));
        return;
    }

    println!("querybench doctor\n");

    if config_exists {
        println!("  config - found at {}", config_path.display());
    } else {
        println!("  config - not found (using defaults, run `querybench init`)");
    }

    match &assistant_path {
        Some(path) => println!(
            "  assistant '{}' - ready ({})",
            config.assistant.name,
            path.display()
        ),
        None => println!("  assistant '{}' - not found on PATH", config.assistant.name),
    }

    if ground_truth_exists {
        println!(
            "  ground truth - found at {}",
            config.evaluation.ground_truth_path.display()
        );
    } else {
        println!(
            "  ground truth - missing ({})",
            config.evaluation.ground_truth_path.display()
        );
    }

    match (&config.schema_path, schema_exists) {
        (Some(path), Some(true)) => println!("  schema - found at {}", path.display()),
        (Some(path), _) => println!("  schema - configured but missing ({})", path.display()),
        (None, _) => println!("  schema - not configured"),
    }

    let ready = assistant_path.is_some() && ground_truth_exists;
    println!("\n{}", if ready { "Ready to evaluate" } else { "Not ready" });
}

fn cmd_eval(limit: Option<usize>, json: bool) {
    let config_path = Path::new(DATA_DIR).join("config.json");
    if !config_path.exists() {
        fail("config.json not found; run `querybench init` first");
    }

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => fail(e),
    };

    let report = match runtime().block_on(run_eval(&config, limit, json)) {
        Ok(report) => report,
        Err(e) => fail(e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report).expect("report JSON"));
    } else {
        print_report(&report);
    }
}

/// Run an evaluation, streaming progress lines unless JSON output was asked.
async fn run_eval(
    config: &Config,
    limit: Option<usize>,
    json: bool,
) -> Result<EvalReport, EvalError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if json {
                continue;
            }
            match event {
                UpdateEvent::EvalStarted { total } => {
                    println!("Evaluating {total} case(s)...\n");
                }
                UpdateEvent::CaseEvaluated { result } => {
                    let index = result.index + 1;
                    match (result.similarity, &result.error) {
                        (Some(similarity), _) => {
                            let status = if result.passed { "PASS" } else { "FAIL" };
                            println!("  case {index}: {status} (similarity {similarity:.3})");
                        }
                        (None, Some(error)) => println!("  case {index}: FAIL ({error})"),
                        (None, None) => println!("  case {index}: FAIL"),
                    }
                }
                UpdateEvent::Status { message } => println!("  {message}"),
                UpdateEvent::EvalCompleted { .. }
                | UpdateEvent::EvalCancelled { .. }
                | UpdateEvent::EvalFailed { .. } => {}
            }
        }
    });

    // Keep the cancel sender alive for the whole run; dropping it would read
    // as a cancellation inside the loop.
    let (_cancel_tx, mut cancel_rx) = mpsc::channel(1);

    let result = evaluate(config, &EvalOptions { limit }, &event_tx, &mut cancel_rx).await;

    drop(event_tx);
    let _ = printer.await;

    result
}

fn print_report(report: &EvalReport) {
    println!("\n=== Evaluation Report ===");
    println!("Total cases:       {}", report.total);
    println!("Successful:        {}", report.successful);
    println!("Failed:            {}", report.failed);
    println!("Success rate:      {:.1}%", report.success_rate);
    println!("Avg similarity:    {:.3}", report.average_similarity);
    println!("Median similarity: {:.3}", report.median_similarity);
    println!("Min similarity:    {:.3}", report.min_similarity);
    println!("Max similarity:    {:.3}", report.max_similarity);
    println!("Duration:          {}ms", report.duration_ms);

    let failed: Vec<_> = report.failed_cases().collect();
    if !failed.is_empty() {
        println!("\nFailed cases:");
        for case in failed {
            let reason = case
                .error
                .clone()
                .or_else(|| case.similarity.map(|s| format!("similarity {s:.3}")))
                .unwrap_or_else(|| "unknown".into());
            println!("  {}: {} ({reason})", case.index + 1, case.input);
        }
    }
}

fn cmd_history(json: bool) {
    let store = match HistoryStore::new(Path::new(DATA_DIR).join("history")) {
        Ok(store) => store,
        Err(e) => fail(e),
    };

    let summaries = match store.list() {
        Ok(s) => s,
        Err(e) => fail(e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries).expect("history JSON"));
        return;
    }

    if summaries.is_empty() {
        println!("No saved conversations");
        return;
    }

    println!("Saved conversations\n");
    for summary in &summaries {
        println!(
            "  {}  {:>3} msgs  {}",
            summary.updated_at.format("%Y-%m-%d %H:%M"),
            summary.messages,
            summary.title
        );
    }
}
