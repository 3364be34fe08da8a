use sql_practice::catalog::Challenge;
use sql_practice::export::{export_file_name, to_csv, to_tsv};
use sql_practice::formatter::format_query;
use sql_practice::history::time_ago;
use sql_practice::result::display_cell;
use sql_practice::session::{QueryOutcome, Submission};
use sql_practice::{ErrorClassification, PracticeConfig, PracticeSession, QueryResult};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Widest a rendered cell may get before it is cut
const MAX_CELL_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "sql-practice")]
#[command(about = "Practice SQL against bundled datasets and graded challenges")]
#[command(version)]
struct Args {
    /// Directory for saved progress and history (or set SQL_PRACTICE_HOME)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List datasets and their columns
    Datasets,
    /// Show example queries for a dataset
    Examples {
        /// Dataset name (default: every dataset)
        dataset: Option<String>,
    },
    /// List challenges with completion status
    Challenges,
    /// Show one challenge
    Show {
        id: u32,

        /// Also print the reference solution
        #[arg(long)]
        solution: bool,
    },
    /// Submit an answer to a challenge
    Submit {
        id: u32,

        /// The SQL query
        query: String,
    },
    /// Run a query in free practice
    Run {
        /// The SQL query
        #[arg(required_unless_present = "from_history")]
        query: Option<String>,

        /// Re-run entry N from `history` instead
        #[arg(long, value_name = "N", conflicts_with = "query")]
        from_history: Option<usize>,

        /// Dataset to run against (default: SQL_PRACTICE_DATASET or employees)
        #[arg(short, long)]
        dataset: Option<String>,
    },
    /// Pretty-print a query
    Format { query: String },
    /// Run a query and write the result as CSV
    Export {
        query: String,

        #[arg(short, long)]
        dataset: Option<String>,

        /// Output file (default: <dataset>_results_<date>.csv)
        #[arg(short, long, conflicts_with = "tsv")]
        output: Option<PathBuf>,

        /// Print tab-separated rows to stdout for pasting into a spreadsheet
        #[arg(long)]
        tsv: bool,
    },
    /// Show recent queries
    History {
        /// Forget all saved queries
        #[arg(long)]
        clear: bool,
    },
    /// Clear all challenge progress
    Reset,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = PracticeConfig::from_env();
    if let Some(home) = args.home {
        config = config.with_home(home);
    }

    dispatch(&config, args.command)
}

/// Run one command. The session (and its store) is only opened by commands
/// that need it.
fn dispatch(config: &PracticeConfig, command: Commands) -> Result<()> {
    let open = || PracticeSession::open(config);

    match command {
        Commands::Format { query } => {
            println!("{}", format_query(&query)?);
            Ok(())
        }
        Commands::Datasets => list_datasets(&mut open()?),
        Commands::Examples { dataset } => list_examples(&open()?, dataset),
        Commands::Challenges => {
            list_challenges(&open()?);
            Ok(())
        }
        Commands::Show { id, solution } => {
            let session = open()?;
            print_challenge(session.challenge(id)?, solution);
            Ok(())
        }
        Commands::Submit { id, query } => submit(&mut open()?, id, &query),
        Commands::Run {
            query,
            from_history,
            dataset,
        } => {
            let mut session = open()?;
            let query = match (query, from_history) {
                (Some(query), _) => query,
                (None, Some(position)) => session.recall_query(position)?,
                (None, None) => bail!("Give a query or --from-history N"),
            };
            run(&mut session, &query, dataset)
        }
        Commands::Export {
            query,
            dataset,
            output,
            tsv,
        } => export(&mut open()?, &query, dataset, output, tsv),
        Commands::History { clear } => history(&mut open()?, clear),
        Commands::Reset => {
            open()?.reset_progress()?;
            println!("Progress reset. All challenges are available again.");
            Ok(())
        }
    }
}

fn list_datasets(session: &mut PracticeSession) -> Result<()> {
    let names: Vec<String> = session
        .catalog()
        .datasets()
        .iter()
        .map(|d| d.name.clone())
        .collect();

    for name in names {
        let schema = session.switch_dataset(&name)?;
        println!("\n{} ({} rows)", schema.name, schema.rows);
        for column in &schema.columns {
            println!("  {:<24} {}", column.name, column.data_type);
        }
    }
    Ok(())
}

fn list_examples(session: &PracticeSession, dataset: Option<String>) -> Result<()> {
    let catalog = session.catalog();
    let datasets: Vec<_> = match dataset {
        Some(name) => match catalog.dataset(&name) {
            Some(d) => vec![d],
            None => bail!("Dataset \"{}\" not found", name),
        },
        None => catalog.datasets().iter().collect(),
    };

    for dataset in datasets {
        println!("\n{}", dataset.name);
        for example in &dataset.examples {
            println!("\n  {} [{}]", example.title, example.level);
            for line in example.query.lines() {
                println!("    {}", line);
            }
        }
    }
    Ok(())
}

fn list_challenges(session: &PracticeSession) {
    let summary = session.progress_summary();
    println!(
        "{} of {} completed ({}%), level: {}",
        summary.completed, summary.total, summary.percent, summary.level
    );

    let mut dataset = "";
    for challenge in session.catalog().challenges() {
        if challenge.dataset != dataset {
            dataset = &challenge.dataset;
            println!("\n{}", dataset);
        }
        let mark = if session.is_completed(challenge.id) { "x" } else { " " };
        println!(
            "  [{}] {:>2}. {} ({})",
            mark, challenge.id, challenge.title, challenge.level
        );
    }
}

fn print_challenge(challenge: &Challenge, with_solution: bool) {
    println!("\n{}", "=".repeat(80));
    println!(" Challenge {}: {} [{}]", challenge.id, challenge.title, challenge.level);
    println!("{}", "=".repeat(80));
    println!("\nDataset: {}", challenge.dataset);
    println!("\n{}", challenge.problem);

    let expected = &challenge.expected_output;
    if let Some(columns) = &expected.columns {
        println!("\nExpected columns: {}", columns.join(", "));
    }
    if let Some(rows) = expected.row_count {
        println!("Expected rows: {}", rows);
    }

    if !challenge.hints.is_empty() {
        println!("\nHints:");
        for (i, hint) in challenge.hints.iter().enumerate() {
            println!("  {}. {}", i + 1, hint);
        }
    }

    if with_solution {
        println!("\nSolution:\n  {}", challenge.solution);
    }
}

fn submit(session: &mut PracticeSession, id: u32, query: &str) -> Result<()> {
    let submission = session.submit(id, query)?;
    print_submission(session, &submission)?;
    Ok(())
}

fn print_submission(session: &PracticeSession, submission: &Submission) -> Result<()> {
    let outcome = &submission.outcome;
    if outcome.correct {
        println!("Correct! {}", outcome.message);
        if let Some(result) = &submission.result {
            println!("\n{}", render_table(result));
        }
        let summary = session.progress_summary();
        println!("{} of {} completed ({}%)", summary.completed, summary.total, summary.percent);
        match submission.next_challenge_id {
            Some(next) => println!("Next up: challenge {}", next),
            None => println!("You've completed the last challenge!"),
        }
        return Ok(());
    }

    println!("Not quite: {}", outcome.message);
    if let Some(hint) = &outcome.hint {
        println!("{}", hint);
    }
    if let Some(classification) = &submission.error {
        print_classification(classification);
    }
    if let Some(result) = &submission.result {
        println!("\nYour output:\n{}", render_table(result));
    }

    let expected = &session.challenge(submission.challenge_id)?.expected_output;
    if let Some(columns) = &expected.columns {
        println!("Expected columns: {}", columns.join(", "));
    }
    Ok(())
}

fn run(session: &mut PracticeSession, query: &str, dataset: Option<String>) -> Result<()> {
    if let Some(name) = dataset {
        session.switch_dataset(&name)?;
    }

    let dataset = session.current_dataset().name.clone();
    info!("Running query against {}", dataset);

    match session.run_query(query)? {
        QueryOutcome::Rows(result) => {
            println!("{}", render_table(&result));
            println!(
                "Retrieved {} row{} with {} column{} from {}.",
                result.row_count(),
                plural(result.row_count()),
                result.column_count(),
                plural(result.column_count()),
                dataset
            );
        }
        QueryOutcome::NoRows => {
            println!("Query ran successfully (0 rows)");
        }
        QueryOutcome::Failed {
            message,
            classification,
        } => {
            println!("Error: {}", message);
            print_classification(&classification);
        }
    }
    Ok(())
}

fn export(
    session: &mut PracticeSession,
    query: &str,
    dataset: Option<String>,
    output: Option<PathBuf>,
    tsv: bool,
) -> Result<()> {
    if let Some(name) = dataset {
        session.switch_dataset(&name)?;
    }

    let result = match session.run_query(query)? {
        QueryOutcome::Rows(result) => result,
        QueryOutcome::NoRows => bail!("No results to export"),
        QueryOutcome::Failed {
            message,
            classification,
        } => {
            print_classification(&classification);
            bail!("Query failed: {}", message)
        }
    };

    if tsv {
        print!("{}", to_tsv(&result));
        return Ok(());
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(export_file_name(
            &session.current_dataset().name,
            Utc::now().date_naive(),
        ))
    });
    std::fs::write(&path, to_csv(&result)?)?;
    println!("Exported {} rows to {}", result.row_count(), path.display());
    Ok(())
}

fn history(session: &mut PracticeSession, clear: bool) -> Result<()> {
    if clear {
        session.clear_history()?;
        println!("Query history cleared.");
        return Ok(());
    }

    if session.history().is_empty() {
        println!("No query history yet");
        return Ok(());
    }

    let now = Utc::now();
    for (i, entry) in session.history().entries().enumerate() {
        println!("{:>2}. {}", i + 1, entry.preview());
        println!("    {} - {}", time_ago(entry.timestamp, now), entry.dataset);
    }
    Ok(())
}

fn print_classification(classification: &ErrorClassification) {
    println!("Hint: {}", classification.hint);
    if let Some(suggestion) = &classification.suggestion {
        println!("{}", suggestion);
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn render_table(result: &QueryResult) -> String {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|v| truncate(&display_cell(v))).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&render_line(result.columns.iter().map(String::as_str), &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_CELL_WIDTH {
        let head: String = value.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_run_from_history() {
        let args = Args::try_parse_from(["sql-practice", "run", "--from-history", "2"]).unwrap();
        match args.command {
            Commands::Run {
                query,
                from_history,
                dataset,
            } => {
                assert_eq!(query, None);
                assert_eq!(from_history, Some(2));
                assert_eq!(dataset, None);
            }
            _ => panic!("expected run"),
        }

        assert!(Args::try_parse_from(["sql-practice", "run"]).is_err());
        assert!(Args::try_parse_from(["sql-practice", "run", "SELECT 1", "--from-history", "1"]).is_err());
    }

    #[test]
    fn test_export_tsv() {
        let args = Args::try_parse_from(["sql-practice", "export", "SELECT 1", "--tsv"]).unwrap();
        assert!(matches!(args.command, Commands::Export { tsv: true, output: None, .. }));

        assert!(Args::try_parse_from(["sql-practice", "export", "SELECT 1", "--tsv", "-o", "out.csv"]).is_err());
    }

    #[test]
    fn test_format_needs_no_session() {
        // Points at a path that cannot be created as a directory.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let config = PracticeConfig::default().with_home(blocker.join("home"));

        dispatch(&config, Commands::Format { query: "select 1".to_string() }).unwrap();
        assert!(dispatch(&config, Commands::Challenges).is_err());
    }
}
