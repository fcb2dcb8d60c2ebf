use clap::{Parser as ClapParser, Subcommand};
use gistql::cli::{self, CheckOptions, CheckResult, CliError};
use gistql::output::{report_to_json, to_json, to_json_pretty};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "gistql")]
#[command(about = "gistql - Field projection and filter expressions over JSON documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and run a fields/filter request
    Check {
        /// The fields expression
        #[arg(short, long)]
        fields: Option<String>,

        /// A filter expression (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// How top-level filters combine: AND or OR
        #[arg(long)]
        root_junction: Option<String>,

        /// JSON object of key -> document (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Page to return, starting at 1
        #[arg(long)]
        page: Option<usize>,

        /// Entries per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Return the bare entry array without the pager
        #[arg(long)]
        headless: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Filter in parallel from this many entries
        #[arg(long)]
        parallel_threshold: Option<usize>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'gistql docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            fields,
            filters,
            root_junction,
            input,
            page,
            page_size,
            headless,
            pretty,
            syntax_only,
            parallel_threshold,
        } => {
            let options = CheckOptions {
                fields,
                filters,
                root_junction,
                input: None,
                page,
                page_size,
                headless,
                syntax_only,
                parallel_threshold,
            };
            run_check(options, input, pretty)
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions, input: Option<String>, pretty: bool) -> Result<(), CliError> {
    options.input = match input {
        Some(s) => Some(s),
        None if !options.syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                to_json_pretty(&output)
            } else {
                to_json(&output)
            };
            println!("{}", json);
        }
        CheckResult::Rejected(report) => {
            println!("{}", report_to_json(&report, pretty)?);
            std::process::exit(1);
        }
    }
    Ok(())
}
