//! mtlab CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mtlab",
    version,
    about = "Machine-translation post-editing lab: score, translate, and track student work"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a candidate translation against a reference
    Score {
        /// Candidate translation (post-edit or MT output)
        #[arg(long)]
        candidate: String,

        /// Reference translation
        #[arg(long)]
        reference: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Only compute p1, p2, and len_ratio
        #[arg(long)]
        baseline_only: bool,
    },

    /// Machine-translate a piece of text
    Translate {
        /// Text to translate
        #[arg(long)]
        text: String,

        /// Engine name (default from config)
        #[arg(long)]
        engine: Option<String>,

        /// Model name (default from config)
        #[arg(long)]
        model: Option<String>,

        /// Terminology hints, e.g. "policy=سياسة, ministry=الوزارة"
        #[arg(long, default_value = "")]
        terms: String,

        /// Style constraints appended to the prompt
        #[arg(long)]
        style: Option<String>,

        /// System prompt override
        #[arg(long)]
        system_prompt: Option<String>,

        #[arg(long, default_value = "en")]
        src_lang: String,

        #[arg(long, default_value = "ar")]
        tgt_lang: String,

        /// Score the output against this reference
        #[arg(long)]
        reference: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score and save a student's post-edit
    Submit {
        /// Student name
        #[arg(long)]
        student: String,

        /// Pairs-dataset item id
        #[arg(long, conflicts_with = "ticket", required_unless_present = "ticket")]
        item: Option<String>,

        /// Ticket id
        #[arg(long)]
        ticket: Option<String>,

        /// Raw machine translation
        #[arg(long, default_value = "")]
        mt_output: String,

        /// The student's post-edited translation
        #[arg(long, default_value = "")]
        post_edit: String,

        /// Terminology hints used for the MT output
        #[arg(long, default_value = "")]
        terms: String,

        /// System prompt used for the MT output
        #[arg(long, default_value = "")]
        system_prompt: String,

        /// Data directory (default from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage assignment tickets
    Tickets {
        #[command(subcommand)]
        action: TicketsCommand,

        /// Data directory (default from config)
        #[arg(long, global = true)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },

    /// Manage the sample pairs dataset
    Pairs {
        #[command(subcommand)]
        action: PairsCommand,

        /// Data directory (default from config)
        #[arg(long, global = true)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },

    /// Translate and score the whole pairs dataset with one engine
    Lab {
        /// Engine name (default from config)
        #[arg(long)]
        engine: Option<String>,

        /// Model name (default from config)
        #[arg(long)]
        model: Option<String>,

        /// Terminology hints applied to every item
        #[arg(long, default_value = "")]
        terms: String,

        /// Style constraints applied to every item
        #[arg(long)]
        style: Option<String>,

        /// Max concurrent translations (default from config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory
        #[arg(long, default_value = "./mtlab-results")]
        output: PathBuf,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Data directory (default from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two lab reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Metric to compare on
        #[arg(long, default_value = "p2")]
        metric: String,

        /// Regression threshold
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Export the class overview from the results log
    Export {
        /// Output file
        #[arg(long, default_value = "mtlab-overview.html")]
        output: PathBuf,

        /// Output format: html, json
        #[arg(long, default_value = "html")]
        format: String,

        /// Data directory (default from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show enabled metrics, engines, and data files
    Health {
        /// Data directory (default from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and seed the data directory
    Init,
}

#[derive(Subcommand)]
enum TicketsCommand {
    /// Add a single ticket
    Add {
        #[arg(long)]
        id: String,

        #[arg(long)]
        source: String,

        #[arg(long)]
        reference: Option<String>,

        #[arg(long, default_value = "en")]
        src_lang: String,

        #[arg(long, default_value = "ar")]
        tgt_lang: String,

        /// Assign to a student right away
        #[arg(long)]
        assigned_to: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<chrono::NaiveDate>,

        #[arg(long, default_value = "5")]
        points: u32,
    },

    /// List tickets
    List {
        /// Only tickets assigned to this student that are still open
        #[arg(long, conflicts_with = "open")]
        student: Option<String>,

        /// Only unassigned tickets
        #[arg(long)]
        open: bool,
    },

    /// Claim an unassigned ticket
    Claim {
        #[arg(long)]
        id: String,

        #[arg(long)]
        student: String,
    },

    /// Replace all tickets with an uploaded CSV
    Import {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum PairsCommand {
    /// Create the demo dataset if missing
    Seed {
        /// Overwrite an existing dataset
        #[arg(long)]
        reset: bool,
    },

    /// Print the dataset
    List,

    /// Check the dataset for problems
    Validate,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mtlab=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            candidate,
            reference,
            format,
            baseline_only,
        } => commands::score::execute(candidate, reference, format, baseline_only),
        Commands::Translate {
            text,
            engine,
            model,
            terms,
            style,
            system_prompt,
            src_lang,
            tgt_lang,
            reference,
            config,
        } => {
            commands::translate::execute(commands::translate::TranslateArgs {
                text,
                engine,
                model,
                terms,
                style,
                system_prompt,
                src_lang,
                tgt_lang,
                reference,
                config,
            })
            .await
        }
        Commands::Submit {
            student,
            item,
            ticket,
            mt_output,
            post_edit,
            terms,
            system_prompt,
            data_dir,
            config,
        } => commands::submit::execute(commands::submit::SubmitArgs {
            student,
            item,
            ticket,
            mt_output,
            post_edit,
            terms,
            system_prompt,
            data_dir,
            config,
        }),
        Commands::Tickets {
            action,
            data_dir,
            config,
        } => commands::tickets::execute(action, data_dir, config),
        Commands::Pairs {
            action,
            data_dir,
            config,
        } => commands::pairs::execute(action, data_dir, config),
        Commands::Lab {
            engine,
            model,
            terms,
            style,
            parallelism,
            output,
            format,
            data_dir,
            config,
        } => {
            commands::lab::execute(commands::lab::LabArgs {
                engine,
                model,
                terms,
                style,
                parallelism,
                output,
                format,
                data_dir,
                config,
            })
            .await
        }
        Commands::Compare {
            baseline,
            current,
            metric,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(
            baseline,
            current,
            metric,
            threshold,
            fail_on_regression,
            format,
        ),
        Commands::Export {
            output,
            format,
            data_dir,
            config,
        } => commands::export::execute(output, format, data_dir, config),
        Commands::Health { data_dir, config } => commands::health::execute(data_dir, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
