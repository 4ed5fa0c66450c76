use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use codexspell::cli::output::{self, OutputFormat};
use codexspell::{cli, dict, Config, Level, Session};
use std::io;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "codexspell")]
#[command(version, about = "Dictionary-backed spell checker for translation drafts", long_about = None)]
struct Cli {
    /// Files or directories to check
    #[arg(value_name = "PATHS")]
    paths: Vec<PathBuf>,

    /// Fix misspellings in place (closest near match only)
    #[arg(short, long)]
    fix: bool,

    /// Choose among the suggested actions for every flagged line
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Project root holding the dictionary data
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Language scope of the dictionary
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Accept auto-verified words as correct
    #[arg(short, long, global = true)]
    relative: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DictCommands {
    /// List dictionary entries
    List {
        /// Only entries at this level (verified, verified_auto, unverified)
        #[arg(long)]
        level: Option<Level>,
    },
    /// Add words to the dictionary
    Add {
        #[arg(required = true)]
        words: Vec<String>,
        /// Level for the new entries (defaults to the configured level)
        #[arg(long)]
        level: Option<Level>,
    },
    /// Remove words from every dictionary file
    Remove {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Show dictionary info
    Info,
    /// Show correction candidates for a word
    Suggest { word: String },
    /// Show completions for a prefix
    Complete { prefix: String },
}

fn init_logging(verbose: bool) -> Result<()> {
    let directive = if verbose { "codexspell=debug" } else { "codexspell=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "codexspell", &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose)?;
    if cli.no_color {
        colored::control::set_override(false);
    }
    let colored = !cli.no_color;

    let relative = cli.relative.then_some(true);
    let config = Config::load(&cli.project, cli.language.clone(), relative)?;
    debug!(?config, "Loaded configuration");

    let mut session = Session::open(&cli.project, config)?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, &mut session);
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No paths specified. Use --help for usage information.");
    }

    let files = cli::collect_files(&cli.paths, session.config());

    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_fixed = 0;
    let mut words_added = 0;

    for file_path in &files {
        if !file_path.exists() {
            error!(file = %file_path.display(), "File not found");
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        if cli.fix && cli.interactive {
            let outcome = cli::fix_interactive(&mut session, file_path, colored)?;
            total_fixed += outcome.fixed_count;
            words_added += outcome.words_added;
            if outcome.quit {
                break;
            }
        } else if cli.fix {
            let result = cli::fix_auto(&session, file_path)?;
            total_fixed += result.fixed_count;
            total_errors += result.error_count;
        } else {
            let result = cli::check_file(&session, file_path)?;
            total_errors += result.error_count;
            if cli.format == OutputFormat::Text {
                output::print_text_findings(file_path, &result, colored);
            }
            results.push((file_path.clone(), result));
        }
    }

    // Print summary
    if cli.fix {
        output::print_fix_summary(total_fixed, words_added, files.len(), colored);
    } else if cli.format == OutputFormat::Json {
        output::print_json_report(&results)?;
    } else {
        output::print_check_summary(total_errors, files.len(), colored);
    }

    // Exit with appropriate code
    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands, session: &mut Session) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List { level } => {
                dict::manager::list_entries(session, level)?;
            }
            DictCommands::Add { words, level } => {
                dict::manager::add_words(session, &words, level)?;
            }
            DictCommands::Remove { words } => {
                dict::manager::remove_words(session, &words)?;
            }
            DictCommands::Info => {
                dict::manager::show_info(session)?;
            }
            DictCommands::Suggest { word } => {
                dict::manager::suggest(session, &word)?;
            }
            DictCommands::Complete { prefix } => {
                dict::manager::complete(session, &prefix)?;
            }
        },
    }
    Ok(())
}
