use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "steadystudy", version, about = "SteadyStudy planning CLI")]
struct Cli {
    /// Log scheduling decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find free blocks for an availability constraint (JSON)
    Free(commands::free::FreeArgs),
    /// Plan tasks into free time using the configured preferences
    Plan(commands::plan::PlanArgs),
    /// Break an assignment into ordered subtasks
    Breakdown(commands::breakdown::BreakdownArgs),
    /// Extract an explicit time range from a message
    ParseTime {
        /// Free text such as "tomorrow from 3 to 4pm"
        message: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("STEADYSTUDY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("warning: failed to initialize logging: {e}");
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Free(args) => commands::free::run(args),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Breakdown(args) => commands::breakdown::run(args),
        Commands::ParseTime { message } => commands::parse_time::run(&message),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
