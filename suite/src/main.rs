use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use suite::context::{AppContext, ServeOverrides, VerbosityLevel};
use tracing_subscriber::EnvFilter;

/// k3s-suite - Local cluster and registry dashboard
///
/// Serves a web dashboard for browsing an OCI registry and controlling a
/// local minikube cluster.
#[derive(Parser, Debug)]
#[command(name = "suite")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dashboard server
    Serve {
        /// Configuration file (YAML)
        #[arg(short, long, env = "SUITE_CONFIG")]
        config: Option<PathBuf>,
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Display version information
    Version,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from_count(cli.verbose);

    match cli.command {
        Commands::Serve { config, bind, port } => {
            init_tracing(verbosity);

            let overrides = ServeOverrides {
                config_path: config,
                bind,
                port,
            };
            let ctx = match AppContext::build(&overrides, verbosity) {
                Ok(ctx) => ctx,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };

            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    eprintln!("Error: failed to start async runtime: {}", e);
                    process::exit(1);
                }
            };

            if let Err(e) = runtime.block_on(suite::server::run(&ctx.config)) {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Commands::Version => {
            suite::version::print_version();
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }
}
