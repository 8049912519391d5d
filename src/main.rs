// Entrypoint for the CLI application.
// - Parses the command before asking for credentials, so typos fail fast.
// - Maps each error category to its own exit code.

use clap::{ArgAction, Parser};
use isi_toolbox::api::{Connection, IsilonClient};
use isi_toolbox::commands::{Command, Context};
use isi_toolbox::config::Config;
use isi_toolbox::error::{Result, ToolError};
use isi_toolbox::ui::{self, Console};
use log::info;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "isi-toolbox",
    version,
    about = "Manage quotas and volumes on a OneFS cluster",
    after_help = "Commands:\n  quota list\n  quota search <filter>\n  quota audit <path>\n  quota resize <path|filter> <[+|-]size>\n  volume list\n  volume create <path>"
)]
struct Cli {
    /// Cluster hostname or SmartConnect address
    #[arg(long, env = "ISI_HOSTNAME")]
    hostname: Option<String>,

    /// Platform API port
    #[arg(long)]
    port: Option<u16>,

    /// Accept self-signed certificates
    #[arg(long)]
    insecure: bool,

    /// Config file (default: <config dir>/isi-toolbox/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Command and its parameters, e.g. `quota resize proj +5G`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    params: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        for line in err.report_lines() {
            eprintln!("{}", line);
        }
        process::exit(err.exit_code());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let command = Command::from_params(&cli.params)?;

    let mut config = Config::load(cli.config.as_deref()).map_err(ToolError::Config)?;
    if cli.hostname.is_some() {
        config.hostname = cli.hostname;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.insecure |= cli.insecure;

    let hostname = config.hostname.clone().ok_or_else(|| {
        ToolError::Validation("no cluster given, pass --hostname or set hostname in the config file".into())
    })?;

    let credentials = ui::prompt_credentials(config.username.as_deref())?
        .ok_or_else(|| ToolError::Auth("username and password are required".into()))?;

    let mut client = IsilonClient::new(&Connection {
        scheme: "https".into(),
        hostname,
        port: config.port,
        insecure: config.insecure,
        timeout: config.timeout(),
    })?;

    let spinner = ui::spinner("Authenticating...");
    let authenticated = client.authenticate(&credentials);
    spinner.finish_and_clear();
    authenticated?;
    info!("authenticated to {} as {}", client.base_url(), credentials.username);

    let mut console = Console::new();
    let mut ctx = Context {
        quotas: &client,
        namespace: &client,
        term: &mut console,
    };
    command.execute(&mut ctx)
}
