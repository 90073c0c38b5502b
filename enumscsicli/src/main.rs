use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use enumscsi::{
    is_root, is_valid_ipv4, local_install_hint, Config, Mode, Orchestrator, Report, StdinPrompter,
    SystemRunner, DEFAULT_PORT,
};
use env_logger::Env;
use log::debug;

#[derive(Parser)]
#[command(name = "enumscsicli")]
#[command(about = "iSCSI Target Discovery and Operations", long_about = None)]
struct Cli {
    /// IP address of the iSCSI target
    target_ip: String,

    /// Output file to save results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Port for the iSCSI target
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Enable interactive mode for browsing and file copying
    #[arg(long, conflicts_with = "all")]
    interactive: bool,

    /// List contents of all discovered iSCSI targets
    #[arg(long)]
    all: bool,

    /// Yaml file overriding tool names, mount point and device polling
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More log output, repeat for debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.all {
            Mode::All
        } else if self.interactive {
            Mode::Interactive
        } else {
            Mode::Single
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => Config::read(path)?,
        None => Config::default(),
    };
    debug!("config: {:?}", config);

    let has_tool = which::which(config.iscsiadm()).is_ok();
    let report = match start(&cli, is_root(), has_tool, &mut io::stdout())? {
        Start::Exit(0) => return Ok(()),
        Start::Exit(code) => process::exit(code),
        Start::Ready(report) => report,
    };

    let runner = SystemRunner;
    let mut prompter = StdinPrompter;
    let mut stdout = io::stdout();

    let mut orchestrator = Orchestrator::new(&config, &runner, &mut prompter, &mut stdout)?;
    if let Some(report) = report {
        orchestrator = orchestrator.with_report(report);
    }

    orchestrator.discover_and_run(&cli.target_ip, cli.port, cli.mode())
}

#[derive(Debug)]
enum Start {
    /// stop before touching anything, with this exit code
    Exit(i32),
    Ready(Option<Report>),
}

/// Checks run before any command is executed, in order: root, `iscsiadm`
/// present, target address. The output file is only created once all pass.
fn start(cli: &Cli, root: bool, has_tool: bool, out: &mut dyn Write) -> Result<Start> {
    if !root {
        writeln!(out, "This program must be run as root. Exiting.")?;
        return Ok(Start::Exit(1));
    }

    if !has_tool {
        for line in local_install_hint() {
            writeln!(out, "{}", line)?;
        }
        return Ok(Start::Exit(1));
    }

    if !is_valid_ipv4(&cli.target_ip) {
        writeln!(out, "Invalid IP address format: {}", cli.target_ip)?;
        return Ok(Start::Exit(0));
    }

    let report = match &cli.output {
        Some(path) => Some(Report::create(path)?),
        None => None,
    };
    Ok(Start::Ready(report))
}
