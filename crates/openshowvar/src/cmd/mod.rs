use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use openshowvar_client::{ClientConfig, TcpClient};
use openshowvar_transport::DEFAULT_PORT;

use crate::exit::{client_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod poll;
pub mod read;
pub mod serve;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a variable.
    Read(ReadArgs),
    /// Write a variable and print the value the controller echoed.
    Write(WriteArgs),
    /// Read a variable repeatedly until interrupted.
    Poll(PollArgs),
    /// Run a local controller emulator.
    Serve(ServeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Read(args) => read::run(args, format),
        Command::Write(args) => write::run(args, format),
        Command::Poll(args) => poll::run(args, format),
        Command::Serve(args) => serve::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Where and how to reach the controller.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Controller host name or IP address.
    #[arg(long, env = "OSV_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Controller port.
    #[arg(long, env = "OSV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Connect and response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Bytes requested per receive.
    #[arg(long, default_value_t = openshowvar_client::DEFAULT_RECEIVE_BUFFER_SIZE)]
    pub buffer_size: usize,
}

impl ConnectArgs {
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn client_config(&self) -> CliResult<ClientConfig> {
        let timeout = parse_duration(&self.timeout)?;
        if self.buffer_size == 0 {
            return Err(CliError::new(USAGE, "--buffer-size must be greater than zero"));
        }

        let mut config = ClientConfig {
            receive_buffer_size: self.buffer_size,
            ..ClientConfig::default()
        };
        config.transport.connect_timeout = Some(timeout);
        config.transport.read_timeout = Some(timeout);
        config.transport.write_timeout = Some(timeout);
        Ok(config)
    }

    pub fn connect(&self) -> CliResult<TcpClient> {
        let config = self.client_config()?;
        openshowvar_client::connect_with_config(&self.addr(), config)
            .map_err(|err| client_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Variable name (e.g. $OV_PRO).
    pub name: String,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Variable name.
    pub name: String,
    /// Value to write, in controller syntax.
    pub value: String,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Variable name.
    pub name: String,
    /// Delay between reads (e.g. 1s, 250ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Exit after N reads.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:7000")]
    pub bind: String,
    /// Seed a variable (NAME=VALUE). Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Clear `running` on Ctrl-C so long-running commands wind down cleanly.
pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
