use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use openshowvar_client::ControllerEmulator;

use crate::cmd::{install_ctrlc_handler, ServeArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let seeds = args
        .vars
        .iter()
        .map(String::as_str)
        .map(parse_var)
        .collect::<CliResult<Vec<_>>>()?;

    let mut emulator =
        ControllerEmulator::bind(&args.bind).map_err(|err| client_error("bind failed", err))?;
    for (name, value) in &seeds {
        emulator = emulator
            .with_variable(name, value)
            .map_err(|err| client_error(&format!("cannot seed {name}"), err))?;
    }
    tracing::info!(
        addr = %emulator.local_addr(),
        variables = seeds.len(),
        "controller emulator ready"
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    emulator
        .serve_until(&running)
        .map_err(|err| client_error("serve failed", err))?;
    Ok(SUCCESS)
}

/// Split a `NAME=VALUE` seed. The value may itself contain `=`.
fn parse_var(spec: &str) -> CliResult<(String, String)> {
    match spec.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::new(
            USAGE,
            format!("--var expects NAME=VALUE, got {spec:?}"),
        )),
    }
}
