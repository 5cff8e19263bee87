use openshowvar_frame::Operation;

use crate::cmd::WriteArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_variable, OutputFormat, VariableOutput};

pub fn run(args: WriteArgs, format: OutputFormat) -> CliResult<i32> {
    let controller = args.connect.addr();
    let mut client = args.connect.connect()?;

    let echoed = client
        .write(&args.name, &args.value)
        .map_err(|err| client_error("write failed", err))?;
    if echoed != args.value {
        tracing::warn!(
            name = %args.name,
            requested = %args.value,
            echoed = %echoed,
            "controller echoed a different value"
        );
    }
    print_variable(
        &VariableOutput::new(Operation::Write, &args.name, &echoed, &controller),
        format,
    );

    if let Err(err) = client.disconnect() {
        tracing::debug!(error = %err, "disconnect failed");
    }
    Ok(SUCCESS)
}
