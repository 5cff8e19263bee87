use openshowvar_frame::Operation;

use crate::cmd::ReadArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_variable, OutputFormat, VariableOutput};

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let controller = args.connect.addr();
    let mut client = args.connect.connect()?;

    let value = client
        .read(&args.name)
        .map_err(|err| client_error("read failed", err))?;
    print_variable(
        &VariableOutput::new(Operation::Read, &args.name, &value, &controller),
        format,
    );

    if let Err(err) = client.disconnect() {
        tracing::debug!(error = %err, "disconnect failed");
    }
    Ok(SUCCESS)
}
