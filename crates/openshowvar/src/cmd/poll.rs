use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use openshowvar_frame::Operation;

use crate::cmd::{install_ctrlc_handler, parse_duration, PollArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_variable, OutputFormat, VariableOutput};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

pub fn run(args: PollArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let controller = args.connect.addr();
    let mut client = args.connect.connect()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut reads = 0usize;
    while running.load(Ordering::SeqCst) {
        let value = client
            .read(&args.name)
            .map_err(|err| client_error("read failed", err))?;
        print_variable(
            &VariableOutput::new(Operation::Read, &args.name, &value, &controller),
            format,
        );
        reads = reads.saturating_add(1);

        if args.count.is_some_and(|count| reads >= count) {
            break;
        }
        sleep_while_running(interval, &running);
    }

    tracing::debug!(reads, "poll finished");
    if let Err(err) = client.disconnect() {
        tracing::debug!(error = %err, "disconnect failed");
    }
    Ok(SUCCESS)
}

/// Sleep for `total`, waking early once `running` is cleared.
fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_returns_immediately_when_stopped() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        sleep_while_running(Duration::from_secs(5), &running);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_waits_for_interval() {
        let running = AtomicBool::new(true);
        let start = Instant::now();
        sleep_while_running(Duration::from_millis(120), &running);
        assert!(start.elapsed() >= Duration::from_millis(120));
    }
}
