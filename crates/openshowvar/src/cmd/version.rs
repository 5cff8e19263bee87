use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("openshowvar {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!("target: {}", option_env!("OPENSHOWVAR_BUILD_TARGET").unwrap_or("unknown"));
        println!("target_os: {}", std::env::consts::OS);
        println!("target_arch: {}", std::env::consts::ARCH);
        println!("default_port: {}", openshowvar_transport::DEFAULT_PORT);
        println!(
            "receive_buffer: {} bytes",
            openshowvar_client::DEFAULT_RECEIVE_BUFFER_SIZE
        );
    }
    Ok(SUCCESS)
}
