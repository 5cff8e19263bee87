//! Read, write and re-read a variable.
//!
//! Targets the controller at `OSV_ADDR` (e.g. `10.145.173.160:7000`). Without
//! it, an in-process emulator stands in for the controller.

use openshowvar::client::{connect, ControllerEmulator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, _emulator) = match std::env::var("OSV_ADDR") {
        Ok(addr) => (addr, None),
        Err(_) => {
            let emulator = ControllerEmulator::bind("127.0.0.1:0")?
                .with_variable("COUNT", "0")?
                .spawn()?;
            (emulator.local_addr().to_string(), Some(emulator))
        }
    };

    let mut client = connect(&addr)?;

    let name = "COUNT";
    let initial = client.read(name)?;
    println!("initial value of {name}: {initial}");

    let written = client.write(name, "1")?;
    println!("wrote {name}: {written}");

    let updated = client.read(name)?;
    println!("updated value of {name}: {updated}");

    client.disconnect()?;
    Ok(())
}
