//! frontier-chess driver
//!
//! Speaks the line-oriented control protocol on stdin/stdout for an
//! external program driving the engine. Logging goes to stderr so
//! stdout stays machine-readable.

mod config;
mod protocol;

use std::io::{self, BufRead, Write};
use std::path::Path;

use config::EngineConfig;
use protocol::{Driver, Flow};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let (config, loaded) = EngineConfig::load(Path::new(config::CONFIG_FILENAME));
    let mut driver = if loaded {
        Driver::with_config(&config)
    } else {
        Driver::new()
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let (response, flow) = driver.handle_line(&line);
        match flow {
            Flow::Continue => {
                let _ = writeln!(stdout, "{response}");
                let _ = stdout.flush();
            }
            Flow::LeaveControl | Flow::Exit => break,
        }
    }
}
