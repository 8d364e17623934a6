use std::env::args;
use std::process::exit;

use config::Config;
use logger::{log, Level, Logger};
use pidprovider::current_process_id;
use pidprovider::identity::run_id;
use pidprovider::pidfile::PidFile;

fn main() {
    let mut config = Config::new(Logger::new(Level::Notice));
    if let Some(f) = args().nth(1) {
        if let Err(e) = config.parsefile(&f) {
            eprintln!("Failed to load {}: {}", f, e);
            exit(1);
        }
    }

    let pid = current_process_id();
    log!(
        config.logger,
        Notice,
        "pidprovider {} started, pid={}, run_id={}",
        env!("CARGO_PKG_VERSION"),
        pid,
        run_id()
    );

    let _pidfile = match config.pidfile {
        Some(ref path) => match PidFile::create(path) {
            Ok(f) => {
                log!(config.logger, Verbose, "Wrote pid file {}", path);
                Some(f)
            }
            Err(e) => {
                log!(config.logger, Warning, "Error writing pid: {}", e);
                None
            }
        },
        None => None,
    };

    config.logger.sync();
    println!("PID: {}", pid);
}
