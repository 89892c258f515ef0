//! Message host for the Study Assist front end.
//!
//! Reads length-prefixed JSON requests from stdin and answers on stdout
//! until stdin is closed. `--memory` keeps everything in a throwaway
//! database instead of the user's data directory.

use std::io;
use std::process::ExitCode;
use study_assist_lib::{get_db_path, host::Host, open_memory_storage, open_storage};

#[allow(clippy::print_stderr, reason = "stdout carries the protocol; stderr is the only place to report")]
fn main() -> ExitCode {
    let in_memory = std::env::args().skip(1).any(|arg| arg == "--memory");
    let storage = if in_memory {
        open_memory_storage()
    } else {
        get_db_path().and_then(|path| open_storage(&path))
    };
    let storage = match storage {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Study Assist host failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut host = Host::new(storage);
    let mut stdout = io::stdout().lock();

    match host.run(io::stdin(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Study Assist host error: {e}");
            ExitCode::FAILURE
        }
    }
}
