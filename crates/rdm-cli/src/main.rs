use rdm_core::control::RunCancelled;
use rdm_core::logging;

mod cli;

use crate::cli::CliCommand;

/// 128 + SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        if err.downcast_ref::<RunCancelled>().is_some() {
            eprintln!("rdm: {}", err);
            // In-flight blocking workers are abandoned, not awaited.
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!("rdm error: {:#}", err);
        std::process::exit(1);
    }
}
