mod cli;
mod presenter;

use focus_core::interrupt;

fn main() {
    if let Err(e) = cli::run() {
        if e.downcast_ref::<interrupt::InterruptedError>().is_some() {
            std::process::exit(interrupt::INTERRUPTED_EXIT_CODE);
        }
        // The user already saw the notice.
        if e.downcast_ref::<cli::FlowFailed>().is_some() {
            std::process::exit(1);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
