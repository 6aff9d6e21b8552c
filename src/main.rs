use std::process::ExitCode;

use create_resource::{Error, cli, logging};

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    logging::init(command_line_interface.verbosity());
    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.downcast_ref::<Error>().is_some_and(Error::is_interrupted) => {
            eprintln!("interrupted");
            ExitCode::from(130)
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
