use std::process::ExitCode;

fn main() -> ExitCode {
    match fitplot::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{err:?}");
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
