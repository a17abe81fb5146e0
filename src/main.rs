use apmec_rs::cli::run_cli;
use apmec_rs::display::print_error;

fn main() {
    match run_cli() {
        Ok(()) => {
            // Success - output already printed by the command
        }
        Err(e) => {
            print_error(&format!("Error: {}", e));
            std::process::exit(1);
        }
    }
}
