use std::process;

fn main() {
    if let Err(e) = rsa420::cli::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
