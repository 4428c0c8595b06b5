use std::process;

fn main() {
    if let Err(err) = designdump::cli::run_dump(std::env::args()) {
        eprintln!("FATAL: {err}");
        process::exit(1);
    }
}
