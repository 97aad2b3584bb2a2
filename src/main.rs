use std::process;

fn main() {
    env_logger::init();

    if let Err(err) = locmatch::run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
