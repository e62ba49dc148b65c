fn main() {
    if let Err(err) = respacer::app::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
