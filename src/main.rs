fn main() {
    let args = std::env::args();
    // Initialize logging as early as possible; fallback to stderr on failure.
    let _ = remfs::logging::init_logging(remfs::logging::LogFormat::Human);

    if let Err(err) = remfs::run(args) {
        eprintln!("remfs error: {err}");
        std::process::exit(1);
    }
}
