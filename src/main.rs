fn main() {
    if let Err(err) = sankeyflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
