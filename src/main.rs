fn main() {
    if let Err(err) = sales_clean::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
