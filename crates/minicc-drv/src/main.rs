fn main() {
    if let Err(e) = minicc_drv::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
