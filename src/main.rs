fn main() {
    if let Err(err) = genui_chat::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
