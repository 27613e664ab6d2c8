use colored::Colorize;

fn main() {
    if let Err(e) = snortmon::app::run_cli() {
        if !e.is_empty() {
            eprintln!("{}", e.red());
        }
        std::process::exit(1);
    }
}
