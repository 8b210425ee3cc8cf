//! booklend-catalog - Manage the textbook catalog.

fn main() -> std::process::ExitCode {
    booklend::cmd::catalog_cmd::main()
}
