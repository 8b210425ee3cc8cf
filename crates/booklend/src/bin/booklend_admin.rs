//! booklend-admin - Backups and school settings.

fn main() -> std::process::ExitCode {
    booklend::cmd::admin_cmd::main()
}
