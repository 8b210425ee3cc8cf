//! booklend-roster - Manage members, classes, imports and year-end promotion.

fn main() -> std::process::ExitCode {
    booklend::cmd::roster_cmd::main()
}
