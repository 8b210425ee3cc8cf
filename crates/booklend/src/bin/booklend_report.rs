//! booklend-report - Stock, fine and ledger reports.

fn main() -> std::process::ExitCode {
    booklend::cmd::report_cmd::main()
}
