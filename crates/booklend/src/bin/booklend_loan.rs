//! booklend-loan - Borrow, return and damage actions on the loan ledger.

fn main() -> std::process::ExitCode {
    booklend::cmd::loan_cmd::main()
}
