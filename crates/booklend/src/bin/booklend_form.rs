//! booklend-form - View, edit and print member loan forms.

fn main() -> std::process::ExitCode {
    booklend::cmd::form_cmd::main()
}
