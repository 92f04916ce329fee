use std::process::ExitCode;

use fruitcade::config::Variant;

fn main() -> ExitCode {
    fruitcade::runner::run(Variant::Slicer)
}
