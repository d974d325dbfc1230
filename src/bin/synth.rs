use std::process::ExitCode;

use clap::Parser;
use users_api::stack::SynthCli;

fn main() -> ExitCode {
    let cli = SynthCli::parse();

    let template = match cli.stack.synth() {
        Ok(template) => template,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match template.to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to render template: {e}");
            ExitCode::FAILURE
        }
    }
}
