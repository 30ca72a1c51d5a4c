pub mod binding;
pub mod cli;
pub mod model;
pub mod runtime;
pub mod ui;
pub mod widgets;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
