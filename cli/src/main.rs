mod commands;
mod terminal;

use anyhow::Context;
use ansinv_common::config::Config;
use commands::{CommandLine, dump};
use terminal::{logging, print};

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    let cfg = Config {
        lowercase: !commands.keep_case,
        load_vars: !commands.no_vars,
        quiet: commands.quiet,
        verbose: commands.verbose,
    };

    logging::init_logging(&cfg);
    print::initialize();

    let inventory = ansinv_core::load(&commands.inventory, &cfg).with_context(|| {
        format!(
            "failed to load inventory '{}'",
            commands.inventory.display()
        )
    })?;

    match commands.patterns.as_deref() {
        Some(expression) => dump::matched(&inventory, expression, commands.pretty, &cfg),
        None => dump::full(&inventory, commands.pretty, &cfg),
    }
}
