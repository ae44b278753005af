extern crate clap;
use clap::*;

mod cmd_phylodist;

fn main() -> anyhow::Result<()> {
    init_logging();

    let app = Command::new("phylodist")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`phylodist` - Phylogenetic distance and similarity scoring")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_phylodist::round::make_subcommand())
        .subcommand(cmd_phylodist::dist::make_subcommand())
        .subcommand(cmd_phylodist::prune::make_subcommand())
        .subcommand(cmd_phylodist::variants::make_subcommand())
        .after_help(
            r###"Subcommands:

* Rounds:
    * round    - Distances and scores of every species against a target
    * dist     - Distance and score of one pair
    * prune    - The working tree of a round, as Newick or JSON

* Names:
    * variants - Spellings a species name is matched under

Log verbosity follows RUST_LOG (default: warn). Logs go to stderr.

"###,
        );

    match app.get_matches().subcommand() {
        Some(("round", sub_matches)) => cmd_phylodist::round::execute(sub_matches),
        Some(("dist", sub_matches)) => cmd_phylodist::dist::execute(sub_matches),
        Some(("prune", sub_matches)) => cmd_phylodist::prune::execute(sub_matches),
        Some(("variants", sub_matches)) => cmd_phylodist::variants::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
