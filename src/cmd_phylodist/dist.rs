use super::utils;
use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("dist")
        .about("Distance and score between two species")
        .after_help(
            r###"
The round is configured with <a> as its target, so the score is relative to
the distances from <a> to the other species of the round.

Output columns: a, b, raw distance, edges, effective distance, score (1-100).

Examples:
1. Over the whole tree:
   phylodist dist tree.nwk "Homo sapiens" "Mus musculus"

2. Within a round of three species:
   phylodist dist tree.nwk Homo_sapiens Pan_troglodytes -n Mus_musculus

"###,
        );
    utils::round_args(cmd)
        .arg(
            Arg::new("a")
                .required(true)
                .num_args(1)
                .index(2)
                .help("First species, also the target of the round"),
        )
        .arg(
            Arg::new("b")
                .required(true)
                .num_args(1)
                .index(3)
                .help("Second species"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let a = args.get_one::<String>("a").unwrap();
    let b = args.get_one::<String>("b").unwrap();

    //----------------------------
    // Operating
    //----------------------------
    let mut coordinator = utils::configure(args, Some(a))?;
    let Some(metrics) = coordinator.get_phylogenetic_distance(a, b) else {
        anyhow::bail!("No distance between {} and {} in this round", a, b);
    };
    let score = coordinator.distance_to_score(Some(metrics.effective));

    //----------------------------
    // Output
    //----------------------------
    writer.write_fmt(format_args!(
        "{}\t{}\t{}\n",
        a,
        b,
        utils::format_metrics(&metrics, score)
    ))?;

    Ok(())
}
