use super::utils;
use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("round")
        .about("Distances and scores of every species of a round against its target")
        .after_help(
            r###"
Configures one round of play and scores every species in it against the target.

Notes:
* Species of the round come from `--node`, `--file` and `--dataset` combined.
  Without any of them, every leaf of the tree takes part.
* Names are matched loosely: case, spaces vs underscores, and trailing
  tokens after `Genus_species` (e.g. `Homo_sapiens_ott770315`) are ignored.
* The tree is pruned to the round's species and rerooted on the target.
* Output columns: name, raw distance, edges, effective distance, score (1-100).
  Rows are sorted by descending score.

Examples:
1. Score every leaf against a target:
   phylodist round tree.nwk -t "Homo sapiens"

2. A round of four species, log-blended distances:
   phylodist round tree.nwk -t Homo_sapiens -n Pan_troglodytes -n Mus_musculus -n Felis_catus --mode log

3. Species from a game dataset:
   phylodist round tree.nwk -t "Felis catus" -d species.json

"###,
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .required(true)
                .num_args(1)
                .help("Target species of the round"),
        );
    utils::round_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let target = args.get_one::<String>("target").unwrap();

    //----------------------------
    // Operating
    //----------------------------
    let mut coordinator = utils::configure(args, Some(target))?;
    if coordinator.target_name().is_none() {
        anyhow::bail!("Target {} is not in the tree", target);
    }

    let mut rows = vec![];
    for species in coordinator.active_species() {
        let Some(metrics) = coordinator.get_phylogenetic_distance(target, &species) else {
            continue;
        };
        let score = coordinator.distance_to_score(Some(metrics.effective));
        rows.push((species, metrics, score));
    }
    rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.raw.total_cmp(&b.1.raw)));

    //----------------------------
    // Output
    //----------------------------
    for (species, metrics, score) in rows {
        writer.write_fmt(format_args!(
            "{}\t{}\n",
            species,
            utils::format_metrics(&metrics, score)
        ))?;
    }

    Ok(())
}
