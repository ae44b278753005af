use super::utils;
use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("prune")
        .about("Print the working tree of a round")
        .after_help(
            r###"
Restricts the tree to the species of a round, exactly as `round` does, and
prints the result.

Notes:
* Leaves not in the round are removed, then internal nodes left without
  children. A root with a single child is replaced by that child.
* With `--target`, the tree is rerooted at the midpoint of the target's branch.
* `--json` prints a nested {label, branch_length, children} snapshot instead
  of Newick.

Examples:
1. Keep three species:
   phylodist prune tree.nwk -n Homo_sapiens -n Pan_troglodytes -n Mus_musculus

2. Reroot on a target, as JSON:
   phylodist prune tree.nwk -t "Felis catus" --json

"###,
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .num_args(1)
                .help("Reroot on this species"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Output the tree snapshot as JSON"),
        );
    utils::round_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let target = args.get_one::<String>("target");

    //----------------------------
    // Operating
    //----------------------------
    let coordinator = utils::configure(args, target.map(String::as_str))?;

    let out_string = if args.get_flag("json") {
        serde_json::to_string(&coordinator.active_tree_snapshot())?
    } else {
        coordinator
            .active_tree()
            .map(|tree| tree.to_newick())
            .unwrap_or_default()
    };

    //----------------------------
    // Output
    //----------------------------
    writer.write_all((out_string + "\n").as_ref())?;

    Ok(())
}
