use clap::*;
use phylodist::libs::names;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("variants")
        .about("List the spellings a species name is matched under")
        .after_help(
            r###"
Two names refer to the same species when their variant sets overlap.

Output columns: name, variant. A name with no usable characters has no
variants and prints nothing.

Examples:
1. phylodist variants "Homo sapiens"

2. phylodist variants Homo_sapiens_ott770315 --canonical

"###,
        )
        .arg(
            Arg::new("names")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Species names"),
        )
        .arg(
            Arg::new("canonical")
                .long("canonical")
                .short('c')
                .action(ArgAction::SetTrue)
                .help("Only print the two-token Genus_species form"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let is_canonical = args.get_flag("canonical");

    for name in args.get_many::<String>("names").unwrap() {
        if is_canonical {
            if let Some(canon) = names::canonical(name) {
                writer.write_fmt(format_args!("{}\t{}\n", name, canon))?;
            }
            continue;
        }

        for variant in names::variants(name) {
            writer.write_fmt(format_args!("{}\t{}\n", name, variant))?;
        }
    }

    Ok(())
}
