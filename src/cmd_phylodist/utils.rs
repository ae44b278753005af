use clap::*;
use phylodist::libs::config::EngineConfig;
use phylodist::libs::dataset;
use phylodist::libs::distance::DistanceMetrics;
use phylodist::libs::round::RoundCoordinator;

/// Arguments shared by every subcommand that configures a round.
pub fn round_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("infile")
            .required(true)
            .num_args(1)
            .index(1)
            .help("Input Newick file. [stdin] for standard input"),
    )
    .arg(
        Arg::new("node")
            .long("node")
            .short('n')
            .num_args(1)
            .action(ArgAction::Append)
            .help("Species of the round"),
    )
    .arg(
        Arg::new("file")
            .long("file")
            .short('f')
            .num_args(1)
            .help("A file contains species names, one per line"),
    )
    .arg(
        Arg::new("dataset")
            .long("dataset")
            .short('d')
            .num_args(1)
            .help("A JSON array of species records; their scientific names join the round"),
    )
    .arg(
        Arg::new("mode")
            .long("mode")
            .num_args(1)
            .help("Distance transform: linear or log [default: linear]"),
    )
    .arg(
        Arg::new("strength")
            .long("strength")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true)
            .help("Weight of the log component, clamped to [0, 1] [default: 0.6]"),
    )
    .arg(
        Arg::new("threshold")
            .long("threshold")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .help("Skip the all-pairs statistics above this many species [default: 400]"),
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

/// Species names from --node, --file and --dataset. Empty means every leaf.
pub fn allowed_names(args: &ArgMatches) -> anyhow::Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();

    if let Some(nodes) = args.get_many::<String>("node") {
        names.extend(nodes.cloned());
    }

    if let Some(file) = args.get_one::<String>("file") {
        names.extend(
            intspan::read_first_column(file)
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty() && !name.starts_with('#')),
        );
    }

    if let Some(json) = args.get_one::<String>("dataset") {
        let records = dataset::from_file(json)?;
        names.extend(dataset::scientific_names(&records));
    }

    Ok(names)
}

pub fn engine_config(args: &ArgMatches) -> anyhow::Result<EngineConfig> {
    let config = EngineConfig::default().with_overrides(
        args.get_one::<usize>("threshold").copied(),
        args.get_one::<String>("mode").map(String::as_str),
        args.get_one::<f64>("strength").copied(),
    )?;
    Ok(config)
}

/// Load the tree and configure a round from the shared arguments.
pub fn configure(args: &ArgMatches, target: Option<&str>) -> anyhow::Result<RoundCoordinator> {
    let infile = args.get_one::<String>("infile").unwrap();
    let allowed = allowed_names(args)?;

    let mut coordinator = RoundCoordinator::new(engine_config(args)?);
    coordinator.load_tree(infile, None);
    if !coordinator.is_loaded() {
        anyhow::bail!("Failed to load a tree from {}", infile);
    }

    coordinator.configure_round(allowed.as_slice(), target);
    if !coordinator.is_configured() {
        anyhow::bail!("None of the requested species are in the tree");
    }

    Ok(coordinator)
}

/// `raw edges effective score`, tab separated
pub fn format_metrics(metrics: &DistanceMetrics, score: Option<u8>) -> String {
    format!(
        "{:.4}\t{}\t{:.4}\t{}",
        metrics.raw,
        metrics.edges,
        metrics.effective,
        score.map_or_else(|| "NA".to_string(), |s| s.to_string())
    )
}
