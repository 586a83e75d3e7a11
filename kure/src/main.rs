use std::path::PathBuf;
use std::process;

use is_terminal::IsTerminal;
use kure_layout::{ApplicationFileMode, FilePer, FluxPlacement, Grouping, KustomizationMode, LayoutRules};
use kure_scheme::StripLevel;
use kure_writer::WriterConfig;
use tracing::{error, info};

use kure::Error;

fn main() {
    use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command, ValueHint};

    let cmd = Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .subcommand_required(true)
        .subcommands([
            Command::new("compile")
                .about("compile a fleet directory into a GitOps-ready directory tree")
                .args([
                    Arg::new("fleet_dir")
                        .required(true)
                        .value_hint(ValueHint::DirPath)
                        .help("directory containing cluster.yaml and the fleet's ApplicationWrapper files"),
                    Arg::new("out")
                        .long("out")
                        .env("KURE_OUT_DIR")
                        .value_hint(ValueHint::DirPath)
                        .default_value("out")
                        .help("directory the compiled `{cluster}-repo` tree is written under"),
                    Arg::new("tar")
                        .long("tar")
                        .value_hint(ValueHint::FilePath)
                        .help("write a tar archive at this path instead of a directory tree"),
                    Arg::new("provider")
                        .long("provider")
                        .help("override cluster.yaml's gitOps.type")
                        .value_parser(["flux", "argocd"]),
                    Arg::new("node_grouping").long("node-grouping").value_parser(["by-name", "flat"]),
                    Arg::new("bundle_grouping").long("bundle-grouping").value_parser(["by-name", "flat"]),
                    Arg::new("application_grouping")
                        .long("application-grouping")
                        .value_parser(["by-name", "flat"]),
                    Arg::new("application_file_mode")
                        .long("application-file-mode")
                        .value_parser(["per-resource", "single"]),
                    Arg::new("file_per").long("file-per").value_parser(["resource", "kind"]),
                    Arg::new("kustomization_mode")
                        .long("kustomization-mode")
                        .value_parser(["explicit", "recursive"]),
                    Arg::new("flux_placement").long("flux-placement").value_parser(["separate", "integrated"]),
                    Arg::new("cluster_name").long("cluster-name").help("optional manifests-dir prefix segment"),
                    Arg::new("manifests_dir").long("manifests-dir").default_value("clusters"),
                    Arg::new("strip").long("strip").value_parser(["none", "basic", "full"]).default_value("full"),
                    Arg::new("verbose").short('v').action(ArgAction::Count).help("increase log verbosity"),
                ]),
            Command::new("validate")
                .about("parse and validate a fleet directory without planning or writing output")
                .args([
                    Arg::new("fleet_dir")
                        .required(true)
                        .value_hint(ValueHint::DirPath)
                        .help("directory containing cluster.yaml and the fleet's ApplicationWrapper files"),
                    Arg::new("verbose").short('v').action(ArgAction::Count).help("increase log verbosity"),
                ]),
        ]);

    let matches = cmd.get_matches();
    let verbosity = matches
        .subcommand()
        .map(|(_, m)| m.get_count("verbose"))
        .unwrap_or_default();
    install_tracing(verbosity);

    let result = match matches.subcommand() {
        Some(("compile", m)) => run_compile(m),
        Some(("validate", m)) => run_validate(m),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("{e}");
        process::exit(1);
    }
}

fn install_tracing(verbosity: u8) {
    use tracing_subscriber::{filter::EnvFilter, prelude::*};

    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let collector = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(if std::io::stdout().is_terminal() {
            Some(tracing_subscriber::fmt::layer())
        } else {
            None
        })
        .with(if std::io::stdout().is_terminal() {
            None
        } else {
            Some(tracing_subscriber::fmt::layer().json())
        });
    let _ = tracing::subscriber::set_global_default(collector);
}

fn run_validate(m: &clap::ArgMatches) -> kure::Result<()> {
    let fleet_dir = PathBuf::from(m.get_one::<String>("fleet_dir").unwrap());
    kure::validate(&fleet_dir)?;
    info!(dir = %fleet_dir.display(), "fleet is valid");
    Ok(())
}

fn run_compile(m: &clap::ArgMatches) -> kure::Result<()> {
    let fleet_dir = PathBuf::from(m.get_one::<String>("fleet_dir").unwrap());
    let out_dir = PathBuf::from(m.get_one::<String>("out").unwrap());

    let mut cluster = kure::load_fleet(&fleet_dir)?;
    if let Some(provider) = m.get_one::<String>("provider") {
        cluster.gitops.provider = provider.clone();
    }

    let rules = rules_from_args(m);
    let plan = kure::compile_cluster(&cluster, &rules)?;

    let base_path = out_dir.join(format!("{}-repo", cluster.gitops.cluster_name));
    let mut config = WriterConfig::new(&base_path);
    config.strip = parse_strip(m.get_one::<String>("strip").map(String::as_str).unwrap_or("full"));

    match m.get_one::<String>("tar") {
        Some(tar_path) => {
            let file = std::fs::File::create(tar_path).map_err(Error::from)?;
            kure::write_tar(&plan, &config, &rules, file)?;
            info!(path = %tar_path, "wrote tar archive");
        }
        None => {
            kure::write_fs(&plan, &config, &rules)?;
            info!(dir = %base_path.display(), "wrote directory tree");
        }
    }
    Ok(())
}

fn rules_from_args(m: &clap::ArgMatches) -> LayoutRules {
    let mut rules = LayoutRules::default();
    if let Some(v) = m.get_one::<String>("node_grouping") {
        rules.node_grouping = parse_grouping(v);
    }
    if let Some(v) = m.get_one::<String>("bundle_grouping") {
        rules.bundle_grouping = parse_grouping(v);
    }
    if let Some(v) = m.get_one::<String>("application_grouping") {
        rules.application_grouping = parse_grouping(v);
    }
    if let Some(v) = m.get_one::<String>("application_file_mode") {
        rules.application_file_mode = match v.as_str() {
            "single" => ApplicationFileMode::Single,
            _ => ApplicationFileMode::PerResource,
        };
    }
    if let Some(v) = m.get_one::<String>("file_per") {
        rules.file_per = match v.as_str() {
            "kind" => FilePer::Kind,
            _ => FilePer::Resource,
        };
    }
    if let Some(v) = m.get_one::<String>("kustomization_mode") {
        rules.kustomization_mode = match v.as_str() {
            "recursive" => KustomizationMode::Recursive,
            _ => KustomizationMode::Explicit,
        };
    }
    if let Some(v) = m.get_one::<String>("flux_placement") {
        rules.flux_placement = match v.as_str() {
            "integrated" => FluxPlacement::Integrated,
            _ => FluxPlacement::Separate,
        };
    }
    if let Some(v) = m.get_one::<String>("cluster_name") {
        rules.cluster_name = Some(v.clone());
    }
    if let Some(v) = m.get_one::<String>("manifests_dir") {
        rules.manifests_dir = v.clone();
    }
    rules
}

fn parse_grouping(value: &str) -> Grouping {
    match value {
        "flat" => Grouping::Flat,
        _ => Grouping::ByName,
    }
}

fn parse_strip(value: &str) -> StripLevel {
    match value {
        "none" => StripLevel::None,
        "basic" => StripLevel::Basic,
        _ => StripLevel::Full,
    }
}
