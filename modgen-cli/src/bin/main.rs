use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use modgen_cfg::ConfigSet;
use modgen_core::defs::{FILE_PREFIX, OUTPUT_DIR};
use modgen_core::emit::ManifestEmitter;
use modgen_core::{BuildSelection, Generator, GeneratorConfig};
use modgen_filesystem::RealFilesystem;
use modgen_ore::path;
use tracing_subscriber::EnvFilter;

/// Generate per-component build projects from an annotated source tree.
#[derive(Debug, Parser)]
#[command(name = "modgen", version)]
struct Args {
    /// Root of the source tree.
    src_dir: String,

    #[command(subcommand)]
    command: Option<Command>,

    /// Enable a component or feature, may be repeated.
    #[arg(long, value_name = "NAME")]
    enable: Vec<String>,
    /// Disable a component or feature, may be repeated.
    #[arg(long, value_name = "NAME")]
    disable: Vec<String>,
    /// Enable every component.
    #[arg(long)]
    enable_all_components: bool,
    /// Disable every component.
    #[arg(long)]
    disable_all_components: bool,

    /// Directory the project manifests are written to.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,
    /// Prefix for file paths inside the generated projects.
    #[arg(long, value_name = "PREFIX")]
    file_prefix: Option<String>,
    /// Override any setting, see `modgen <SRC_DIR> configs`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    settings: Vec<String>,

    /// Log more.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only print errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Generate every project (default).
    Generate,
    /// Print every component and whether it's enabled.
    ListComponents,
    /// Print every feature and whether it's enabled.
    ListFeatures,
    /// Print every setting and its current value.
    Configs,
}

/// A single selection change requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Override {
    One { name: String, enabled: bool },
    All { enabled: bool },
}

/// Every selection override in `matches`, in the order they were passed.
fn ordered_overrides(matches: &ArgMatches) -> Vec<Override> {
    let mut overrides: Vec<(usize, Override)> = Vec::new();

    for (id, enabled) in [("enable", true), ("disable", false)] {
        let (Some(names), Some(indices)) = (matches.get_many::<String>(id), matches.indices_of(id))
        else {
            continue;
        };
        overrides.extend(indices.zip(names).map(|(idx, name)| {
            let name = name.clone();
            (idx, Override::One { name, enabled })
        }));
    }
    for (id, enabled) in [("enable_all_components", true), ("disable_all_components", false)] {
        if !matches.get_flag(id) {
            continue;
        }
        if let Some(idx) = matches.index_of(id) {
            overrides.push((idx, Override::All { enabled }));
        }
    }

    overrides.sort_by_key(|(idx, _)| *idx);
    overrides.into_iter().map(|(_, o)| o).collect()
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,modgen={level},modgen_core={level},modgen_filesystem={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!modgen_ore::env::is_truthy("NO_COLOR"))
        .init();
}

fn spinner(quiet: bool) -> Result<ProgressBar, anyhow::Error> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::new_spinner().with_message("Resolving");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")?
            // For more spinners check out the cli-spinners project:
            // https://github.com/sindresorhus/cli-spinners/blob/master/spinners.json
            .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]),
    );
    Ok(spinner)
}

fn configs(args: &Args) -> Result<ConfigSet, anyhow::Error> {
    let mut builder = ConfigSet::builder();
    modgen_core::cfgs::all_cfgs(&mut builder);
    let configs = builder.build();

    for setting in &args.settings {
        configs.try_assign(setting)?;
    }
    if let Some(output_dir) = &args.output_dir {
        configs.try_update(OUTPUT_DIR.name(), &path::unify_dir(output_dir))?;
    }
    if let Some(file_prefix) = &args.file_prefix {
        configs.try_update(FILE_PREFIX.name(), &path::unify_dir(file_prefix))?;
    }

    Ok(configs)
}

fn apply_overrides(
    selection: &mut BuildSelection<'_>,
    overrides: &[Override],
) -> Result<(), anyhow::Error> {
    for o in overrides {
        match o {
            Override::One { name, enabled } => selection.apply_override(name, *enabled)?,
            Override::All { enabled } => selection.set_all_components(*enabled),
        }
    }
    Ok(())
}

fn run(args: &Args, overrides: &[Override]) -> Result<(), anyhow::Error> {
    let configs = configs(args)?;
    let command = args.command.unwrap_or(Command::Generate);
    if let Command::Configs = command {
        print!("{configs}");
        return Ok(());
    }

    let filesystem = RealFilesystem::new();
    let config = GeneratorConfig {
        src_dir: path::unify_dir(&args.src_dir),
        configs: configs.clone(),
    };
    let generator = Generator::new(config, &filesystem)?;
    let mut selection = generator.selection();
    apply_overrides(&mut selection, overrides)?;

    match command {
        Command::ListComponents => {
            for (component, enabled) in selection.components() {
                let state = if enabled { "enabled" } else { "disabled" };
                println!("{state:>9} | {:<15} | {}", component.name, component.description);
            }
            return Ok(());
        }
        Command::ListFeatures => {
            for (feature, enabled) in selection.features() {
                let state = if enabled { "enabled" } else { "disabled" };
                println!("{state:>9} | {:<15} | {}", feature.name(), feature.desc());
            }
            return Ok(());
        }
        Command::Generate | Command::Configs => (),
    }

    if generator.components().is_empty() {
        tracing::warn!(src_dir = %args.src_dir, "no components found");
        return Ok(());
    }

    if !args.quiet {
        print!("{}", selection.summary());
    }

    let output_dir = OUTPUT_DIR.read(&configs);
    let mut emitter = ManifestEmitter::new(&filesystem, output_dir.as_str());
    let spinner = spinner(args.quiet)?;
    let report = generator.generate_with_progress(&selection, &mut emitter, &mut |name| {
        spinner.set_message(format!("Generating {name}"));
    })?;
    spinner.finish_and_clear();

    if !args.quiet {
        for project in &report.projects {
            println!(
                "{:<15} {:>5} files {:>3} duplicate objects",
                project.name, project.files, project.duplicates
            );
        }
        println!("Wrote {} projects to {output_dir}", report.projects.len());
    }

    Ok(())
}

fn main() -> ExitCode {
    let matches = Args::command().get_matches();
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    init_logging(&args);

    let overrides = ordered_overrides(&matches);
    match run(&args, &overrides) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> (Args, Vec<Override>) {
        let matches = Args::command().try_get_matches_from(argv).unwrap();
        let args = Args::from_arg_matches(&matches).unwrap();
        let overrides = ordered_overrides(&matches);
        (args, overrides)
    }

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn smoketest_overrides_keep_order() {
        let (args, overrides) = parse(&[
            "modgen",
            "src",
            "--disable-all-components",
            "--enable",
            "gob",
            "--disable",
            "nasm",
            "--enable",
            "scumm",
        ]);
        assert_eq!(args.src_dir, "src");
        assert_eq!(
            overrides,
            [
                Override::All { enabled: false },
                Override::One { name: "gob".to_string(), enabled: true },
                Override::One { name: "nasm".to_string(), enabled: false },
                Override::One { name: "scumm".to_string(), enabled: true },
            ]
        );
    }

    #[test]
    fn subcommands_and_settings() {
        let (args, overrides) = parse(&[
            "modgen",
            "src",
            "--set",
            "emit_tree=yes",
            "--output-dir",
            r"out\vc",
            "list-components",
        ]);
        assert!(overrides.is_empty());
        assert!(matches!(args.command, Some(Command::ListComponents)));

        let configs = configs(&args).unwrap();
        assert_eq!(OUTPUT_DIR.read(&configs), "out/vc");
        assert!(modgen_core::defs::EMIT_TREE.read(&configs));
    }

    #[test]
    fn bad_settings_error() {
        let (args, _) = parse(&["modgen", "src", "--set", "nope=1"]);
        assert!(configs(&args).is_err());
    }
}
