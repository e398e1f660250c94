//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::build::{check_executors, validate_spec, BuildContext, BuildError, BuildRunner};
use crate::config::{
    find_config, load_config, load_config_file, merge_cli_overrides, CliOverrides,
};
use crate::descriptor::OutputFormat;
use crate::manifest::PackageManifest;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// tspack - Declarative bundle pipeline descriptor and build runner
#[derive(Parser)]
#[command(name = "tspack")]
#[command(about = "Declarative bundle pipeline descriptor and build runner")]
#[command(version)]
pub struct Cli {
    /// Path to bundle.toml (default: walk up from the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved build targets
    Targets {
        /// Emit the full pipeline descriptor as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the pipeline descriptor without building
    Validate,
    /// Build targets
    Build {
        /// Only build targets matching these names or formats (default: all)
        targets: Vec<String>,

        /// Resolve and validate, but don't execute stages or write outputs
        #[arg(long)]
        dry_run: bool,

        /// Stop at the first failing target
        #[arg(long)]
        fail_fast: bool,

        /// Number of targets to build in parallel
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// Override the entry module for all targets
        #[arg(long)]
        entry: Option<PathBuf>,

        /// Override the output directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Override the module format for all targets (iife, esm, cjs)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Disable sourcemap emission for all targets
        #[arg(long)]
        no_sourcemap: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Targets { json } => {
            run_targets(cli.config.as_deref(), cli.verbose, json)
        }
        Commands::Validate => run_validate(cli.config.as_deref(), cli.verbose),
        Commands::Build {
            targets,
            dry_run,
            fail_fast,
            jobs,
            entry,
            out,
            format,
            no_sourcemap,
        } => {
            let overrides = CliOverrides {
                out,
                entry,
                sourcemap: no_sourcemap.then_some(false),
                format,
            };
            run_build(
                cli.config.as_deref(),
                cli.verbose,
                &targets,
                &overrides,
                dry_run,
                fail_fast,
                jobs,
            )
        }
    }
}

/// Load configuration and manifest into a build context.
///
/// Argument and file problems are reported here; the caller gets back a
/// ready exit code on failure.
fn load_context(
    config_path: Option<&Path>,
    verbose: bool,
    overrides: &CliOverrides,
) -> Result<BuildContext, ExitCode> {
    let config_path = match config_path {
        Some(p) => {
            if !p.exists() {
                eprintln!("Error: Config file not found: {}", p.display());
                return Err(ExitCode::from(EXIT_INVALID_ARGS));
            }
            Some(p.to_path_buf())
        }
        None => find_config(),
    };

    let project_root = match &config_path {
        Some(p) => p
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        None => match env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                eprintln!("Error: Cannot determine working directory: {}", e);
                return Err(ExitCode::from(EXIT_ERROR));
            }
        },
    };

    let load_result = match &config_path {
        Some(p) => load_config_file(p),
        None => load_config(None),
    };
    let mut config = match load_result {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };
    merge_cli_overrides(&mut config, overrides);

    let manifest = match PackageManifest::load_from_dir(&project_root) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    if verbose {
        match &config_path {
            Some(p) => println!("Config: {}", p.display()),
            None => println!("Config: (defaults, no bundle.toml found)"),
        }
        println!(
            "Manifest: {}",
            if manifest.is_some() { "package.json" } else { "(none)" }
        );
    }

    Ok(BuildContext::new(config, project_root)
        .with_manifest(manifest)
        .with_verbose(verbose))
}

/// Execute the targets command
fn run_targets(config_path: Option<&Path>, verbose: bool, json: bool) -> ExitCode {
    let ctx = match load_context(config_path, verbose, &CliOverrides::default()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let spec = ctx.pipeline();

    if json {
        match serde_json::to_string_pretty(&spec) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: Failed to serialize descriptor: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    for target in spec.targets() {
        println!("{} ({})", target.name, target.output.format);
        println!("  entry: {}", target.entry.display());
        println!("  dest: {}", target.output.file.display());
        if let Some(global) = &target.output.global {
            println!("  global: {}", global);
        }
        println!("  sourcemap: {}", target.output.sourcemap);

        let kinds: Vec<String> = target.stages.iter().map(|s| s.kind.to_string()).collect();
        println!("  stages: {}", kinds.join(", "));
        if !target.output.post.is_empty() {
            let kinds: Vec<String> =
                target.output.post.iter().map(|s| s.kind.to_string()).collect();
            println!("  post: {}", kinds.join(", "));
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the validate command
fn run_validate(config_path: Option<&Path>, verbose: bool) -> ExitCode {
    let ctx = match load_context(config_path, verbose, &CliOverrides::default()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let spec = ctx.pipeline();

    let issues = validate_spec(&spec, &ctx);
    if issues.is_empty() {
        println!("Pipeline valid: {} target(s)", spec.len());
        return ExitCode::from(EXIT_SUCCESS);
    }

    eprintln!("Pipeline validation failed:");
    for issue in &issues {
        eprintln!("  - {}", issue);
    }
    ExitCode::from(EXIT_ERROR)
}

/// Execute the build command
#[allow(clippy::too_many_arguments)]
fn run_build(
    config_path: Option<&Path>,
    verbose: bool,
    targets: &[String],
    overrides: &CliOverrides,
    dry_run: bool,
    fail_fast: bool,
    jobs: usize,
) -> ExitCode {
    let mut ctx = match load_context(config_path, verbose, overrides) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    if !targets.is_empty() {
        ctx = ctx.with_filter(targets.to_vec());
    }

    let spec = ctx.pipeline();
    if spec.is_empty() && !targets.is_empty() {
        eprintln!("Error: No targets match: {}", targets.join(", "));
        return ExitCode::from(EXIT_ERROR);
    }

    // Surface missing executors before the spec itself when doing a dry
    // run, since a dry run never applies them.
    let runner = BuildRunner::new(ctx)
        .with_dry_run(dry_run)
        .with_fail_fast(fail_fast)
        .with_jobs(jobs);

    let result = if dry_run {
        let issues = validate_spec(&spec, runner.context());
        if !issues.is_empty() {
            eprintln!("Error: {}", BuildError::Invalid(issues));
            return ExitCode::from(EXIT_ERROR);
        }
        for issue in check_executors(&spec, runner.registry()) {
            eprintln!("Warning: {}", issue);
        }
        runner.build_spec(&spec)
    } else {
        match runner.build() {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    };

    for output in result.all_outputs() {
        println!("Bundled: {}", output.display());
    }
    println!("{}", result.summary());

    if result.is_success() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
