use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "pipeline_action_lambda";
const LAMBDA_BINARY: &str = "action_runtime";
const CRATES: [&str; 2] = ["pipeline_action_core", LAMBDA_PACKAGE];

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the pipeline action workspace",
    long_about = "Runs CI checks and packages the custom action runtime\n\
                  as a Lambda deployment zip."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the unit and integration tests of every crate
    Test,
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build the action runtime and zip it as a Lambda `bootstrap`
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory receiving the deployment zip
        #[arg(long, env = "ACTION_DIST_DIR", default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy and tests
    Check,
    /// Debug build of the Lambda package
    Package,
    /// Check followed by package
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn run_cargo(args: &[&str]) -> Result<(), String> {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("failed to execute cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!(
            "cargo {} exited with {}",
            args.join(" "),
            status.code().unwrap_or(1)
        ))
    }
}

fn test_crates() -> Result<(), String> {
    for name in CRATES {
        step(&format!("Test {name}"));
        run_cargo(&["test", "-p", name])?;
    }
    Ok(())
}

fn ci_check() -> Result<(), String> {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"])?;

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])?;

    test_crates()
}

fn package_action_runtime(
    target: &str,
    profile: BuildProfile,
    dist_dir: &Path,
) -> Result<PathBuf, String> {
    step("Build action runtime");
    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args)?;

    step("Package Lambda zip");
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(binary_name(LAMBDA_BINARY, target));
    fs::create_dir_all(dist_dir).map_err(|error| {
        format!(
            "failed to create dist directory '{}': {error}",
            dist_dir.display()
        )
    })?;

    let zip_path = dist_dir.join(format!("{LAMBDA_BINARY}.zip"));
    write_bootstrap_zip(&binary_path, &zip_path)?;
    Ok(zip_path)
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

/// Lambda's custom runtime expects the executable at the zip root as `bootstrap`.
fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) -> Result<(), String> {
    let binary = fs::read(binary_path).map_err(|error| {
        format!(
            "expected lambda binary at '{}': {error}",
            binary_path.display()
        )
    })?;
    let file = fs::File::create(zip_path)
        .map_err(|error| format!("failed to create '{}': {error}", zip_path.display()))?;

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .map_err(|error| format!("failed to start bootstrap entry: {error}"))?;
    zip.write_all(&binary)
        .map_err(|error| format!("failed to write bootstrap entry: {error}"))?;
    zip.finish()
        .map_err(|error| format!("failed to finish lambda zip: {error}"))?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Test => test_crates(),
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check()?,
                CiJob::Package => {
                    run_cargo(&["build", "-p", LAMBDA_PACKAGE, "--bin", LAMBDA_BINARY])?
                }
                CiJob::All => {
                    ci_check()?;
                    run_cargo(&["build", "-p", LAMBDA_PACKAGE, "--bin", LAMBDA_BINARY])?;
                }
            }
            eprintln!("\nCI job passed.");
            Ok(())
        }
        Commands::ServerlessPackage {
            target,
            profile,
            dist_dir,
        } => {
            let zip_path = package_action_runtime(&target, profile, &dist_dir)?;
            eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
            Ok(())
        }
    }
}

fn main() {
    if let Err(message) = run(Cli::parse()) {
        eprintln!("error: {message}");
        exit(1);
    }
}
