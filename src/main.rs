//! Lavadeploy CLI - remote deployment runner
//!
//! Usage: lavadeploy <COMMAND>
//!
//! Commands:
//!   deploy  Run the full deploy sequence against the configured host
//!   plan    Print the command sequence a deploy would issue
//!   doctor  Validate the local setup (ssh client, key file, host)

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use lavadeploy::{execute, scratch_dir, Config, Plan, SshTransport};

/// Lavadeploy - remote deployment runner
#[derive(Parser, Debug)]
#[command(name = "lavadeploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format for CI
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full deploy sequence against the configured host
    Deploy {
        /// Path to the config file
        #[arg(short, long, default_value = "deploy.toml")]
        config: PathBuf,

        /// Branch to deploy (overrides DRONE_BRANCH)
        #[arg(long)]
        branch: Option<String>,

        /// Commit to pin (overrides DRONE_COMMIT)
        #[arg(long)]
        commit: Option<String>,

        /// Print the plan without connecting anywhere
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the command sequence a deploy would issue
    Plan {
        /// Path to the config file
        #[arg(short, long, default_value = "deploy.toml")]
        config: PathBuf,

        /// Branch to deploy (overrides DRONE_BRANCH)
        #[arg(long)]
        branch: Option<String>,

        /// Commit to pin (overrides DRONE_COMMIT)
        #[arg(long)]
        commit: Option<String>,
    },

    /// Validate the local setup (ssh client, key file, host)
    Doctor {
        /// Path to the config file
        #[arg(short, long, default_value = "deploy.toml")]
        config: PathBuf,

        /// Exit non-zero on any failed check
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy { config, branch, commit, dry_run } => {
            cmd_deploy(&config, branch, commit, dry_run, cli.json, cli.verbose)
        }
        Commands::Plan { config, branch, commit } => {
            cmd_plan(&config, branch, commit, cli.json)
        }
        Commands::Doctor { config, strict } => {
            cmd_doctor(&config, strict, cli.json)
        }
    }
}

fn load_config(path: &Path, branch: Option<String>, commit: Option<String>) -> Result<Config> {
    let config = Config::load_or_default(path)?;
    Ok(config.with_flag_overrides(branch, commit))
}

fn print_plan(plan: &Plan, config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({
            "event": "plan",
            "branch": config.branch,
            "image": config.image_tag(),
            "workdir": plan.workdir,
            "steps": plan.all_steps().collect::<Vec<_>>(),
        }))?);
        return Ok(());
    }

    println!("📦 Lavadeploy Plan");
    println!("Branch: {}", config.branch);
    if config.pin_commit {
        println!("Commit: {}", config.commit);
    }
    println!("Image: {}", config.image_tag());
    println!("Workdir: {}", plan.workdir);
    println!();
    for (i, step) in plan.all_steps().enumerate() {
        let note = if step.tolerate_failure { "  (failure tolerated)" } else { "" };
        println!("  {}. [{}] {}{}", i + 1, step.dir, step.command, note);
    }
    println!();

    Ok(())
}

fn cmd_plan(config_path: &Path, branch: Option<String>, commit: Option<String>, json: bool) -> Result<()> {
    let config = load_config(config_path, branch, commit)?;
    let workdir = scratch_dir();
    let plan = Plan::build(&config, &workdir);
    print_plan(&plan, &config, json)
}

fn cmd_deploy(
    config_path: &Path,
    branch: Option<String>,
    commit: Option<String>,
    dry_run: bool,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let config = load_config(config_path, branch, commit)?;
    let workdir = scratch_dir();
    let plan = Plan::build(&config, &workdir);

    if dry_run {
        return print_plan(&plan, &config, json);
    }

    if config.host.is_empty() {
        return Err(lavadeploy::DeployError::MissingHost.into());
    }

    let key_file = config.resolved_key_file();
    if !json {
        println!("📦 Lavadeploy Deploy");
        println!("Host: {}", config.host);
        println!("Branch: {}", config.branch);
        println!("Image: {}", config.image_tag());
        if verbose > 0 {
            if let Some(key) = &key_file {
                println!("Key: {}", key.display());
            }
            println!("Workdir: {}", workdir);
        }
        println!();
    }

    let transport = SshTransport::new(config.host.as_str(), key_file);

    let report = execute(&transport, &plan, |step| {
        if !json {
            println!("→ [{}] {}", step.dir, step.command);
        }
    })?;

    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({
            "event": "deploy",
            "status": "success",
            "branch": config.branch,
            "image": config.image_tag(),
            "completed": report.completed.len(),
            "tolerated": report.tolerated.len(),
        }))?);
    } else {
        println!("\n📊 Deploy Results:");
        println!("  ✓ Completed: {} commands", report.completed.len());
        if !report.tolerated.is_empty() {
            println!("  ⚠ Tolerated: {} failures", report.tolerated.len());
            for (command, stderr) in &report.tolerated {
                println!("    - {}: {}", command, stderr.trim());
            }
        }
        println!("  ✓ Container {} is starting", config.container_name());
        println!();
    }

    Ok(())
}

fn cmd_doctor(config_path: &Path, strict: bool, json: bool) -> Result<()> {
    let config = load_config(config_path, None, None)?;

    let ssh_ok = SshTransport::is_available();
    let key_file = config.resolved_key_file();
    let key_ok = key_file.as_deref().map(Path::exists).unwrap_or(false);
    let host_ok = !config.host.is_empty();
    let healthy = ssh_ok && key_ok && host_ok;

    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({
            "event": "doctor",
            "status": if healthy { "ok" } else { "issues" },
            "ssh": ssh_ok,
            "key_file": key_ok,
            "host": host_ok,
        }))?);
    } else {
        println!("🩺 Lavadeploy Doctor");
        println!(
            "  {} ssh client {}",
            check_mark(ssh_ok),
            if ssh_ok { "found" } else { "not found in PATH" }
        );
        match &key_file {
            Some(key) if key_ok => println!("  ✓ key file {}", key.display()),
            Some(key) => println!("  ✗ key file {} does not exist", key.display()),
            None => println!("  ✗ no key file and no home directory to derive one"),
        }
        if host_ok {
            println!("  ✓ host {}", config.host);
        } else {
            println!("  ✗ no host configured in {}", config_path.display());
        }
        println!();
    }

    if strict && !healthy {
        anyhow::bail!("doctor found issues");
    }

    Ok(())
}

fn check_mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}
