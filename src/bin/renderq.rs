use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "renderq", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a render job on the headless host.
    Run(RunArgs),
    /// Print the work a job would do as JSON, without rendering.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Job config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Override the job's output directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Record renders without writing image files.
    #[arg(long)]
    no_write: bool,

    /// Deliver a cancel event instead of the timer tick after N ticks.
    #[arg(long)]
    cancel_after: Option<u64>,

    /// Sleep for the poll interval between timer ticks.
    #[arg(long)]
    pace: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Job config JSON.
    #[arg(long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn read_job(path: &Path) -> anyhow::Result<renderq::JobConfig> {
    let job = renderq::JobConfig::load(path)
        .with_context(|| format!("load job config '{}'", path.display()))?;
    job.validate()
        .with_context(|| format!("validate job config '{}'", path.display()))?;
    Ok(job)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut job = read_job(&args.config)?;
    if let Some(out) = args.out {
        job.output_dir = out;
    }

    let scene = job.prepare_scene().context("prepare scene")?;
    let opts = renderq::HeadlessOpts {
        write_images: !args.no_write,
        pace_timers: args.pace,
    };
    let mut host = renderq::HeadlessHost::new(scene, opts);
    let mut op = job.build_operator();

    let status = host
        .run_operator(&mut op, args.cancel_after)
        .context("render job failed")?;

    let files: usize = host.renders().iter().map(|r| r.files.len()).sum();
    println!(
        "{:?}: {} renders, {} files under {}",
        status,
        host.renders().len(),
        files,
        job.output_dir.display()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let job = read_job(&args.config)?;
    let plan = job.plan()?;
    let out = serde_json::to_string_pretty(&plan).context("serialize plan")?;
    println!("{out}");
    Ok(())
}
