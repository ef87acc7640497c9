use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use advent::registry::{self, Context, Options};
use advent::replay::{self, Viewer};
use advent::trace::TraceLog;

#[derive(Parser)]
#[command(name = "advent", about = "Advent of Code solutions with replayable traces")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one day, both parts unless --part is given
    Run(RunArgs),
    /// Step through a trace written by `run -v`
    Replay(ReplayArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    year: u16,
    #[arg(long)]
    day: u8,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1 ..= 2))]
    part: Option<u8>,
    /// Overrides inputs/<year>/day<day>.in
    #[arg(long, conflicts_with = "test")]
    input: Option<PathBuf>,
    /// Reads inputs/<year>/day<day>test<N>.in
    #[arg(long)]
    test: Option<u32>,
    /// Writes debug-<year>-day<day>-Part<n>.txt
    #[arg(short, long)]
    verbose: bool,
    /// Writes output-<year>-day<day>-Part<n>.txt
    #[arg(short, long)]
    output: bool,
    /// Blinks for 2024 day 11, both parts
    #[arg(long)]
    blinks: Option<usize>,
    /// Steps between patrol snapshots for 2024 day 6
    #[arg(long)]
    snapshot_every: Option<usize>,
    /// Trace buffer size before it is appended to the file
    #[arg(long, default_value_t = 256)]
    flush_mb: usize,
}

impl RunArgs {
    fn input_path(&self) -> PathBuf {
        if let Some(path) = &self.input {return path.clone()}
        let name = match self.test {
            Some(test) => format!("day{}test{}.in", self.day, test),
            None => format!("day{}.in", self.day),
        };
        PathBuf::from("inputs").join(self.year.to_string()).join(name)
    }

    fn options(&self) -> Options {
        let mut options = Options {snapshot_every: self.snapshot_every, ..Options::default()};
        if let Some(blinks) = self.blinks {options.blinks = [blinks; 2]}
        options
    }
}

#[derive(Args)]
struct ReplayArgs {
    /// Trace to replay; defaults to the one `run -v` writes for --year/--day/--part
    #[arg(long, conflicts_with_all = ["year", "day"])]
    file: Option<PathBuf>,
    #[arg(long, requires = "day")]
    year: Option<u16>,
    #[arg(long, requires = "year")]
    day: Option<u8>,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1 ..= 2))]
    part: u8,
    /// Start playing immediately
    #[arg(short, long)]
    autoplay: bool,
    /// Show the per-cell heat numbers instead of the side panel
    #[arg(long)]
    heat: bool,
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
}

fn trace_path(year: u16, day: u8, part: u8) -> PathBuf {
    PathBuf::from(format!("debug-{}-day{}-Part{}.txt", year, day, part))
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let solver = registry::solver(args.year, args.day)
        .with_context(|| format!("no solution for {} day {}", args.year, args.day))?;
    let path = args.input_path();
    let raw = fs::read_to_string(&path).with_context(|| format!("could not read {}", path.display()))?;
    let input = raw.replace("\r\n", "\n");
    let input = input.strip_suffix('\n').unwrap_or(&input);

    let parts = match args.part {
        Some(part) => part ..= part,
        None => 1 ..= 2,
    };
    for part in parts {
        let trace = if args.verbose {
            let path = trace_path(args.year, args.day, part);
            TraceLog::to_file(&path, args.flush_mb.saturating_mul(1024 * 1024))
                .with_context(|| format!("could not create {}", path.display()))?
        } else {
            TraceLog::disabled()
        };
        let ctx = Context::new(trace, args.options());

        let start = Instant::now();
        let answer = ctx.solve(solver, part, input)
            .with_context(|| format!("{} day {} part {} failed", args.year, args.day, part))?;
        let elapsed = start.elapsed();

        info!(year = args.year, day = args.day, part, ?elapsed, %answer, "finished running part");
        println!("{}", answer);
        if args.output {
            let path = format!("output-{}-day{}-Part{}.txt", args.year, args.day, part);
            fs::write(&path, &answer).with_context(|| format!("could not write {}", path))?;
        }
    }
    Ok(())
}

fn replay(args: ReplayArgs) -> anyhow::Result<()> {
    let path = match (args.file, args.year, args.day) {
        (Some(file), _, _) => file,
        (None, Some(year), Some(day)) => trace_path(year, day, args.part),
        _ => bail!("pass --file, or --year and --day"),
    };
    let log = fs::read_to_string(&path).with_context(|| format!("could not read {}", path.display()))?;
    let frames = replay::parse_frames(&log).with_context(|| format!("cannot replay {}", path.display()))?;
    info!(frames = frames.len(), path = %path.display(), "replaying trace");

    let viewer = Viewer::new(frames, args.autoplay, args.heat);
    replay::run_terminal(viewer, Duration::from_millis(args.interval_ms)).context("terminal failure")?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Replay(args) => replay(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
