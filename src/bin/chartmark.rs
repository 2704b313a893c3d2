use std::path::PathBuf;

use anyhow::Context as _;
use chartmark::{CompileOptions, Compiler, TechniqueRegistry};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chartmark", version)]
struct Cli {
    /// Log compile progress to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an annotation document into a Vega-Lite chart.
    Compile(CompileArgs),
    /// Render only the base chart of a chart or document file.
    RenderChart(RenderChartArgs),
    /// Compile every document in a directory.
    Batch(BatchArgs),
    /// List the registered techniques.
    Techniques,
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Input annotation document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output Vega-Lite JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Fail on the first technique that cannot be applied.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct RenderChartArgs {
    /// Input chart (or annotation document) JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output Vega-Lite JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory of annotation documents.
    #[arg(long)]
    in_dir: PathBuf,

    /// Directory for `<name>.vl.json` outputs.
    #[arg(long)]
    out_dir: PathBuf,

    /// Compile documents in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Fail a document on the first technique that cannot be applied.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::RenderChart(args) => cmd_render_chart(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Techniques => cmd_techniques(),
    }
}

fn compiler(strict: bool) -> Compiler {
    Compiler::new(TechniqueRegistry::builtin(), CompileOptions { strict })
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let out = chartmark::compile_path(&args.in_path, &compiler(args.strict))
        .with_context(|| format!("compile '{}'", args.in_path.display()))?;
    for skip in &out.skipped {
        eprintln!(
            "warning: skipped {} in annotation {} ('{}'): {}",
            skip.technique, skip.annotation_index, skip.annotation_id, skip.error
        );
    }
    chartmark::write_chart(&args.out, &out.chart)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render_chart(args: RenderChartArgs) -> anyhow::Result<()> {
    let chart = chartmark::render_chart_path(&args.in_path)
        .with_context(|| format!("render chart '{}'", args.in_path.display()))?;
    chartmark::write_chart(&args.out, &chart)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let report = chartmark::batch_compile(
        &args.in_dir,
        &args.out_dir,
        &compiler(args.strict),
        args.parallel,
    )?;
    for entry in &report.written {
        eprintln!("wrote {}", entry.output.display());
    }
    for failure in &report.failed {
        eprintln!("failed {}: {}", failure.input.display(), failure.error);
    }
    if !report.is_clean() {
        anyhow::bail!(
            "{} of {} documents failed",
            report.failed.len(),
            report.failed.len() + report.written.len()
        );
    }
    Ok(())
}

fn cmd_techniques() -> anyhow::Result<()> {
    for (slot, names) in TechniqueRegistry::builtin().slots() {
        println!("{slot}: {}", names.join(", "));
    }
    Ok(())
}
