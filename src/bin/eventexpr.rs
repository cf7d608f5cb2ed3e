use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use eventexpr::{Compiler, EvalThreading, MapRecord, NamedFunc, Schema};

#[derive(Parser, Debug)]
#[command(name = "eventexpr", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression on every event and print one JSON value per line.
    Eval(EvalArgs),
    /// Count the events passing all cuts.
    Select(SelectArgs),
    /// Print the canonical name and shape of a compiled expression.
    Name(NameArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input events, one JSON object per line.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Schema JSON mapping variable names to "scalar" or "vector".
    /// Inferred from the first event when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Evaluate on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Pool size when `--parallel` is set.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Expression text.
    #[arg(long)]
    expr: String,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct SelectArgs {
    /// Selection expression; repeat for several cuts.
    #[arg(long = "cut", required = true)]
    cuts: Vec<String>,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct NameArgs {
    /// Expression text.
    #[arg(long)]
    expr: String,

    /// Schema JSON.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Events file used to infer the schema when `--schema` is absent.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Eval(args) => cmd_eval(args),
        Command::Select(args) => cmd_select(args),
        Command::Name(args) => cmd_name(args),
    }
}

fn read_events(path: &Path) -> anyhow::Result<Vec<MapRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read events '{}'", path.display()))?;
    MapRecord::parse_json_lines(&text).with_context(|| format!("parse events '{}'", path.display()))
}

fn load_schema(path: Option<&Path>, events: &[MapRecord]) -> anyhow::Result<Schema> {
    match path {
        Some(p) => Ok(Schema::from_path(p)?),
        None => events
            .first()
            .map(Schema::infer)
            .context("no events to infer a schema from; pass --schema"),
    }
}

fn threading(input: &InputArgs) -> EvalThreading {
    EvalThreading {
        parallel: input.parallel,
        threads: input.threads,
        ..EvalThreading::default()
    }
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<()> {
    let events = read_events(&args.input.in_path)?;
    let schema = load_schema(args.input.schema.as_deref(), &events)?;
    let func: NamedFunc = Compiler::new(schema).compile(&args.expr)?;
    let threading = threading(&args.input);

    let mut out = std::io::stdout().lock();
    if func.is_scalar() {
        for v in eventexpr::eval_scalar_batch(&func, &events, &threading)? {
            writeln!(out, "{}", serde_json::to_string(&v)?)?;
        }
    } else {
        for v in eventexpr::eval_vector_batch(&func, &events, &threading)? {
            writeln!(out, "{}", serde_json::to_string(&v)?)?;
        }
    }
    Ok(())
}

fn cmd_select(args: SelectArgs) -> anyhow::Result<()> {
    let events = read_events(&args.input.in_path)?;
    let schema = load_schema(args.input.schema.as_deref(), &events)?;
    let compiler: Compiler = Compiler::new(schema);
    let cuts = args
        .cuts
        .iter()
        .map(|c| {
            compiler
                .compile(c)
                .with_context(|| format!("compile cut '{c}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let n = eventexpr::count_passing(&cuts, &events, &threading(&args.input))?;
    println!("{n}");
    eprintln!("{n} of {} events passed", events.len());
    Ok(())
}

fn cmd_name(args: NameArgs) -> anyhow::Result<()> {
    let events = match &args.in_path {
        Some(p) => read_events(p)?,
        None => Vec::new(),
    };
    let schema = load_schema(args.schema.as_deref(), &events)?;
    let func: NamedFunc = Compiler::new(schema).compile(&args.expr)?;
    println!("{}\t{}", func.name(), func.shape());
    Ok(())
}
