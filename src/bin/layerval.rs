use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layerval::{
    CollectOptions, LayerRegistry as _, Resolver, SceneGraph as _, SceneSnapshot, collect,
    default_value,
};

#[derive(Parser, Debug)]
#[command(name = "layerval", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve an attribute's value inside a layer.
    Get(GetArgs),
    /// Print an attribute's value with zero layer overrides applied.
    Default(DefaultArgs),
    /// Dump the override stack matched against an attribute, strongest first.
    Stack(StackArgs),
}

#[derive(Parser, Debug)]
struct GetArgs {
    /// Scene snapshot JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Attribute path, e.g. "renderSettings.startFrame".
    #[arg(long)]
    attr: String,

    /// Layer name.
    #[arg(long)]
    layer: String,
}

#[derive(Parser, Debug)]
struct DefaultArgs {
    /// Scene snapshot JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Attribute path.
    #[arg(long)]
    attr: String,
}

#[derive(Parser, Debug)]
struct StackArgs {
    /// Scene snapshot JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Attribute path.
    #[arg(long)]
    attr: String,

    /// Layer name.
    #[arg(long)]
    layer: String,

    /// Include disabled and local-render overrides and keep collecting past
    /// an absolute override.
    #[arg(long)]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Get(args) => cmd_get(args),
        Command::Default(args) => cmd_default(args),
        Command::Stack(args) => cmd_stack(args),
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<SceneSnapshot> {
    let f = File::open(path).with_context(|| format!("open snapshot '{}'", path.display()))?;
    let r = BufReader::new(f);
    let snapshot: SceneSnapshot =
        serde_json::from_reader(r).with_context(|| "parse snapshot JSON")?;
    Ok(snapshot)
}

fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let (scene, mut layers) = read_snapshot(&args.scene)?.build()?;
    let value = Resolver::attr_in_layer(&scene, &mut layers, &args.attr, &args.layer)?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn cmd_default(args: DefaultArgs) -> anyhow::Result<()> {
    let (scene, _layers) = read_snapshot(&args.scene)?.build()?;
    let plug = scene.plug(&args.attr)?;
    let value = default_value(&scene, &plug)?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn cmd_stack(args: StackArgs) -> anyhow::Result<()> {
    let (scene, layers) = read_snapshot(&args.scene)?.build()?;
    let plug = scene.plug(&args.attr)?;
    let layer = layers.resolve(&args.layer)?;

    if let Some(visible) = layers.visible_layer() {
        eprintln!("visible layer: {}", visible.name);
    }

    let options = if args.all {
        CollectOptions::everything()
    } else {
        CollectOptions::default()
    };
    let stack = collect(&scene, &plug, &layer, options)?;
    for (index, (matched, op)) in stack.iter().enumerate() {
        println!(
            "{index}: {} {} on '{}' (enabled={}, local_render={}) -> {}",
            op.kind.label(),
            serde_json::to_string(matched)?,
            op.attribute_name,
            op.enabled,
            op.is_local_render,
            serde_json::to_string(&op.kind)?,
        );
    }
    Ok(())
}
