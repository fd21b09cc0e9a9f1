use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use trellis::{
    ExtensionId, ExtensionState, LayoutDef, LayoutResult, LayoutVisitor, MountExtension,
    MountItem, MountTarget, Point, Rect, RenderExtension, RenderTree, TrellisResult, reduce,
};

#[derive(Parser, Debug)]
#[command(name = "trellis", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the flattened render tree of a layout JSON.
    Flatten(FlattenArgs),
    /// Mount two layout generations and print the reconciliation ops.
    Diff(DiffArgs),
}

#[derive(Parser, Debug)]
struct FlattenArgs {
    /// Input layout JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct DiffArgs {
    /// First-generation layout JSON.
    #[arg(long)]
    a: PathBuf,

    /// Second-generation layout JSON.
    #[arg(long)]
    b: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Flatten(args) => cmd_flatten(args),
        Command::Diff(args) => cmd_diff(args),
    }
}

fn read_layout_json(path: &Path) -> anyhow::Result<LayoutDef> {
    let def = LayoutDef::from_path(path)
        .with_context(|| format!("load layout '{}'", path.display()))?;
    def.validate()
        .with_context(|| format!("validate layout '{}'", path.display()))?;
    Ok(def)
}

fn cmd_flatten(args: FlattenArgs) -> anyhow::Result<()> {
    let def = read_layout_json(&args.in_path)?;
    let layout = def.lower();
    let tree = reduce(&layout, 0, 0, &[])?;

    for position in 0..tree.len() {
        let Some(node) = tree.node_at(position) else {
            continue;
        };
        let bounds = node.bounds();
        let abs = node.absolute_bounds();
        let padding = node
            .padding()
            .map(|p| format!(" padding=({},{},{},{})", p.left, p.top, p.right, p.bottom))
            .unwrap_or_default();
        println!(
            "{position:>3} id={} {:?} bounds=({},{},{},{}) abs=({},{},{},{}){padding}",
            node.unit().id().0,
            node.unit().render_type(),
            bounds.left,
            bounds.top,
            bounds.right,
            bounds.bottom,
            abs.left,
            abs.top,
            abs.right,
            abs.bottom,
        );
    }

    eprintln!("flattened {} node(s)", tree.len());
    Ok(())
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<()> {
    let def_a = read_layout_json(&args.a)?;
    let def_b = read_layout_json(&args.b)?;
    let layout_a = def_a.lower();
    let layout_b = def_b.lower();

    let log = Arc::new(MountLog);
    let extensions: Vec<Arc<dyn RenderExtension>> = vec![log];

    let tree_a = reduce(&layout_a, 0, 0, &extensions)?;
    let tree_b = reduce(&layout_b, 0, 0, &extensions)?;
    let size_a = tree_a.len();
    let size_b = tree_b.len();

    let mut target = MountTarget::new(extensions);
    target.mount(tree_a)?;
    print_log(target.current_tree(), "gen a");
    target.mount(tree_b)?;
    print_log(target.current_tree(), "gen b");

    eprintln!("reconciled {size_a} -> {size_b} node(s), {} mounted", target.content_count());
    Ok(())
}

fn print_log(tree: Option<&RenderTree>, label: &str) {
    let Some(state) = tree.and_then(|t| t.extension_state(MOUNT_LOG_ID)) else {
        return;
    };
    let Some(state) = state.downcast_ref::<MountLogState>() else {
        return;
    };
    println!("{label}: {} layout node(s) visited", state.visited);
    for event in &state.events {
        println!("{label}: {event}");
    }
}

const MOUNT_LOG_ID: ExtensionId = ExtensionId(1);

/// Records layout visits and mount transitions for one generation.
struct MountLog;

#[derive(Default)]
struct MountLogState {
    visited: usize,
    events: Vec<String>,
}

impl RenderExtension for MountLog {
    fn id(&self) -> ExtensionId {
        MOUNT_LOG_ID
    }

    fn create_state(&self) -> ExtensionState {
        Box::new(MountLogState::default())
    }

    fn layout_visitor(&self) -> Option<&dyn LayoutVisitor> {
        Some(self)
    }

    fn mount_hooks(&self) -> Option<&dyn MountExtension> {
        Some(self)
    }
}

impl LayoutVisitor for MountLog {
    fn visit(
        &self,
        _layout: &dyn LayoutResult,
        _bounds: Rect,
        _absolute_origin: Point,
        state: &mut ExtensionState,
    ) -> TrellisResult<()> {
        if let Some(state) = state.downcast_mut::<MountLogState>() {
            state.visited += 1;
        }
        Ok(())
    }
}

impl MountExtension for MountLog {
    fn on_mount(&self, item: &MountItem, state: Option<&mut ExtensionState>) -> TrellisResult<()> {
        record(state, format!("mount position {} id={}", item.position(), item.id().0));
        Ok(())
    }

    fn on_unmount(
        &self,
        item: &MountItem,
        state: Option<&mut ExtensionState>,
    ) -> TrellisResult<()> {
        record(state, format!("unmount position {} id={}", item.position(), item.id().0));
        Ok(())
    }
}

fn record(state: Option<&mut ExtensionState>, event: String) {
    if let Some(state) = state.and_then(|s| s.downcast_mut::<MountLogState>()) {
        state.events.push(event);
    }
}
