use trellis::{LayoutDef, MountTarget, reduce};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let s = include_str!("../tests/data/simple.json");
    let def: LayoutDef = serde_json::from_str(s)?;
    def.validate()?;

    let tree = reduce(&def.lower(), 0, 0, &[])?;
    println!("generation of {} node(s)", tree.len());

    let mut target = MountTarget::default();
    target.mount(tree)?;
    println!("{} content instance(s) mounted", target.content_count());

    // A second pass over the same layout only rebinds.
    let tree = reduce(&def.lower(), 0, 0, &[])?;
    target.mount(tree)?;
    println!("{} content instance(s) after remount", target.content_count());

    target.unmount_all()?;
    Ok(())
}
