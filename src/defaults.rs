use crate::{
    error::LayervalResult,
    plug::Plug,
    scene::{ChainNodeKind, ORIGINAL_ATTR, SceneGraph},
    value::Value,
};

/// The attribute's value with zero layer overrides applied.
///
/// When a layer has been applied to the scene, apply nodes shadow the
/// attribute; the authored value survives on the innermost apply node's
/// `original` input. Unit conversion nodes spliced into the chain are
/// ignored so the read is not polluted by conversion artifacts. Compound
/// plugs without a chain of their own are assembled slot by slot, since the
/// engine attaches apply nodes to leaf plugs.
pub fn default_value(scene: &dyn SceneGraph, plug: &Plug) -> LayervalResult<Value> {
    let chain = scene.override_input_chain(plug);
    let terminal = chain
        .iter()
        .filter(|node| node.kind == ChainNodeKind::ApplyOverride)
        .next_back();
    if let Some(node) = terminal {
        let original = scene.plug(&format!("{}.{ORIGINAL_ATTR}", node.name))?;
        return scene.live_value(&original);
    }

    let children = scene.children(plug);
    if children.is_empty() {
        return scene.live_value(plug);
    }
    let mut slots = Vec::with_capacity(children.len());
    for child in &children {
        slots.push(default_value(scene, child)?);
    }
    Ok(Value::Compound(slots))
}
