use crate::{
    error::{LayervalError, LayervalResult},
    layer::Layer,
    matching::{PlugMatch, classify},
    overrides::{FlatOverride, Override, OverrideKind},
    plug::Plug,
    scene::SceneGraph,
};

/// Filtering applied while collecting a plug's override stack.
#[derive(Clone, Copy, Debug)]
pub struct CollectOptions {
    pub skip_disabled: bool,
    pub skip_local_render: bool,
    /// Stop collecting once an absolute override fully replaces the value.
    pub stop_at_absolute: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            skip_disabled: true,
            skip_local_render: true,
            stop_at_absolute: true,
        }
    }
}

impl CollectOptions {
    /// No filtering and no truncation; used for stack diagnostics.
    pub fn everything() -> Self {
        Self {
            skip_disabled: false,
            skip_local_render: false,
            stop_at_absolute: false,
        }
    }
}

/// Collect the overrides in `layer` that affect `plug`, strongest first.
///
/// With `stop_at_absolute`, collection truncates after an absolute override
/// matching the plug exactly or through its parent; nothing weaker can change
/// the result. An absolute override matching only a child shadows one
/// compound slot and does not truncate.
pub fn collect(
    scene: &dyn SceneGraph,
    plug: &Plug,
    layer: &Layer,
    options: CollectOptions,
) -> LayervalResult<Vec<(PlugMatch, Override)>> {
    if layer.is_base {
        return Ok(Vec::new());
    }

    let flat = layer.flattened_overrides()?;

    // Aliases of the plug, its parent and its children. An override naming
    // anything else cannot match, so it is rejected before any target query.
    let mut candidate_names = scene.names(plug);
    if let Some(parent) = scene.parent(plug) {
        candidate_names.extend(scene.names(&parent));
    }
    for child in scene.children(plug) {
        candidate_names.extend(scene.names(&child));
    }

    let mut collected = Vec::new();
    for entry in flat.iter().rev() {
        let op = entry.op;
        if options.skip_disabled && !op.enabled {
            continue;
        }
        if options.skip_local_render && op.is_local_render {
            continue;
        }
        if !candidate_names.contains(&op.attribute_name) {
            continue;
        }

        let targets = target_plugs(scene, entry)?;
        let Some(matched) = classify(scene, plug, &targets) else {
            continue;
        };

        let truncates = options.stop_at_absolute
            && matches!(op.kind, OverrideKind::Absolute { .. })
            && matches!(matched, PlugMatch::Exact | PlugMatch::Parent(_));
        collected.push((matched, op.clone()));
        if truncates {
            break;
        }
    }

    tracing::debug!(
        plug = %plug,
        layer = %layer.name,
        count = collected.len(),
        "collected override stack"
    );
    Ok(collected)
}

/// Resolve the plugs an override applies to.
///
/// Value overrides target the attribute on every member of their enclosing
/// collection; unique overrides carry an explicit node. A member that simply
/// lacks the attribute contributes nothing. The engine's target query is
/// known to trip an internal assertion for some attributes (frame-range
/// overrides among them); when it does, fall back to trusting the authored
/// node/attribute pair.
fn target_plugs(scene: &dyn SceneGraph, entry: &FlatOverride<'_>) -> LayervalResult<Vec<Plug>> {
    let attribute = &entry.op.attribute_name;
    let nodes: Vec<&str> = match &entry.op.kind {
        OverrideKind::Unique { target_node } => vec![target_node.as_str()],
        _ => entry.members.iter().map(String::as_str).collect(),
    };

    let mut plugs = Vec::new();
    for node in nodes {
        match scene.plug(&format!("{node}.{attribute}")) {
            Ok(plug) => plugs.push(plug),
            Err(LayervalError::AttributeNotFound(_)) => continue,
            Err(LayervalError::EngineQuery(path)) => {
                tracing::warn!(%path, "target query failed in engine, using authored pair");
                plugs.push(Plug::new(node, attribute.clone()));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(plugs)
}
