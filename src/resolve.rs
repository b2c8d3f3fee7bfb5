use std::collections::HashMap;

use crate::{
    collect::{CollectOptions, collect},
    defaults::default_value,
    error::{LayervalError, LayervalResult},
    layer::{Layer, LayerRegistry},
    matching::PlugMatch,
    overrides::{Override, OverrideKind},
    plug::Plug,
    scene::SceneGraph,
    value::Value,
};

/// Caller-supplied memo for repeated resolutions over an unchanged scene.
///
/// Keyed by plug; drop or clear it after any scene mutation. There is no
/// process-wide cache: callers that want caching pass one in explicitly.
#[derive(Debug, Default)]
pub struct ResolveCache {
    defaults: HashMap<Plug, Value>,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.defaults.clear();
    }
}

/// Computes an attribute's value inside a render layer without switching the
/// scene to that layer.
pub struct Resolver;

impl Resolver {
    /// Resolve `attribute_path` (a `node.attribute` path) inside `layer_name`.
    #[tracing::instrument(skip(scene, layers))]
    pub fn attr_in_layer(
        scene: &dyn SceneGraph,
        layers: &mut dyn LayerRegistry,
        attribute_path: &str,
        layer_name: &str,
    ) -> LayervalResult<Value> {
        let plug = scene.plug(attribute_path)?;
        let layer = layers.resolve(layer_name)?;
        Self::plug_in_layer(scene, layers, &plug, &layer)
    }

    /// As [`Self::attr_in_layer`], memoizing default values in `cache`.
    #[tracing::instrument(skip(scene, layers, cache))]
    pub fn attr_in_layer_cached(
        scene: &dyn SceneGraph,
        layers: &mut dyn LayerRegistry,
        cache: &mut ResolveCache,
        attribute_path: &str,
        layer_name: &str,
    ) -> LayervalResult<Value> {
        let plug = scene.plug(attribute_path)?;
        let layer = layers.resolve(layer_name)?;

        if layer.is_visible {
            return Self::plug_in_layer(scene, layers, &plug, &layer);
        }

        let base = match cache.defaults.get(&plug) {
            Some(value) => value.clone(),
            None => {
                let value = default_value(scene, &plug)?;
                cache.defaults.insert(plug.clone(), value.clone());
                value
            }
        };
        fold_overrides(scene, &plug, &layer, base)
    }

    /// Resolve an already-looked-up plug inside an already-resolved layer.
    pub fn plug_in_layer(
        scene: &dyn SceneGraph,
        layers: &mut dyn LayerRegistry,
        plug: &Plug,
        layer: &Layer,
    ) -> LayervalResult<Value> {
        // The visible layer is already embodied by the scene; read it live,
        // after forcing a re-apply if authoring left it stale.
        if layer.is_visible {
            if layer.needs_refresh() {
                refresh_with_retry(layers, layer)?;
            }
            return scene.live_value(plug);
        }

        let base = default_value(scene, plug)?;
        fold_overrides(scene, plug, layer, base)
    }
}

fn fold_overrides(
    scene: &dyn SceneGraph,
    plug: &Plug,
    layer: &Layer,
    base: Value,
) -> LayervalResult<Value> {
    let stack = collect(scene, plug, layer, CollectOptions::default())?;

    // The stack is strongest-first; composition applies weakest-first so the
    // stronger overrides land on top.
    let mut value = base;
    for (matched, op) in stack.iter().rev() {
        value = apply_override(value, *matched, op)?;
    }
    Ok(value)
}

fn refresh_with_retry(layers: &mut dyn LayerRegistry, layer: &Layer) -> LayervalResult<()> {
    if let Err(first) = layers.refresh(layer) {
        // The engine intermittently rejects the first re-apply of a layer
        // carrying compound-attribute overrides; one retry, then give up.
        tracing::warn!(layer = %layer.name, error = %first, "layer refresh failed, retrying once");
        layers
            .refresh(layer)
            .map_err(|_| LayervalError::engine_refresh(&layer.name))?;
    }
    Ok(())
}

fn apply_override(value: Value, matched: PlugMatch, op: &Override) -> LayervalResult<Value> {
    match (&op.kind, matched) {
        (OverrideKind::Absolute { value: replacement }, PlugMatch::Exact) => {
            Ok(replacement.clone())
        }
        (OverrideKind::Absolute { value: replacement }, PlugMatch::Parent(index)) => {
            Ok(replacement.component(index)?.clone())
        }
        (OverrideKind::Absolute { value: replacement }, PlugMatch::Child(index)) => {
            let mut value = value;
            value.set_component(index, replacement.clone())?;
            Ok(value)
        }
        (OverrideKind::Relative { multiply, offset }, PlugMatch::Exact) => {
            value.mul_add(multiply, offset)
        }
        (OverrideKind::Relative { multiply, offset }, PlugMatch::Parent(index)) => {
            value.mul_add(multiply.component(index)?, offset.component(index)?)
        }
        (OverrideKind::Relative { multiply, offset }, PlugMatch::Child(index)) => {
            let slot = value.component(index)?.mul_add(multiply, offset)?;
            let mut value = value;
            value.set_component(index, slot)?;
            Ok(value)
        }
        (OverrideKind::Unique { target_node }, _) => Err(LayervalError::invariant(format!(
            "unique override (target '{target_node}') reached the value fold for {}",
            op.attribute_name
        ))),
    }
}
