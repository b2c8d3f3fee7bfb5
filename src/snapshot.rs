//! Serde scene snapshot and the in-memory backend built from it.
//!
//! A snapshot is a JSON document describing nodes (with attribute values,
//! short-name aliases, compound children and apply-override chains) and
//! render layers (with their collection trees). Building it yields a
//! [`MemoryScene`] / [`MemoryLayers`] pair implementing the scene-graph and
//! layer-registry seams, which is what the CLI and the test suite run
//! against.

use std::collections::{BTreeSet, HashMap};

use crate::{
    error::{LayervalError, LayervalResult},
    layer::{Layer, LayerRegistry},
    overrides::{Collection, CollectionItem, Override, OverrideKind},
    plug::Plug,
    scene::{ChainNode, SceneGraph},
    value::Value,
};

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeSnapshot>,
    #[serde(default)]
    pub layers: Vec<LayerSnapshot>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeSnapshot>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AttributeSnapshot {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    /// Leaf value; compounds leave this unset and list `children` instead.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub children: Vec<AttributeSnapshot>,
    /// Apply-override chain feeding the attribute, outermost first.
    #[serde(default)]
    pub override_chain: Vec<ChainNode>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayerSnapshot {
    pub name: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub needs_membership_update: bool,
    #[serde(default)]
    pub needs_apply_update: bool,
    #[serde(default)]
    pub base: bool,
    #[serde(default)]
    pub collections: Vec<CollectionSnapshot>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CollectionSnapshot {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub items: Vec<CollectionItemSnapshot>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionItemSnapshot {
    Collection(CollectionSnapshot),
    Override(RawOverride),
}

/// An override as authored, before the kind string is checked.
///
/// The kind stays a plain string here so that data written by a newer
/// authoring tool surfaces as [`LayervalError::UnsupportedOverride`] instead
/// of a generic parse failure.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RawOverride {
    pub attribute: String,
    pub kind: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub local_render: bool,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub multiply: Option<Value>,
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub target_node: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RawOverride {
    pub fn to_override(&self) -> LayervalResult<Override> {
        let kind = match self.kind.as_str() {
            "absolute" => OverrideKind::Absolute {
                value: self.value.clone().ok_or_else(|| {
                    LayervalError::snapshot(format!(
                        "absolute override on '{}' has no value",
                        self.attribute
                    ))
                })?,
            },
            "relative" => OverrideKind::Relative {
                multiply: self.multiply.clone().unwrap_or(Value::Float(1.0)),
                offset: self.offset.clone().unwrap_or(Value::Float(0.0)),
            },
            "unique" => OverrideKind::Unique {
                target_node: self.target_node.clone().ok_or_else(|| {
                    LayervalError::snapshot(format!(
                        "unique override on '{}' has no target node",
                        self.attribute
                    ))
                })?,
            },
            other => return Err(LayervalError::unsupported_override(other)),
        };
        Ok(Override {
            attribute_name: self.attribute.clone(),
            enabled: self.enabled,
            is_local_render: self.local_render,
            kind,
        })
    }
}

impl SceneSnapshot {
    pub fn from_json(text: &str) -> LayervalResult<Self> {
        serde_json::from_str(text).map_err(|err| LayervalError::snapshot(err.to_string()))
    }

    /// Build the in-memory backend pair. Fails on malformed attribute data
    /// and on override kinds this resolver does not know.
    pub fn build(self) -> LayervalResult<(MemoryScene, MemoryLayers)> {
        let scene = MemoryScene::from_nodes(&self.nodes)?;
        let layers = MemoryLayers::from_layers(&self.layers)?;
        Ok((scene, layers))
    }
}

#[derive(Debug)]
struct AttrRecord {
    names: BTreeSet<String>,
    value: Option<Value>,
    parent: Option<Plug>,
    children: Vec<Plug>,
    chain: Vec<ChainNode>,
}

/// In-memory scene graph over a snapshot.
#[derive(Debug, Default)]
pub struct MemoryScene {
    records: HashMap<Plug, AttrRecord>,
    by_path: HashMap<String, Plug>,
    failing_queries: BTreeSet<String>,
}

impl MemoryScene {
    fn from_nodes(nodes: &[NodeSnapshot]) -> LayervalResult<Self> {
        let mut scene = Self::default();
        for node in nodes {
            for attr in &node.attributes {
                scene.register(&node.name, attr, None)?;
            }
        }
        Ok(scene)
    }

    fn register(
        &mut self,
        node: &str,
        attr: &AttributeSnapshot,
        parent: Option<&Plug>,
    ) -> LayervalResult<()> {
        if attr.value.is_some() && !attr.children.is_empty() {
            return Err(LayervalError::snapshot(format!(
                "attribute '{}.{}' has both a leaf value and children",
                node, attr.name
            )));
        }

        let plug = Plug::new(node, attr.name.clone());
        self.by_path.insert(plug.path(), plug.clone());
        if let Some(short) = &attr.short_name {
            self.by_path.insert(format!("{node}.{short}"), plug.clone());
        }
        if let Some(parent) = parent {
            // Long-form child path, e.g. "rs.frameRange.start".
            self.by_path
                .insert(format!("{}.{}", parent.path(), attr.name), plug.clone());
        }

        let mut names = BTreeSet::from([attr.name.clone()]);
        if let Some(short) = &attr.short_name {
            names.insert(short.clone());
        }

        let children: Vec<Plug> = attr
            .children
            .iter()
            .map(|child| Plug::new(node, child.name.clone()))
            .collect();
        for child in &attr.children {
            self.register(node, child, Some(&plug))?;
        }

        let record = AttrRecord {
            names,
            value: attr.value.clone(),
            parent: parent.cloned(),
            children,
            chain: attr.override_chain.clone(),
        };
        if self.records.insert(plug.clone(), record).is_some() {
            return Err(LayervalError::snapshot(format!(
                "duplicate attribute '{plug}'"
            )));
        }
        Ok(())
    }

    /// Make subsequent `plug()` lookups of `path` fail with an engine-query
    /// error, mimicking the engine assertion seen on some target queries.
    pub fn fail_plug_queries(&mut self, path: impl Into<String>) {
        self.failing_queries.insert(path.into());
    }

    fn record(&self, plug: &Plug) -> Option<&AttrRecord> {
        self.records.get(plug)
    }
}

impl SceneGraph for MemoryScene {
    fn plug(&self, path: &str) -> LayervalResult<Plug> {
        if self.failing_queries.contains(path) {
            return Err(LayervalError::engine_query(path));
        }
        self.by_path
            .get(path)
            .cloned()
            .ok_or_else(|| LayervalError::attribute_not_found(path))
    }

    fn parent(&self, plug: &Plug) -> Option<Plug> {
        self.record(plug).and_then(|r| r.parent.clone())
    }

    fn children(&self, plug: &Plug) -> Vec<Plug> {
        self.record(plug).map(|r| r.children.clone()).unwrap_or_default()
    }

    fn names(&self, plug: &Plug) -> BTreeSet<String> {
        self.record(plug).map(|r| r.names.clone()).unwrap_or_default()
    }

    fn live_value(&self, plug: &Plug) -> LayervalResult<Value> {
        let record = self
            .record(plug)
            .ok_or_else(|| LayervalError::attribute_not_found(plug.path()))?;
        if !record.children.is_empty() {
            let mut slots = Vec::with_capacity(record.children.len());
            for child in &record.children {
                slots.push(self.live_value(child)?);
            }
            return Ok(Value::Compound(slots));
        }
        record.value.clone().ok_or_else(|| {
            LayervalError::snapshot(format!("attribute '{plug}' has no recorded value"))
        })
    }

    fn override_input_chain(&self, plug: &Plug) -> Vec<ChainNode> {
        self.record(plug).map(|r| r.chain.clone()).unwrap_or_default()
    }
}

/// In-memory layer registry over a snapshot.
#[derive(Debug, Default)]
pub struct MemoryLayers {
    layers: Vec<Layer>,
    refresh_failures_remaining: u32,
    refreshes_applied: u32,
}

impl MemoryLayers {
    fn from_layers(layers: &[LayerSnapshot]) -> LayervalResult<Self> {
        let built = layers
            .iter()
            .map(build_layer)
            .collect::<LayervalResult<Vec<_>>>()?;
        Ok(Self {
            layers: built,
            refresh_failures_remaining: 0,
            refreshes_applied: 0,
        })
    }

    /// Make the next `count` refresh attempts fail, mimicking the engine's
    /// flaky first re-apply.
    pub fn fail_refreshes(&mut self, count: u32) {
        self.refresh_failures_remaining = count;
    }

    /// Number of refreshes that have been applied successfully.
    pub fn refreshes_applied(&self) -> u32 {
        self.refreshes_applied
    }
}

fn build_layer(snapshot: &LayerSnapshot) -> LayervalResult<Layer> {
    let children = snapshot
        .collections
        .iter()
        .map(|c| Ok(CollectionItem::Collection(build_collection(c)?)))
        .collect::<LayervalResult<Vec<_>>>()?;
    Ok(Layer {
        name: snapshot.name.clone(),
        is_visible: snapshot.visible,
        needs_membership_update: snapshot.needs_membership_update,
        needs_apply_update: snapshot.needs_apply_update,
        is_base: snapshot.base,
        root: Collection {
            name: format!("{}_collections", snapshot.name),
            members: Vec::new(),
            children,
        },
    })
}

fn build_collection(snapshot: &CollectionSnapshot) -> LayervalResult<Collection> {
    let children = snapshot
        .items
        .iter()
        .map(|item| match item {
            CollectionItemSnapshot::Collection(nested) => {
                Ok(CollectionItem::Collection(build_collection(nested)?))
            }
            CollectionItemSnapshot::Override(raw) => {
                Ok(CollectionItem::Override(raw.to_override()?))
            }
        })
        .collect::<LayervalResult<Vec<_>>>()?;
    Ok(Collection {
        name: snapshot.name.clone(),
        members: snapshot.members.clone(),
        children,
    })
}

impl LayerRegistry for MemoryLayers {
    fn resolve(&self, name: &str) -> LayervalResult<Layer> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
            .cloned()
            .ok_or_else(|| LayervalError::layer_not_found(name))
    }

    fn visible_layer(&self) -> Option<Layer> {
        self.layers.iter().find(|layer| layer.is_visible).cloned()
    }

    fn refresh(&mut self, layer: &Layer) -> LayervalResult<()> {
        if self.refresh_failures_remaining > 0 {
            self.refresh_failures_remaining -= 1;
            return Err(LayervalError::engine_refresh(&layer.name));
        }
        let stored = self
            .layers
            .iter_mut()
            .find(|stored| stored.name == layer.name)
            .ok_or_else(|| LayervalError::layer_not_found(&layer.name))?;
        stored.needs_membership_update = false;
        stored.needs_apply_update = false;
        self.refreshes_applied += 1;
        Ok(())
    }
}
