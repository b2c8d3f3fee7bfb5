use std::collections::BTreeSet;

use crate::{error::LayervalResult, plug::Plug, value::Value};

/// One node in the override input chain feeding a plug.
///
/// When an override is applied to the scene, the engine wires intermediary
/// "apply" nodes in front of the attribute; the original authored value stays
/// reachable through the innermost apply node's `original` input. Unit
/// conversion nodes can be spliced anywhere in the chain and carry no
/// authored value of their own.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChainNode {
    pub name: String,
    pub kind: ChainNodeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainNodeKind {
    ApplyOverride,
    UnitConversion,
}

/// Attribute name on apply nodes that carries the pre-override value.
pub const ORIGINAL_ATTR: &str = "original";

/// Read access to the scene graph that owns the nodes and attributes.
///
/// Everything the resolver knows about the scene goes through this trait;
/// implementations are expected to be cheap, synchronous lookups.
pub trait SceneGraph {
    /// Look up a plug by `node.attribute` path.
    fn plug(&self, path: &str) -> LayervalResult<Plug>;

    /// Parent plug for a compound child, `None` at top level.
    fn parent(&self, plug: &Plug) -> Option<Plug>;

    /// Child plugs in slot order; empty unless the attribute is compound.
    fn children(&self, plug: &Plug) -> Vec<Plug>;

    /// Long and short attribute-name aliases for the plug.
    fn names(&self, plug: &Plug) -> BTreeSet<String>;

    /// The plug's value as the scene currently evaluates it.
    fn live_value(&self, plug: &Plug) -> LayervalResult<Value>;

    /// The apply-override chain feeding the plug, outermost first. Empty when
    /// no layer override has ever been applied to the attribute.
    fn override_input_chain(&self, plug: &Plug) -> Vec<ChainNode>;
}
