use crate::{
    error::LayervalResult,
    overrides::{Collection, FlatOverride, flatten},
};

/// A named render layer and its override content.
///
/// At most one layer is visible in the owning scene at a time. The staleness
/// flags are set by the engine when authoring edits have not yet been applied
/// to the visible layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub is_visible: bool,
    pub needs_membership_update: bool,
    pub needs_apply_update: bool,
    /// The scene's designated no-override layer; by definition it carries no
    /// overrides and resolution short-circuits to the default value.
    pub is_base: bool,
    pub root: Collection,
}

impl Layer {
    pub fn needs_refresh(&self) -> bool {
        self.needs_membership_update || self.needs_apply_update
    }

    /// The layer's override stack in authored order (weakest first).
    pub fn flattened_overrides(&self) -> LayervalResult<Vec<FlatOverride<'_>>> {
        flatten(&self.root)
    }
}

/// The registry of render layers owned by the external scene.
pub trait LayerRegistry {
    /// Look a layer up by name.
    fn resolve(&self, name: &str) -> LayervalResult<Layer>;

    /// The currently visible layer, if any.
    fn visible_layer(&self) -> Option<Layer>;

    /// Re-apply a layer to itself, clearing its staleness flags. Idempotent
    /// when it succeeds; the engine is known to intermittently reject the
    /// first attempt for layers with compound-attribute overrides.
    fn refresh(&mut self, layer: &Layer) -> LayervalResult<()>;
}
