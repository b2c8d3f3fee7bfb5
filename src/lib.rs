//! Virtual render-layer attribute resolution.
//!
//! Scenes organize their render output into named layers, each carrying a
//! stack of attribute overrides. Switching the whole scene to a layer just to
//! read one value is slow and mutates global state; this crate computes what
//! an attribute's value *would be* inside a layer by reconstructing the
//! override composition instead:
//!
//! - Look up the plug and the layer
//! - If the layer is the visible one, read the scene live (refreshing a stale
//!   layer first)
//! - Otherwise fold the attribute's zero-layer default through the layer's
//!   matching override stack

#![forbid(unsafe_code)]

pub mod collect;
pub mod defaults;
pub mod error;
pub mod layer;
pub mod matching;
pub mod overrides;
pub mod plug;
pub mod resolve;
pub mod scene;
pub mod snapshot;
pub mod value;

pub use collect::{CollectOptions, collect};
pub use defaults::default_value;
pub use error::{LayervalError, LayervalResult};
pub use layer::{Layer, LayerRegistry};
pub use matching::{PlugMatch, classify};
pub use overrides::{Collection, CollectionItem, FlatOverride, Override, OverrideKind, flatten};
pub use plug::Plug;
pub use resolve::{ResolveCache, Resolver};
pub use scene::{ChainNode, ChainNodeKind, ORIGINAL_ATTR, SceneGraph};
pub use snapshot::{MemoryLayers, MemoryScene, SceneSnapshot};
pub use value::Value;
