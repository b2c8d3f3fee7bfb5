use crate::{
    error::{LayervalError, LayervalResult},
    value::Value,
};

/// One authored override inside a layer's collection tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Override {
    /// Attribute the override targets; may be a long or short name.
    pub attribute_name: String,
    pub enabled: bool,
    /// Local-render overrides only apply to in-session preview renders and
    /// are excluded from batch resolution.
    pub is_local_render: bool,
    pub kind: OverrideKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum OverrideKind {
    /// Replaces the accumulated value outright.
    Absolute { value: Value },
    /// Transforms the accumulated value as `value * multiply + offset`.
    Relative { multiply: Value, offset: Value },
    /// Redirects a connection to an explicit node; never a value override.
    Unique { target_node: String },
}

impl OverrideKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absolute { .. } => "absolute",
            Self::Relative { .. } => "relative",
            Self::Unique { .. } => "unique",
        }
    }
}

/// A group of overrides and nested collections sharing a node selection.
///
/// `members` is the resolved node selection, supplied by the authoring side;
/// nothing here recomputes membership.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Collection {
    pub name: String,
    pub members: Vec<String>,
    pub children: Vec<CollectionItem>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum CollectionItem {
    Collection(Collection),
    Override(Override),
}

/// One entry of a flattened override stack: the override plus the node
/// selection of its enclosing collection.
#[derive(Clone, Copy, Debug)]
pub struct FlatOverride<'a> {
    pub op: &'a Override,
    pub members: &'a [String],
}

/// Nesting bound; deeper trees are treated as authoring corruption.
const MAX_COLLECTION_DEPTH: usize = 64;

/// Linearize a collection tree depth-first in authored order.
///
/// Position in the returned stack is priority: later entries are stronger.
/// Traversal uses an explicit work stack so corrupt, pathologically nested
/// authoring data fails with an error instead of exhausting the call stack.
pub fn flatten(root: &Collection) -> LayervalResult<Vec<FlatOverride<'_>>> {
    enum Work<'a> {
        Collection(&'a Collection, usize),
        Override(&'a Override, &'a [String]),
    }

    let mut out = Vec::new();
    let mut work = vec![Work::Collection(root, 0)];
    while let Some(item) = work.pop() {
        match item {
            Work::Override(op, members) => out.push(FlatOverride { op, members }),
            Work::Collection(collection, depth) => {
                if depth > MAX_COLLECTION_DEPTH {
                    return Err(LayervalError::invariant(format!(
                        "collection '{}' nested deeper than {MAX_COLLECTION_DEPTH} levels",
                        collection.name
                    )));
                }
                for child in collection.children.iter().rev() {
                    match child {
                        CollectionItem::Override(op) => {
                            work.push(Work::Override(op, &collection.members));
                        }
                        CollectionItem::Collection(nested) => {
                            work.push(Work::Collection(nested, depth + 1));
                        }
                    }
                }
            }
        }
    }
    Ok(out)
}
