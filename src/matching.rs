use crate::{plug::Plug, scene::SceneGraph};

/// How a queried plug relates to an override's target plug.
///
/// The index identifies the compound slot involved: for `Parent` it is the
/// queried plug's position among the target's children, for `Child` it is the
/// matched child's position among the queried plug's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PlugMatch {
    Exact,
    Parent(usize),
    Child(usize),
}

/// Classify the strongest relationship between `queried` and any of the
/// override's target plugs.
///
/// Per candidate, exact identity beats a parent match beats a child match;
/// the first candidate to match wins. Pure; safe to call redundantly.
pub fn classify(scene: &dyn SceneGraph, queried: &Plug, targets: &[Plug]) -> Option<PlugMatch> {
    let parent = scene.parent(queried);
    let children = scene.children(queried);

    for target in targets {
        if target == queried {
            return Some(PlugMatch::Exact);
        }
        if let Some(parent) = &parent
            && target == parent
        {
            // Which slot of the compound the queried plug occupies.
            if let Some(index) = scene.children(parent).iter().position(|c| c == queried) {
                return Some(PlugMatch::Parent(index));
            }
        }
        if let Some(index) = children.iter().position(|c| c == target) {
            return Some(PlugMatch::Child(index));
        }
    }
    None
}
