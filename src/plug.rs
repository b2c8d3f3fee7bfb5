use std::fmt;

use crate::error::{LayervalError, LayervalResult};

/// A reference to one attribute on one node.
///
/// Plugs are read-only views into the external scene graph; two plugs are the
/// same plug iff they name the same node and attribute. Parent/child structure
/// for compound attributes is queried through [`crate::scene::SceneGraph`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Plug {
    pub node: String,
    pub attribute: String,
}

impl Plug {
    pub fn new(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attribute: attribute.into(),
        }
    }

    /// Parse a `node.attribute` path.
    pub fn parse(path: &str) -> LayervalResult<Self> {
        match path.split_once('.') {
            Some((node, attribute)) if !node.is_empty() && !attribute.is_empty() => {
                Ok(Self::new(node, attribute))
            }
            _ => Err(LayervalError::attribute_not_found(path)),
        }
    }

    pub fn path(&self) -> String {
        format!("{}.{}", self.node, self.attribute)
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_first_dot() {
        let plug = Plug::parse("rs.frameRange.start").unwrap();
        assert_eq!(plug.node, "rs");
        assert_eq!(plug.attribute, "frameRange.start");
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert!(Plug::parse("noDotHere").is_err());
        assert!(Plug::parse(".attr").is_err());
        assert!(Plug::parse("node.").is_err());
    }

    #[test]
    fn identity_is_node_plus_attribute() {
        assert_eq!(Plug::new("cam", "fl"), Plug::new("cam", "fl"));
        assert_ne!(Plug::new("cam", "fl"), Plug::new("cam2", "fl"));
    }
}
