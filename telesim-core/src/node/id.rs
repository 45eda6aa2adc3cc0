use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt, str, sync::Arc};
use thiserror::Error;

/// The identifier of a node (a switching site) of the simulated network
///
/// Identifiers are short labels (`"A"`, `"B"`, ...) coming from the
/// [`SimulationConfig`]. Cloning is cheap: the label is reference counted
/// so that packet paths can hold many copies of the same identifier.
///
/// [`SimulationConfig`]: crate::config::SimulationConfig
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(Arc<str>);

/// Error returned when building a [`NodeId`] from an empty or blank label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("node identifier cannot be empty")]
pub struct EmptyNodeId;

impl NodeId {
    /// create a node identifier from the given label
    ///
    /// ```
    /// # use telesim_core::node::NodeId;
    /// let a = NodeId::new("A").unwrap();
    /// assert_eq!(a.as_str(), "A");
    /// ```
    pub fn new(label: impl AsRef<str>) -> Result<Self, EmptyNodeId> {
        let label = label.as_ref().trim();
        if label.is_empty() {
            return Err(EmptyNodeId);
        }
        Ok(Self(Arc::from(label)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl str::FromStr for NodeId {
    type Err = EmptyNodeId;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NodeId {
    type Error = EmptyNodeId;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.0.as_ref().to_owned()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
