use crate::node::{EmptyNodeId, NodeId};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Identifier of a directed link between two nodes
///
/// Unlike the routing graph, which is undirected, load and backlog are
/// accounted per direction: `(a, b)` and `(b, a)` are two different
/// identifiers.
///
/// ```
/// # use telesim_core::{link::LinkId, node::NodeId};
/// let a: NodeId = "A".parse().unwrap();
/// let b: NodeId = "B".parse().unwrap();
///
/// let ab = LinkId::new(a.clone(), b.clone());
/// assert_ne!(ab, LinkId::new(b, a));
/// assert_eq!(ab.to_string(), "A-B");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId {
    from: NodeId,
    to: NodeId,
}

/// Error returned when parsing a [`LinkId`] from a `FROM-TO` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkIdParseError {
    #[error("expecting a link of the form `FROM-TO'")]
    MissingSeparator,
    #[error("{0}")]
    Node(#[from] EmptyNodeId),
}

impl LinkId {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn from(&self) -> &NodeId {
        &self.from
    }

    #[inline]
    pub fn to(&self) -> &NodeId {
        &self.to
    }

    /// the same link, travelled the other way
    #[must_use = "function does not modify the current value"]
    pub fn reversed(&self) -> Self {
        Self::new(self.to.clone(), self.from.clone())
    }

    #[inline]
    pub fn into_nodes(self) -> (NodeId, NodeId) {
        (self.from, self.to)
    }
}

impl FromStr for LinkId {
    type Err = LinkIdParseError;

    /// Parses `"A-B"` (or `"A->B"`) into the link from `A` to `B`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once("->")
            .or_else(|| s.split_once('-'))
            .ok_or(LinkIdParseError::MissingSeparator)?;
        Ok(Self::new(from.parse()?, to.parse()?))
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> NodeId {
        label.parse().unwrap()
    }

    #[test]
    fn directed() {
        let ab = LinkId::new(id("A"), id("B"));
        assert_ne!(ab, LinkId::new(id("B"), id("A")));
        assert_eq!(ab.reversed(), LinkId::new(id("B"), id("A")));
        assert_eq!(ab.reversed().reversed(), ab);
    }

    #[test]
    fn parse() {
        let ab = LinkId::new(id("A"), id("B"));
        assert_eq!("A-B".parse::<LinkId>().unwrap(), ab);
        assert_eq!("A->B".parse::<LinkId>().unwrap(), ab);
        assert_eq!(" A - B ".parse::<LinkId>().unwrap(), ab);
    }

    #[test]
    fn parse_invalid_strings() {
        assert_eq!(
            "AB".parse::<LinkId>(),
            Err(LinkIdParseError::MissingSeparator)
        );
        assert_eq!(
            "A-".parse::<LinkId>(),
            Err(LinkIdParseError::Node(EmptyNodeId))
        );
    }
}
