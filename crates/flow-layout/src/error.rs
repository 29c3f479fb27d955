use std::fmt;
use thiserror::Error;

/// Identity of a link: the names of its two endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub source: String,
    pub target: String,
}

impl LinkKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Errors raised while loading graph data into the engine
///
/// None of these can come out of layout computation itself: once a graph
/// has been accepted, laying it out always succeeds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A link names a node that is not part of the graph
    #[error("link {link} references unknown node {node:?}")]
    UnknownNodeReference { link: LinkKey, node: String },

    /// A link does not move strictly forward through the layers
    #[error("link {link} goes from layer rank {source_rank} to layer rank {target_rank}")]
    BackwardLink {
        link: LinkKey,
        source_rank: usize,
        target_rank: usize,
    },

    /// A node was given without a layer
    #[error("node {node:?} has no layer")]
    MissingLayer { node: String },
}

/// Error returned when a link style name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown link type {0:?}, expected \"straight\" or \"c_bezier\"")]
pub struct ParseLinkTypeError(pub String);
