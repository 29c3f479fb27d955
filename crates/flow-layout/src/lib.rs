//! Layout engine for layered flow diagrams
//!
//! Nodes come already sorted into layers; the engine places layers left to
//! right, stacks the nodes of each layer top to bottom and routes every link
//! from the right edge of its source to the left edge of its target. It
//! only computes geometry, drawing is left to the caller.
//!
//! # Example
//!
//! ```
//! use flow_layout::{GraphData, LayoutEngine, LinkInput, NodeInput};
//!
//! let data = GraphData {
//!     nodes: vec![NodeInput::new("a", 1), NodeInput::new("b", 2)],
//!     links: vec![LinkInput::new("a", "b")],
//! };
//!
//! // Canvas of 500x300 with default spacing
//! let mut engine = LayoutEngine::from_parts(500.0, 300.0, Some(data), None).unwrap();
//!
//! let layout = engine.layout();
//! assert_eq!(layout.nodes[0].x, 45.0);
//! assert_eq!(layout.nodes[1].x, 145.0);
//!
//! // Weighted mode sizes nodes by their weight
//! engine.set_weighted(true);
//! let weighted = engine.layout();
//! assert_eq!(weighted.nodes[0].height, 1.0);
//! ```

mod engine;
mod error;
mod geometry;
mod model;
mod options;
mod validate;

pub mod layered;

// Re-export core types
pub use engine::LayoutEngine;
pub use error::{LayoutError, LinkKey, ParseLinkTypeError};
pub use geometry::Point;
pub use model::{
    natural_layer_order, DegreeIndex, GraphData, GraphModel, Layer, LayerComparator, LayerKey,
    LinkInput, ModelLink, ModelNode, NodeInput,
};
pub use options::{LayoutOptions, LinkType, OptionsPatch, RenderingOptions, RenderingPatch};
pub use validate::validate_layer_order;

// Re-export petgraph's index type used to address model nodes
pub use petgraph::graph::NodeIndex;

// Re-export layered layout types
pub use layered::{
    Layout, LayoutLink, LayoutNode, NodeOrdering, OrderingContext, PredecessorAverage,
};
