use crate::error::LayoutError;
use crate::layered::{compute_layout, Layout, NodeOrdering, PredecessorAverage};
use crate::model::{GraphData, GraphModel, LayerComparator};
use crate::options::{LayoutOptions, OptionsPatch};
use crate::validate::validate_layer_order;
use std::sync::Arc;
use tracing::{debug, info};

/// Layout engine for layered flow diagrams
///
/// Holds the loaded graph, the options and the last computed layout. Every
/// mutating call drops the cached layout, and [`LayoutEngine::layout`]
/// recomputes it on demand.
pub struct LayoutEngine {
    width: f64,
    height: f64,
    options: LayoutOptions,
    layer_comparator: Option<LayerComparator>,
    node_ordering: Arc<dyn NodeOrdering>,
    model: GraphModel,
    cache: Option<Arc<Layout>>,
}

impl LayoutEngine {
    /// Create an empty engine for a canvas of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            options: LayoutOptions::default(),
            layer_comparator: None,
            node_ordering: Arc::new(PredecessorAverage),
            model: GraphModel::default(),
            cache: None,
        }
    }

    /// Create an engine and load options, then data, into it
    ///
    /// # Errors
    /// Fails if `data` is rejected by [`LayoutEngine::load_data`]
    pub fn from_parts(
        width: f64,
        height: f64,
        data: Option<GraphData>,
        options: Option<OptionsPatch>,
    ) -> Result<Self, LayoutError> {
        let mut engine = Self::new(width, height);
        if let Some(options) = options {
            engine.load_options(options);
        }
        if let Some(data) = data {
            engine.load_data(data)?;
        }
        Ok(engine)
    }

    /// Replace the graph
    ///
    /// The new graph is built and validated aside, and only replaces the
    /// current one once both steps succeed.
    ///
    /// # Errors
    /// Fails if a node has no layer, a link names an unknown node, or a link
    /// does not go forward through the layers
    pub fn load_data(&mut self, data: GraphData) -> Result<(), LayoutError> {
        let model = GraphModel::build(data, self.layer_comparator.as_ref())?;
        validate_layer_order(&model)?;

        self.model = model;
        self.invalidate();

        info!(
            "Loaded graph with {} nodes, {} links and {} layers",
            self.model.node_count(),
            self.model.link_count(),
            self.model.layers().len()
        );
        Ok(())
    }

    /// Merge options over the current ones
    pub fn load_options(&mut self, patch: OptionsPatch) {
        debug!("Loading options {patch:?}");
        self.options.merge(patch);
        self.invalidate();
    }

    pub fn set_weighted(&mut self, weighted: bool) {
        self.options.weighted = weighted;
        self.invalidate();
    }

    /// Change the canvas size
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.invalidate();
    }

    /// Order layers with `comparator`, or by first appearance when `None`
    ///
    /// The loaded graph is re-ranked and validated again; on failure the
    /// previous comparator and ranks are kept.
    ///
    /// # Errors
    /// Fails if a link would go backward under the new layer order
    pub fn set_layer_comparator(
        &mut self,
        comparator: Option<LayerComparator>,
    ) -> Result<(), LayoutError> {
        let model = self.model.reranked(comparator.as_ref());
        validate_layer_order(&model)?;

        debug!("Layer comparator changed");
        self.model = model;
        self.layer_comparator = comparator;
        self.invalidate();
        Ok(())
    }

    /// Use another strategy to order nodes within layers
    pub fn set_node_ordering(&mut self, ordering: impl NodeOrdering + 'static) {
        debug!("Node ordering changed");
        self.node_ordering = Arc::new(ordering);
        self.invalidate();
    }

    /// Current layout, computed if the cached one is stale
    ///
    /// Repeated calls without a mutation in between return the same `Arc`.
    pub fn layout(&mut self) -> Arc<Layout> {
        if let Some(layout) = &self.cache {
            return Arc::clone(layout);
        }

        info!("Relayouting");
        let layout = Arc::new(compute_layout(
            &self.model,
            &self.options,
            self.node_ordering.as_ref(),
            self.height,
        ));
        self.cache = Some(Arc::clone(&layout));
        layout
    }

    pub fn node_margin(&self) -> f64 {
        self.options.rendering.node_margin
    }

    pub fn layer_margin(&self) -> f64 {
        self.options.rendering.layer_margin
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn invalidate(&mut self) {
        self.cache = None;
    }
}
