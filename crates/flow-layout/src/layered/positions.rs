use crate::geometry::NodeBox;
use crate::model::GraphModel;
use crate::options::RenderingOptions;
use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

/// Horizontal position shared by every node of each layer, indexed by rank
pub(crate) fn assign_horizontal_positions(
    layer_count: usize,
    rendering: &RenderingOptions,
) -> Vec<f64> {
    (0..layer_count)
        .map(|rank| {
            let rank = rank as f64;
            rendering.padding_x
                + (rank + 0.5) * rendering.layer_margin
                + rank * rendering.node_width
        })
        .collect()
}

/// Pixel height per unit of weight that lets the heaviest layer fit the canvas
///
/// The heaviest layer is the one with the largest total weight, the lowest
/// rank winning ties. Never returns less than one pixel.
pub(crate) fn infer_unit_height(
    model: &GraphModel,
    canvas_height: f64,
    rendering: &RenderingOptions,
) -> f64 {
    let heaviest = model
        .layers()
        .iter()
        .map(|layer| {
            let total: f64 = layer
                .nodes
                .iter()
                .map(|&node| model.node(node).weight.unwrap_or(0.0))
                .sum();
            (layer, total)
        })
        .fold(None, |best, (layer, total)| match best {
            Some((_, best_total)) if best_total >= total => best,
            _ => Some((layer, total)),
        });

    let Some((layer, total)) = heaviest else {
        return 1.0;
    };
    if total <= 0.0 {
        debug!("Heaviest layer {} has no weight, using unit height 1", layer.key);
        return 1.0;
    }

    let available = canvas_height - 2.0 * rendering.padding_y;
    let reserved = layer.nodes.len().saturating_sub(1) as f64 * rendering.node_margin;
    let unit_height = ((available - reserved) / total).max(1.0);

    debug!(
        "Inferred unit height {unit_height} from layer {} (total weight {total})",
        layer.key
    );
    unit_height
}

/// Stack the nodes of every layer from top to bottom
///
/// Returns one box per node, indexed by node index.
pub(crate) fn assign_vertical_positions(
    model: &GraphModel,
    ordered: &[Vec<NodeIndex>],
    xs: &[f64],
    unit_height: f64,
    weighted: bool,
    rendering: &RenderingOptions,
) -> Vec<NodeBox> {
    let mut boxes = vec![NodeBox::default(); model.node_count()];

    for (rank, layer) in ordered.iter().enumerate() {
        let x = xs[rank];
        let mut accumulated = 0.0;

        for (i, &node) in layer.iter().enumerate() {
            let weight = if weighted {
                model.node(node).weight.unwrap_or(0.0)
            } else {
                1.0
            };
            let height = (weight * unit_height).floor().max(1.0);

            boxes[node.index()] = NodeBox {
                layer_idx: i,
                x,
                y: rendering.padding_y + accumulated + i as f64 * rendering.node_margin,
                width: rendering.node_width,
                height,
            };
            accumulated += height;
        }

        trace!("Layer {rank} at x = {x}, stacked height {accumulated}");
    }

    boxes
}
