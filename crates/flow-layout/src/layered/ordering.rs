use crate::model::{DegreeIndex, GraphModel};
use petgraph::graph::NodeIndex;
use std::cmp::Ordering;
use tracing::trace;

/// Read-only view of the model handed to ordering strategies
#[derive(Debug, Clone, Copy)]
pub struct OrderingContext<'a> {
    pub in_degree: &'a DegreeIndex,
    pub model: &'a GraphModel,
}

impl<'a> OrderingContext<'a> {
    pub fn new(model: &'a GraphModel) -> Self {
        Self {
            in_degree: model.degrees(),
            model,
        }
    }

    pub fn predecessors(&self, node: NodeIndex) -> &'a [NodeIndex] {
        self.in_degree.predecessors(node)
    }

    /// Rank of the layer holding `node`
    pub fn rank(&self, node: NodeIndex) -> usize {
        self.model.node(node).rank
    }

    pub fn name(&self, node: NodeIndex) -> &'a str {
        &self.model.node(node).name
    }
}

/// Strategy ordering the nodes of a layer from top to bottom
///
/// Both methods have default implementations; overriding only
/// `height_score` keeps the default tie-breaking rules.
pub trait NodeOrdering: Send + Sync {
    /// Score placing a node close to what feeds it, lower is higher up.
    /// `None` when the node has no predecessor.
    fn height_score(&self, node: NodeIndex, ctx: &OrderingContext<'_>) -> Option<f64> {
        predecessor_average(node, ctx)
    }

    /// Order two nodes of the same layer
    ///
    /// Nodes with predecessors come first, by score. Ties go to the node
    /// with fewer predecessors, then to the smaller name.
    fn compare(&self, a: NodeIndex, b: NodeIndex, ctx: &OrderingContext<'_>) -> Ordering {
        let preds_a = ctx.predecessors(a).len();
        let preds_b = ctx.predecessors(b).len();

        let primary = match (preds_a, preds_b) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            _ => {
                let score_a = self.height_score(a, ctx).unwrap_or(f64::INFINITY);
                let score_b = self.height_score(b, ctx).unwrap_or(f64::INFINITY);
                score_a.total_cmp(&score_b)
            }
        };

        primary
            .then_with(|| preds_a.cmp(&preds_b))
            .then_with(|| ctx.name(a).cmp(ctx.name(b)))
    }
}

/// Mean of `rank + 1` over the node's predecessors
pub fn predecessor_average(node: NodeIndex, ctx: &OrderingContext<'_>) -> Option<f64> {
    let preds = ctx.predecessors(node);
    if preds.is_empty() {
        return None;
    }
    let total: usize = preds.iter().map(|&pred| ctx.rank(pred) + 1).sum();
    Some(total as f64 / preds.len() as f64)
}

/// Default ordering: stack nodes by the average layer of their predecessors
#[derive(Debug, Clone, Copy, Default)]
pub struct PredecessorAverage;

impl NodeOrdering for PredecessorAverage {}

/// Order the nodes of every layer, indexed by rank
///
/// The first layer keeps its input order. A node's `layer_idx` is its
/// position in the returned vector.
pub(crate) fn order_layers(model: &GraphModel, ordering: &dyn NodeOrdering) -> Vec<Vec<NodeIndex>> {
    let ctx = OrderingContext::new(model);

    model
        .layers()
        .iter()
        .map(|layer| {
            let mut nodes = layer.nodes.clone();
            if layer.rank > 0 {
                nodes.sort_by(|&a, &b| ordering.compare(a, b, &ctx));
            }
            trace!(
                "Layer {} ordered as {:?}",
                layer.key,
                nodes.iter().map(|&n| ctx.name(n)).collect::<Vec<_>>()
            );
            nodes
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphData, LinkInput, NodeInput};
    use test_log::test;

    fn model() -> GraphModel {
        let nodes = [
            ("c", 1),
            ("a", 1),
            ("b", 1),
            ("e", 2),
            ("d", 2),
            ("w", 3),
            ("x", 3),
            ("z", 3),
            ("v", 3),
            ("y", 3),
            ("u", 3),
        ];
        let links = [
            ("d", "x"),
            ("a", "y"),
            ("a", "z"),
            ("d", "z"),
            ("b", "v"),
            ("c", "v"),
            ("a", "u"),
        ];
        GraphModel::build(
            GraphData {
                nodes: nodes.iter().map(|&(n, l)| NodeInput::new(n, l)).collect(),
                links: links.iter().map(|&(s, t)| LinkInput::new(s, t)).collect(),
            },
            None,
        )
        .unwrap()
    }

    fn names(model: &GraphModel, layer: &[NodeIndex]) -> Vec<String> {
        layer.iter().map(|&n| model.node(n).name.clone()).collect()
    }

    #[test]
    fn first_layer_keeps_input_order() {
        let model = model();
        let layers = order_layers(&model, &PredecessorAverage);
        assert_eq!(names(&model, &layers[0]), vec!["c", "a", "b"]);
    }

    #[test]
    fn nodes_without_predecessors_sort_by_name() {
        let model = model();
        let layers = order_layers(&model, &PredecessorAverage);
        assert_eq!(names(&model, &layers[1]), vec!["d", "e"]);
    }

    #[test]
    fn nodes_follow_predecessor_average() {
        let model = model();
        let layers = order_layers(&model, &PredecessorAverage);
        // u, y: score 1 with one predecessor, by name
        // v: score 1 with two predecessors
        // z: score 1.5, x: score 2, w: no predecessor
        assert_eq!(
            names(&model, &layers[2]),
            vec!["u", "y", "v", "z", "x", "w"]
        );
    }

    #[test]
    fn predecessor_average_uses_layer_ranks() {
        let model = model();
        let ctx = OrderingContext::new(&model);
        let score = |name| predecessor_average(model.node_index(name).unwrap(), &ctx);
        assert_eq!(score("z"), Some(1.5));
        assert_eq!(score("x"), Some(2.0));
        assert_eq!(score("w"), None);
    }

    #[test]
    fn custom_height_score_keeps_tie_breaking() {
        struct Flat;
        impl NodeOrdering for Flat {
            fn height_score(&self, _: NodeIndex, _: &OrderingContext<'_>) -> Option<f64> {
                Some(0.0)
            }
        }

        let model = model();
        let layers = order_layers(&model, &Flat);
        assert_eq!(
            names(&model, &layers[2]),
            vec!["u", "x", "y", "v", "z", "w"]
        );
    }
}
