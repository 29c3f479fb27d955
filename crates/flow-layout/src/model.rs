use crate::error::{LayoutError, LinkKey};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Key identifying the layer a node belongs to
///
/// Layers are plain labels; their left-to-right order comes from a
/// [`LayerComparator`], or from the order in which they first appear.
///
/// Keys order numerically across integers and floats, then strings. An
/// integer sorts before a float of the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerKey {
    Number(i64),
    Float(f64),
    Text(String),
}

impl Ord for LayerKey {
    fn cmp(&self, other: &Self) -> Ordering {
        use LayerKey::*;
        match (self, other) {
            (Number(a), Number(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Number(a), Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Float(a), Number(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for LayerKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LayerKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LayerKey {}

impl Hash for LayerKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            LayerKey::Number(n) => (0u8, n).hash(state),
            LayerKey::Float(n) => (1u8, n.to_bits()).hash(state),
            LayerKey::Text(s) => (2u8, s).hash(state),
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Number(n) => write!(f, "{n}"),
            LayerKey::Float(n) => write!(f, "{n}"),
            LayerKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for LayerKey {
    fn from(n: f64) -> Self {
        LayerKey::Float(n)
    }
}

impl From<i64> for LayerKey {
    fn from(n: i64) -> Self {
        LayerKey::Number(n)
    }
}

impl From<i32> for LayerKey {
    fn from(n: i32) -> Self {
        LayerKey::Number(n.into())
    }
}

impl From<&str> for LayerKey {
    fn from(s: &str) -> Self {
        LayerKey::Text(s.to_string())
    }
}

impl From<String> for LayerKey {
    fn from(s: String) -> Self {
        LayerKey::Text(s)
    }
}

/// Node fields computed by the layout, never taken from pass-through input
const RESERVED_NODE_FIELDS: &[&str] = &["idx", "layerIdx", "x", "y", "width", "height"];

/// Link fields computed by the layout, never taken from pass-through input
const RESERVED_LINK_FIELDS: &[&str] = &["start", "end", "controlPoint0", "controlPoint1"];

/// Drop pass-through fields that would collide with computed ones
fn strip_reserved(
    mut extra: Map<String, Value>,
    reserved: &[&str],
    owner: &str,
) -> Map<String, Value> {
    extra.retain(|key, _| {
        let keep = !reserved.contains(&key.as_str());
        if !keep {
            debug!("Ignoring input field {key:?} on {owner}, it is computed by the layout");
        }
        keep
    });
    extra
}

/// Comparator deciding the left-to-right order of layers
pub type LayerComparator = Arc<dyn Fn(&LayerKey, &LayerKey) -> Ordering + Send + Sync>;

/// Order layers by their key: numbers ascending, then strings
pub fn natural_layer_order() -> LayerComparator {
    Arc::new(|a: &LayerKey, b: &LayerKey| a.cmp(b))
}

/// Raw graph payload, as handed to the engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub links: Vec<LinkInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LayerKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Any other field, carried through to the layout output
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeInput {
    pub fn new(name: impl Into<String>, layer: impl Into<LayerKey>) -> Self {
        Self {
            name: name.into(),
            layer: Some(layer.into()),
            weight: None,
            extra: Map::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInput {
    pub source: String,
    pub target: String,

    /// Any other field, carried through to the layout output
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LinkInput {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            extra: Map::new(),
        }
    }
}

/// A node once accepted into the model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub layer: LayerKey,
    /// Rank of `layer`, kept in sync with the model's layer order
    pub rank: usize,
    pub weight: Option<f64>,
    /// Position of the node in the input payload
    pub idx: usize,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelLink {
    pub extra: Map<String, Value>,
}

/// Nodes sharing a layer key, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub key: LayerKey,
    pub rank: usize,
    pub nodes: Vec<NodeIndex>,
    first_seen: usize,
}

/// Direct predecessors and successors of every node, in link order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DegreeIndex {
    incoming: Vec<Vec<NodeIndex>>,
    outgoing: Vec<Vec<NodeIndex>>,
}

impl DegreeIndex {
    fn from_graph(graph: &DiGraph<ModelNode, ModelLink>) -> Self {
        let mut incoming = vec![Vec::new(); graph.node_count()];
        let mut outgoing = vec![Vec::new(); graph.node_count()];
        for edge in graph.edge_references() {
            incoming[edge.target().index()].push(edge.source());
            outgoing[edge.source().index()].push(edge.target());
        }
        Self { incoming, outgoing }
    }

    pub fn predecessors(&self, node: NodeIndex) -> &[NodeIndex] {
        self.incoming.get(node.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn successors(&self, node: NodeIndex) -> &[NodeIndex] {
        self.outgoing.get(node.index()).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Nodes, links and layers discovered from a [`GraphData`] payload
///
/// Node indices follow input order (duplicates excluded) and edge indices
/// follow link order. The model is immutable once built, apart from
/// re-ranking its layers.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    graph: DiGraph<ModelNode, ModelLink>,
    by_name: HashMap<String, NodeIndex>,
    links: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    layers: Vec<Layer>,
    degrees: DegreeIndex,
}

impl GraphModel {
    /// Build a model from raw data
    ///
    /// The first node with a given name wins; a later link with the same
    /// endpoints replaces the earlier one but keeps its position.
    ///
    /// # Errors
    /// Fails if a node has no layer or a link names an unknown node
    pub fn build(
        data: GraphData,
        comparator: Option<&LayerComparator>,
    ) -> Result<Self, LayoutError> {
        let mut graph = DiGraph::with_capacity(data.nodes.len(), data.links.len());
        let mut by_name = HashMap::new();
        let mut layers: Vec<Layer> = Vec::new();
        let mut layer_slots: HashMap<LayerKey, usize> = HashMap::new();

        for (idx, input) in data.nodes.into_iter().enumerate() {
            if by_name.contains_key(&input.name) {
                debug!("Skipping duplicate node {:?} at position {idx}", input.name);
                continue;
            }

            let NodeInput {
                name,
                layer,
                weight,
                extra,
            } = input;
            let Some(layer) = layer else {
                return Err(LayoutError::MissingLayer { node: name });
            };

            let slot = *layer_slots.entry(layer.clone()).or_insert_with(|| {
                layers.push(Layer {
                    key: layer.clone(),
                    rank: 0,
                    nodes: Vec::new(),
                    first_seen: layers.len(),
                });
                layers.len() - 1
            });

            let node = graph.add_node(ModelNode {
                name: name.clone(),
                layer,
                rank: 0,
                weight,
                idx,
                extra: strip_reserved(extra, RESERVED_NODE_FIELDS, &name),
            });
            layers[slot].nodes.push(node);
            by_name.insert(name, node);
        }

        let mut links = HashMap::new();
        for LinkInput {
            source,
            target,
            extra,
        } in data.links
        {
            let resolve = |name: &str| {
                by_name
                    .get(name)
                    .copied()
                    .ok_or_else(|| LayoutError::UnknownNodeReference {
                        link: LinkKey::new(source.as_str(), target.as_str()),
                        node: name.to_string(),
                    })
            };
            let from = resolve(&source)?;
            let to = resolve(&target)?;
            let owner = format!("{source} -> {target}");
            let extra = strip_reserved(extra, RESERVED_LINK_FIELDS, &owner);

            match links.entry((from, to)) {
                Entry::Occupied(entry) => {
                    debug!("Replacing duplicate link {source} -> {target}");
                    graph[*entry.get()] = ModelLink { extra };
                }
                Entry::Vacant(entry) => {
                    entry.insert(graph.add_edge(from, to, ModelLink { extra }));
                }
            }
        }

        let degrees = DegreeIndex::from_graph(&graph);
        let mut model = Self {
            graph,
            by_name,
            links,
            layers,
            degrees,
        };
        model.rank_layers(comparator);

        Ok(model)
    }

    /// Assign layer ranks, by first appearance or with the given comparator
    pub(crate) fn rank_layers(&mut self, comparator: Option<&LayerComparator>) {
        self.layers.sort_by_key(|layer| layer.first_seen);
        if let Some(compare) = comparator {
            self.layers.sort_by(|a, b| compare(&a.key, &b.key));
        }

        for (rank, layer) in self.layers.iter_mut().enumerate() {
            layer.rank = rank;
            for &node in &layer.nodes {
                self.graph[node].rank = rank;
            }
        }
    }

    /// Copy of this model with layers ranked by another comparator
    pub(crate) fn reranked(&self, comparator: Option<&LayerComparator>) -> Self {
        let mut model = self.clone();
        model.rank_layers(comparator);
        model
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Layers sorted by rank
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn node(&self, node: NodeIndex) -> &ModelNode {
        &self.graph[node]
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    /// Node indices in input order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Links in insertion order, as `(source, target, link)`
    pub fn links(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &ModelLink)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight()))
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&ModelLink> {
        let key = (self.node_index(source)?, self.node_index(target)?);
        self.links.get(&key).map(|&edge| &self.graph[edge])
    }

    pub fn link_key(&self, source: NodeIndex, target: NodeIndex) -> LinkKey {
        LinkKey::new(
            self.graph[source].name.as_str(),
            self.graph[target].name.as_str(),
        )
    }

    pub fn degrees(&self) -> &DegreeIndex {
        &self.degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    fn data(value: Value) -> GraphData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn duplicate_node_names_keep_first() {
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    { "name": "a", "layer": 1, "color": "red" },
                    { "name": "b", "layer": 2 },
                    { "name": "a", "layer": 2, "color": "blue" },
                ],
                "links": [],
            })),
            None,
        )
        .unwrap();

        assert_eq!(model.node_count(), 2);
        let a = model.node(model.node_index("a").unwrap());
        assert_eq!(a.layer, LayerKey::Number(1));
        assert_eq!(a.extra["color"], "red");
        assert_eq!(a.idx, 0);
        assert_eq!(model.node(model.node_index("b").unwrap()).idx, 1);
    }

    #[test]
    fn later_duplicate_link_replaces_earlier() {
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    { "name": "a", "layer": 1 },
                    { "name": "b", "layer": 2 },
                    { "name": "c", "layer": 2 },
                ],
                "links": [
                    { "source": "a", "target": "b", "value": 1 },
                    { "source": "a", "target": "c" },
                    { "source": "a", "target": "b", "value": 2 },
                ],
            })),
            None,
        )
        .unwrap();

        assert_eq!(model.link_count(), 2);
        assert_eq!(model.link("a", "b").unwrap().extra["value"], 2);

        // The replaced link keeps its original slot
        let order: Vec<_> = model
            .links()
            .map(|(s, t, _)| model.link_key(s, t).to_string())
            .collect();
        assert_eq!(order, vec!["a -> b", "a -> c"]);
    }

    #[test]
    fn link_keys_are_not_ambiguous() {
        // "a-b" -> "c" and "a" -> "b-c" would collide under a joined string key
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    { "name": "a", "layer": 1 },
                    { "name": "a-b", "layer": 1 },
                    { "name": "c", "layer": 2 },
                    { "name": "b-c", "layer": 2 },
                ],
                "links": [
                    { "source": "a-b", "target": "c" },
                    { "source": "a", "target": "b-c" },
                ],
            })),
            None,
        )
        .unwrap();

        assert_eq!(model.link_count(), 2);
    }

    #[test]
    fn unknown_link_endpoint_is_rejected() {
        let err = GraphModel::build(
            data(json!({
                "nodes": [{ "name": "a", "layer": 1 }],
                "links": [{ "source": "a", "target": "z" }],
            })),
            None,
        )
        .unwrap_err();

        assert_eq!(
            err,
            LayoutError::UnknownNodeReference {
                link: LinkKey::new("a", "z"),
                node: "z".to_string(),
            }
        );
    }

    #[test]
    fn node_without_layer_is_rejected() {
        for node in [json!({ "name": "x" }), json!({ "name": "x", "layer": null })] {
            let err = GraphModel::build(data(json!({ "nodes": [node], "links": [] })), None)
                .unwrap_err();
            assert_eq!(
                err,
                LayoutError::MissingLayer {
                    node: "x".to_string()
                }
            );
        }
    }

    #[test]
    fn layers_are_ranked_by_first_appearance() {
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    { "name": "a", "layer": "second" },
                    { "name": "b", "layer": "first" },
                    { "name": "c", "layer": "second" },
                    { "name": "d", "layer": 0 },
                ],
                "links": [],
            })),
            None,
        )
        .unwrap();

        let keys: Vec<_> = model.layers().iter().map(|l| l.key.to_string()).collect();
        assert_eq!(keys, vec!["second", "first", "0"]);
        assert_eq!(model.layers()[0].nodes.len(), 2);
        assert_eq!(model.node(model.node_index("d").unwrap()).rank, 2);
    }

    #[test]
    fn custom_comparator_orders_layers() {
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    { "name": "a", "layer": 3 },
                    { "name": "b", "layer": 1 },
                    { "name": "c", "layer": 2 },
                ],
                "links": [],
            })),
            Some(&natural_layer_order()),
        )
        .unwrap();

        let ranks: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| model.node(model.node_index(n).unwrap()).rank)
            .collect();
        assert_eq!(ranks, vec![2, 0, 1]);

        let back = model.reranked(None);
        assert_eq!(back.node(back.node_index("a").unwrap()).rank, 0);
    }

    #[test]
    fn degree_index_follows_links() {
        let model = GraphModel::build(
            GraphData {
                nodes: vec![
                    NodeInput::new("a", 1),
                    NodeInput::new("b", 1),
                    NodeInput::new("c", 2),
                ],
                links: vec![LinkInput::new("b", "c"), LinkInput::new("a", "c")],
            },
            None,
        )
        .unwrap();

        let [a, b, c] = ["a", "b", "c"].map(|n| model.node_index(n).unwrap());
        assert_eq!(model.degrees().predecessors(c), &[b, a]);
        assert_eq!(model.degrees().successors(a), &[c]);
        assert!(model.degrees().predecessors(a).is_empty());
    }

    #[test]
    fn fractional_and_large_layer_keys_are_ranked() {
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    { "name": "a", "layer": 2 },
                    { "name": "b", "layer": 1.5 },
                    { "name": "c", "layer": 1 },
                    { "name": "d", "layer": u64::MAX },
                    { "name": "e", "layer": "x" },
                    { "name": "f", "layer": 1.0 },
                ],
                "links": [],
            })),
            Some(&natural_layer_order()),
        )
        .unwrap();

        let node = |name| model.node(model.node_index(name).unwrap());
        assert_eq!(node("b").layer, LayerKey::Float(1.5));
        assert_eq!(node("d").layer, LayerKey::Float(u64::MAX as f64));

        let ranks: Vec<_> = ["c", "f", "b", "a", "d", "e"]
            .iter()
            .map(|&name| node(name).rank)
            .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(model.layers().len(), 6);
    }

    #[test]
    fn computed_fields_are_not_taken_from_input() {
        let model = GraphModel::build(
            data(json!({
                "nodes": [
                    {
                        "name": "a",
                        "layer": 1,
                        "x": 999,
                        "height": 1,
                        "layerIdx": 7,
                        "color": "red",
                    },
                    { "name": "b", "layer": 2 },
                ],
                "links": [{ "source": "a", "target": "b", "start": "s", "value": 4 }],
            })),
            None,
        )
        .unwrap();

        let a = model.node(model.node_index("a").unwrap());
        assert_eq!(a.extra.len(), 1);
        assert_eq!(a.extra["color"], "red");

        let link = model.link("a", "b").unwrap();
        assert!(link.extra.get("start").is_none());
        assert_eq!(link.extra["value"], 4);
    }
}
