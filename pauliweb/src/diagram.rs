//! Open ZX diagrams: typed nodes with phases, undirected edges and an input/output allocation.
//!
//! Node and edge ids are plain integers that stay valid across removals of other nodes and
//! edges. Pauli strings over a diagram are keyed by its edge ids.

use crate::error::{Result, WebError};
use num_rational::Rational64;
use num_traits::Zero;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet};

pub type NodeId = usize;
pub type EdgeId = usize;

/// Phases are rational multiples of π.
pub type Phase = Rational64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    #[display("B")]
    Boundary,
    Z,
    X,
    H,
}

impl NodeType {
    /// The other spider colour; boundaries and Hadamard boxes have none.
    #[must_use]
    pub fn opposite_color(self) -> Option<NodeType> {
        match self {
            NodeType::Z => Some(NodeType::X),
            NodeType::X => Some(NodeType::Z),
            NodeType::Boundary | NodeType::H => None,
        }
    }

    #[must_use]
    pub fn is_spider(self) -> bool {
        matches!(self, NodeType::Z | NodeType::X)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    node_type: NodeType,
    phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Io {
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    is_virtual: bool,
}

/// Optional per-node drawing coordinates.
///
/// Nodes without coordinates report `-1.0` for both axes.
pub trait PositionedDiagram {
    fn x(&self, node: NodeId) -> f64;
    fn y(&self, node: NodeId) -> f64;
    fn set_position(&mut self, node: NodeId, x: f64, y: f64) -> &mut Self;
}

/// An open ZX diagram.
///
/// The input/output allocation is either *real*, listing boundary nodes which must then cover
/// every boundary node exactly once, or *virtual*, listing the spiders the (absent) boundary
/// nodes would attach to.
///
/// ```
/// use pauliweb::{Diagram, NodeType};
///
/// let mut diagram = Diagram::new();
/// let input = diagram.add_node(NodeType::Boundary);
/// let spider = diagram.add_node(NodeType::Z);
/// let output = diagram.add_node(NodeType::Boundary);
/// diagram.add_edge(input, spider);
/// diagram.add_edge(spider, output);
/// diagram.set_io(vec![input], vec![output], false).unwrap();
/// assert_eq!(diagram.boundary_edges().len(), 2);
/// assert_eq!(diagram.neighbors(spider), vec![input, output]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    graph: StableUnGraph<NodeData, ()>,
    io: Option<Io>,
    positions: BTreeMap<NodeId, (f64, f64)>,
}

impl Diagram {
    #[must_use]
    pub fn new() -> Diagram {
        Diagram::default()
    }

    pub fn add_node(&mut self, node_type: NodeType) -> NodeId {
        self.add_node_with_phase(node_type, Phase::zero())
    }

    /// Adds a node with the given phase, reduced into `[0, 2)`.
    pub fn add_node_with_phase(&mut self, node_type: NodeType, phase: Phase) -> NodeId {
        self.graph
            .add_node(NodeData {
                node_type,
                phase: normalized_phase(phase),
            })
            .index()
    }

    /// # Panics
    ///
    /// Panics if either node does not exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        self.graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ()).index()
    }

    /// Removes the node and its incident edges.
    pub fn remove_node(&mut self, node: NodeId) {
        self.graph.remove_node(NodeIndex::new(node));
        self.positions.remove(&node);
    }

    pub fn remove_edge(&mut self, edge: EdgeId) {
        self.graph.remove_edge(EdgeIndex::new(edge));
    }

    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.graph.contains_node(NodeIndex::new(node))
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.graph[NodeIndex::new(node)]
    }

    /// # Panics
    ///
    /// Panics if the node does not exist.
    #[must_use]
    pub fn node_type(&self, node: NodeId) -> NodeType {
        self.data(node).node_type
    }

    /// # Panics
    ///
    /// Panics if the node does not exist.
    #[must_use]
    pub fn phase(&self, node: NodeId) -> Phase {
        self.data(node).phase
    }

    pub fn set_node_type(&mut self, node: NodeId, node_type: NodeType) {
        self.graph[NodeIndex::new(node)].node_type = node_type;
    }

    pub fn set_phase(&mut self, node: NodeId, phase: Phase) {
        self.graph[NodeIndex::new(node)].phase = normalized_phase(phase);
    }

    /// Adds `phase` to the node's phase, modulo 2π.
    pub fn add_to_phase(&mut self, node: NodeId, phase: Phase) {
        let updated = self.phase(node) + phase;
        self.set_phase(node, updated);
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node ids in increasing order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices().map(NodeIndex::index)
    }

    /// Edge ids in increasing order.
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices().map(EdgeIndex::index)
    }

    #[must_use]
    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.graph
            .edge_endpoints(EdgeIndex::new(edge))
            .map(|(source, target)| (source.index(), target.index()))
    }

    /// All `(edge, source, target)` triples in increasing edge order.
    pub fn edge_list(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId)> + '_ {
        self.edge_indices()
            .filter_map(|edge| self.edge_endpoints(edge).map(|(source, target)| (edge, source, target)))
    }

    /// Edges incident to `node`, in increasing order.
    #[must_use]
    pub fn incident_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let mut edges: Vec<EdgeId> = self.graph.edges(NodeIndex::new(node)).map(|edge| edge.id().index()).collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// The endpoint of `edge` that is not `node`.
    #[must_use]
    pub fn opposite(&self, edge: EdgeId, node: NodeId) -> Option<NodeId> {
        self.edge_endpoints(edge)
            .map(|(source, target)| if source == node { target } else { source })
    }

    /// Neighbours of `node` in increasing order, with repetitions for parallel edges.
    #[must_use]
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self
            .incident_edges(node)
            .into_iter()
            .filter_map(|edge| self.opposite(edge, node))
            .collect();
        neighbors.sort_unstable();
        neighbors
    }

    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.incident_edges(node).len()
    }

    /// Edges connecting `first` and `second`, in increasing order.
    #[must_use]
    pub fn edges_between(&self, first: NodeId, second: NodeId) -> Vec<EdgeId> {
        self.incident_edges(first)
            .into_iter()
            .filter(|edge| self.opposite(*edge, first) == Some(second))
            .collect()
    }

    /// The first pair of nodes connected by more than one edge, if any.
    #[must_use]
    pub fn parallel_edge(&self) -> Option<(NodeId, NodeId)> {
        let mut seen = BTreeSet::new();
        self.edge_list()
            .map(|(_, source, target)| (source.min(target), source.max(target)))
            .find(|pair| !seen.insert(*pair))
    }

    #[must_use]
    pub fn has_parallel_edges(&self) -> bool {
        self.parallel_edge().is_some()
    }

    /// Boundary nodes in increasing order.
    #[must_use]
    pub fn boundary_nodes(&self) -> Vec<NodeId> {
        self.node_indices()
            .filter(|node| self.node_type(*node) == NodeType::Boundary)
            .collect()
    }

    #[must_use]
    pub fn boundary_edges(&self) -> BTreeSet<EdgeId> {
        self.boundary_nodes()
            .into_iter()
            .flat_map(|boundary| self.incident_edges(boundary))
            .collect()
    }

    /// Sets the nodes regarded as inputs and outputs, which are indexed as `[inputs.., outputs..]`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MalformedIo`] if either list repeats a node, if a node does not exist,
    /// or if a real allocation does not cover the boundary nodes one-to-one.
    pub fn set_io(&mut self, inputs: Vec<NodeId>, outputs: Vec<NodeId>, is_virtual: bool) -> Result<()> {
        let unique_inputs: BTreeSet<NodeId> = inputs.iter().copied().collect();
        let unique_outputs: BTreeSet<NodeId> = outputs.iter().copied().collect();
        if unique_inputs.len() != inputs.len() || unique_outputs.len() != outputs.len() {
            return Err(WebError::malformed_io(format!(
                "IO may not contain duplicate node indices, unique {}/{} of given {}/{}",
                unique_inputs.len(),
                unique_outputs.len(),
                inputs.len(),
                outputs.len()
            )));
        }
        if let Some(missing) = inputs.iter().chain(&outputs).find(|node| !self.contains_node(**node)) {
            return Err(WebError::MissingNode(*missing));
        }
        if !is_virtual {
            let boundaries: BTreeSet<NodeId> = self.boundary_nodes().into_iter().collect();
            let allocated: BTreeSet<NodeId> = unique_inputs.union(&unique_outputs).copied().collect();
            if allocated != boundaries {
                return Err(WebError::malformed_io(format!(
                    "real IO must allocate boundary nodes one-to-one, surplus {:?}, unaccounted {:?}",
                    allocated.difference(&boundaries).collect::<Vec<_>>(),
                    boundaries.difference(&allocated).collect::<Vec<_>>()
                )));
            }
        }
        self.io = Some(Io {
            inputs,
            outputs,
            is_virtual,
        });
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`WebError::MalformedIo`] if no IO was set.
    pub fn io(&self) -> Result<(&[NodeId], &[NodeId])> {
        self.io
            .as_ref()
            .map(|io| (io.inputs.as_slice(), io.outputs.as_slice()))
            .ok_or_else(|| WebError::malformed_io("IO is not set"))
    }

    #[must_use]
    pub fn has_io(&self) -> bool {
        self.io.is_some()
    }

    #[must_use]
    pub fn is_io_virtual(&self) -> bool {
        self.io.as_ref().is_some_and(|io| io.is_virtual)
    }

    /// `[inputs.., outputs..]` if IO is set, the boundary nodes in increasing order otherwise.
    #[must_use]
    pub fn io_order(&self) -> Vec<NodeId> {
        match &self.io {
            Some(io) => io.inputs.iter().chain(&io.outputs).copied().collect(),
            None => self.boundary_nodes(),
        }
    }

    /// Uses the boundary nodes, in increasing order, as the inputs of a real allocation.
    pub fn infer_io_from_boundaries(&mut self) {
        self.io = Some(Io {
            inputs: self.boundary_nodes(),
            outputs: Vec::new(),
            is_virtual: false,
        });
    }

    /// Replaces real boundary nodes by a virtual allocation on their neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MalformedIo`] if IO is unset or a boundary node does not have exactly one
    /// neighbour.
    pub fn virtualize_io(&mut self) -> Result<()> {
        if self.is_io_virtual() {
            return Ok(());
        }
        let (inputs, outputs) = self.io()?;
        let (inputs, outputs) = (inputs.to_vec(), outputs.to_vec());
        let sole_neighbor = |diagram: &Diagram, node: NodeId| match diagram.neighbors(node).as_slice() {
            [neighbor] => Ok(*neighbor),
            _ => Err(WebError::malformed_io(format!("boundary {node} must have exactly one neighbour"))),
        };
        let new_inputs = inputs
            .iter()
            .map(|node| sole_neighbor(self, *node))
            .collect::<Result<Vec<_>>>()?;
        let new_outputs = outputs
            .iter()
            .map(|node| sole_neighbor(self, *node))
            .collect::<Result<Vec<_>>>()?;
        for boundary in inputs.iter().chain(&outputs) {
            self.remove_node(*boundary);
        }
        self.set_io(new_inputs, new_outputs, true)
    }

    /// Materializes a virtual allocation as fresh boundary nodes and returns them.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MalformedIo`] if IO is unset.
    pub fn realize_io(&mut self) -> Result<(Vec<NodeId>, Vec<NodeId>)> {
        let (inputs, outputs) = self.io()?;
        let (inputs, outputs) = (inputs.to_vec(), outputs.to_vec());
        if !self.is_io_virtual() {
            return Ok((inputs, outputs));
        }
        let mut attach = |nodes: &[NodeId]| {
            nodes
                .iter()
                .map(|node| {
                    let boundary = self.add_node(NodeType::Boundary);
                    self.add_edge(*node, boundary);
                    boundary
                })
                .collect::<Vec<_>>()
        };
        let new_inputs = attach(&inputs);
        let new_outputs = attach(&outputs);
        self.set_io(new_inputs.clone(), new_outputs.clone(), false)?;
        Ok((new_inputs, new_outputs))
    }

    /// Copies `other` into this diagram and adds an edge for every `(self_node, other_node)`
    /// connection. Returns the ids given to the nodes of `other`.
    ///
    /// # Panics
    ///
    /// Panics if a connection refers to a node that does not exist.
    pub fn compose(&mut self, other: &Diagram, connections: &[(NodeId, NodeId)]) -> BTreeMap<NodeId, NodeId> {
        let mut node_map = BTreeMap::new();
        for node in other.node_indices() {
            let new_node = self.add_node_with_phase(other.node_type(node), other.phase(node));
            if let Some(position) = other.positions.get(&node) {
                self.positions.insert(new_node, *position);
            }
            node_map.insert(node, new_node);
        }
        for (_, source, target) in other.edge_list() {
            self.add_edge(node_map[&source], node_map[&target]);
        }
        for (this_node, other_node) in connections {
            self.add_edge(*this_node, node_map[other_node]);
        }
        node_map
    }

    /// The subgraph induced by `nodes`, without IO, and the map from old to new node ids.
    #[must_use]
    pub fn subgraph(&self, nodes: &BTreeSet<NodeId>) -> (Diagram, BTreeMap<NodeId, NodeId>) {
        let mut subgraph = Diagram::new();
        let mut node_map = BTreeMap::new();
        for node in nodes.iter().filter(|node| self.contains_node(**node)) {
            let new_node = subgraph.add_node_with_phase(self.node_type(*node), self.phase(*node));
            if let Some(position) = self.positions.get(node) {
                subgraph.positions.insert(new_node, *position);
            }
            node_map.insert(*node, new_node);
        }
        for (_, source, target) in self.edge_list() {
            if let (Some(new_source), Some(new_target)) = (node_map.get(&source), node_map.get(&target)) {
                subgraph.add_edge(*new_source, *new_target);
            }
        }
        (subgraph, node_map)
    }
}

impl PositionedDiagram for Diagram {
    fn x(&self, node: NodeId) -> f64 {
        self.positions.get(&node).map_or(-1.0, |position| position.0)
    }

    fn y(&self, node: NodeId) -> f64 {
        self.positions.get(&node).map_or(-1.0, |position| position.1)
    }

    fn set_position(&mut self, node: NodeId, x: f64, y: f64) -> &mut Self {
        self.positions.insert(node, (x, y));
        self
    }
}

/// Reduces a phase into `[0, 2)`.
#[must_use]
pub fn normalized_phase(phase: Phase) -> Phase {
    let two = Phase::from_integer(2);
    let reduced = phase % two;
    if reduced < Phase::zero() {
        reduced + two
    } else {
        reduced
    }
}
