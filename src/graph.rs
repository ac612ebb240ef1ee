//! The attribute graph: a bipartite projection of a [`RecordStore`].
//!
//! Column names become column nodes, observed values become value nodes, and
//! every `(column, value)` pair present in some record becomes one edge. The
//! graph is simple, so a pair observed in many records still yields a single
//! edge.
//!
//! Value nodes are created through an explicit key to node map before any
//! edge is added. How values are keyed is a [`ValueNamespace`]: `Shared`
//! collapses equal values under different columns into one node, while
//! `PerColumn` keeps them apart.

// used to keep the one-to-one mapping between node keys and their graph handles
use bimap::BiMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::construct::RecordStore;
use crate::datatype::Value;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Column,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueNamespace {
    /// One node per distinct value, whichever column it was seen under.
    #[default]
    Shared,
    /// One node per distinct `(column, value)` pair.
    PerColumn,
}

// ------------- Node -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    label: String,
    value: Option<Value>,
    column: Option<String>,
}
impl Node {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    /// The value of a value node, `None` for column nodes.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
    /// The owning column of a value node in a per-column namespace.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeKey {
    Column(String),
    Value { column: Option<String>, value: Value },
}

/// Handle to a column node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnNode(NodeIndex);
/// Handle to a value node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueNode(NodeIndex);

// ------------- Export -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    pub id: usize,
    pub label: String,
    pub kind: NodeKind,
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEdge {
    pub from: usize,
    pub to: usize,
}
/// Plain node and edge lists for a rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

// ------------- AttributeGraph -------------
#[derive(Debug)]
pub struct AttributeGraph {
    namespace: ValueNamespace,
    graph: UnGraph<Node, ()>,
    keys: BiMap<NodeKey, NodeIndex>,
}

impl AttributeGraph {
    pub fn new(namespace: ValueNamespace) -> Self {
        Self {
            namespace,
            graph: UnGraph::new_undirected(),
            keys: BiMap::new(),
        }
    }
    pub fn namespace(&self) -> ValueNamespace {
        self.namespace
    }
    fn value_key(&self, column: &str, value: Value) -> NodeKey {
        let column = match self.namespace {
            ValueNamespace::Shared => None,
            ValueNamespace::PerColumn => Some(column.to_owned()),
        };
        NodeKey::Value { column, value }
    }
    fn keep(&mut self, key: NodeKey, node: Node) -> NodeIndex {
        if let Some(index) = self.keys.get_by_left(&key) {
            return *index;
        }
        let index = self.graph.add_node(node);
        self.keys.insert(key, index);
        index
    }
    /// Returns the node for a column, creating it on first use.
    pub fn add_column(&mut self, name: &str) -> ColumnNode {
        let node = Node {
            kind: NodeKind::Column,
            label: name.to_owned(),
            value: None,
            column: None,
        };
        ColumnNode(self.keep(NodeKey::Column(name.to_owned()), node))
    }
    /// Returns the node for a value seen under `column`, creating it on first use.
    pub fn add_value(&mut self, column: &str, value: Value) -> ValueNode {
        let key = self.value_key(column, value.clone());
        let node = Node {
            kind: NodeKind::Value,
            label: value.to_string(),
            column: match &key {
                NodeKey::Value { column, .. } => column.clone(),
                NodeKey::Column(_) => None,
            },
            value: Some(value),
        };
        ValueNode(self.keep(key, node))
    }
    /// Adds the edge unless it already exists. Returns true when it was added.
    pub fn connect(&mut self, column: ColumnNode, value: ValueNode) -> bool {
        if self.graph.find_edge(column.0, value.0).is_some() {
            return false;
        }
        self.graph.add_edge(column.0, value.0, ());
        true
    }
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|i| &self.graph[i])
    }
    pub fn column_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.kind == NodeKind::Column)
    }
    pub fn value_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.kind == NodeKind::Value)
    }
    /// Edges in insertion order, column endpoint first.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.graph.edge_references().map(|e| {
            let (a, b) = (&self.graph[e.source()], &self.graph[e.target()]);
            if a.kind == NodeKind::Column {
                (a, b)
            } else {
                (b, a)
            }
        })
    }
    /// Whether `column` is joined to `value`. The value is matched as stored,
    /// that is after sanitization.
    pub fn contains_edge(&self, column: &str, value: &Value) -> bool {
        let column_index = self.keys.get_by_left(&NodeKey::Column(column.to_owned()));
        let value_index = self.keys.get_by_left(&self.value_key(column, value.clone()));
        match (column_index, value_index) {
            (Some(c), Some(v)) => self.graph.find_edge(*c, *v).is_some(),
            _ => false,
        }
    }
    /// True when every edge joins one column node and one value node.
    pub fn is_bipartite(&self) -> bool {
        self.graph
            .edge_references()
            .all(|e| self.graph[e.source()].kind != self.graph[e.target()].kind)
    }
    pub fn export(&self) -> GraphExport {
        let nodes = self
            .graph
            .node_indices()
            .map(|i| {
                let node = &self.graph[i];
                ExportNode {
                    id: i.index(),
                    label: node.label.clone(),
                    kind: node.kind,
                }
            })
            .collect();
        let edges = self
            .graph
            .edge_references()
            .map(|e| ExportEdge {
                from: e.source().index(),
                to: e.target().index(),
            })
            .collect();
        GraphExport { nodes, edges }
    }
}

// ------------- GraphProjector -------------
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphProjector {
    namespace: ValueNamespace,
}

impl GraphProjector {
    pub fn new(namespace: ValueNamespace) -> Self {
        Self { namespace }
    }
    /// Projects every (record, column) pair of the store into the graph.
    /// Text values are sanitized before they become nodes.
    pub fn project(&self, store: &RecordStore) -> Result<AttributeGraph> {
        let mut graph = AttributeGraph::new(self.namespace);
        let columns: Vec<ColumnNode> = store
            .columns()
            .iter()
            .map(|column| graph.add_column(column))
            .collect();
        for record in store.records() {
            for (column, column_node) in store.columns().iter().zip(&columns) {
                let value = record.get(column)?.sanitized();
                let value_node = graph.add_value(column, value);
                graph.connect(*column_node, value_node);
            }
        }
        info!(
            store = %store.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "attribute graph projected"
        );
        Ok(graph)
    }
}
