use std::collections::BTreeSet;

use surveygraph::construct::RecordStore;
use surveygraph::datatype::Value;
use surveygraph::graph::{AttributeGraph, GraphProjector, NodeKind, ValueNamespace};
use surveygraph::table::Table;

fn store(columns: &[&str], rows: Vec<Vec<Value>>) -> RecordStore {
    let table = Table::new(columns.iter().map(|c| c.to_string()).collect(), rows).expect("table");
    RecordStore::from_table("graph.csv", table).expect("store")
}

fn survey() -> RecordStore {
    store(
        &["Country", "Level"],
        vec![
            vec!["Brazil".into(), "established".into()],
            vec!["Chile".into(), "startup".into()],
            vec!["Brazil".into(), "startup".into()],
        ],
    )
}

fn labels<'a>(nodes: impl Iterator<Item = &'a surveygraph::graph::Node>) -> BTreeSet<String> {
    nodes.map(|n| n.label().to_string()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn edges(graph: &AttributeGraph) -> BTreeSet<(String, String)> {
    graph
        .edges()
        .map(|(a, b)| (a.label().to_string(), b.label().to_string()))
        .collect()
}

#[test]
fn repeated_pairs_collapse_into_single_edges() {
    let graph = GraphProjector::default().project(&survey()).expect("graph");
    assert_eq!(labels(graph.column_nodes()), set(&["Country", "Level"]));
    assert_eq!(
        labels(graph.value_nodes()),
        set(&["Brazil", "Chile", "established", "startup"])
    );
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 4);
    let expected: BTreeSet<(String, String)> = [
        ("Country", "Brazil"),
        ("Country", "Chile"),
        ("Level", "established"),
        ("Level", "startup"),
    ]
    .iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();
    assert_eq!(edges(&graph), expected);
    assert!(graph.is_bipartite());
}

#[test]
fn every_record_value_is_connected_to_its_column() {
    let store = store(
        &["Country", "Year", "Score"],
        vec![
            vec!["Peru".into(), Value::Integer(2016), Value::Float(0.5)],
            vec!["México".into(), Value::Integer(2020), Value::Null],
        ],
    );
    let graph = GraphProjector::default().project(&store).expect("graph");
    for record in store.records() {
        for column in store.columns() {
            let value = record.get(column).unwrap().sanitized();
            assert!(graph.contains_edge(column, &value), "missing edge {column} - {value}");
        }
    }
    for (column, value) in graph.edges() {
        assert_eq!(column.kind(), NodeKind::Column);
        assert_eq!(value.kind(), NodeKind::Value);
    }
}

#[test]
fn text_is_stripped_of_non_ascii() {
    let store = store(&["Name"], vec![vec!["café".into()], vec!["東京".into()]]);
    let graph = GraphProjector::default().project(&store).expect("graph");
    assert!(graph.contains_edge("Name", &Value::from("caf")));
    assert!(!graph.contains_edge("Name", &Value::from("café")));
    // a value made only of non-ASCII characters becomes the empty string
    assert!(graph.contains_edge("Name", &Value::from("")));
    assert_eq!(labels(graph.value_nodes()), set(&["caf", ""]));
}

#[test]
fn numbers_and_nulls_pass_through() {
    let store = store(
        &["Year", "Score"],
        vec![vec![Value::Integer(5), Value::Null], vec![Value::Integer(5), Value::Float(5.0)]],
    );
    let graph = GraphProjector::default().project(&store).expect("graph");
    assert!(graph.contains_edge("Year", &Value::Integer(5)));
    assert!(graph.contains_edge("Score", &Value::Null));
    assert!(graph.contains_edge("Score", &Value::Float(5.0)));
    assert!(!graph.contains_edge("Score", &Value::Integer(5)));
    let values: Vec<&Value> = graph.value_nodes().filter_map(|n| n.value()).collect();
    assert_eq!(values, vec![&Value::Integer(5), &Value::Null, &Value::Float(5.0)]);
    assert_eq!(labels(graph.value_nodes()), set(&["5", "null", "5.0"]));
}

#[test]
fn shared_namespace_collapses_equal_values_across_columns() {
    // Flagged behavior: the same literal under two columns is one node.
    let store = store(&["Q1", "Q2"], vec![vec!["5".into(), "5".into()]]);
    let graph = GraphProjector::new(ValueNamespace::Shared).project(&store).expect("graph");
    assert_eq!(graph.value_nodes().count(), 1);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.is_bipartite());
}

#[test]
fn per_column_namespace_keeps_equal_values_apart() {
    let store = store(
        &["Q1", "Q2"],
        vec![vec!["5".into(), "5".into()], vec!["5".into(), "6".into()]],
    );
    let graph = GraphProjector::new(ValueNamespace::PerColumn).project(&store).expect("graph");
    assert_eq!(graph.namespace(), ValueNamespace::PerColumn);
    assert_eq!(graph.value_nodes().count(), 3);
    assert_eq!(graph.edge_count(), 3);
    let owners: BTreeSet<Option<String>> = graph
        .value_nodes()
        .map(|n| n.column().map(str::to_string))
        .collect();
    assert_eq!(owners, BTreeSet::from([Some("Q1".to_string()), Some("Q2".to_string())]));
    assert!(graph.contains_edge("Q2", &Value::from("6")));
    assert!(!graph.contains_edge("Q1", &Value::from("6")));
}

#[test]
fn column_and_value_with_the_same_text_stay_distinct() {
    let store = store(&["Country", "Answer"], vec![vec!["Chile".into(), "Country".into()]]);
    let graph = GraphProjector::default().project(&store).expect("graph");
    assert_eq!(graph.node_count(), 4);
    assert!(graph.contains_edge("Answer", &Value::from("Country")));
    assert!(graph.is_bipartite());
}

#[test]
fn explicit_node_creation_is_idempotent() {
    let mut graph = AttributeGraph::new(ValueNamespace::Shared);
    let column = graph.add_column("Level");
    assert_eq!(graph.add_column("Level"), column);
    let value = graph.add_value("Level", Value::from("startup"));
    assert_eq!(graph.add_value("Other", Value::from("startup")), value);
    assert!(graph.connect(column, value));
    assert!(!graph.connect(column, value));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn projection_is_deterministic_and_exportable() {
    let store = survey();
    let first = GraphProjector::default().project(&store).unwrap().export();
    let second = GraphProjector::default().project(&store).unwrap().export();
    assert_eq!(first, second);
    assert_eq!(first.nodes.len(), 6);
    assert_eq!(first.edges.len(), 4);
    assert_eq!(first.nodes[0].label, "Country");
    assert_eq!(first.nodes[0].kind, NodeKind::Column);
    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["nodes"][1]["kind"], "column");
    assert_eq!(json["nodes"][2]["kind"], "value");
    assert_eq!(json["edges"][0]["from"], 0);
}

#[test]
fn empty_store_projects_column_nodes_only() {
    let store = store(&["Country"], vec![]);
    let graph = GraphProjector::default().project(&store).unwrap();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.is_bipartite());
}
