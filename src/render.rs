//! HTML collaborators for the four visualizations.
//!
//! Every page is self-contained apart from the charting library it pulls
//! from a CDN: vis-network for the attribute graph, plotly for the maps.
//! Data is embedded as JSON.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Value as Json, json};
use tracing::info;

use crate::construct::{Criteria, RecordStore};
use crate::datatype::Value;
use crate::error::Result;
use crate::graph::{AttributeGraph, GraphProjector};
use crate::settings::{Settings, Visualization};
use crate::table::Table;

const VIS_NETWORK: &str = "https://unpkg.com/vis-network/standalone/umd/vis-network.min.js";
const PLOTLY: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const FALLBACK_COLOR: &str = "gray";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

// JSON placed inside a script element must not be able to close it
fn script_json<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string(data)?.replace("</", "<\\/"))
}

fn page(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}</head>\n<body>\n<h1>{}</h1>\n{}</body>\n</html>\n",
        escape_html(title),
        head,
        escape_html(title),
        body
    )
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => escape_html(&other.to_string()),
    }
}

// ------------- Table -------------
pub fn table_html(table: &Table, title: &str) -> String {
    let mut body = String::from("<table>\n<thead><tr>");
    for column in table.columns() {
        body.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    body.push_str("</tr></thead>\n<tbody>\n");
    for row in table.rows() {
        body.push_str("<tr>");
        for value in row {
            body.push_str(&format!("<td>{}</td>", cell(value)));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>\n");
    let style = "<style>\
        table { border-collapse: collapse; }\
        th { background: paleturquoise; text-align: left; padding: 4px; }\
        td { background: lavender; text-align: left; padding: 4px; }\
        </style>\n";
    page(title, style, &body)
}

// ------------- Graph -------------
pub fn graph_html(graph: &AttributeGraph, title: &str) -> Result<String> {
    let data = script_json(&graph.export())?;
    let head = format!("<script src=\"{}\"></script>\n", VIS_NETWORK);
    let body = format!(
        "<div id=\"graph\" style=\"width: 100%; height: 750px;\"></div>\n<script>\n\
         const data = {};\n\
         const nodes = new vis.DataSet(data.nodes.map(n => ({{ id: n.id, label: n.label, group: n.kind }})));\n\
         const edges = new vis.DataSet(data.edges.map(e => ({{ from: e.from, to: e.to }})));\n\
         new vis.Network(document.getElementById(\"graph\"), {{ nodes, edges }}, {{ configure: {{ enabled: true }} }});\n\
         </script>\n",
        data
    );
    Ok(page(title, &head, &body))
}

// ------------- Maps -------------
fn geo_layout(title: &str) -> Json {
    json!({
        "title": { "text": title },
        "geo": {
            "projection": { "type": "orthographic" },
            "showcoastlines": true,
            "coastlinecolor": "DarkBlue",
            "showland": true,
            "landcolor": "LightGreen"
        }
    })
}

fn map_page(title: &str, traces: &[Json]) -> Result<String> {
    let head = format!("<script src=\"{}\"></script>\n", PLOTLY);
    let body = format!(
        "<div id=\"map\" style=\"width: 100%; height: 750px;\"></div>\n<script>\n\
         Plotly.newPlot(\"map\", {}, {});\n\
         </script>\n",
        script_json(&traces)?,
        script_json(&geo_layout(title))?
    );
    Ok(page(title, &head, &body))
}

/// One choropleth trace colouring every distinct country differently.
pub fn country_map_html(countries: &[&Value], title: &str) -> Result<String> {
    let names: Vec<String> = countries
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
        .collect();
    let z: Vec<usize> = (0..names.len()).collect();
    let trace = json!({
        "type": "choropleth",
        "locationmode": "country names",
        "locations": &names,
        "z": z,
        "text": &names,
        "hoverinfo": "text",
        "colorscale": "Rainbow",
        "showscale": false
    });
    map_page(title, &[trace])
}

/// One choropleth trace per category, listed categories first in the given
/// order, then any others in the order they are first seen.
pub fn maturity_map_html(
    store: &RecordStore,
    country_column: &str,
    category_column: &str,
    order: &[String],
    colors: &HashMap<String, String>,
    title: &str,
) -> Result<String> {
    let mut categories: Vec<Value> = order.iter().map(|c| Value::from(c.as_str())).collect();
    for value in store.distinct_values(category_column)? {
        if !value.is_null() && !categories.contains(value) {
            categories.push(value.clone());
        }
    }
    let mut traces = Vec::new();
    for category in categories {
        let criteria = Criteria::new().with(category_column, category.clone());
        let mut locations = Vec::new();
        for record in store.filter(&criteria)? {
            let country = record.get(country_column)?;
            if !country.is_null() {
                locations.push(country.to_string());
            }
        }
        if locations.is_empty() {
            continue;
        }
        let name = category.to_string();
        let color = colors.get(&name).map_or(FALLBACK_COLOR, String::as_str);
        let z = vec![1; locations.len()];
        traces.push(json!({
            "type": "choropleth",
            "locationmode": "country names",
            "name": name,
            "locations": &locations,
            "z": z,
            "text": &locations,
            "hoverinfo": "text+name",
            "colorscale": [[0, color], [1, color]],
            "showscale": false,
            "showlegend": true
        }));
    }
    map_page(title, &traces)
}

// ------------- Dispatch -------------
/// Produces the configured visualization and returns the written file.
pub fn render(store: &RecordStore, settings: &Settings) -> Result<PathBuf> {
    let (file_name, html) = match settings.visualization {
        Visualization::Table => ("table.html", table_html(store.table(), store.name())),
        Visualization::Graph => {
            let graph = GraphProjector::new(settings.namespace).project(store)?;
            ("interactive_graph.html", graph_html(&graph, store.name())?)
        }
        Visualization::CountryMap => {
            let countries = store.distinct_values(&settings.country_column)?;
            (
                "country_map.html",
                country_map_html(&countries, "Countries mentioned in the dataset")?,
            )
        }
        Visualization::MaturityMap => (
            "maturity_map.html",
            maturity_map_html(
                store,
                &settings.country_column,
                &settings.category_column,
                &settings.category_order,
                &settings.category_colors,
                "Maturity level by country",
            )?,
        ),
    };
    fs::create_dir_all(&settings.output_dir)?;
    let path = settings.output_dir.join(file_name);
    fs::write(&path, html)?;
    info!(path = %path.display(), visualization = ?settings.visualization, "visualization written");
    Ok(path)
}
