//! Surveygraph – record filtering and attribute-value graphs over survey tables.
//!
//! A survey export is a flat table: one row per respondent, one column per
//! attribute. Surveygraph loads it once and offers two views of it:
//! * A [`construct::RecordStore`] materializes every row as an immutable
//!   [`construct::Record`] and answers equality filters over any set of columns.
//! * A [`graph::GraphProjector`] turns the store into a bipartite
//!   [`graph::AttributeGraph`] where column nodes are joined to the (sanitized)
//!   values observed under them.
//!
//! ## Modules
//! * [`datatype`] – The scalar [`datatype::Value`], per-column type inference and sanitization.
//! * [`table`] – The [`table::Table`] and the [`table::TableSource`] seam, with a CSV source.
//! * [`construct`] – Records, filter criteria and the record store.
//! * [`graph`] – The attribute graph and its projector.
//! * [`settings`] – Layered configuration selecting the source and visualization.
//! * [`render`] – HTML pages for the table, graph and map visualizations.
//!
//! ## Quick Start
//! ```
//! use surveygraph::construct::{Criteria, RecordStore};
//! use surveygraph::graph::GraphProjector;
//! use surveygraph::table::CsvSource;
//! let csv = "Country,Level\nBrazil,established\nChile,startup\nBrazil,startup\n";
//! let store = RecordStore::load(CsvSource::from_reader("survey.csv", csv.as_bytes())).unwrap();
//! let brazil = store.filter(&Criteria::new().with("Country", "Brazil")).unwrap();
//! assert_eq!(brazil.len(), 2);
//! let graph = GraphProjector::default().project(&store).unwrap();
//! assert_eq!(graph.edge_count(), 4);
//! ```

pub mod construct;
pub mod datatype;
pub mod error;
pub mod graph;
pub mod render;
pub mod settings;
pub mod table;

pub use error::{Result, SurveyGraphError};
