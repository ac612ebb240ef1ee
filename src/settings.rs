// config lets you read a separate config file, layered over defaults and the environment
use config::{Config, Environment, File};
use serde::Deserialize;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SurveyGraphError};
use crate::graph::ValueNamespace;
use crate::table::LoadOptions;

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG: &str = "surveygraph";
/// Prefix of environment variables overriding settings, e.g. `SURVEYGRAPH_SOURCE`.
/// `SURVEYGRAPH_CATEGORY_ORDER` takes a comma separated list and a single color
/// is set with `SURVEYGRAPH_CATEGORY_COLORS__STARTUP`.
pub const ENV_PREFIX: &str = "SURVEYGRAPH";

/// The visualization a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visualization {
    Table,
    Graph,
    CountryMap,
    MaturityMap,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub source: PathBuf,
    pub delimiter: char,
    pub infer_types: bool,
    pub visualization: Visualization,
    pub namespace: ValueNamespace,
    pub output_dir: PathBuf,
    pub country_column: String,
    pub category_column: String,
    pub category_order: Vec<String>,
    pub category_colors: HashMap<String, String>,
}

impl Settings {
    /// Defaults, then the config file, then `SURVEYGRAPH_*` variables.
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG).required(false),
        };
        let settings = Config::builder()
            .set_default("source", "survey.csv")?
            .set_default("delimiter", ",")?
            .set_default("infer_types", true)?
            .set_default("visualization", "graph")?
            .set_default("namespace", "shared")?
            .set_default("output_dir", ".")?
            .set_default("country_column", "Country")?
            .set_default("category_column", "Nivel_de_madurez_texto_EN")?
            .set_default("category_order", vec!["startup", "formative", "established"])?
            .set_default("category_colors.startup", "yellow")?
            .set_default("category_colors.formative", "orange")?
            .set_default("category_colors.established", "green")?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("category_order"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
    pub fn load_options(&self) -> Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            return Err(SurveyGraphError::Config(format!(
                "delimiter '{}' is not a single ASCII character",
                self.delimiter
            )));
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            infer_types: self.infer_types,
            ..LoadOptions::default()
        })
    }
}
