// other keepers use HashSet or HashMap
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hash};
use seahash::SeaHasher;

// records share one column index, so they are handed out through Arc
use std::sync::Arc;

// used to print out readable forms of a construct
use std::fmt;

// since every record is a row number we can use bitsets to "join" filter criteria
use roaring::RoaringBitmap;

use tracing::{debug, info};

// our own stuff that we need
use crate::datatype::Value;
use crate::error::{Result, SurveyGraphError};
use crate::table::{Table, TableSource};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Columns -------------
/// The ordered column names of a store, with a name to position index.
#[derive(Debug, PartialEq)]
pub struct Columns {
    names: Vec<String>,
    positions: HashMap<String, usize, OtherHasher>,
}
impl Columns {
    pub fn new(names: &[String]) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names: names.to_vec(),
            positions,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.names
    }
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ------------- Record -------------
/// One materialized row, addressable by column name.
///
/// Records are only created by a [`RecordStore`] and expose no way to change
/// their values afterwards.
#[derive(Debug, Clone)]
pub struct Record {
    row: usize,
    columns: Arc<Columns>,
    values: Vec<Value>,
}
impl Record {
    fn new(row: usize, columns: Arc<Columns>, values: Vec<Value>) -> Self {
        Self { row, columns, values }
    }
    /// Zero-based position of the row this record was made from.
    pub fn row(&self) -> usize {
        self.row
    }
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.columns
            .position(column)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| SurveyGraphError::Attribute(column.to_owned()))
    }
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// True when every criterion holds; fails on the first unknown column.
    pub fn matches(&self, criteria: &Criteria) -> Result<bool> {
        for (column, expected) in criteria.iter() {
            if self.get(column)? != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
            && self.columns.names() == other.columns.names()
            && self.values == other.values
    }
}
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields: Vec<String> = self
            .fields()
            .map(|(column, value)| format!("{}={}", column, value))
            .collect();
        write!(f, "Record({})", fields.join(", "))
    }
}

// ------------- Criteria -------------
/// Column name to expected value. Setting a column twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pairs: Vec<(String, Value)>,
}
impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with<C: Into<String>, V: Into<Value>>(mut self, column: C, value: V) -> Self {
        self.set(column.into(), value.into());
        self
    }
    fn set(&mut self, column: String, value: Value) {
        match self.pairs.iter_mut().find(|(c, _)| *c == column) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((column, value)),
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(c, v)| (c.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
impl<C: Into<String>, V: Into<Value>> FromIterator<(C, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (column, value) in iter {
            criteria.set(column.into(), value.into());
        }
        criteria
    }
}

// ------------- Lookups -------------
/// Maps a key to the set of rows it was observed in.
#[derive(Debug)]
pub struct Lookup<K, H = OtherHasher> {
    index: HashMap<K, RoaringBitmap, H>,
}
impl<K: Eq + Hash> Lookup<K> {
    pub fn new() -> Self {
        Self {
            index: HashMap::default(),
        }
    }
    pub fn insert(&mut self, key: K, row: u32) {
        self.index.entry(key).or_default().insert(row);
    }
    pub fn lookup(&self, key: &K) -> Option<&RoaringBitmap> {
        self.index.get(key)
    }
}
impl<K: Eq + Hash> Default for Lookup<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Human readable store name: last path segment, cut at the first dot,
/// with underscores turned into spaces.
pub fn store_name(identifier: &str) -> String {
    let file = identifier.rsplit(['/', '\\']).next().unwrap_or(identifier);
    let stem = file.split('.').next().unwrap_or(file);
    stem.replace('_', " ")
}

// ------------- RecordStore -------------
// This owns the loaded table, its records and one value lookup per column
pub struct RecordStore {
    name: String,
    identifier: String,
    table: Table,
    columns: Arc<Columns>,
    records: Vec<Record>,
    lookups: Vec<Lookup<Value>>,
}

impl RecordStore {
    pub fn load<S: TableSource>(source: S) -> Result<Self> {
        let identifier = source.identifier().to_owned();
        let table = source.read_table()?;
        Self::from_table(identifier, table)
    }
    pub fn from_table<S: Into<String>>(identifier: S, table: Table) -> Result<Self> {
        let identifier = identifier.into();
        if u32::try_from(table.len()).is_err() {
            return Err(SurveyGraphError::Schema {
                message: format!("{} rows exceed the addressable row count", table.len()),
                row: None,
            });
        }
        let columns = Arc::new(Columns::new(table.columns()));
        let mut lookups: Vec<Lookup<Value>> = (0..columns.len()).map(|_| Lookup::new()).collect();
        let mut records = Vec::with_capacity(table.len());
        for (row, values) in table.rows().iter().enumerate() {
            for (lookup, value) in lookups.iter_mut().zip(values) {
                // the row count was checked above
                lookup.insert(value.clone(), row as u32);
            }
            records.push(Record::new(row, Arc::clone(&columns), values.clone()));
        }
        let name = store_name(&identifier);
        info!(name = %name, rows = records.len(), columns = columns.len(), "record store loaded");
        Ok(Self {
            name,
            identifier,
            table,
            columns,
            records,
            lookups,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
    pub fn table(&self) -> &Table {
        &self.table
    }
    pub fn columns(&self) -> &[String] {
        self.columns.names()
    }
    pub fn records(&self) -> &[Record] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    fn position(&self, column: &str) -> Result<usize> {
        self.columns
            .position(column)
            .ok_or_else(|| SurveyGraphError::Attribute(column.to_owned()))
    }
    /// Every record whose value equals the expected value for every
    /// criterion, in original row order. Unknown columns fail up front.
    pub fn filter(&self, criteria: &Criteria) -> Result<Vec<&Record>> {
        let positions = criteria
            .iter()
            .map(|(column, _)| self.position(column))
            .collect::<Result<Vec<usize>>>()?;
        if criteria.is_empty() {
            return Ok(self.records.iter().collect());
        }
        let mut matched: Option<RoaringBitmap> = None;
        for ((_, expected), position) in criteria.iter().zip(positions) {
            let Some(rows) = self.lookups[position].lookup(expected) else {
                matched = Some(RoaringBitmap::new());
                break;
            };
            let narrowed = match matched {
                None => rows.clone(),
                Some(mut so_far) => {
                    so_far &= rows;
                    so_far
                }
            };
            let exhausted = narrowed.is_empty();
            matched = Some(narrowed);
            if exhausted {
                break;
            }
        }
        let matched = matched.unwrap_or_default();
        debug!(criteria = criteria.len(), matched = matched.len(), "filter evaluated");
        Ok(matched
            .iter()
            .map(|row| &self.records[row as usize])
            .collect())
    }
    /// Raw column access in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<&Value>> {
        let position = self.position(column)?;
        Ok(self.records.iter().map(|r| &r.values[position]).collect())
    }
    /// Distinct values of a column in the order they are first seen.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<&Value>> {
        let mut seen = HashSet::new();
        Ok(self
            .column_values(column)?
            .into_iter()
            .filter(|v| seen.insert(*v))
            .collect())
    }
}

impl fmt::Display for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RecordStore(name='{}', columns={:?}, rows={})",
            self.name,
            self.columns.names(),
            self.records.len()
        )
    }
}
