//! Lazy select-query building
//!
//! `SelectQuery` is the collection representation the filters narrow: a
//! table plus an accumulated WHERE-condition list and named bindings.
//! Nothing touches the database until a repository renders the statement
//! and executes it, so narrowing steps compose cheaply and purely.

use std::collections::HashMap;
use serde_json::Value;

/// Request parameters as seen by the filters.
///
/// A thin read-only view over the query string of the current request,
/// decoupled from any HTTP framework type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Insert a parameter value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Whether no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A select over one table, narrowed by zero or more AND-ed conditions.
///
/// Values referenced by conditions are carried as named bindings
/// (`$p0`, `$p1`, ...) so request-supplied text never lands in the
/// statement itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: &'static str,
    conditions: Vec<String>,
    bindings: Vec<(String, Value)>,
    order: Option<&'static str>,
    fetch: Option<&'static str>,
    limit: Option<u64>,
    start: Option<u64>,
}

impl SelectQuery {
    /// Start an unfiltered query over a table.
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            bindings: Vec::new(),
            order: None,
            fetch: None,
            limit: None,
            start: None,
        }
    }

    /// Register a bound value and return its `$name` placeholder.
    pub fn push_binding(&mut self, value: impl Into<Value>) -> String {
        let name = format!("p{}", self.bindings.len());
        let placeholder = format!("${}", name);
        self.bindings.push((name, value.into()));
        placeholder
    }

    /// Append an AND-ed WHERE condition.
    pub fn push_condition(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// Set the ORDER BY clause.
    pub fn with_order(mut self, order: &'static str) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the record-link field to expand with FETCH.
    pub fn with_fetch(mut self, fetch: &'static str) -> Self {
        self.fetch = Some(fetch);
        self
    }

    /// Limit the number of returned rows.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `start` rows.
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// The accumulated WHERE conditions, in order.
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// The accumulated bindings, in order.
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }

    /// Consume the query, returning its bindings for execution.
    pub fn into_bindings(self) -> Vec<(String, Value)> {
        self.bindings
    }

    /// Render the SELECT statement with the given projection.
    pub fn statement(&self, projection: &str) -> String {
        let mut sql = format!("SELECT {} FROM {}", projection, self.table);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if let Some(order) = self.order {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(start) = self.start {
            sql.push_str(&format!(" START {}", start));
        }
        if let Some(fetch) = self.fetch {
            sql.push_str(" FETCH ");
            sql.push_str(fetch);
        }
        sql
    }

    /// Render a matching-row count statement over the same conditions.
    ///
    /// Ordering and pagination do not apply to the count.
    pub fn count_statement(&self) -> String {
        let mut sql = format!("SELECT count() AS count FROM {}", self.table);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(" GROUP ALL");
        sql
    }
}
