//! Request-driven collection filtering
//!
//! A `Filter` narrows a `SelectQuery` according to the parameters of the
//! current request. Each filter is configured at construction with a
//! fields mapping (request parameter name -> storage field name(s)) and
//! is a no-op for requests that carry none of its parameters.
//!
//! `FilterSet` composes filters in declaration order; every filter only
//! ever appends conditions, so the set as a whole is narrowing-only and
//! order-independent in its final result.

use crate::datetime;
use crate::error::{DbError, DbResult};
use crate::repository::query::{QueryParams, SelectQuery};

/// A narrowing step applied to a query under a request context.
///
/// Implementations must be pure: they may only append conditions to the
/// query they are given, and must pass the query through untouched when
/// none of their configured parameters are present.
pub trait Filter: Send + Sync {
    /// Narrow `query` according to `params`.
    fn apply(&self, query: SelectQuery, params: &QueryParams) -> DbResult<SelectQuery>;
}

/// Relational suffixes checked per parameter, in precedence order.
///
/// The bare parameter (exact match) wins over any relational variant
/// when both are present.
const DATE_OPERATORS: &[(&str, &str)] = &[
    ("", "="),
    ("__lt", "<"),
    ("__lte", "<="),
    ("__gt", ">"),
    ("__gte", ">="),
];

/// Filter by a timestamp field. Other than exact, relative values
/// (lt, lte, gt, gte) are supported via `param__lt` style suffixes.
#[derive(Debug, Clone)]
pub struct DateFilter {
    fields: Vec<(String, String)>,
}

impl DateFilter {
    /// Mapping used when construction supplies no explicit one.
    const DEFAULT_FIELDS: &'static [(&'static str, &'static str)] = &[("date", "date")];

    /// Create a date filter from a (parameter -> field) mapping.
    ///
    /// An empty mapping falls back to [`Self::DEFAULT_FIELDS`], so
    /// construction of this filter kind never fails.
    pub fn new<P, F>(mapping: impl IntoIterator<Item = (P, F)>) -> DbResult<Self>
    where
        P: Into<String>,
        F: Into<String>,
    {
        let fields: Vec<(String, String)> = mapping
            .into_iter()
            .map(|(param, field)| (param.into(), field.into()))
            .collect();

        let fields = if fields.is_empty() {
            Self::DEFAULT_FIELDS
                .iter()
                .map(|(param, field)| (param.to_string(), field.to_string()))
                .collect()
        } else {
            fields
        };

        Ok(Self { fields })
    }
}

impl Filter for DateFilter {
    fn apply(&self, mut query: SelectQuery, params: &QueryParams) -> DbResult<SelectQuery> {
        for (param, field) in &self.fields {
            for (suffix, operator) in DATE_OPERATORS {
                let name = format!("{}{}", param, suffix);
                let Some(raw) = params.get(&name) else {
                    continue;
                };

                let value = datetime::parse_timestamp(raw).ok_or_else(|| DbError::Validation {
                    message: format!("Invalid datetime value for '{}': '{}'", name, raw),
                })?;

                let placeholder = query.push_binding(value.to_rfc3339());
                query.push_condition(format!(
                    "{} {} <datetime> {}",
                    field, operator, placeholder
                ));

                // Only the first present variant applies per pair
                break;
            }
        }
        Ok(query)
    }
}

/// Allow filtering records based on whether a field is empty or not.
#[derive(Debug, Clone)]
pub struct CheckNoneFilter {
    fields: Vec<(String, String)>,
}

/// Parameter values meaning "the field is populated".
const EXISTS_KEYWORDS: &[&str] = &[
    "true", "exists", "not none", "not-none", "not_none", "notnone", "filled", "populated",
];

/// Parameter values meaning "the field is empty".
const EMPTY_KEYWORDS: &[&str] = &[
    "false",
    "not exists",
    "notexists",
    "not-exists",
    "not_exists",
    "none",
    "empty",
];

impl CheckNoneFilter {
    /// Create a null-check filter from a (parameter -> field) mapping.
    ///
    /// # Errors
    ///
    /// Returns `DbError::FilterConfig` when the mapping is empty; this
    /// filter kind has no default mapping.
    pub fn new<P, F>(mapping: impl IntoIterator<Item = (P, F)>) -> DbResult<Self>
    where
        P: Into<String>,
        F: Into<String>,
    {
        let fields: Vec<(String, String)> = mapping
            .into_iter()
            .map(|(param, field)| (param.into(), field.into()))
            .collect();

        if fields.is_empty() {
            return Err(DbError::FilterConfig {
                message: "Must provide a fields mapping for CheckNoneFilter.".to_string(),
            });
        }

        Ok(Self { fields })
    }
}

impl Filter for CheckNoneFilter {
    fn apply(&self, mut query: SelectQuery, params: &QueryParams) -> DbResult<SelectQuery> {
        for (param, field) in &self.fields {
            let value = params.get(param).unwrap_or("").to_lowercase();

            if EXISTS_KEYWORDS.contains(&value.as_str()) {
                query.push_condition(format!("{} != NONE", field));
            } else if EMPTY_KEYWORDS.contains(&value.as_str()) {
                query.push_condition(format!("{} = NONE", field));
            }
            // Any other value, including absent, is a no-op for this pair
        }
        Ok(query)
    }
}

/// Check if any of the mapped fields contains the provided text,
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct TextFilter {
    fields: Vec<(String, Vec<String>)>,
}

impl TextFilter {
    /// Create a text filter from a (parameter -> group of fields) mapping.
    ///
    /// # Errors
    ///
    /// Returns `DbError::FilterConfig` when the mapping is empty or any
    /// parameter maps to an empty field group; this filter kind has no
    /// default mapping.
    pub fn new<P, F>(mapping: impl IntoIterator<Item = (P, Vec<F>)>) -> DbResult<Self>
    where
        P: Into<String>,
        F: Into<String>,
    {
        let fields: Vec<(String, Vec<String>)> = mapping
            .into_iter()
            .map(|(param, group)| {
                (
                    param.into(),
                    group.into_iter().map(Into::into).collect::<Vec<String>>(),
                )
            })
            .collect();

        if fields.is_empty() || fields.iter().any(|(_, group)| group.is_empty()) {
            return Err(DbError::FilterConfig {
                message: "Must provide a fields mapping for TextFilter.".to_string(),
            });
        }

        Ok(Self { fields })
    }
}

impl Filter for TextFilter {
    fn apply(&self, mut query: SelectQuery, params: &QueryParams) -> DbResult<SelectQuery> {
        for (param, group) in &self.fields {
            let value = params.get(param).unwrap_or("").to_lowercase();
            if value.is_empty() {
                continue;
            }

            let placeholder = query.push_binding(value);
            let alternatives: Vec<String> = group
                .iter()
                .map(|field| {
                    // Coalesce so empty fields compare as '' instead of erroring
                    format!(
                        "string::contains(string::lowercase({} ?? ''), {})",
                        field, placeholder
                    )
                })
                .collect();
            query.push_condition(format!("({})", alternatives.join(" OR ")));
        }
        Ok(query)
    }
}

/// An ordered set of filters applied in declaration order.
///
/// The empty set is the identity. Since every filter is narrowing-only,
/// order affects intermediate shapes, never the final result.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the set.
    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the set.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the set holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Thread `query` through every filter in declaration order.
    pub fn apply(&self, query: SelectQuery, params: &QueryParams) -> DbResult<SelectQuery> {
        self.filters
            .iter()
            .try_fold(query, |narrowed, filter| filter.apply(narrowed, params))
    }
}
