//! Read query description shared by all store backends.

use std::fmt::Write;

/// Column filter applied to a read query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    In { column: String, values: Vec<String> },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn in_list<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// Render the right-hand side of a REST filter parameter, e.g. `eq.c1`
    /// or `in.("p1","p2")`.
    pub fn to_param_value(&self) -> String {
        match self {
            Filter::Eq { value, .. } => format!("eq.{value}"),
            Filter::In { values, .. } => {
                let mut out = String::from("in.(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    // Quoted so that commas and parentheses in ids survive.
                    let _ = write!(out, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""));
                }
                out.push(')');
                out
            }
        }
    }
}

/// Sort order for a read query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    pub fn to_param_value(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{}", self.column, direction)
    }
}

/// A read against a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    filters: Vec<Filter>,
    order: Option<Order>,
}

impl Query {
    /// Start a query against `table` selecting every column.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Restrict the returned columns.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Encode the query as REST query-string pairs (unescaped).
    pub fn to_params(&self) -> Vec<(String, String)> {
        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };

        let mut params = vec![("select".to_string(), select)];
        for filter in &self.filters {
            params.push((filter.column().to_string(), filter.to_param_value()));
        }
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.to_param_value()));
        }
        params
    }
}
