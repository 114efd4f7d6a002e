//! Per-block query state accumulated by the statement compiler.

use serde::Serialize;

use super::keywords::FetchParam;
use crate::ast::BinaryOp;

/// What the prepared query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    All,
    Keys,
    Single,
    Count,
    #[default]
    None,
}

impl SelectionMode {
    pub fn parse(name: &str) -> Option<Self> {
        use super::keywords::matches_word;
        [
            SelectionMode::All,
            SelectionMode::Keys,
            SelectionMode::Single,
            SelectionMode::Count,
        ]
        .into_iter()
        .find(|mode| matches_word(name, mode.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::All => "all",
            SelectionMode::Keys => "keys",
            SelectionMode::Single => "single",
            SelectionMode::Count => "count",
            SelectionMode::None => "none",
        }
    }
}

/// How rows of a typed `from` are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    Pojo,
    Entity,
}

impl Representation {
    /// Read the marker of `from marker as Type`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let upper = marker.to_uppercase();
        if upper.contains("POJO") || upper.contains("BEAN") {
            Some(Representation::Pojo)
        } else if upper.contains("ENTITY") {
            Some(Representation::Entity)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Pojo => "pojo",
            Representation::Entity => "entity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
}

impl FilterOperator {
    /// Map a predicate operator; `<<` is an alias for `in`.
    pub fn from_binary(op: BinaryOp) -> Option<Self> {
        let operator = match op {
            BinaryOp::Eq => FilterOperator::Equal,
            BinaryOp::Ne => FilterOperator::NotEqual,
            BinaryOp::Lt => FilterOperator::LessThan,
            BinaryOp::Le => FilterOperator::LessThanOrEqual,
            BinaryOp::Gt => FilterOperator::GreaterThan,
            BinaryOp::Ge => FilterOperator::GreaterThanOrEqual,
            BinaryOp::In | BinaryOp::LeftShift => FilterOperator::In,
            _ => return None,
        };
        Some(operator)
    }

    pub fn token(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "EQUAL",
            FilterOperator::NotEqual => "NOT_EQUAL",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOperator::In => "IN",
        }
    }

    /// Everything but equality and set membership.
    pub fn is_inequality(&self) -> bool {
        !matches!(self, FilterOperator::Equal | FilterOperator::In)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Read a direction marker; `ASC` and `DESC` in any case.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let upper = marker.to_uppercase();
        if upper.starts_with("DESC") {
            Some(SortDirection::Descending)
        } else if upper.starts_with("ASC") {
            Some(SortDirection::Ascending)
        } else {
            None
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASCENDING",
            SortDirection::Descending => "DESCENDING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    /// Rendered value expression.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// One `name = value` or `name(value)` argument of a fetch-tuning keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setting {
    pub param: FetchParam,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FetchOptions {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub chunk_size: Option<String>,
    pub prefetch_size: Option<String>,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl FetchOptions {
    pub fn set(&mut self, param: FetchParam, value: String) {
        let slot = match param {
            FetchParam::Limit => &mut self.limit,
            FetchParam::Offset => &mut self.offset,
            FetchParam::ChunkSize => &mut self.chunk_size,
            FetchParam::PrefetchSize => &mut self.prefetch_size,
            FetchParam::StartCursor => &mut self.start_cursor,
            FetchParam::EndCursor => &mut self.end_cursor,
        };
        *slot = Some(value);
    }

    pub fn get(&self, param: FetchParam) -> Option<&str> {
        match param {
            FetchParam::Limit => self.limit.as_deref(),
            FetchParam::Offset => self.offset.as_deref(),
            FetchParam::ChunkSize => self.chunk_size.as_deref(),
            FetchParam::PrefetchSize => self.prefetch_size.as_deref(),
            FetchParam::StartCursor => self.start_cursor.as_deref(),
            FetchParam::EndCursor => self.end_cursor.as_deref(),
        }
    }
}

/// The translated form of one statement, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "clause", rename_all = "camelCase")]
pub enum Clause {
    Select {
        mode: Option<SelectionMode>,
        settings: Vec<Setting>,
    },
    Cursor {
        mode: SelectionMode,
        settings: Vec<Setting>,
    },
    From {
        kind: Option<String>,
        /// Type of `marker as Type`, as written.
        type_name: Option<String>,
        representation: Option<Representation>,
        ancestor: Option<String>,
    },
    Where { filters: Vec<Filter> },
    OrderBy { sorts: Vec<Sort> },
    FetchOptions { settings: Vec<Setting> },
}

/// Everything known about one query block.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QuerySpec {
    pub selection: SelectionMode,
    pub cursor: bool,
    pub kind: Option<String>,
    pub kindless_ancestor: bool,
    pub type_name: Option<String>,
    pub representation: Option<Representation>,
    pub ancestor: Option<String>,
    pub fetch: FetchOptions,
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub inequality_field: Option<String>,
    pub inequality_count: usize,
    pub has_not_equal: bool,
    pub clauses: Vec<Clause>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of inequality predicates a query may carry.
    pub const MAX_INEQUALITIES: usize = 2;
}
