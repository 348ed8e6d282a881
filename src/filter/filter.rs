use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterJoinInfo, FilterOrderInfo, FilterWhereInfo, SqlResult};
use super::{is_identifier, quote_column, validate_column};

/// Builds one parameterized statement against a table (optionally aliased and
/// joined). Every value goes through a placeholder; identifiers are validated
/// and quoted.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    alias: Option<String>,
    joins: Vec<FilterJoinInfo>,
    select_columns: Vec<String>,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            alias: None,
            joins: vec![],
            select_columns: vec![],
            where_data: vec![],
            order_data: vec![],
            limit: None,
        })
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Result<Self, FilterError> {
        let alias = alias.into();
        Self::validate_table_name(&alias)?;
        self.alias = Some(alias);
        Ok(self)
    }

    /// Inner join `table AS alias ON left = right`.
    pub fn join(mut self, table: &str, alias: &str, left: &str, right: &str) -> Result<Self, FilterError> {
        Self::validate_table_name(table)?;
        Self::validate_table_name(alias)?;
        validate_column(left)?;
        validate_column(right)?;
        self.joins.push(FilterJoinInfo {
            table: table.to_string(),
            alias: alias.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        });
        Ok(self)
    }

    pub fn select(mut self, columns: &[&str]) -> Result<Self, FilterError> {
        for column in columns {
            validate_column(column)?;
        }
        self.select_columns = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    /// Adds `column = value`; conditions are ANDed in insertion order.
    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Result<Self, FilterError> {
        validate_column(column)?;
        self.where_data.push(FilterWhereInfo {
            column: column.to_string(),
            data: value.into(),
        });
        Ok(self)
    }

    pub fn order(mut self, order_spec: &str) -> Result<Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(order_spec)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0);
        let query = [
            format!("SELECT {}", self.build_select_clause()),
            format!("FROM {}", self.build_from_clause()),
            Self::prefixed("WHERE", where_clause),
            FilterOrder::generate(&self.order_data),
            self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0);
        let query = [
            format!("SELECT COUNT(*) AS count FROM {}", self.build_from_clause()),
            Self::prefixed("WHERE", where_clause),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    /// `UPDATE ... SET ... WHERE ...`; SET values take the first placeholders.
    pub fn to_update_sql(&self, changes: &[(&str, Value)]) -> Result<SqlResult, FilterError> {
        self.ensure_single_table()?;
        if changes.is_empty() {
            return Err(FilterError::EmptyAssignment(self.table_name.clone()));
        }

        let mut params = Vec::with_capacity(changes.len() + self.where_data.len());
        let mut assignments = Vec::with_capacity(changes.len());
        for (column, value) in changes {
            if !is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
            // Untyped NULL avoids binding a text-typed null into non-text columns
            if value.is_null() {
                assignments.push(format!("\"{}\" = NULL", column));
                continue;
            }
            params.push(value.clone());
            assignments.push(format!("\"{}\" = ${}", column, params.len()));
        }

        let (where_clause, where_params) = FilterWhere::generate(&self.where_data, params.len());
        params.extend(where_params);

        let query = [
            format!("UPDATE {} SET {}", self.build_from_clause(), assignments.join(", ")),
            Self::prefixed("WHERE", where_clause),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_delete_sql(&self) -> Result<SqlResult, FilterError> {
        self.ensure_single_table()?;
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0);
        let query = [
            format!("DELETE FROM {}", self.build_from_clause()),
            Self::prefixed("WHERE", where_clause),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// `INSERT INTO table (...) VALUES (...)`, optionally `RETURNING column`.
    pub fn to_insert_sql(&self, values: &[(&str, Value)], returning: Option<&str>) -> Result<SqlResult, FilterError> {
        self.ensure_single_table()?;
        if values.is_empty() {
            return Err(FilterError::EmptyAssignment(self.table_name.clone()));
        }

        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len());
        for (column, value) in values {
            if !is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
            columns.push(format!("\"{}\"", column));
            if value.is_null() {
                placeholders.push("NULL".to_string());
                continue;
            }
            params.push(value.clone());
            placeholders.push(format!("${}", params.len()));
        }

        let mut query = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table_name,
            columns.join(", "),
            placeholders.join(", ")
        );
        if let Some(column) = returning {
            if !is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
            query.push_str(&format!(" RETURNING \"{}\"", column));
        }

        Ok(SqlResult { query, params })
    }

    fn ensure_single_table(&self) -> Result<(), FilterError> {
        if self.joins.is_empty() {
            Ok(())
        } else {
            Err(FilterError::InvalidTableName(format!(
                "{} cannot be written through a join",
                self.table_name
            )))
        }
    }

    fn prefixed(keyword: &str, clause: String) -> String {
        if clause.is_empty() {
            clause
        } else {
            format!("{} {}", keyword, clause)
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if !is_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns
                .iter()
                .map(|c| quote_column(c))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn build_from_clause(&self) -> String {
        let mut from = match &self.alias {
            Some(alias) => format!("\"{}\" AS \"{}\"", self.table_name, alias),
            None => format!("\"{}\"", self.table_name),
        };
        for join in &self.joins {
            from.push_str(&format!(
                " JOIN \"{}\" AS \"{}\" ON {} = {}",
                join.table,
                join.alias,
                quote_column(&join.left),
                quote_column(&join.right)
            ));
        }
        from
    }
}
