use serde_json::Value;

use super::quote_column;
use super::types::FilterWhereInfo;

/// Renders equality conditions as an `AND` chain with numbered placeholders.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause without the `WHERE` keyword, or an empty string
    /// when there are no conditions.
    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = conditions
            .iter()
            .map(|c| filter_where.build_sql_condition(c))
            .collect::<Vec<_>>()
            .join(" AND ");
        (sql, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let column = quote_column(&condition.column);
        if condition.data.is_null() {
            return format!("{} IS NULL", column);
        }
        self.param_index += 1;
        self.param_values.push(condition.data.clone());
        format!("{} = ${}", column, self.param_index)
    }
}
