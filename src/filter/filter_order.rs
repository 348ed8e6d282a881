use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};
use super::{quote_column, validate_column};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `"pd.name asc, p.id desc"` style order specs.
    pub fn validate_and_parse(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let Some(col) = it.next() else { continue };
            validate_column(col)?;
            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(dir) => return Err(FilterError::InvalidOrder(format!("unknown direction '{}'", dir))),
            };
            if it.next().is_some() {
                return Err(FilterError::InvalidOrder(trimmed.to_string()));
            }
            out.push(FilterOrderInfo { column: col.to_string(), sort });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", quote_column(&i.column), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_generates() {
        let infos = FilterOrder::validate_and_parse("pd.name, p.id desc").unwrap();
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"pd\".\"name\" ASC, \"p\".\"id\" DESC");
    }

    #[test]
    fn rejects_injection() {
        assert!(FilterOrder::validate_and_parse("name; drop table users").is_err());
        assert!(FilterOrder::validate_and_parse("name sideways").is_err());
    }
}
