//! SQL rendering for the gateway's queries.
//!
//! Identifiers come from the [`Column`] catalogue; every request-supplied
//! value becomes a positional `$n` argument.

use crate::columns::{Column, Entity, TRIAL_JOIN_KEY};
use crate::store::SUGGESTION_LIMIT;

/// Rendered SQL text plus its positional arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub args: Vec<String>,
}

/// A case-insensitive substring predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: Column,
    pub value: String,
}

/// Escapes `LIKE` metacharacters so `value` matches literally under
/// `ESCAPE '\'`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `/search` query-string parameters. Missing parameters default to empty.
#[derive(Debug, Default, Clone)]
pub struct SearchParams {
    pub disease_indication_category: String,
    pub trial_datapoint_idc_identifier_row_identifier: String,
    pub immunogenicity_testing: String,
    pub antibody: String,
    pub target: String,
}

impl SearchParams {
    /// Picks the filter parameters out of decoded query-string pairs. The
    /// first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();
        for column in Column::ALL {
            if let Some((_, value)) = pairs.iter().find(|(k, _)| k == column.name()) {
                *params.value_mut(column) = value.clone();
            }
        }
        params
    }

    fn value_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::DiseaseIndicationCategory => &mut self.disease_indication_category,
            Column::TrialDatapointIdcIdentifierRowIdentifier => {
                &mut self.trial_datapoint_idc_identifier_row_identifier
            }
            Column::ImmunogenicityTesting => &mut self.immunogenicity_testing,
            Column::Antibody => &mut self.antibody,
            Column::Target => &mut self.target,
        }
    }

    fn value(&self, column: Column) -> &str {
        match column {
            Column::DiseaseIndicationCategory => &self.disease_indication_category,
            Column::TrialDatapointIdcIdentifierRowIdentifier => {
                &self.trial_datapoint_idc_identifier_row_identifier
            }
            Column::ImmunogenicityTesting => &self.immunogenicity_testing,
            Column::Antibody => &self.antibody,
            Column::Target => &self.target,
        }
    }
}

/// Builder for the trial/antibody search join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    filters: Vec<Filter>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a query from request parameters, trimming each value and
    /// skipping the empty ones.
    pub fn from_params(params: &SearchParams) -> Self {
        Column::ALL
            .into_iter()
            .fold(Self::new(), |query, column| {
                query.contains(column, params.value(column))
            })
    }

    /// Adds a substring filter on `column`. Blank values are ignored.
    pub fn contains(mut self, column: Column, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.filters.push(Filter {
                column,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Renders the join with one `ILIKE $n` predicate per filter. Each row is
    /// returned as a single JSON object, so columns sharing a name collapse
    /// to the last one.
    pub fn build(&self) -> SqlQuery {
        let trial = Entity::Trial;
        let antibody = Entity::Antibody;
        let mut sql = format!(
            "SELECT row_to_json(j) FROM (SELECT * FROM {} {} FULL JOIN {} {} ON {}.{} = {} WHERE TRUE",
            trial.table(),
            trial.alias(),
            antibody.table(),
            antibody.alias(),
            trial.alias(),
            TRIAL_JOIN_KEY,
            Column::Antibody.qualified(),
        );
        let mut args = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            args.push(format!("%{}%", escape_like(&filter.value)));
            sql.push_str(&format!(
                " AND {} ILIKE ${} ESCAPE '\\'",
                filter.column.qualified(),
                args.len()
            ));
        }
        sql.push_str(") j");

        SqlQuery { sql, args }
    }
}

/// `SELECT DISTINCT` over the table owning `column`. Values come back as
/// `jsonb` so any column type maps onto JSON.
pub fn unique_values(column: Column) -> SqlQuery {
    let name = column.name();
    SqlQuery {
        sql: format!(
            "SELECT DISTINCT to_jsonb({name}) FROM {} WHERE {name} IS NOT NULL",
            column.entity().table()
        ),
        args: Vec::new(),
    }
}

/// Prefix autocomplete over `column`, shortest values first.
pub fn suggestions(column: Column, prefix: &str) -> SqlQuery {
    let name = column.name();
    let prefix = prefix.trim();
    let mut args = Vec::new();
    let mut predicate = String::new();
    if !prefix.is_empty() {
        args.push(format!("{}%", escape_like(prefix)));
        predicate = format!(" AND {name}::text ILIKE $1 ESCAPE '\\'");
    }

    SqlQuery {
        sql: format!(
            "SELECT suggestion FROM (SELECT DISTINCT {name}::text AS suggestion FROM {table} \
             WHERE {name} IS NOT NULL AND {name}::text <> ''{predicate}) sub \
             ORDER BY LENGTH(suggestion), suggestion ASC LIMIT {SUGGESTION_LIMIT}",
            table = column.entity().table(),
        ),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOIN: &str = "SELECT row_to_json(j) FROM (SELECT * FROM trial t FULL JOIN antibodies a \
                        ON t.therapeutic_assessed_for_ada_inn_name = a.antibody WHERE TRUE";

    #[test]
    fn test_search_without_filters() {
        let query = SearchQuery::new().build();
        assert_eq!(query.sql, format!("{JOIN}) j"));
        assert!(query.args.is_empty());
    }

    #[test]
    fn test_search_with_filters_binds_arguments_in_order() {
        let query = SearchQuery::new()
            .contains(Column::DiseaseIndicationCategory, "onco")
            .contains(Column::Target, "TNF")
            .build();

        assert_eq!(
            query.sql,
            format!(
                "{JOIN} AND t.disease_indication_category ILIKE $1 ESCAPE '\\' \
                 AND a.target ILIKE $2 ESCAPE '\\') j"
            )
        );
        assert_eq!(query.args, vec!["%onco%".to_string(), "%TNF%".to_string()]);
    }

    #[test]
    fn test_search_blank_values_add_no_filter() {
        let query = SearchQuery::new()
            .contains(Column::Antibody, "")
            .contains(Column::Target, "   ");
        assert!(query.filters().is_empty());
        assert!(query.build().args.is_empty());
    }

    #[test]
    fn test_search_values_are_trimmed() {
        let query = SearchQuery::new().contains(Column::Antibody, "  drugA \t");
        assert_eq!(query.filters()[0].value, "drugA");
    }

    #[test]
    fn test_injection_attempt_stays_out_of_sql_text() {
        let hostile = "' OR '1'='1";
        let query = SearchQuery::new()
            .contains(Column::ImmunogenicityTesting, hostile)
            .build();
        assert!(!query.sql.contains("OR '1'"));
        assert_eq!(query.args, vec![format!("%{hostile}%")]);
    }

    #[test]
    fn test_like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        let query = SearchQuery::new().contains(Column::Target, "IL_6").build();
        assert_eq!(query.args, vec!["%IL\\_6%".to_string()]);
    }

    #[test]
    fn test_from_params_follows_column_order() {
        let params = SearchParams {
            target: "TNF".into(),
            disease_indication_category: " Oncology ".into(),
            ..SearchParams::default()
        };
        let query = SearchQuery::from_params(&params);
        let columns: Vec<Column> = query.filters().iter().map(|f| f.column).collect();
        assert_eq!(
            columns,
            vec![Column::DiseaseIndicationCategory, Column::Target]
        );
        assert_eq!(query.filters()[0].value, "Oncology");
    }

    #[test]
    fn test_from_pairs_first_value_wins() {
        let pairs = vec![
            ("target".to_string(), "tnf".to_string()),
            ("page".to_string(), "2".to_string()),
            ("target".to_string(), "il".to_string()),
            ("antibody".to_string(), "drug".to_string()),
        ];
        let params = SearchParams::from_pairs(&pairs);
        assert_eq!(params.target, "tnf");
        assert_eq!(params.antibody, "drug");
        assert!(params.disease_indication_category.is_empty());
    }

    #[test]
    fn test_unique_values_reads_owning_table() {
        assert_eq!(
            unique_values(Column::Target).sql,
            "SELECT DISTINCT to_jsonb(target) FROM antibodies WHERE target IS NOT NULL"
        );
        assert_eq!(
            unique_values(Column::ImmunogenicityTesting).sql,
            "SELECT DISTINCT to_jsonb(immunogenicity_testing) FROM trial \
             WHERE immunogenicity_testing IS NOT NULL"
        );
    }

    #[test]
    fn test_suggestions_without_prefix() {
        let query = suggestions(Column::Antibody, "");
        assert!(query.args.is_empty());
        assert!(!query.sql.contains("$1"));
        assert!(query.sql.ends_with("ORDER BY LENGTH(suggestion), suggestion ASC LIMIT 50"));
    }

    #[test]
    fn test_suggestions_with_prefix_binds_pattern() {
        let query = suggestions(Column::DiseaseIndicationCategory, " onc ");
        assert!(query.sql.contains("FROM trial"));
        assert!(
            query
                .sql
                .contains("disease_indication_category::text ILIKE $1 ESCAPE '\\'")
        );
        assert_eq!(query.args, vec!["onc%".to_string()]);
    }
}
