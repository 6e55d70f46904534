//! Record list parameters.

use crate::filter::prepare_filters;
use crate::sort::{sort_payload, validate_sorts};
use crate::{DocViewResult, FilterRule, PropertyDefinition, SortRule, ViewId};

/// Parameters for listing records. Filters and sorts can only be set through
/// the validating builders, so an invalid rule never reaches the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    view_id: Option<ViewId>,
    search: Option<String>,
    filters: Vec<FilterRule>,
    sorts: Vec<SortRule>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    /// Validate and attach filters.
    pub fn with_filters(
        mut self,
        rules: &[FilterRule],
        properties: &[PropertyDefinition],
    ) -> DocViewResult<Self> {
        self.filters = prepare_filters(rules, properties)?;
        Ok(self)
    }

    /// Validate and attach sorts.
    pub fn with_sorts(
        mut self,
        sorts: &[SortRule],
        properties: &[PropertyDefinition],
    ) -> DocViewResult<Self> {
        validate_sorts(sorts, properties)?;
        self.sorts = sorts.to_vec();
        Ok(self)
    }

    pub fn filters(&self) -> &[FilterRule] {
        &self.filters
    }

    pub fn sorts(&self) -> &[SortRule] {
        &self.sorts
    }

    /// Query-string pairs. Filters and sorts are JSON-encoded.
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, serde_json::Error> {
        let mut pairs = Vec::new();
        if let Some(view_id) = &self.view_id {
            pairs.push(("viewId".to_string(), view_id.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if !self.filters.is_empty() {
            pairs.push(("filters".to_string(), serde_json::to_string(&self.filters)?));
        }
        if !self.sorts.is_empty() {
            pairs.push((
                "sorts".to_string(),
                serde_json::to_string(&sort_payload(&self.sorts))?,
            ));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FilterOperator, PropertyType, SortDirection};
    use serde_json::json;

    fn properties() -> Vec<PropertyDefinition> {
        vec![
            PropertyDefinition::new("title", "Title", PropertyType::Text),
            PropertyDefinition::new("done", "Done", PropertyType::Checkbox).with_order(1),
        ]
    }

    #[test]
    fn test_query_pairs() {
        let query = RecordQuery::new()
            .view("open")
            .page(2, 50)
            .with_filters(
                &[FilterRule::new("done", FilterOperator::Unchecked).with_value(json!(true))],
                &properties(),
            )
            .unwrap()
            .with_sorts(&[SortRule::new("title", SortDirection::Asc)], &properties())
            .unwrap();
        let pairs = query.to_query_pairs().unwrap();
        assert_eq!(pairs[0], ("viewId".to_string(), "open".to_string()));
        let filters: serde_json::Value = serde_json::from_str(&pairs[1].1).unwrap();
        assert_eq!(filters, json!([{"propertyId": "done", "operator": "unchecked"}]));
        let sorts: serde_json::Value = serde_json::from_str(&pairs[2].1).unwrap();
        assert_eq!(sorts[0]["priority"], json!(0));
        assert_eq!(pairs[3], ("page".to_string(), "2".to_string()));
        assert_eq!(pairs[4], ("limit".to_string(), "50".to_string()));
    }

    #[test]
    fn test_invalid_filters_never_enter_query() {
        let result = RecordQuery::new().with_filters(
            &[FilterRule::new("done", FilterOperator::Contains).with_value(json!("x"))],
            &properties(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(RecordQuery::new().to_query_pairs().unwrap().is_empty());
    }
}
