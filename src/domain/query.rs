use crate::domain::{ALL_CATEGORIES, FilterValue};
use chrono::NaiveDate;

/// The filter parameters attached to an appointment-listing request, in the
/// exact shape the store expects. Absent fields are omitted entirely; an
/// absent window means "fetch everything", never an implied default range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    pub category: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub client: Option<String>,
}

impl QueryParams {
    /// Project a `FilterValue` into query parameters. The category list is
    /// dropped when the selection is empty or contains the "all" sentinel;
    /// otherwise it is passed through verbatim.
    pub fn from_filter(filter: &FilterValue) -> Self {
        let categories = filter.categories();
        let category = if categories.is_empty() || categories.contains(ALL_CATEGORIES) {
            None
        } else {
            Some(categories.iter().cloned().collect())
        };

        Self {
            category,
            start: filter.window().start,
            end: filter.window().end,
            client: filter.client().map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.start.is_none() && self.end.is_none() && self.client.is_none()
    }

    /// Render as GET-style key/value pairs, one pair per category value.
    pub fn as_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(categories) = &self.category {
            for category in categories {
                pairs.push(("category".to_string(), category.clone()));
            }
        }
        if let Some(start) = self.start {
            pairs.push(("start".to_string(), start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if let Some(client) = &self.client {
            pairs.push(("client".to_string(), client.clone()));
        }

        pairs
    }
}

impl From<&FilterValue> for QueryParams {
    fn from(filter: &FilterValue) -> Self {
        Self::from_filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_filter_projects_to_no_parameters() {
        let params = QueryParams::from_filter(&FilterValue::new());
        assert!(params.is_empty());
        assert!(params.as_pairs().is_empty());
    }

    #[test]
    fn category_is_omitted_for_the_all_sentinel() {
        let all = FilterValue::new().with_categories([ALL_CATEGORIES]);
        assert_eq!(QueryParams::from_filter(&all).category, None);

        let mixed = FilterValue::new().with_categories(["c1", ALL_CATEGORIES]);
        assert_eq!(QueryParams::from_filter(&mixed).category, None);
    }

    #[test]
    fn explicit_categories_pass_through_verbatim() {
        let filter = FilterValue::new().with_categories(["c2", "c1"]);
        let params = QueryParams::from_filter(&filter);
        assert_eq!(
            params.category,
            Some(vec!["c1".to_string(), "c2".to_string()])
        );
    }

    #[test]
    fn window_sides_are_carried_independently() {
        let filter = FilterValue::new()
            .with_window(Some(date(2024, 5, 13)), None)
            .unwrap();
        let params = QueryParams::from_filter(&filter);
        assert_eq!(params.start, Some(date(2024, 5, 13)));
        assert_eq!(params.end, None);
    }

    #[test]
    fn week_filter_with_category_projects_fully() {
        let filter = FilterValue::new()
            .with_categories(["c1"])
            .with_window(Some(date(2024, 5, 13)), Some(date(2024, 5, 17)))
            .unwrap();
        let params = QueryParams::from_filter(&filter);

        assert_eq!(params.category, Some(vec!["c1".to_string()]));
        assert_eq!(params.start, Some(date(2024, 5, 13)));
        assert_eq!(params.end, Some(date(2024, 5, 17)));
        assert_eq!(params.client, None);

        assert_eq!(
            params.as_pairs(),
            vec![
                ("category".to_string(), "c1".to_string()),
                ("start".to_string(), "2024-05-13".to_string()),
                ("end".to_string(), "2024-05-17".to_string()),
            ]
        );
    }

    #[test]
    fn client_only_filter_projects_client_only() {
        let filter = FilterValue::new().with_client(Some("p42".to_string()));
        let params = QueryParams::from_filter(&filter);

        assert_eq!(
            params,
            QueryParams {
                client: Some("p42".to_string()),
                ..QueryParams::default()
            }
        );
        assert_eq!(
            params.as_pairs(),
            vec![("client".to_string(), "p42".to_string())]
        );
    }
}
