use std::sync::Arc;

use tracing::trace;

use crate::observer::Observable;
use crate::table::Row;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub brand_query: String,
    pub category_query: String,
}

impl FilterCriteria {
    pub fn matches(&self, row: &Row) -> bool {
        let brand = self.brand_query.is_empty()
            || row
                .brand
                .to_lowercase()
                .contains(&self.brand_query.to_lowercase());
        let category = self.category_query.is_empty()
            || row.category.to_lowercase() == self.category_query.to_lowercase();
        brand && category
    }

    pub fn is_empty(&self) -> bool {
        self.brand_query.is_empty() && self.category_query.is_empty()
    }
}

#[derive(Debug)]
pub struct RowFilter {
    rows: Arc<Vec<Row>>,
    categories: Vec<String>,
    criteria: Observable<FilterCriteria>,
}

impl RowFilter {
    pub fn new(rows: Arc<Vec<Row>>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for row in rows.iter() {
            if !categories.contains(&row.category) {
                categories.push(row.category.clone());
            }
        }
        Self {
            rows,
            categories,
            criteria: Observable::new(FilterCriteria::default()),
        }
    }

    pub fn criteria(&self) -> &Observable<FilterCriteria> {
        &self.criteria
    }

    /// Distinct categories of the source rows in first-seen order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn source_len(&self) -> usize {
        self.rows.len()
    }

    pub fn set_brand_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        trace!("Brand query: {text:?}");
        self.criteria.update(|c| {
            let changed = c.brand_query != text;
            c.brand_query = text;
            changed
        });
    }

    pub fn set_category_query(&mut self, category: impl Into<String>) {
        let category = category.into();
        trace!("Category query: {category:?}");
        self.criteria.update(|c| {
            let changed = c.category_query != category;
            c.category_query = category;
            changed
        });
    }

    pub fn clear(&mut self) {
        self.criteria.set(FilterCriteria::default());
    }

    /// Rows passing the current criteria, in source order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        let criteria = self.criteria.get();
        self.rows.iter().filter(move |row| criteria.matches(row))
    }

    /// Cycles the category criterion forward through "" and every category.
    pub fn next_category(&mut self) {
        let next = match self.category_position() {
            None => self.categories.first(),
            Some(idx) => self.categories.get(idx + 1),
        };
        self.set_category_query(next.cloned().unwrap_or_default());
    }

    pub fn previous_category(&mut self) {
        let previous = match self.category_position() {
            None => self.categories.last(),
            Some(0) => None,
            Some(idx) => self.categories.get(idx - 1),
        };
        self.set_category_query(previous.cloned().unwrap_or_default());
    }

    fn category_position(&self) -> Option<usize> {
        let current = &self.criteria.get().category_query;
        if current.is_empty() {
            return None;
        }
        self.categories
            .iter()
            .position(|c| c.to_lowercase() == current.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixture_rows;

    fn filter() -> RowFilter {
        RowFilter::new(Arc::new(fixture_rows()))
    }

    fn ids(filter: &RowFilter) -> Vec<i64> {
        filter.visible_rows().map(|r| r.id).collect()
    }

    #[test]
    fn empty_criteria_yield_everything_in_order() {
        let filter = filter();
        assert_eq!(ids(&filter), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn category_matches_exactly() {
        let mut filter = filter();
        filter.set_category_query("Mobile");
        assert_eq!(ids(&filter), vec![6, 7, 8]);

        filter.set_category_query("mobile");
        assert_eq!(ids(&filter), vec![6, 7, 8]);

        filter.set_category_query("Mob");
        assert!(ids(&filter).is_empty());
    }

    #[test]
    fn brand_is_case_insensitive_substring() {
        let mut filter = filter();
        for query in ["ac", "AC", "Ac"] {
            filter.set_brand_query(query);
            assert_eq!(ids(&filter), vec![4, 5], "query {query}");
        }
    }

    #[test]
    fn criteria_order_does_not_matter() {
        let mut a = filter();
        a.set_brand_query("sam");
        a.set_category_query("Tablet");

        let mut b = filter();
        b.set_category_query("Tablet");
        b.set_brand_query("sam");

        assert_eq!(ids(&a), vec![10]);
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn queries_are_kept_verbatim() {
        let mut filter = filter();
        filter.set_brand_query(" hp");
        assert_eq!(filter.criteria().get().brand_query, " hp");
        assert!(ids(&filter).is_empty());
    }

    #[test]
    fn categories_in_first_seen_order() {
        let filter = filter();
        assert_eq!(filter.categories(), ["Computer", "Mobile", "Tablet"]);
    }

    #[test]
    fn category_cycles_through_all() {
        let mut filter = filter();
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter.next_category();
            seen.push(filter.criteria().get().category_query.clone());
        }
        assert_eq!(seen, ["Computer", "Mobile", "Tablet", ""]);

        filter.previous_category();
        assert_eq!(filter.criteria().get().category_query, "Tablet");
        filter.set_category_query("Computer");
        filter.previous_category();
        assert_eq!(filter.criteria().get().category_query, "");
    }

    #[test]
    fn clear_resets_both_criteria() {
        let mut filter = filter();
        filter.set_brand_query("apple");
        filter.set_category_query("Tablet");
        assert_eq!(ids(&filter), vec![9]);
        filter.clear();
        assert!(filter.criteria().get().is_empty());
        assert_eq!(ids(&filter).len(), 10);
    }
}
