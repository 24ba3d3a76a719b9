//! Client-side filtering over already-fetched rows. Every filter is a pure
//! predicate, so applying search and facets in any order gives the same set.

use serde::Deserialize;

use agrihub_types::models::{EquipmentListing, FarmerCase, ForumPost, LandListing};

/// Case-insensitive substring match against any of `fields`. An empty
/// needle matches everything.
fn matches_text(needle: &str, fields: &[&str]) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Equality facet. `None`, "" and "all" match everything.
fn matches_facet(facet: Option<&str>, value: &str) -> bool {
    match facet.map(str::trim) {
        None | Some("") => true,
        Some(f) if f.eq_ignore_ascii_case("all") => true,
        Some(f) => f == value,
    }
}

pub trait RowFilter<T> {
    fn accepts(&self, row: &T) -> bool;

    fn apply<'a>(&self, rows: &'a [T]) -> Vec<&'a T> {
        rows.iter().filter(|r| self.accepts(r)).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForumFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl RowFilter<ForumPost> for ForumFilter {
    fn accepts(&self, post: &ForumPost) -> bool {
        let text = matches_text(
            self.search.as_deref().unwrap_or_default(),
            &[post.title.as_str(), post.content.as_str()],
        );
        text && matches_facet(self.category.as_deref(), post.category.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseFilter {
    pub search: Option<String>,
}

impl RowFilter<FarmerCase> for CaseFilter {
    fn accepts(&self, case: &FarmerCase) -> bool {
        matches_text(
            self.search.as_deref().unwrap_or_default(),
            &[case.name.as_str(), case.location.as_str()],
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandFilter {
    pub search: Option<String>,
    pub state: Option<String>,
    pub soil_type: Option<String>,
}

impl RowFilter<LandListing> for LandFilter {
    fn accepts(&self, listing: &LandListing) -> bool {
        matches_text(
            self.search.as_deref().unwrap_or_default(),
            &[listing.title.as_str(), listing.location.as_str()],
        ) && matches_facet(self.state.as_deref(), &listing.state)
            && matches_facet(self.soil_type.as_deref(), &listing.soil_type)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentFilter {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub state: Option<String>,
}

impl RowFilter<EquipmentListing> for EquipmentFilter {
    fn accepts(&self, listing: &EquipmentListing) -> bool {
        matches_text(
            self.search.as_deref().unwrap_or_default(),
            &[listing.name.as_str(), listing.location.as_str()],
        ) && matches_facet(self.kind.as_deref(), &listing.kind)
            && matches_facet(self.state.as_deref(), &listing.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(id: i64, title: &str, content: &str, category: &str) -> ForumPost {
        serde_json::from_value(json!({
            "id": id,
            "clerk_user_id": "user_1",
            "user_name": "Ravi",
            "title": title,
            "content": content,
            "category": category,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn posts() -> Vec<ForumPost> {
        vec![
            post(1, "Wheat rust spreading", "Yellow stripes on leaves", "crops"),
            post(2, "Best drip kit?", "Looking at wheat fields", "equipment"),
            post(3, "Monsoon timing", "When to sow paddy", "weather"),
            post(4, "Rust on tools", "Any fix?", "equipment"),
        ]
    }

    fn ids(rows: Vec<&ForumPost>) -> Vec<i64> {
        rows.into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let rows = posts();
        let filter = ForumFilter {
            search: Some("WHEAT".to_string()),
            category: None,
        };
        assert_eq!(ids(filter.apply(&rows)), [1, 2]);
    }

    #[test]
    fn search_and_category_commute() {
        let rows = posts();
        let text = ForumFilter {
            search: Some("rust".to_string()),
            category: None,
        };
        let facet = ForumFilter {
            search: None,
            category: Some("equipment".to_string()),
        };

        let text_first: Vec<ForumPost> = text.apply(&rows).into_iter().cloned().collect();
        let a = ids(facet.apply(&text_first));

        let facet_first: Vec<ForumPost> = facet.apply(&rows).into_iter().cloned().collect();
        let b = ids(text.apply(&facet_first));

        assert_eq!(a, b);
        assert_eq!(a, [4]);

        // Idempotent
        let again: Vec<ForumPost> = text.apply(&text_first).into_iter().cloned().collect();
        assert_eq!(ids(again.iter().collect()), ids(text_first.iter().collect()));
    }

    #[test]
    fn facets_treat_all_as_wildcard() {
        assert!(matches_facet(Some("all"), "Punjab"));
        assert!(matches_facet(Some(""), "Punjab"));
        assert!(matches_facet(None, "Punjab"));
        assert!(!matches_facet(Some("Kerala"), "Punjab"));
    }

    #[test]
    fn empty_search_matches_everything() {
        let rows = posts();
        assert_eq!(ForumFilter::default().apply(&rows).len(), rows.len());
    }
}
