//! Query-string filters for recipe and attribute listings.
//!
//! Parsing happens before any database access so a malformed value is
//! rejected without a round trip.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {param} filter: '{value}' is not an integer ID")]
    InvalidId { param: &'static str, value: String },

    #[error("Invalid assigned_only value: '{0}'. Expected 0 or 1")]
    InvalidFlag(String),
}

/// Restricts a recipe listing. Within one family IDs are OR-ed; the two
/// families are AND-ed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tag_ids: Option<Vec<i32>>,
    pub ingredient_ids: Option<Vec<i32>>,
}

impl RecipeFilter {
    /// Builds a filter from raw `tags` / `ingredients` parameters.
    /// Absent or empty values apply no restriction.
    pub fn parse(tags: Option<&str>, ingredients: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            tag_ids: parse_optional_ids("tags", tags)?,
            ingredient_ids: parse_optional_ids("ingredients", ingredients)?,
        })
    }
}

/// Restricts a tag or ingredient listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    pub assigned_only: bool,
}

impl AttributeFilter {
    pub fn parse(assigned_only: Option<&str>) -> Result<Self, FilterError> {
        let assigned_only = match assigned_only.map(str::trim) {
            None | Some("") => false,
            Some(raw) => raw
                .parse::<i64>()
                .map(|v| v != 0)
                .map_err(|_| FilterError::InvalidFlag(raw.to_string()))?,
        };
        Ok(Self { assigned_only })
    }
}

fn parse_optional_ids(
    param: &'static str,
    raw: Option<&str>,
) -> Result<Option<Vec<i32>>, FilterError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => parse_id_list(param, raw).map(Some),
    }
}

/// Parses a comma-separated list of integer IDs, e.g. `"1,2,3"`.
pub fn parse_id_list(param: &'static str, raw: &str) -> Result<Vec<i32>, FilterError> {
    raw.split(',')
        .map(|item| {
            item.trim().parse::<i32>().map_err(|_| FilterError::InvalidId {
                param,
                value: item.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("tags", "1,2, 3"), Ok(vec![1, 2, 3]));
        assert_eq!(parse_id_list("tags", "7"), Ok(vec![7]));
        assert_eq!(
            parse_id_list("tags", "1,x"),
            Err(FilterError::InvalidId {
                param: "tags",
                value: "x".to_string()
            })
        );
        assert!(parse_id_list("tags", "1,,2").is_err());
    }

    #[test]
    fn test_recipe_filter_empty_values() {
        let filter = RecipeFilter::parse(None, Some("")).unwrap();
        assert_eq!(filter, RecipeFilter::default());

        let filter = RecipeFilter::parse(Some("4,5"), Some("9")).unwrap();
        assert_eq!(filter.tag_ids, Some(vec![4, 5]));
        assert_eq!(filter.ingredient_ids, Some(vec![9]));
    }

    #[test]
    fn test_attribute_filter_flag() {
        assert!(!AttributeFilter::parse(None).unwrap().assigned_only);
        assert!(!AttributeFilter::parse(Some("0")).unwrap().assigned_only);
        assert!(AttributeFilter::parse(Some("1")).unwrap().assigned_only);
        assert!(AttributeFilter::parse(Some("yes")).is_err());
    }
}
