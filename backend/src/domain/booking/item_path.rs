//! Dotted-path lookups over loosely shaped upstream items.

use serde_json::Value;

/// Value at a dotted path such as `details.departureTime`.
pub(crate) fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(item, |current, segment| current.get(segment))
}

/// Text at `path`, if it holds a usable scalar.
///
/// Strings count when non-blank and not the literal `"null"` or
/// `"undefined"`; numbers are stringified. Booleans, objects, and arrays do
/// not count.
pub(crate) fn text_at(item: &Value, path: &str) -> Option<String> {
    lookup(item, path).and_then(scalar_text)
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// First usable text along `paths`, in order.
pub(crate) fn first_text(item: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| text_at(item, path))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn skips_null_like_and_blank_candidates() {
        let item = json!({
            "details": { "name": "null", "code": "  " },
            "name": "",
            "descriptor": { "name": "IndiGo" },
            "id": 42
        });
        assert_eq!(
            first_text(&item, &["details.name", "name", "descriptor.name"]).as_deref(),
            Some("IndiGo")
        );
        assert_eq!(first_text(&item, &["details.code", "id"]).as_deref(), Some("42"));
    }

    #[rstest]
    fn objects_are_not_text() {
        let item = json!({ "location": { "city": { "name": "Goa" } } });
        assert_eq!(text_at(&item, "location.city"), None);
        assert_eq!(text_at(&item, "location.city.name").as_deref(), Some("Goa"));
        assert_eq!(text_at(&item, "location.country.name"), None);
    }
}
