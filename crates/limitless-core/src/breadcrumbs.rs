//! Breadcrumb trail derivation for admin pages

use serde::{Deserialize, Serialize};

/// One step of a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbItem {
    /// Human-readable label
    pub label: String,
    /// Cumulative path up to and including this segment
    pub href: String,
    /// True only for the final segment
    pub is_active: bool,
}

/// Derive the breadcrumb trail for a slash-delimited path
///
/// Empty segments are dropped, so leading, trailing and repeated slashes do not
/// produce items. An empty or root path yields an empty trail.
///
/// ```
/// use limitless_core::breadcrumbs::derive_breadcrumbs;
///
/// let trail = derive_breadcrumbs("/admin/seo-settings/");
/// assert_eq!(trail.len(), 2);
/// assert_eq!(trail[1].label, "Seo Settings");
/// assert_eq!(trail[1].href, "/admin/seo-settings");
/// assert!(trail[1].is_active);
/// ```
#[must_use]
pub fn derive_breadcrumbs(path: &str) -> Vec<BreadcrumbItem> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.len().saturating_sub(1);

    let mut href = String::with_capacity(path.len());
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            href.push('/');
            href.push_str(segment);
            BreadcrumbItem {
                label: humanize_segment(segment),
                href: href.clone(),
                is_active: index == last,
            }
        })
        .collect()
}

/// Turn a path segment into a label
///
/// Hyphens become spaces and the first word character after a non-word
/// character is upper-cased. Word characters are ASCII letters, digits and `_`.
#[must_use]
pub fn humanize_segment(segment: &str) -> String {
    let mut label = String::with_capacity(segment.len());
    let mut at_word_start = true;

    for ch in segment.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if is_word && at_word_start {
            label.push(ch.to_ascii_uppercase());
        } else {
            label.push(ch);
        }
        at_word_start = !is_word;
    }

    label
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn item(label: &str, href: &str, is_active: bool) -> BreadcrumbItem {
        BreadcrumbItem {
            label: label.to_string(),
            href: href.to_string(),
            is_active,
        }
    }

    #[test]
    fn test_admin_leads_trail() {
        assert_eq!(
            derive_breadcrumbs("/admin/leads"),
            vec![
                item("Admin", "/admin", false),
                item("Leads", "/admin/leads", true),
            ]
        );
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("///")]
    fn test_empty_paths(#[case] path: &str) {
        assert!(derive_breadcrumbs(path).is_empty());
    }

    #[test]
    fn test_trailing_and_repeated_slashes_collapse() {
        assert_eq!(
            derive_breadcrumbs("/admin/audit/"),
            derive_breadcrumbs("/admin/audit")
        );
        assert_eq!(
            derive_breadcrumbs("admin//audit"),
            derive_breadcrumbs("/admin/audit")
        );
    }

    #[rstest]
    #[case("leads", "Leads")]
    #[case("seo-settings", "Seo Settings")]
    #[case("case-study-2024", "Case Study 2024")]
    #[case("already_Snake", "Already_Snake")]
    #[case("api.v2", "Api.V2")]
    #[case("--x", "  X")]
    fn test_humanize_segment(#[case] segment: &str, #[case] expected: &str) {
        assert_eq!(humanize_segment(segment), expected);
    }

    #[test]
    fn test_serializes_with_camel_case_flag() {
        let json = serde_json::to_value(item("Admin", "/admin", true)).unwrap();
        assert_eq!(json["isActive"], serde_json::Value::Bool(true));
    }

    proptest! {
        #[test]
        fn prop_one_item_per_segment(segments in proptest::collection::vec("[a-z0-9-]{0,8}", 0..8)) {
            let path = segments.join("/");
            let expected = segments.iter().filter(|s| !s.is_empty()).count();
            prop_assert_eq!(derive_breadcrumbs(&path).len(), expected);
        }

        #[test]
        fn prop_only_last_item_is_active(path in "(/[a-z-]{0,6}){0,6}/?") {
            let trail = derive_breadcrumbs(&path);
            if let Some((last, rest)) = trail.split_last() {
                prop_assert!(last.is_active);
                prop_assert!(rest.iter().all(|item| !item.is_active));
            }
        }

        #[test]
        fn prop_hrefs_are_increasing_prefixes(path in "(/[a-z-]{1,6}){1,6}") {
            let trail = derive_breadcrumbs(&path);
            for pair in trail.windows(2) {
                prop_assert!(pair[1].href.starts_with(&pair[0].href));
                prop_assert!(pair[1].href.len() > pair[0].href.len());
            }
            prop_assert_eq!(&trail.last().unwrap().href, &path);
        }

        #[test]
        fn prop_trailing_slash_is_ignored(path in "(/[a-z-]{1,6}){0,6}") {
            prop_assert_eq!(derive_breadcrumbs(&format!("{path}/")), derive_breadcrumbs(&path));
        }
    }
}
