//! Tiered, case-insensitive package name filter.
//!
//! Candidates are ranked into three tiers and concatenated in this order:
//! exact match, prefix match, substring match. Each tier keeps the order of
//! the source list.
//!
//! Cap policy: the prefix and substring tiers together contribute at most
//! [`MAX_NON_EXACT`] names, filled prefix-first; the final list is then
//! truncated to [`MAX_CANDIDATES`]. A single exact hit plus a full non-exact
//! budget therefore lands exactly on the cap.

use std::collections::HashSet;

use compact_str::CompactString;

pub const MAX_CANDIDATES: usize = 30;
pub const MAX_NON_EXACT: usize = MAX_CANDIDATES - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exact,
    Prefix,
    Substring,
}

/// Classify `name` (already lowercased into `folded`) against a lowercased query.
fn classify(folded: &str, query: &str) -> Option<Tier> {
    if folded == query {
        Some(Tier::Exact)
    } else if folded.starts_with(query) {
        Some(Tier::Prefix)
    } else if folded.contains(query) {
        Some(Tier::Substring)
    } else {
        None
    }
}

fn fold_into(buf: &mut String, name: &str) {
    buf.clear();
    if name.is_ascii() {
        buf.push_str(name);
        buf.make_ascii_lowercase();
    } else {
        buf.extend(name.chars().flat_map(char::to_lowercase));
    }
}

/// Rank `names` against `query`. An empty (or blank) query yields nothing.
pub fn tiered_filter(names: &[CompactString], query: &str) -> Vec<CompactString> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut exact = Vec::new();
    let mut prefix = Vec::new();
    let mut substring = Vec::new();
    let mut folded = String::new();

    for name in names {
        // With the prefix tier full only exact hits can still be taken.
        if prefix.len() >= MAX_NON_EXACT && name.is_ascii() && name.len() != query.len() {
            continue;
        }

        fold_into(&mut folded, name);
        let Some(tier) = classify(&folded, &query) else {
            continue;
        };
        if !seen.insert(name.as_str()) {
            continue;
        }

        match tier {
            Tier::Exact => exact.push(name.clone()),
            Tier::Prefix if prefix.len() < MAX_NON_EXACT => prefix.push(name.clone()),
            Tier::Substring if prefix.len() + substring.len() < MAX_NON_EXACT => {
                substring.push(name.clone())
            }
            _ => {}
        }
    }

    let non_exact = prefix.into_iter().chain(substring).take(MAX_NON_EXACT);
    let mut out: Vec<CompactString> = exact.into_iter().chain(non_exact).collect();
    out.truncate(MAX_CANDIDATES);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<CompactString> {
        items.iter().map(|s| CompactString::from(*s)).collect()
    }

    fn tier_of(name: &str, query: &str) -> Tier {
        classify(&name.to_lowercase(), &query.to_lowercase()).expect("matched")
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let names = list(&["requests", "flask"]);
        assert!(tiered_filter(&names, "").is_empty());
        assert!(tiered_filter(&names, "   ").is_empty());
    }

    #[test]
    fn test_requests_scenario() {
        let names = list(&["requests", "requests-oauthlib", "flask"]);
        assert_eq!(
            tiered_filter(&names, "requests"),
            list(&["requests", "requests-oauthlib"])
        );
    }

    #[test]
    fn test_tiers_are_ordered_and_stable() {
        let names = list(&[
            "django-rest", "mydjango", "Django", "djangorestframework", "old-django-tools",
        ]);
        let out = tiered_filter(&names, "django");
        assert_eq!(
            out,
            list(&["Django", "django-rest", "djangorestframework", "mydjango", "old-django-tools"])
        );

        let tiers: Vec<Tier> = out.iter().map(|n| tier_of(n, "django")).collect();
        assert!(tiers.windows(2).all(|w| (w[0] as u8) <= (w[1] as u8)));
    }

    #[test]
    fn test_case_insensitive_query() {
        let names = list(&["PyYAML", "yamllint"]);
        assert_eq!(tiered_filter(&names, "YAML"), list(&["yamllint", "PyYAML"]));
    }

    #[test]
    fn test_caps() {
        let mut names: Vec<CompactString> =
            (0..100).map(|i| CompactString::from(format!("pkg-{i}"))).collect();
        names.push(CompactString::from("pkg"));

        let out = tiered_filter(&names, "pkg");
        assert_eq!(out.len(), MAX_CANDIDATES);
        assert_eq!(out[0], "pkg");
        assert_eq!(out[1], "pkg-0");
        assert_eq!(out.iter().filter(|n| n.as_str() != "pkg").count(), MAX_NON_EXACT);
    }

    #[test]
    fn test_prefix_tier_fills_before_substring() {
        let mut names: Vec<CompactString> =
            (0..40).map(|i| CompactString::from(format!("x-np-{i}"))).collect();
        names.extend((0..5).map(|i| CompactString::from(format!("np{i}"))));

        let out = tiered_filter(&names, "np");
        assert_eq!(&out[..5], &list(&["np0", "np1", "np2", "np3", "np4"])[..]);
        assert_eq!(out.len(), MAX_NON_EXACT);
    }

    #[test]
    fn test_no_duplicates() {
        let names = list(&["flask", "flask", "flask-login", "flask-login", "Flask"]);
        let out = tiered_filter(&names, "flask");
        assert_eq!(out, list(&["flask", "Flask", "flask-login"]));
    }
}
