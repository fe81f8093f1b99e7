//! Fuzzy category alignment between a reference and a target document.
//!
//! Language files are free to translate category titles and have, over the
//! years, also renamed `moduleName`s, so neither is a reliable join key.
//! What does survive translation is the set of template names inside a
//! category — names are language-invariant — so matching scores categories
//! by name-set overlap:
//!
//! ```text
//! score(R, T) = |names(R) ∩ names(T)| / max(|names(R)|, |names(T)|)
//! ```
//!
//! The denominator is `max`, not the union. This is deliberately asymmetric:
//! a tiny category fully contained in a huge one scores low, which keeps a
//! grab-bag category from swallowing every match. A match is accepted at
//! score ≥ 0.5 (inclusive); below that the reference category is considered
//! new to the target language.
//!
//! Matching is one-to-one with first-come priority: the caller threads a
//! claimed-index set through successive calls in reference iteration order,
//! and a claimed target category is never matched again. Ties go to the
//! first-encountered target category (a later candidate must score strictly
//! higher to displace the current best).

use crate::model::{Category, IndexDocument};
use std::collections::HashSet;

/// Minimum overlap score for a match. Inclusive: 2 shared names out of a
/// max set size of 4 is exactly 0.5 and is accepted.
const MATCH_THRESHOLD: f64 = 0.5;

/// The set of non-empty template names in a category.
pub(crate) fn template_names(category: &Category) -> HashSet<&str> {
    category
        .templates
        .iter()
        .filter_map(|t| t.name.as_deref())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Name-set overlap score between a reference and a target category.
fn overlap_score(reference: &HashSet<&str>, target: &HashSet<&str>) -> f64 {
    let intersection = reference.intersection(target).count();
    let denominator = reference.len().max(target.len());
    if denominator == 0 {
        return 0.0;
    }
    intersection as f64 / denominator as f64
}

/// Find the best-matching target category for a reference category.
///
/// Returns the target index, or `None` when nothing clears the threshold —
/// the signal that the category is new and must be created in the target.
/// Categories with zero named templates never participate, on either side.
pub fn find_match(
    reference: &Category,
    target: &IndexDocument,
    claimed: &HashSet<usize>,
) -> Option<usize> {
    let reference_names = template_names(reference);
    if reference_names.is_empty() {
        return None;
    }

    let mut best_index = None;
    let mut best_score = 0.0;

    for (index, candidate) in target.iter().enumerate() {
        if claimed.contains(&index) {
            continue;
        }
        let candidate_names = template_names(candidate);
        if candidate_names.is_empty() {
            continue;
        }
        let score = overlap_score(&reference_names, &candidate_names);
        if score > best_score {
            best_score = score;
            best_index = Some(index);
        }
    }

    if best_score >= MATCH_THRESHOLD {
        best_index
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::category;

    #[test]
    fn identical_name_sets_match() {
        let reference = category("basic", &["a", "b", "c"]);
        let target = vec![category("basique", &["a", "b", "c"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), Some(0));
    }

    #[test]
    fn best_scoring_category_wins() {
        let reference = category("basic", &["a", "b", "c", "d"]);
        let target = vec![
            category("other", &["a", "x", "y", "z"]),
            category("close", &["a", "b", "c", "w"]),
        ];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), Some(1));
    }

    #[test]
    fn boundary_score_half_is_accepted() {
        // intersection 2, sizes 3 and 4 → 2/4 = 0.5 exactly
        let reference = category("basic", &["a", "b", "c"]);
        let target = vec![category("t", &["a", "b", "x", "y"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), Some(0));
    }

    #[test]
    fn below_threshold_is_no_match() {
        let reference = category("basic", &["a", "b", "c", "d", "e"]);
        let target = vec![category("t", &["a", "b", "x", "y", "z"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), None);
    }

    #[test]
    fn empty_reference_category_never_matches() {
        let reference = category("basic", &[]);
        let target = vec![category("t", &["a"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), None);
    }

    #[test]
    fn empty_target_categories_are_skipped() {
        let reference = category("basic", &["a"]);
        let target = vec![category("empty", &[]), category("t", &["a"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), Some(1));
    }

    #[test]
    fn claimed_category_is_not_rematched() {
        let reference = category("basic", &["a", "b"]);
        let target = vec![category("t", &["a", "b"]), category("u", &["a", "b"])];

        let mut claimed = HashSet::new();
        assert_eq!(find_match(&reference, &target, &claimed), Some(0));
        claimed.insert(0);
        assert_eq!(find_match(&reference, &target, &claimed), Some(1));
    }

    #[test]
    fn tie_goes_to_first_encountered() {
        let reference = category("basic", &["a", "b"]);
        let target = vec![category("first", &["a", "b"]), category("second", &["a", "b"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), Some(0));
    }

    #[test]
    fn small_category_inside_large_scores_low() {
        // Asymmetric denominator: 2 shared names, target has 6 → 2/6 < 0.5.
        let reference = category("basic", &["a", "b"]);
        let target = vec![category("grab-bag", &["a", "b", "c", "d", "e", "f"])];
        assert_eq!(find_match(&reference, &target, &HashSet::new()), None);
    }

    #[test]
    fn unnamed_templates_do_not_contribute_names() {
        let mut reference = category("basic", &["a"]);
        let mut unnamed = crate::test_helpers::named_template("x");
        unnamed.name = None;
        reference.templates.push(unnamed);

        assert_eq!(template_names(&reference).len(), 1);
    }
}
