//! Direct-impact classifier.
//!
//! Given the diff structure of a test file and its test declarations in the
//! checked-out tree, decides which tests are ADDED or MODIFIED. Hunk/range
//! intersection is the only signal available without keeping two parsed
//! trees (old and new); a pure deletion inside an existing test body still
//! collides with the enclosing range at a single point and registers as
//! MODIFIED.

use crate::model::{FileDiff, ImpactType, ImpactedTest, TestDeclaration};
use std::collections::HashMap;

/// Closed-interval overlap: `[a_start, a_end]` intersects `[b_start, b_end]`.
fn intersects(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Classify ADDED and MODIFIED tests for one test file.
///
/// Step 1 marks every declaration intersecting a hunk's new-file span as
/// MODIFIED. Step 2 upgrades declarations fully contained in a hunk's added
/// span to ADDED: full containment in new lines is stronger evidence than
/// partial overlap, so a declaration straddling a hunk boundary stays
/// MODIFIED. The upgrade is a pure reduction into a keyed map, which makes
/// the classification idempotent and order-independent.
pub fn classify(file_diff: &FileDiff, tests: &[TestDeclaration]) -> Vec<ImpactedTest> {
    let mut by_name: HashMap<&str, ImpactType> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for hunk in &file_diff.hunks {
        let (hunk_start, hunk_end) = hunk.new_span();
        for test in tests {
            if intersects(hunk_start, hunk_end, test.start_line, test.end_line) {
                by_name.entry(&test.test_name).or_insert_with(|| {
                    order.push(&test.test_name);
                    ImpactType::Modified
                });
            }
        }
    }

    for test in tests {
        for hunk in &file_diff.hunks {
            let contained = test.start_line >= hunk.new_start
                && test.end_line <= hunk.new_start + hunk.new_lines;
            if contained {
                match by_name.get_mut(test.test_name.as_str()) {
                    Some(existing) => *existing = ImpactType::Added,
                    None => {
                        order.push(&test.test_name);
                        by_name.insert(&test.test_name, ImpactType::Added);
                    }
                }
            }
        }
    }

    order
        .into_iter()
        .map(|name| ImpactedTest {
            test_name: name.to_string(),
            file_path: file_diff.path.clone(),
            impact_type: by_name[name],
            related_file: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Hunk;

    fn test_decl(name: &str, start: i64, end: i64) -> TestDeclaration {
        TestDeclaration {
            test_name: name.to_string(),
            start_line: start,
            end_line: end,
        }
    }

    fn diff_with_hunks(hunks: Vec<Hunk>) -> FileDiff {
        FileDiff {
            path: "e2e/login.spec.ts".to_string(),
            change_type: crate::model::ChangeType::Mod,
            changed_lines: Vec::new(),
            hunks,
        }
    }

    #[test]
    fn single_line_change_inside_body_is_modified() {
        // Test at lines 3-6, hunk `@@ -4 +4 @@`.
        let diff = diff_with_hunks(vec![Hunk {
            old_start: 4,
            old_lines: 1,
            new_start: 4,
            new_lines: 1,
        }]);
        let tests = vec![test_decl("logs in", 3, 6)];
        let results = classify(&diff, &tests);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].impact_type, ImpactType::Modified);
        assert_eq!(results[0].test_name, "logs in");
    }

    #[test]
    fn fully_contained_declaration_is_added_not_modified() {
        // Brand-new 5-line hunk introducing a self-contained test.
        let diff = diff_with_hunks(vec![Hunk {
            old_start: 10,
            old_lines: 0,
            new_start: 11,
            new_lines: 5,
        }]);
        let tests = vec![test_decl("fresh", 11, 15)];
        let results = classify(&diff, &tests);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].impact_type, ImpactType::Added);
    }

    #[test]
    fn declaration_straddling_hunk_boundary_stays_modified() {
        let diff = diff_with_hunks(vec![Hunk {
            old_start: 5,
            old_lines: 0,
            new_start: 5,
            new_lines: 3,
        }]);
        // Starts before the hunk: only partially contained.
        let tests = vec![test_decl("straddler", 3, 7)];
        let results = classify(&diff, &tests);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].impact_type, ImpactType::Modified);
    }

    #[test]
    fn pure_deletion_point_collides_only_inside_range() {
        let pure_deletion = |at: i64| {
            diff_with_hunks(vec![Hunk {
                old_start: at,
                old_lines: 1,
                new_start: at,
                new_lines: 0,
            }])
        };
        let tests = vec![test_decl("nearby", 10, 14)];

        // Inside the declaration range: MODIFIED.
        let results = classify(&pure_deletion(12), &tests);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].impact_type, ImpactType::Modified);

        // Adjacent but outside: ignored, not flagged.
        assert!(classify(&pure_deletion(15), &tests).is_empty());
        assert!(classify(&pure_deletion(9), &tests).is_empty());

        // Boundary lines collide.
        assert_eq!(classify(&pure_deletion(10), &tests).len(), 1);
        assert_eq!(classify(&pure_deletion(14), &tests).len(), 1);
    }

    #[test]
    fn suite_and_leaf_both_flagged_on_inner_change() {
        let diff = diff_with_hunks(vec![Hunk {
            old_start: 4,
            old_lines: 1,
            new_start: 4,
            new_lines: 1,
        }]);
        let tests = vec![test_decl("suite", 1, 10), test_decl("leaf", 3, 6)];
        let results = classify(&diff, &tests);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.impact_type == ImpactType::Modified));
    }

    #[test]
    fn classification_is_idempotent_and_order_independent() {
        let diff = diff_with_hunks(vec![
            Hunk {
                old_start: 4,
                old_lines: 1,
                new_start: 4,
                new_lines: 1,
            },
            Hunk {
                old_start: 20,
                old_lines: 0,
                new_start: 21,
                new_lines: 4,
            },
        ]);
        let mut tests = vec![test_decl("existing", 3, 6), test_decl("new", 21, 24)];
        let first = classify(&diff, &tests);
        let second = classify(&diff, &tests);
        assert_eq!(first, second);

        tests.reverse();
        let mut reversed = classify(&diff, &tests);
        reversed.sort_by(|a, b| a.test_name.cmp(&b.test_name));
        let mut sorted_first = first.clone();
        sorted_first.sort_by(|a, b| a.test_name.cmp(&b.test_name));
        assert_eq!(sorted_first, reversed);
    }

    #[test]
    fn modified_then_contained_upgrades_to_added() {
        // One hunk overlaps partially, another fully contains the test.
        let diff = diff_with_hunks(vec![
            Hunk {
                old_start: 9,
                old_lines: 1,
                new_start: 10,
                new_lines: 1,
            },
            Hunk {
                old_start: 9,
                old_lines: 0,
                new_start: 10,
                new_lines: 6,
            },
        ]);
        let tests = vec![test_decl("upgraded", 10, 14)];
        let results = classify(&diff, &tests);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].impact_type, ImpactType::Added);
    }

    #[test]
    fn no_hunks_no_results() {
        let diff = diff_with_hunks(Vec::new());
        let tests = vec![test_decl("any", 1, 5)];
        assert!(classify(&diff, &tests).is_empty());
    }

    #[test]
    fn overlap_predicate_is_symmetric() {
        for (a, b, c, d, expected) in [
            (1, 5, 3, 8, true),
            (3, 8, 1, 5, true),
            (1, 2, 3, 4, false),
            (3, 4, 1, 2, false),
            (1, 3, 3, 5, true), // adjacent-inclusive
            (5, 5, 5, 5, true), // point on point
        ] {
            assert_eq!(intersects(a, b, c, d), expected, "({a},{b}) vs ({c},{d})");
            assert_eq!(intersects(c, d, a, b), expected, "symmetry");
        }
    }
}
