//! Removed-test detection over deleted diff lines.
//!
//! A test that no longer exists in the checked-out tree cannot be found by
//! parsing it, so removal is detected textually: any deleted line whose text
//! declares a test is reported as REMOVED. The match is intentionally loose
//! about formatting and modifiers (`test.skip(`, `it.only(`) since diff
//! lines arrive exactly as the author wrote them.

use crate::model::{ChangedLine, FileDiff, ImpactType, ImpactedTest};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `test(`/`it(`/`describe(` call heads, with optional dotted
/// modifiers, and captures the first string argument. The backreference-free
/// alternation keeps each quote style paired with its own closer.
static TEST_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?:test|it|describe)(?:\s*\.\s*\w+)*\s*\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#,
    )
    .unwrap()
});

/// Extract the test name declared on one line of source, if any.
pub fn test_name_on_line(line: &str) -> Option<&str> {
    let caps = TEST_DECLARATION.captures(line)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

/// REMOVED records for every test declaration among the deleted lines of
/// `file_diff`. For a deleted file this covers the whole old content; for a
/// modified file only the lines the diff removed.
pub fn detect(file_diff: &FileDiff) -> Vec<ImpactedTest> {
    file_diff
        .changed_lines
        .iter()
        .filter(|line| line.is_deleted)
        .filter_map(|line: &ChangedLine| test_name_on_line(&line.content))
        .map(|name| ImpactedTest {
            test_name: name.to_string(),
            file_path: file_diff.path.clone(),
            impact_type: ImpactType::Removed,
            related_file: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeType;

    fn deleted(content: &str, line: i64) -> ChangedLine {
        ChangedLine {
            line,
            content: content.to_string(),
            is_deleted: true,
        }
    }

    #[test]
    fn matches_each_keyword_and_quote_style() {
        assert_eq!(
            test_name_on_line("test('logs in', async () => {"),
            Some("logs in")
        );
        assert_eq!(
            test_name_on_line(r#"it("renders header", () => {"#),
            Some("renders header")
        );
        assert_eq!(
            test_name_on_line("describe(`auth flows`, () => {"),
            Some("auth flows")
        );
    }

    #[test]
    fn matches_dotted_modifiers() {
        assert_eq!(
            test_name_on_line("test.skip('flaky checkout', () => {"),
            Some("flaky checkout")
        );
        assert_eq!(test_name_on_line("it.only('focus', () => {"), Some("focus"));
        assert_eq!(
            test_name_on_line("describe.serial.only('ordered', () => {"),
            Some("ordered")
        );
    }

    #[test]
    fn tolerates_whitespace_around_call() {
        assert_eq!(
            test_name_on_line("  test ( 'spaced out' , () => {"),
            Some("spaced out")
        );
    }

    #[test]
    fn ignores_non_declaration_lines() {
        assert_eq!(test_name_on_line("await page.click('#submit');"), None);
        assert_eq!(test_name_on_line("const latest = tests[0];"), None);
        // Keyword must stand alone, not be a suffix of another identifier.
        assert_eq!(test_name_on_line("retest('nope', () => {"), None);
        assert_eq!(
            test_name_on_line("// test('commented out', ..."),
            Some("commented out")
        );
    }

    #[test]
    fn mismatched_quotes_do_not_match() {
        assert_eq!(test_name_on_line("test('mismatched\", () => {"), None);
    }

    #[test]
    fn detect_reports_only_deleted_declaration_lines() {
        let diff = FileDiff {
            path: "e2e/old.spec.ts".to_string(),
            change_type: ChangeType::Del,
            changed_lines: vec![
                deleted("import { test } from '@playwright/test';", 1),
                deleted("", 2),
                deleted("test('obsolete flow', async ({ page }) => {", 3),
                deleted("  await page.goto('/');", 4),
                deleted("});", 5),
            ],
            hunks: Vec::new(),
        };
        let results = detect(&diff);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].test_name, "obsolete flow");
        assert_eq!(results[0].impact_type, ImpactType::Removed);
        assert_eq!(results[0].file_path, "e2e/old.spec.ts");
        assert_eq!(results[0].related_file, None);
    }

    #[test]
    fn detect_skips_added_lines_in_modified_file() {
        let diff = FileDiff {
            path: "e2e/login.spec.ts".to_string(),
            change_type: ChangeType::Mod,
            changed_lines: vec![
                deleted("test('dropped', () => {});", 8),
                ChangedLine {
                    line: 8,
                    content: "test('replacement', () => {});".to_string(),
                    is_deleted: false,
                },
            ],
            hunks: Vec::new(),
        };
        let results = detect(&diff);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].test_name, "dropped");
    }

    #[test]
    fn empty_name_is_still_a_declaration() {
        assert_eq!(test_name_on_line("test('', () => {})"), Some(""));
    }
}
