//! Indirect-impact tracer.
//!
//! Starting from the changed lines of a non-test source file, walks the
//! name-based reference graph outward until it reaches test declarations.
//! The walk is an explicit worklist with a visited set, a depth cap, and a
//! global symbol budget, so cyclic reference graphs and pathological
//! fan-out both terminate.

use crate::config::Config;
use crate::model::{FileDiff, ImpactType, ImpactedTest};
use crate::project::source::Declaration;
use crate::project::{self, Project, Reference};
use std::collections::HashSet;

/// Trace tests impacted by the changes in `file_diff`, a non-test source
/// file. Every emitted record carries the changed file itself as
/// `related_file`, regardless of how many hops the walk took.
pub fn impacted_tests(project: &mut Project, file_diff: &FileDiff) -> Vec<ImpactedTest> {
    let config = Config::get();
    let mut results = Vec::new();
    let mut visited: HashSet<(String, i64)> = HashSet::new();
    let mut emitted: HashSet<(String, String)> = HashSet::new();
    let mut worklist: Vec<(Declaration, usize)> = Vec::new();
    let mut symbols_seen = 0usize;

    for line in &file_diff.changed_lines {
        // Deleted-line numbers index the pre-commit file and cannot be
        // located in the checked-out tree.
        if line.is_deleted {
            continue;
        }
        let Some(symbol) = project.exported_declaration_at(&file_diff.path, line.line) else {
            continue;
        };
        if visited.insert((symbol.path.clone(), symbol.start_byte)) {
            worklist.push((symbol, 0));
        }
    }

    while let Some((symbol, depth)) = worklist.pop() {
        symbols_seen += 1;
        if symbols_seen > config.trace_symbol_limit {
            eprintln!(
                "tia: trace budget of {} symbols exhausted in {}, results may be partial",
                config.trace_symbol_limit, file_diff.path
            );
            break;
        }

        for reference in project.references(&symbol) {
            if project::is_test_file(&reference.path) {
                emit_for_test_reference(
                    project,
                    &reference,
                    &symbol.name,
                    &file_diff.path,
                    &mut emitted,
                    &mut results,
                );
            } else if depth + 1 <= config.trace_depth {
                // `trace_depth` is the deepest hop a symbol may land on;
                // the changed symbol itself sits at depth 0.
                let Some(next) = project.exported_declaration_at(&reference.path, reference.line)
                else {
                    continue;
                };
                if visited.insert((next.path.clone(), next.start_byte)) {
                    worklist.push((next, depth + 1));
                }
            }
        }
    }

    results
}

/// Emit IMPACTED_BY_DEPENDENCY for the tests behind one reference site in a
/// test file. An import-statement site stands for every local use of the
/// imported name; a direct use stands only for its own enclosing test.
fn emit_for_test_reference(
    project: &mut Project,
    reference: &Reference,
    name: &str,
    origin: &str,
    emitted: &mut HashSet<(String, String)>,
    results: &mut Vec<ImpactedTest>,
) {
    let use_lines: Vec<i64> = if reference.in_import {
        project
            .local_references(&reference.path, name)
            .iter()
            .map(|r| r.line)
            .collect()
    } else {
        vec![reference.line]
    };

    for line in use_lines {
        let Some(test) = project.enclosing_test(&reference.path, line) else {
            continue;
        };
        if emitted.insert((reference.path.clone(), test.test_name.clone())) {
            results.push(ImpactedTest {
                test_name: test.test_name,
                file_path: reference.path.clone(),
                impact_type: ImpactType::ImpactedByDependency,
                related_file: Some(origin.to_string()),
            });
        }
    }
}
