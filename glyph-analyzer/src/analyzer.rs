//! Orchestrates the three phases in the fixed order A → B → C (§5: "Analysis
//! phases run strictly in the order A → B → C; issues within a phase are
//! emitted in AST pre-order").

use crate::detector::{default_detectors, PatternDetector};
use crate::phase_b::ImportPolicy;
use crate::{phase_b, phase_c};
use glyph_diagnostics::Issue;
use glyph_registry::Registry;
use glyph_syntax::ast::Program;

/// Below this many statements, Phase A's detectors run sequentially; above
/// it they run via `std::thread::scope` since they are independent,
/// read-only scans over the same AST (§5 ADDED). Either way, issue order is
/// renormalized to AST pre-order before this function returns.
const PARALLEL_THRESHOLD: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Any `critical` or `high` issue is a hard failure; the caller must
    /// not generate code.
    Strict,
    /// Issues of any severity are returned as warnings only.
    Permissive,
}

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub mode: Mode,
    pub import_policy: ImportPolicy,
    pub parallel_threshold: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self { mode: Mode::Strict, import_policy: ImportPolicy::permissive(), parallel_threshold: PARALLEL_THRESHOLD }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    /// False when `mode` is `Strict` and a `critical`/`high` issue exists.
    pub passed: bool,
}

#[tracing::instrument(level = "debug", skip_all, fields(mode = ?options.mode))]
pub fn analyze(program: &Program, registry: &Registry, options: &AnalyzerOptions) -> AnalysisResult {
    let phase_a = run_phase_a(program, options.parallel_threshold);
    tracing::debug!(phase = "a", issues = phase_a.len(), "pattern detection complete");
    let mut issues = phase_a;

    let phase_b = phase_b::run(program, registry, &options.import_policy);
    tracing::debug!(phase = "b", issues = phase_b.len(), "ast structural analysis complete");
    issues.extend(phase_b);

    let phase_c = phase_c::run(program, registry);
    tracing::debug!(phase = "c", issues = phase_c.len(), "taint tracking complete");
    issues.extend(phase_c);

    let passed = match options.mode {
        Mode::Strict => !issues.iter().any(|issue| issue.severity.is_hard_failure()),
        Mode::Permissive => true,
    };

    tracing::info!(total_issues = issues.len(), passed, "analysis complete");
    AnalysisResult { issues, passed }
}

fn run_phase_a(program: &Program, parallel_threshold: usize) -> Vec<Issue> {
    let detectors = default_detectors();
    let node_count = count_statements(&program.statements);

    let mut issues = if node_count >= parallel_threshold {
        run_detectors_parallel(&detectors, program)
    } else {
        detectors.iter().flat_map(|d| d.scan(program)).collect()
    };

    issues.sort_by_key(|issue| issue.span.map(|s| s.start).unwrap_or(usize::MAX));
    issues
}

fn run_detectors_parallel(detectors: &[Box<dyn PatternDetector>], program: &Program) -> Vec<Issue> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = detectors.iter().map(|detector| scope.spawn(|| detector.scan(program))).collect();
        handles.into_iter().flat_map(|h| h.join().unwrap_or_default()).collect()
    })
}

fn count_statements(statements: &[glyph_syntax::ast::Stmt]) -> usize {
    let mut count = 0;
    crate::detector::walk_stmts(statements, &mut |_| count += 1);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_syntax::parse;

    #[test]
    fn benign_program_produces_zero_hard_issues() {
        let program = parse("x = 1; y = x + 2; function add(a, b) { return a + b; }", None).unwrap();
        let result = analyze(&program, &Registry::with_default_builtins(), &AnalyzerOptions::default());
        assert!(result.passed);
        assert!(!result.issues.iter().any(|i| i.severity.is_hard_failure()));
    }

    #[test]
    fn malicious_eval_program_fails_strict_mode() {
        let program = parse("eval(x);", None).unwrap();
        let result = analyze(&program, &Registry::with_default_builtins(), &AnalyzerOptions::default());
        assert!(!result.passed);
    }

    #[test]
    fn permissive_mode_never_fails() {
        let program = parse("eval(x);", None).unwrap();
        let options = AnalyzerOptions { mode: Mode::Permissive, ..AnalyzerOptions::default() };
        let result = analyze(&program, &Registry::with_default_builtins(), &options);
        assert!(result.passed);
        assert!(!result.issues.is_empty());
    }

    #[test]
    fn issues_are_normalized_to_ast_pre_order() {
        let program = parse("eval(a); x = \"__class__\";", None).unwrap();
        let result = analyze(&program, &Registry::with_default_builtins(), &AnalyzerOptions::default());
        let starts: Vec<usize> = result.issues.iter().filter_map(|i| i.span.map(|s| s.start)).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }
}
