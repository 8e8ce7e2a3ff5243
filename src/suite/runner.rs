//! Sequential suite execution and tallying.

use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::http::{ApiRequest, ApiResponse};

use super::parse::SuiteRow;

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed { status: u16, duration_ms: u128 },
    Failed { expected: u16, actual: u16 },
    Error { message: String },
    Malformed { reason: String },
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Result of one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    pub line: usize,
    pub name: String,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

/// Totals for a suite run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of passing rows; `None` when no rows were eligible.
    pub success_rate: Option<f64>,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    fn from_results(results: Vec<CaseResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.outcome.is_pass()).count();
        let failed = total - passed;
        let success_rate = if total == 0 {
            None
        } else {
            Some(passed as f64 * 100.0 / total as f64)
        };

        Self {
            total,
            passed,
            failed,
            success_rate,
            results,
        }
    }

    /// Whether every row passed (vacuously true for an empty suite).
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// One-line summary, e.g. `3/4 passed (75.0%)`.
    pub fn summary_line(&self) -> String {
        match self.success_rate {
            Some(rate) => format!("{}/{} passed ({:.1}%)", self.passed, self.total, rate),
            None => "No tests run".to_string(),
        }
    }
}

/// Run every row in order.
///
/// `send` performs the HTTP request; `observe` sees each result as soon as
/// it is known so callers can print progress. A transport error fails the
/// row and the run continues.
pub fn run_suite<S, O>(rows: &[SuiteRow], mut send: S, mut observe: O) -> SuiteReport
where
    S: FnMut(&ApiRequest) -> Result<ApiResponse>,
    O: FnMut(&CaseResult),
{
    let mut results = Vec::with_capacity(rows.len());

    for row in rows {
        let result = match row {
            SuiteRow::Malformed { line, reason } => CaseResult {
                line: *line,
                name: format!("line {}", line),
                outcome: CaseOutcome::Malformed {
                    reason: reason.clone(),
                },
            },
            SuiteRow::Case(case) => {
                let outcome = match send(&case.request()) {
                    Ok(resp) if resp.status == case.expected_status => CaseOutcome::Passed {
                        status: resp.status,
                        duration_ms: duration_ms(resp.duration),
                    },
                    Ok(resp) => CaseOutcome::Failed {
                        expected: case.expected_status,
                        actual: resp.status,
                    },
                    Err(e) => CaseOutcome::Error {
                        message: e.to_string(),
                    },
                };
                tracing::debug!("Suite case '{}' -> {:?}", case.name, outcome);
                CaseResult {
                    line: case.line,
                    name: case.name.clone(),
                    outcome,
                }
            }
        };

        observe(&result);
        results.push(result);
    }

    SuiteReport::from_results(results)
}

fn duration_ms(d: Duration) -> u128 {
    d.as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpsError;
    use crate::suite::parse_suite;

    fn respond(status: u16) -> Result<ApiResponse> {
        Ok(ApiResponse {
            status,
            body: String::new(),
            content_type: None,
            duration: Duration::from_millis(3),
        })
    }

    #[test]
    fn all_matching_rows_pass() {
        let rows = parse_suite(
            "a|GET|http://x/a|200\nb|POST|http://x/b|201|{}\n# skip\nc|DELETE|http://x/c|204\n",
        );
        let expected = [200, 201, 204];
        let mut i = 0;

        let report = run_suite(
            &rows,
            |_| {
                let status = expected[i];
                i += 1;
                respond(status)
            },
            |_| {},
        );

        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.success_rate, Some(100.0));
        assert!(report.all_passed());
    }

    #[test]
    fn empty_suite_has_no_rate() {
        let rows = parse_suite("# only comments\n\n");
        let report = run_suite(&rows, |_| respond(200), |_| {});

        assert_eq!(report.total, 0);
        assert_eq!(report.success_rate, None);
        assert_eq!(report.summary_line(), "No tests run");
        assert!(report.all_passed());
    }

    #[test]
    fn mismatch_error_and_malformed_fail() {
        let rows = parse_suite(
            "ok|GET|http://x/ok|200\n\
             wrong|GET|http://x/wrong|200\n\
             down|GET|http://x/down|200\n\
             broken|GET\n",
        );
        let mut calls = 0;

        let report = run_suite(
            &rows,
            |req| {
                calls += 1;
                if req.url.ends_with("/ok") {
                    respond(200)
                } else if req.url.ends_with("/wrong") {
                    respond(500)
                } else {
                    Err(OpsError::Other(anyhow::anyhow!("connection refused")))
                }
            },
            |_| {},
        );

        assert_eq!(calls, 3, "malformed rows are never sent");
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 3);
        assert_eq!(report.summary_line(), "1/4 passed (25.0%)");
        assert_eq!(
            report.results[1].outcome,
            CaseOutcome::Failed {
                expected: 200,
                actual: 500
            }
        );
        assert!(matches!(report.results[2].outcome, CaseOutcome::Error { .. }));
        assert!(matches!(
            report.results[3].outcome,
            CaseOutcome::Malformed { .. }
        ));
    }

    #[test]
    fn observe_sees_every_row_in_order() {
        let rows = parse_suite("a|GET|http://x|200\nb|GET|http://x|200\n");
        let mut seen = Vec::new();

        run_suite(&rows, |_| respond(200), |r| seen.push(r.name.clone()));

        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn report_serializes_outcome_tag() {
        let rows = parse_suite("a|GET|http://x|200\n");
        let report = run_suite(&rows, |_| respond(404), |_| {});

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["outcome"], "failed");
        assert_eq!(json["results"][0]["actual"], 404);
        assert_eq!(json["success_rate"], 0.0);
    }
}
