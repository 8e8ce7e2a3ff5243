//! API test suites: pipe-delimited files of requests and expected statuses.
//!
//! # Example
//!
//! ```
//! use opskit::suite::{parse_suite, run_suite};
//! use opskit::http::ApiResponse;
//! use std::time::Duration;
//!
//! let rows = parse_suite("# smoke tests\nhealth|GET|http://localhost/health|200\n");
//! let report = run_suite(
//!     &rows,
//!     |_req| {
//!         Ok(ApiResponse {
//!             status: 200,
//!             body: String::new(),
//!             content_type: None,
//!             duration: Duration::ZERO,
//!         })
//!     },
//!     |_result| {},
//! );
//! assert_eq!(report.summary_line(), "1/1 passed (100.0%)");
//! ```

pub mod parse;
pub mod runner;

pub use parse::{parse_suite, SuiteRow, TestCase};
pub use runner::{run_suite, CaseOutcome, CaseResult, SuiteReport};
