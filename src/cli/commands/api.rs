//! API testing commands.
//!
//! Provides `opskit api request`, `health`, `suite` and `monitor`. All of
//! them go through one [`ApiClient`] built with the configured HTTP timeout.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::analysis::read_text;
use crate::cli::args::MonitorArgs;
use crate::error::{OpsError, Result};
use crate::http::{ApiClient, ApiRequest, ApiResponse, HttpMethod};
use crate::monitor::ProbeStatus;
use crate::suite::{parse_suite, run_suite, CaseOutcome, CaseResult};
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::non_empty;

/// Arguments for the api command.
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    #[command(subcommand)]
    pub command: ApiSubcommand,
}

/// API subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ApiSubcommand {
    /// Send one request
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD)
        method: HttpMethod,
        /// Target URL
        #[arg(value_parser = non_empty())]
        url: String,
        /// Request body; JSON bodies get a JSON content type
        #[arg(short, long)]
        data: Option<String>,
        /// Fail unless the response has this status
        #[arg(short, long)]
        expect: Option<u16>,
    },
    /// GET a URL and require a 2xx status
    Health {
        /// Target URL
        #[arg(value_parser = non_empty())]
        url: String,
    },
    /// Run a pipe-delimited test suite file
    Suite {
        /// Suite file: name|method|url|expected_status|data per line
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll a URL repeatedly
    Monitor {
        /// Target URL
        #[arg(value_parser = non_empty())]
        url: String,
        #[command(flatten)]
        watch: MonitorArgs,
    },
}

impl ApiSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
            Self::Health { .. } => "health",
            Self::Suite { .. } => "suite",
            Self::Monitor { .. } => "monitor",
        }
    }
}

fn timing(response: &ApiResponse) -> String {
    format!("HTTP {} in {}", response.status, format_duration(response.duration))
}

/// Print line for one suite row.
fn describe_case(result: &CaseResult) -> String {
    match &result.outcome {
        CaseOutcome::Passed {
            status,
            duration_ms,
        } => format!("PASS {} ({}, {}ms)", result.name, status, duration_ms),
        CaseOutcome::Failed { expected, actual } => format!(
            "FAIL {}: expected {}, got {}",
            result.name, expected, actual
        ),
        CaseOutcome::Error { message } => format!("FAIL {}: {}", result.name, message),
        CaseOutcome::Malformed { reason } => {
            format!("FAIL line {}: {}", result.line, reason)
        }
    }
}

/// The api command implementation.
pub struct ApiCommand<'a> {
    ctx: &'a CommandContext,
    args: ApiArgs,
}

impl<'a> ApiCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: ApiArgs) -> Self {
        Self { ctx, args }
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(self.ctx.settings.http.timeout())
    }

    fn request(
        &self,
        request: ApiRequest,
        expect: Option<u16>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let response = self.client()?.send(&request)?;

        ui.show_header(&format!("{} {}", request.method, request.url));
        ui.show_field("Status", &response.status.to_string());
        ui.show_field("Time", &format_duration(response.duration));
        if let Some(content_type) = &response.content_type {
            ui.show_field("Content-Type", content_type);
        }
        let body = response.pretty_body();
        for line in body.lines() {
            ui.message(line);
        }

        let summary = format!("{} {} -> {}", request.method, request.url, response.status);
        match expect {
            Some(expected) if expected == response.status => {
                ui.success(&format!("Got expected status {}", expected));
                Ok(CommandResult::success(summary))
            }
            Some(expected) => {
                ui.error(&format!(
                    "Expected status {}, got {}",
                    expected, response.status
                ));
                Ok(CommandResult::failure(1, summary))
            }
            None => Ok(CommandResult::from_check(response.status < 400, summary)),
        }
    }

    fn health(&self, url: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let client = self.client()?;
        match client.send(&ApiRequest::new(HttpMethod::Get, url)) {
            Ok(response) if response.is_success() => {
                ui.success(&format!("{} is healthy ({})", url, timing(&response)));
                Ok(CommandResult::success(format!("{} healthy", url)))
            }
            Ok(response) => {
                ui.error(&format!("{} is unhealthy ({})", url, timing(&response)));
                Ok(CommandResult::failure(
                    1,
                    format!("{} returned {}", url, response.status),
                ))
            }
            Err(e) => {
                ui.error(&format!("{} is unreachable: {}", url, e));
                Ok(CommandResult::failure(1, format!("{} unreachable", url)))
            }
        }
    }

    fn suite(&self, file: &Path, json: bool, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let rows = parse_suite(&read_text(file)?);
        let client = self.client()?;
        tracing::debug!("Running {} suite row(s) from {}", rows.len(), file.display());

        if !json {
            ui.show_header(&format!("API suite: {}", file.display()));
        }
        let report = run_suite(
            &rows,
            |request| client.send(request),
            |result| {
                if json {
                    return;
                }
                let line = describe_case(result);
                if result.outcome.is_pass() {
                    ui.success(&line);
                } else {
                    ui.error(&line);
                }
            },
        );

        if json {
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|e| OpsError::Other(e.into()))?;
            ui.message(&rendered);
        } else {
            if report.total == 0 {
                ui.message("No tests run");
            }
            ui.show_field("Total", &report.total.to_string());
            ui.show_field("Passed", &report.passed.to_string());
            ui.show_field("Failed", &report.failed.to_string());
            ui.show_field(
                "Success rate",
                &report
                    .success_rate
                    .map_or_else(|| "n/a".to_string(), |rate| format!("{:.1}%", rate)),
            );
        }

        Ok(CommandResult::from_check(
            report.all_passed(),
            report.summary_line(),
        ))
    }

    fn monitor(
        &self,
        url: &str,
        watch: &MonitorArgs,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let client = self.client()?;
        let request = ApiRequest::new(HttpMethod::Get, url);
        let probe = || match client.send(&request) {
            Ok(response) if response.is_success() => ProbeStatus::up(timing(&response)),
            Ok(response) => ProbeStatus::down(timing(&response)),
            Err(e) => ProbeStatus::down(e.to_string()),
        };
        Ok(self.ctx.watch(ui, url, watch, probe))
    }
}

impl Command for ApiCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            ApiSubcommand::Request {
                method,
                url,
                data,
                expect,
            } => {
                let request = ApiRequest::new(*method, url.clone()).with_body(data.clone());
                self.request(request, *expect, ui)
            }
            ApiSubcommand::Health { url } => self.health(url, ui),
            ApiSubcommand::Suite { file, json } => self.suite(file, *json, ui),
            ApiSubcommand::Monitor { url, watch } => self.monitor(url, watch, ui),
        }
    }
}
