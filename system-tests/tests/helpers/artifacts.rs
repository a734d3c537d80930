// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, token-sale-harness, serde, serde_jcs
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SystemTestConfig;
use token_sale_harness::ContainerKind;
use token_sale_harness::ContainerStack;
use token_sale_harness::SuiteReport;

#[derive(Debug, Serialize)]
struct TestSummary {
    test_name: String,
    status: String,
    started_at_ms: u128,
    ended_at_ms: u128,
    duration_ms: u128,
    notes: Vec<String>,
    artifacts: Vec<String>,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
}

/// Artifact manager for a single system-test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
    capture_logs: bool,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = config
            .run_root
            .map_or_else(|| default_run_root(test_name), |root| root.join(test_name));
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            capture_logs: config.capture_logs,
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }

    /// Writes both containers' logs when log capture is enabled. Returns the
    /// written file names.
    pub async fn capture_container_logs(&self, stack: &ContainerStack) -> Vec<String> {
        if !self.capture_logs {
            return Vec::new();
        }
        let mut written = Vec::new();
        for kind in [ContainerKind::Chain, ContainerKind::Database] {
            let name = format!("{kind}.log");
            let contents = match stack.logs(kind).await {
                Ok(logs) => logs,
                Err(err) => format!("logs unavailable: {err}"),
            };
            if self.write_text(&name, &contents).is_ok() {
                written.push(name);
            }
        }
        written
    }
}

/// Helper that writes summaries even when a test panics.
pub struct TestReporter {
    artifacts: TestArtifacts,
    test_name: String,
    started_at_ms: u128,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    pub const fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes a suite report and a summary derived from it.
    pub fn finish_with_report(&mut self, report: &SuiteReport) -> io::Result<()> {
        self.artifacts.write_json("report.json", report)?;
        let status = if report.all_passed() { "pass" } else { "fail" };
        let mut notes: Vec<String> = report
            .outcomes
            .iter()
            .map(|outcome| match &outcome.error {
                Some(error) => format!("{}: {error}", outcome.name),
                None => format!("{}: passed in {}ms", outcome.name, outcome.elapsed_ms),
            })
            .collect();
        if let Some(error) = &report.teardown_error {
            notes.push(format!("teardown: {error}"));
        }
        self.finish(status, notes, vec!["report.json".to_string()])
    }

    /// Writes the final summary for the test.
    pub fn finish(
        &mut self,
        status: &str,
        notes: Vec<String>,
        artifacts: Vec<String>,
    ) -> io::Result<()> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            artifacts,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(
            status,
            vec!["test terminated without explicit summary".to_string()],
            Vec::new(),
        );
    }
}

fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# System-Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    }
    for note in &summary.notes {
        let _ = writeln!(out, "- {note}");
    }
    out.push_str("\n## Artifacts\n\n");
    if summary.artifacts.is_empty() {
        out.push_str("- None\n");
    }
    for artifact in &summary.artifacts {
        let _ = writeln!(out, "- {artifact}");
    }
    out
}
