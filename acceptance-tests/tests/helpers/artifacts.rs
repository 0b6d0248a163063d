// acceptance-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for acceptance tests.
// Purpose: Keep rendered manifests and summaries for failed-run inspection.
// Dependencies: acceptance-tests, serde, serde_json
// ============================================================================

#![allow(clippy::missing_docs_in_private_items, reason = "Test helpers are documented at the module level.")]

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use acceptance_tests::config::AcceptanceTestConfig;
use serde::Serialize;
use tile_manifest_core::Manifest;

#[derive(Debug, Serialize)]
struct TestSummary {
    test_name: String,
    status: String,
    duration_ms: u128,
    notes: Vec<String>,
    artifacts: Vec<String>,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Artifact writer for one test; disabled unless
/// `TILE_ACCEPTANCE_RUN_ROOT` is set.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: Option<PathBuf>,
}

impl TestArtifacts {
    /// Creates the artifact root for a test when artifacts are enabled.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = AcceptanceTestConfig::load().map_err(io::Error::other)?;
        let root = config.run_root.map(|root| root.join(test_name));
        if let Some(root) = &root {
            fs::create_dir_all(root)?;
        }
        Ok(Self {
            root,
        })
    }

    /// Writes a text artifact; a no-op when disabled.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<Option<PathBuf>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let path = root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(Some(path))
    }

    /// Writes a rendered manifest as YAML.
    pub fn write_manifest(&self, name: &str, manifest: &Manifest) -> io::Result<Option<PathBuf>> {
        let text = manifest.to_yaml_string().map_err(io::Error::other)?;
        self.write_text(name, &text)
    }
}

/// Writes a summary when the test ends, including on panic.
pub struct TestReporter {
    artifacts: TestArtifacts,
    test_name: String,
    started_at_ms: u128,
    written: Vec<String>,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            written: Vec::new(),
            finalized: false,
        })
    }

    /// Records a rendered manifest artifact.
    pub fn record_manifest(&mut self, name: &str, manifest: &Manifest) -> io::Result<()> {
        if let Some(path) = self.artifacts.write_manifest(name, manifest)? {
            self.written.push(path.display().to_string());
        }
        Ok(())
    }

    /// Writes the final summary for the test.
    pub fn finish(&mut self, status: &str, notes: Vec<String>) -> io::Result<()> {
        self.finalized = true;
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            duration_ms: now_millis().saturating_sub(self.started_at_ms),
            notes,
            artifacts: self.written.clone(),
        };
        let json = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
        self.artifacts.write_text("summary.json", &json)?;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(status, vec!["test terminated without explicit summary".to_string()]);
    }
}
