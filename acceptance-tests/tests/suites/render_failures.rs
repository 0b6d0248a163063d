// acceptance-tests/tests/suites/render_failures.rs
// ============================================================================
// Module: Render Failure Tests
// Description: Renderer process failures and unusable output.
// Purpose: Validate error classification and scratch cleanup end to end.
// Dependencies: acceptance-tests helpers, tile-manifest-render, tempfile
// ============================================================================

//! ## Overview
//! Drives the stub renderer into each failure mode and checks that the
//! client classifies the failure and leaves no scratch files behind.

use std::fs;
use std::path::Path;
use std::time::Duration;

use helpers::renderer::DEFAULT_TEST_TIMEOUT;
use helpers::renderer::cf_metadata;
use helpers::renderer::client_for;
use helpers::renderer::stub_renderer;
use tile_manifest_render::ConfigOverrides;
use tile_manifest_render::RenderError;
use tile_manifest_render::RenderErrorKind;
use tile_manifest_render::RunnerError;

use crate::helpers;

/// Asserts the scratch directory was left empty.
fn assert_no_scratch_files(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let leftovers: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    assert!(leftovers.is_empty(), "scratch files left behind: {}", leftovers.len());
    Ok(())
}

/// Renders the fixture with the stub in `mode`, scratch files under `dir`.
fn render_in_mode(
    mode: &str,
    dir: &Path,
    timeout: Duration,
) -> Result<tile_manifest_core::Manifest, RenderError> {
    client_for(&stub_renderer(), timeout)
        .with_additional_args(["--stub-mode", mode])
        .with_scratch_dir(dir)
        .render(&ConfigOverrides::new(), &cf_metadata())
}

#[test]
fn missing_metadata_is_render_failure_with_stderr() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let client = client_for(&stub_renderer(), DEFAULT_TEST_TIMEOUT).with_scratch_dir(scratch.path());

    let err = client
        .render(&ConfigOverrides::new(), Path::new("/nonexistent/tile/metadata.yml"))
        .err()
        .ok_or("render unexpectedly succeeded")?;

    assert_eq!(err.kind(), RenderErrorKind::Render);
    let message = err.to_string();
    assert!(message.starts_with("unable to retrieve manifest"), "{message}");
    assert!(message.contains("unable to read /nonexistent/tile/metadata.yml"), "{message}");
    assert_no_scratch_files(scratch.path())
}

#[test]
fn unresolved_property_is_render_failure() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let metadata = scratch.path().join("metadata.yml");
    fs::write(&metadata, "manifest:\n  name: ((.properties.undefined))\n")?;
    let render_dir = tempfile::tempdir()?;
    let client =
        client_for(&stub_renderer(), DEFAULT_TEST_TIMEOUT).with_scratch_dir(render_dir.path());

    let err = client.render(&ConfigOverrides::new(), &metadata).err().ok_or("render succeeded")?;

    assert!(matches!(err, RenderError::RendererFailed { exit_code: Some(1), .. }));
    assert!(err.to_string().contains("missing value for property .properties.undefined"));
    assert_no_scratch_files(render_dir.path())
}

#[test]
fn forced_failure_is_render_failure() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;

    let err = render_in_mode("fail", scratch.path(), DEFAULT_TEST_TIMEOUT)
        .err()
        .ok_or("render succeeded")?;

    assert_eq!(err.label(), "renderer_failed");
    assert!(err.to_string().contains("stub renderer forced failure"));
    assert_no_scratch_files(scratch.path())
}

#[test]
fn invalid_yaml_output_is_parse_failure() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;

    let err = render_in_mode("invalid-yaml", scratch.path(), DEFAULT_TEST_TIMEOUT)
        .err()
        .ok_or("render succeeded")?;

    assert_eq!(err.kind(), RenderErrorKind::Parse);
    assert!(err.to_string().starts_with("unable to unmarshal yaml"));
    assert_no_scratch_files(scratch.path())
}

#[test]
fn non_mapping_output_is_parse_failure() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;

    let err = render_in_mode("list", scratch.path(), DEFAULT_TEST_TIMEOUT)
        .err()
        .ok_or("render succeeded")?;

    assert_eq!(err.kind(), RenderErrorKind::Parse);
    assert_no_scratch_files(scratch.path())
}

#[test]
fn hung_renderer_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;

    let err = render_in_mode("sleep", scratch.path(), Duration::from_secs(1))
        .err()
        .ok_or("render succeeded")?;

    assert!(matches!(err, RenderError::Runner(RunnerError::TimedOut { .. })));
    assert_eq!(err.kind(), RenderErrorKind::Render);
    assert_no_scratch_files(scratch.path())
}

#[test]
fn missing_program_is_spawn_failure() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let client = client_for(Path::new("/nonexistent/bin/ops-manifest"), DEFAULT_TEST_TIMEOUT)
        .with_scratch_dir(scratch.path());

    let err = client.render(&ConfigOverrides::new(), &cf_metadata()).err().ok_or("succeeded")?;

    assert!(matches!(err, RenderError::Runner(RunnerError::Spawn { .. })));
    assert_no_scratch_files(scratch.path())
}

#[test]
fn concurrent_renders_are_independent() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let timeouts = [120_i64, 240, 360, 480];

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = timeouts
            .iter()
            .map(|timeout| {
                let dir = scratch.path();
                scope.spawn(move || {
                    client_for(&stub_renderer(), DEFAULT_TEST_TIMEOUT)
                        .with_scratch_dir(dir)
                        .render(
                            &ConfigOverrides::new().with(".router.frontend_idle_timeout", *timeout),
                            &cf_metadata(),
                        )
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join()).collect()
    });

    for (timeout, result) in timeouts.iter().zip(results) {
        let manifest = result.map_err(|_| "render thread panicked")??;
        let router = manifest.find_instance_group_job("router", "gorouter")?;
        assert_eq!(router.property("router/frontend_idle_timeout")?.as_i64()?, *timeout);
    }
    assert_no_scratch_files(scratch.path())
}
