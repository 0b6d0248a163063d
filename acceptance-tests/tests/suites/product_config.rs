// acceptance-tests/tests/suites/product_config.rs
// ============================================================================
// Module: Product Config Tests
// Description: Config-file wiring of the renderer and product service.
// Purpose: Validate TOML config, audit output, and base config merging.
// Dependencies: acceptance-tests helpers, tile-manifest-render, serde_json
// ============================================================================

//! ## Overview
//! Builds clients and product services from `tile-manifest.toml` files the
//! way a CI job would, then renders the fixture tile through them.

use std::fs;
use std::path::Path;

use helpers::renderer::cf_base_config;
use helpers::renderer::cf_metadata;
use helpers::renderer::stub_renderer;
use tile_manifest_core::ManifestValue;
use tile_manifest_render::ConfigError;
use tile_manifest_render::ConfigOverrides;
use tile_manifest_render::RendererConfig;

use crate::helpers;

/// Writes a config pointing at the stub renderer and fixture tile.
fn write_config(dir: &Path, audit_log: &Path) -> Result<std::path::PathBuf, std::io::Error> {
    let path = dir.join("tile-manifest.toml");
    let text = format!(
        r#"
[renderer]
program = "{program}"
timeout_secs = 30
scratch_dir = "{scratch}"

[product]
metadata_path = "{metadata}"
config_file = "{config}"

[audit]
sink = "file"
path = "{audit}"
"#,
        program = stub_renderer().display(),
        scratch = dir.display(),
        metadata = cf_metadata().display(),
        config = cf_base_config().display(),
        audit = audit_log.display(),
    );
    fs::write(&path, text)?;
    Ok(path)
}

#[test]
fn product_service_from_config_file_renders() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let audit_log = dir.path().join("audit.jsonl");
    let config_path = write_config(dir.path(), &audit_log)?;

    let config = RendererConfig::from_file(&config_path)?;
    config.validate()?;
    let product = config.build_product_service()?;
    let manifest =
        product.render_manifest(&ConfigOverrides::new().with(".router.min_tls_version", "TLSv1.3"))?;

    let router = manifest.find_instance_group_job("router", "gorouter")?;
    assert_eq!(router.property("router/min_tls_version")?.as_str()?, "TLSv1.3");

    let log = fs::read_to_string(&audit_log)?;
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    let event: serde_json::Value = serde_json::from_str(lines[0])?;
    assert_eq!(event["event"], "manifest_render");
    assert_eq!(event["outcome"], "ok");
    assert_eq!(event["exit_code"], 0);
    Ok(())
}

#[test]
fn scratch_dir_from_config_is_cleaned() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let audit_log = dir.path().join("audit.jsonl");
    let config_path = write_config(dir.path(), &audit_log)?;

    let product = RendererConfig::from_file(&config_path)?.build_product_service()?;
    product.render_manifest(&ConfigOverrides::new())?;

    let mut names: Vec<String> = fs::read_dir(dir.path())?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    assert_eq!(names, vec!["audit.jsonl".to_string(), "tile-manifest.toml".to_string()]);
    Ok(())
}

#[test]
fn merged_config_matches_renderer_input() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config_path = write_config(dir.path(), &dir.path().join("audit.jsonl"))?;
    let product = RendererConfig::from_file(&config_path)?.build_product_service()?;

    let overrides = ConfigOverrides::new().with(".router.frontend_idle_timeout", 60_i64);
    let merged = product.merged_config(&overrides)?;

    let props = merged.get("product-properties").ok_or("missing product-properties")?;
    assert_eq!(
        props.get(".properties.system_domain").and_then(|entry| entry.get("value")),
        Some(&ManifestValue::from("sys.acceptance.example.com"))
    );
    assert_eq!(
        props.get(".router.frontend_idle_timeout").and_then(|entry| entry.get("value")),
        Some(&ManifestValue::from(60_i64))
    );
    assert!(merged.get("network-properties").is_some());
    Ok(())
}

#[test]
fn invalid_config_files_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let unknown = dir.path().join("unknown.toml");
    fs::write(&unknown, "[renderer]\nprogramme = \"ops-manifest\"\n")?;
    assert!(matches!(RendererConfig::from_file(&unknown), Err(ConfigError::Parse(_))));

    let missing = RendererConfig::from_file(&dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let no_metadata = RendererConfig::from_toml_str("[renderer]\nprogram = \"ops-manifest\"\n")?;
    assert!(matches!(no_metadata.build_product_service(), Err(ConfigError::Invalid(_))));
    Ok(())
}
