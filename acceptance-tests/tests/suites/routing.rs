// acceptance-tests/tests/suites/routing.rs
// ============================================================================
// Module: Routing Acceptance Tests
// Description: Router and route registrar properties of the fixture tile.
// Purpose: Validate rendered properties with and without overrides.
// Dependencies: acceptance-tests helpers, tile-manifest-core
// ============================================================================

//! ## Overview
//! Renders the fixture tile through the renderer process and asserts on job
//! properties the way tile acceptance tests do.

use helpers::artifacts::TestReporter;
use helpers::renderer::render_cf;
use tile_manifest_core::ManifestValue;
use tile_manifest_render::ConfigOverrides;

use crate::helpers;

#[test]
fn gorouter_uses_default_idle_timeout() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("gorouter_uses_default_idle_timeout")?;
    let manifest = render_cf(&ConfigOverrides::new())?;
    reporter.record_manifest("manifest.yml", &manifest)?;

    let router = manifest.find_instance_group_job("router", "gorouter")?;
    assert_eq!(router.property("router/frontend_idle_timeout")?.as_i64()?, 900);
    assert_eq!(router.property("router/min_tls_version")?.as_str()?, "TLSv1.2");
    assert!(!router.property("router/disable_http")?.as_bool()?);

    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn gorouter_idle_timeout_override_is_rendered() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("gorouter_idle_timeout_override_is_rendered")?;
    let overrides = ConfigOverrides::new()
        .with(".router.frontend_idle_timeout", 300_i64)
        .with(".properties.routing_disable_http", true);
    let manifest = render_cf(&overrides)?;
    reporter.record_manifest("manifest.yml", &manifest)?;

    let router = manifest.find_instance_group_job("router", "gorouter")?;
    assert_eq!(router.property("router/frontend_idle_timeout")?.as_i64()?, 300);
    assert!(router.property("router/disable_http")?.as_bool()?);

    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn route_registrar_routes_select_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = render_cf(&ConfigOverrides::new())?;

    let registrar = manifest.find_instance_group_job("router", "route_registrar")?;
    assert_eq!(registrar.property("route_registrar/routes/name=api/tls_port")?.as_i64()?, 9024);
    assert_eq!(registrar.property("route_registrar/routes/name=uaa/tls_port")?.as_i64()?, 8443);
    assert_eq!(registrar.path("consumes/nats-tls/from")?.as_str()?, "nats-tls");
    Ok(())
}

#[test]
fn base_config_product_properties_apply() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = render_cf(&ConfigOverrides::new())?;

    let registrar = manifest.find_instance_group_job("router", "route_registrar")?;
    let uris = registrar.property("route_registrar/routes/name=api/uris")?;
    assert_eq!(
        uris,
        &ManifestValue::from(vec![ManifestValue::from("sys.acceptance.example.com")])
    );
    Ok(())
}

#[test]
fn override_wins_over_base_config() -> Result<(), Box<dyn std::error::Error>> {
    let overrides =
        ConfigOverrides::new().with(".properties.system_domain", "sys.override.example.com");
    let manifest = render_cf(&overrides)?;

    let uri = manifest.path(
        "/instance_groups/name=router/jobs/name=route_registrar/properties/route_registrar/routes/name=api/uris/0",
    )?;
    assert_eq!(uri.as_str()?, "sys.override.example.com");
    Ok(())
}

#[test]
fn instance_groups_and_other_jobs_are_reachable() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = render_cf(&ConfigOverrides::new())?;

    assert_eq!(manifest.instance_group_names()?, vec!["router", "diego_brain"]);
    let auctioneer = manifest.find_instance_group_job("diego_brain", "auctioneer")?;
    assert_eq!(
        auctioneer.property("diego/auctioneer/bbs/api_location")?.as_str()?,
        "bbs.service.cf.internal:8889"
    );
    assert_eq!(manifest.path("/instance_groups/name=router/instances")?.as_i64()?, 2);
    Ok(())
}

#[test]
fn missing_job_and_property_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = render_cf(&ConfigOverrides::new())?;

    let missing_job = manifest.find_instance_group_job("router", "tcp_router").err();
    assert!(missing_job.is_some_and(|err| err.to_string().contains("name=tcp_router")));

    let router = manifest.find_instance_group_job("router", "gorouter")?;
    let missing = router.property("router/enable_ssl").err();
    assert!(missing.is_some_and(|err| err.to_string().contains("enable_ssl")));
    Ok(())
}
