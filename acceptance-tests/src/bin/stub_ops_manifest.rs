//! Stub `ops-manifest` renderer for acceptance tests.
// acceptance-tests/src/bin/stub_ops_manifest.rs
// ============================================================================
// Binary: Stub Ops Manifest
// Description: Minimal stand-in for the ops-manifest renderer.
// Purpose: Render fixture manifests without the real tile tooling.
// Dependencies: serde_yaml
// ============================================================================
//
// Usage:
//   stub-ops-manifest --config-file <file.yml> --metadata-path <metadata.yml>
//                     [--stub-mode render|invalid-yaml|list|sleep|fail]
//
// The metadata file holds `manifest` (a template) and `defaults` (property
// values). Every scalar string of the exact form `((<property>))` in the
// template is replaced with the config value for `<property>`: a top-level
// config key first, then `product-properties.<property>.value`, then the
// default. A placeholder with no value is a render failure.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use serde_yaml::Mapping;
use serde_yaml::Value;

/// Exit code for usage errors.
const USAGE_EXIT: u8 = 2;
/// Exit code for render failures.
const RENDER_EXIT: u8 = 1;
/// Product properties key inside the config.
const PRODUCT_PROPERTIES_KEY: &str = "product-properties";

/// Output behavior selected by `--stub-mode`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StubMode {
    /// Render the template.
    Render,
    /// Print unparsable YAML.
    InvalidYaml,
    /// Print a YAML sequence instead of a mapping.
    List,
    /// Sleep far past any sane timeout.
    Sleep,
    /// Fail with a fixed error.
    Fail,
}

/// Parsed command line.
struct StubArgs {
    /// Renderer config path.
    config_file: String,
    /// Product metadata path.
    metadata_path: String,
    /// Output behavior.
    mode: StubMode,
}

/// Parses flags, then renders or simulates the selected failure.
fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => return fail(USAGE_EXIT, &message),
    };
    match args.mode {
        StubMode::InvalidYaml => return emit("instance_groups: [unclosed\n"),
        StubMode::List => return emit("- not\n- a\n- manifest\n"),
        StubMode::Sleep => {
            thread::sleep(Duration::from_secs(60));
            return emit("{}\n");
        }
        StubMode::Fail => return fail(RENDER_EXIT, "stub renderer forced failure"),
        StubMode::Render => {}
    }
    match render(&args) {
        Ok(text) => emit(&text),
        Err(message) => fail(RENDER_EXIT, &message),
    }
}

/// Parses the renderer flags; unknown flags are usage errors.
fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<StubArgs, String> {
    let mut config_file = None;
    let mut metadata_path = None;
    let mut mode = StubMode::Render;
    while let Some(flag) = raw.next() {
        let value = raw.next().ok_or_else(|| format!("{flag} requires a value"))?;
        match flag.as_str() {
            "--config-file" => config_file = Some(value),
            "--metadata-path" => metadata_path = Some(value),
            "--stub-mode" => {
                mode = match value.as_str() {
                    "render" => StubMode::Render,
                    "invalid-yaml" => StubMode::InvalidYaml,
                    "list" => StubMode::List,
                    "sleep" => StubMode::Sleep,
                    "fail" => StubMode::Fail,
                    other => return Err(format!("unknown stub mode {other}")),
                };
            }
            other => return Err(format!("unknown flag {other}")),
        }
    }
    let config_file = config_file.ok_or("--config-file is required")?;
    let metadata_path = metadata_path.ok_or("--metadata-path is required")?;
    if Path::new(&config_file).extension().is_none_or(|ext| ext != "yml") {
        return Err(format!("config file {config_file} must have a .yml extension"));
    }
    Ok(StubArgs {
        config_file,
        metadata_path,
        mode,
    })
}

/// Renders the metadata template against the config.
fn render(args: &StubArgs) -> Result<String, String> {
    let config = read_yaml(&args.config_file)?;
    let metadata = read_yaml(&args.metadata_path)?;
    let template = metadata
        .get("manifest")
        .cloned()
        .ok_or_else(|| format!("{} has no manifest template", args.metadata_path))?;
    let defaults = metadata.get("defaults").and_then(Value::as_mapping).cloned().unwrap_or_default();
    let rendered = substitute(template, &config, &defaults)?;
    serde_yaml::to_string(&rendered).map_err(|err| err.to_string())
}

/// Reads a YAML file.
fn read_yaml(path: &str) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("unable to read {path}: {err}"))?;
    serde_yaml::from_str(&text).map_err(|err| format!("invalid yaml in {path}: {err}"))
}

/// Replaces placeholders throughout `node`.
fn substitute(node: Value, config: &Value, defaults: &Mapping) -> Result<Value, String> {
    match node {
        Value::String(text) => match placeholder(&text) {
            Some(property) => lookup(property, config, defaults)
                .ok_or_else(|| format!("missing value for property {property}")),
            None => Ok(Value::String(text)),
        },
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| substitute(item, config, defaults))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Mapping(entries) => {
            let mut out = Mapping::new();
            for (key, value) in entries {
                out.insert(key, substitute(value, config, defaults)?);
            }
            Ok(Value::Mapping(out))
        }
        other => Ok(other),
    }
}

/// Returns the property name of a `((property))` placeholder.
fn placeholder(text: &str) -> Option<&str> {
    text.strip_prefix("((")?.strip_suffix("))")
}

/// Finds the value for `property` in config precedence order.
fn lookup(property: &str, config: &Value, defaults: &Mapping) -> Option<Value> {
    if let Some(value) = config.get(property) {
        return Some(value.clone());
    }
    if let Some(value) = config
        .get(PRODUCT_PROPERTIES_KEY)
        .and_then(|props| props.get(property))
        .and_then(|entry| entry.get("value"))
    {
        return Some(value.clone());
    }
    defaults.get(property).cloned()
}

/// Writes rendered output to stdout.
fn emit(text: &str) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    if stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()).is_err() {
        return ExitCode::from(RENDER_EXIT);
    }
    ExitCode::SUCCESS
}

/// Writes an error to stderr and returns `code`.
fn fail(code: u8, message: &str) -> ExitCode {
    let _ = writeln!(std::io::stderr(), "stub-ops-manifest: {message}");
    ExitCode::from(code)
}
