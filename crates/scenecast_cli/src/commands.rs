//! CLI command implementations.

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use scenecast_core::{PreflightReport, preflight, strip_code_fences};
use serde_json::{Value, json};
use std::path::Path;
use std::time::{Duration, Instant};

/// Scene submitted when no file is given
pub const HELLO_SCENE: &str = r#"from manim import *

class ConceptScene(Scene):
    def construct(self):
        text = Text("Hello, World!", font_size=72)
        self.play(Write(text))
        self.wait(1)
"#;

/// POST a scene to the worker and report what came back.
pub async fn smoke(url: &str, token: &str, file: Option<&Path>, timeout_secs: u64) -> Result<()> {
    let code = load_script(file).await?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .wrap_err("failed to build HTTP client")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Rendering via {url}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let started = Instant::now();
    let sent = client
        .post(url)
        .bearer_auth(token)
        .json(&json!({ "code": code }))
        .send()
        .await;
    spinner.finish_and_clear();

    let response = sent.map_err(|err| eyre!(transport_failure(&err, url, timeout_secs)))?;
    let status = response.status();
    let text = response.text().await.wrap_err("failed to read response body")?;
    let body = parse_body(&text);

    println!("Status Code: {}", status.as_u16());
    println!("Response: {}", serde_json::to_string_pretty(&body)?);
    println!("Elapsed: {:.1}s", started.elapsed().as_secs_f64());

    if !status.is_success() {
        bail!("render failed with status {}", status.as_u16());
    }
    match video_url(&body) {
        Some(video) => {
            println!("{} Video URL: {video}", style("✓").green().bold());
            Ok(())
        }
        None => bail!("response did not contain a videoUrl"),
    }
}

/// Run the local preflight on a script file.
pub fn check(file: &Path, strip_fences: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    let report = check_source(&raw, strip_fences);

    match &report.scene {
        Some(scene) => println!("Scene: {}", style(scene).cyan()),
        None => println!("Scene: {}", style("none").dim()),
    }
    if report.is_ok() {
        println!("{} {} looks renderable", style("✓").green().bold(), file.display());
        return Ok(());
    }
    for issue in &report.issues {
        println!("  {} {issue}", style("✗").red());
    }
    bail!("{} issue(s) found in {}", report.issues.len(), file.display())
}

fn check_source(raw: &str, strip_fences: bool) -> PreflightReport {
    if strip_fences {
        preflight(&strip_code_fences(raw))
    } else {
        preflight(raw)
    }
}

async fn load_script(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => Ok(HELLO_SCENE.to_string()),
    }
}

// Non-JSON bodies (proxy error pages) are shown verbatim.
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn video_url(body: &Value) -> Option<&str> {
    body.get("videoUrl").and_then(Value::as_str)
}

fn transport_failure(err: &reqwest::Error, url: &str, timeout_secs: u64) -> String {
    if err.is_timeout() {
        format!("request timed out after {timeout_secs}s (the first render after a cold start can be slow)")
    } else if err.is_connect() {
        format!("could not connect to {url}; make sure the worker is running")
    } else {
        format!("request to {url} failed: {err}")
    }
}
