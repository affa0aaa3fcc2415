//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::View;
use anyhow::Context;
use limelight_core::config::{WORKSPACE_CONFIG_DIR, user_config_path, workspace_config_path};
use limelight_core::view::{SvgBackend, SvgOptions};
use limelight_core::{LimeConfig, LimeResults, SaliencyResults};
use std::path::Path;
use tracing::info;

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Render {
            results,
            view,
            output,
            out,
        } => {
            let results = load_results(&results)?;
            let rendered = render(&results, view, output.as_deref())?;
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), ?view, "Wrote rendered view");
                }
                None => print!("{rendered}"),
            }
            Ok(())
        }
        Commands::Top { results, count } => {
            let results = load_results(&results)?;
            print!("{}", top_features(&results, count));
            Ok(())
        }
        Commands::Config { action } => handle_config(action, workspace),
    }
}

fn load_results(path: &Path) -> anyhow::Result<LimeResults> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file {}", path.display()))?;
    let results: SaliencyResults = serde_json::from_str(&text)
        .with_context(|| format!("Invalid results file {}", path.display()))?;
    Ok(LimeResults::new(results))
}

/// Pick the output to chart: the named one, or the only one present.
fn resolve_output<'a>(results: &'a LimeResults, output: Option<&'a str>) -> anyhow::Result<&'a str> {
    if let Some(name) = output {
        return Ok(name);
    }
    let names: Vec<&str> = results.map().keys().copied().collect();
    match names.as_slice() {
        [only] => Ok(*only),
        [] => anyhow::bail!("Results contain no outputs"),
        _ => anyhow::bail!(
            "Results contain {} outputs ({}); choose one with --output",
            names.len(),
            names.join(", ")
        ),
    }
}

fn render(results: &LimeResults, view: View, output: Option<&str>) -> anyhow::Result<String> {
    match view {
        View::Table => Ok(results.as_dataframe().to_string()),
        View::Html => Ok(format!("{}\n", results.as_html().render())),
        View::Svg => {
            let decision = resolve_output(results, output)?;
            let mut backend = SvgBackend::with_options(Vec::new(), SvgOptions::default());
            results.plot(decision, &mut backend)?;
            Ok(String::from_utf8(backend.into_inner())?)
        }
        View::Hover => {
            let decision = resolve_output(results, output)?;
            let charts = results.hover_charts();
            let chart = charts
                .get(decision)
                .ok_or_else(|| limelight_core::LimeError::UnknownOutput(decision.to_string()))?;
            Ok(chart.to_html()?)
        }
    }
}

fn top_features(results: &LimeResults, count: usize) -> String {
    let mut text = String::new();
    for (output, saliency) in results.map() {
        text.push_str(&format!("{output}:\n"));
        for pfi in saliency.top_features(count) {
            text.push_str(&format!(
                "  {:<24} {:>+10.4}  (confidence {:.2})\n",
                pfi.feature.name, pfi.score, pfi.confidence
            ));
        }
    }
    text
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(WORKSPACE_CONFIG_DIR);
            std::fs::create_dir_all(&config_dir)?;

            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&LimeConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = limelight_core::load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Path => {
            match user_config_path() {
                Some(path) => println!("user:      {}", path.display()),
                None => println!("user:      (no home directory)"),
            }
            println!("workspace: {}", workspace_config_path(workspace).display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limelight_core::view::render_svg;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TWO_OUTPUTS: &str = r#"{
        "saliencies": {
            "A": {"per_feature_importance": [
                {"feature": {"name": "x", "value": 1.0}, "score": 0.5, "confidence": 0.9}
            ]},
            "B": {"per_feature_importance": [
                {"feature": {"name": "x", "value": 1.0}, "score": -0.3, "confidence": 0.8},
                {"feature": {"name": "y", "value": true}, "score": 0.1, "confidence": 0.7}
            ]}
        }
    }"#;

    fn write_results(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("results.json");
        std::fs::write(&path, TWO_OUTPUTS).unwrap();
        path
    }

    #[test]
    fn test_render_table() {
        let dir = TempDir::new().unwrap();
        let results = load_results(&write_results(&dir)).unwrap();
        let table = render(&results, View::Table, None).unwrap();
        let header = table.lines().next().unwrap();
        assert!(header.starts_with("A_features"));
        assert!(header.ends_with("B_confidence"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn test_render_svg_requires_output_choice() {
        let dir = TempDir::new().unwrap();
        let results = load_results(&write_results(&dir)).unwrap();
        let err = render(&results, View::Svg, None).unwrap_err();
        assert!(err.to_string().contains("choose one with --output"));

        let svg = render(&results, View::Svg, Some("B")).unwrap();
        assert!(svg.contains("LIME explanation of B"));
        assert_eq!(svg, render_svg(&results.bar_chart("B").unwrap(), &SvgOptions::default()));
    }

    #[test]
    fn test_render_hover_unknown_output() {
        let dir = TempDir::new().unwrap();
        let results = load_results(&write_results(&dir)).unwrap();
        assert!(render(&results, View::Hover, Some("C")).is_err());
        let page = render(&results, View::Hover, Some("A")).unwrap();
        assert!(page.contains("Lime Feature Importances"));
    }

    #[test]
    fn test_render_command_writes_file() {
        let dir = TempDir::new().unwrap();
        let results = write_results(&dir);
        let out = dir.path().join("table.html");
        handle_command(
            Commands::Render {
                results,
                view: View::Html,
                output: None,
                out: Some(out.clone()),
            },
            dir.path(),
        )
        .unwrap();
        let html = std::fs::read_to_string(out).unwrap();
        assert!(html.contains("<th>B_score</th>"));
    }

    #[test]
    fn test_top_features() {
        let dir = TempDir::new().unwrap();
        let results = load_results(&write_results(&dir)).unwrap();
        let text = top_features(&results, 1);
        assert_eq!(
            text,
            "A:\n  x                           +0.5000  (confidence 0.90)\n\
             B:\n  x                           -0.3000  (confidence 0.80)\n"
        );
    }

    #[test]
    fn test_invalid_results_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_results(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid results file"));
    }

    #[test]
    fn test_config_init_then_show() {
        let dir = TempDir::new().unwrap();
        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            dir.path(),
        )
        .unwrap();
        let written = std::fs::read_to_string(workspace_config_path(dir.path())).unwrap();
        let parsed: LimeConfig = toml::from_str(&written).unwrap();
        assert_eq!(parsed, LimeConfig::default());

        let result = handle_command(
            Commands::Config {
                action: ConfigAction::Show,
            },
            dir.path(),
        );
        assert!(result.is_ok());
    }
}
