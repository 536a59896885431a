use gridchart::api::{BarChartLayout, BarRect, ChartTheme, compute_layout, paint};
use gridchart::core::{ChartSpec, ParsedChartData};
use gridchart::render::NullRenderer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
struct CliArgs {
    fixture: PathBuf,
    output: Option<PathBuf>,
    theme: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFixture {
    width: f64,
    height: f64,
    #[serde(default)]
    theme: Option<String>,
    spec: ChartSpec,
    data: ParsedChartData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOutput {
    theme: String,
    layout: BarChartLayout,
    bars: Vec<BarRect>,
    line_count: usize,
    rect_count: usize,
    text_count: usize,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let _ = gridchart::telemetry::init_tracing_with_filter("warn");
    let raw = fs::read_to_string(&args.fixture)
        .map_err(|err| format!("failed to read `{}`: {err}", args.fixture.display()))?;
    let fixture: SnapshotFixture =
        serde_json::from_str(&raw).map_err(|err| format!("invalid fixture json: {err}"))?;
    fixture
        .data
        .validate()
        .map_err(|err| format!("invalid fixture data: {err}"))?;

    let theme_name = args
        .theme
        .or(fixture.theme)
        .unwrap_or_else(|| "light".to_owned());
    let theme = ChartTheme::find(&theme_name);

    let layout = compute_layout(
        fixture.width,
        fixture.height,
        &fixture.spec,
        &fixture.data,
        &theme,
    );
    let mut renderer = NullRenderer::default();
    let bars = paint(&mut renderer, &fixture.data, &fixture.spec, &layout, &theme)
        .map_err(|err| format!("failed to paint chart: {err}"))?;

    let output = SnapshotOutput {
        theme: theme.name.clone(),
        layout,
        bars,
        line_count: renderer.last_line_count,
        rect_count: renderer.last_rect_count,
        text_count: renderer.last_text_count,
    };
    let serialized = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("failed to serialize snapshot: {err}"))?;

    match args.output {
        Some(path) => fs::write(&path, format!("{serialized}\n"))
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?,
        None => println!("{serialized}"),
    }
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut fixture: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut theme: Option<String> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fixture" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --fixture".to_owned())?;
                fixture = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output = Some(PathBuf::from(value));
            }
            "--theme" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --theme".to_owned())?;
                theme = Some(value);
            }
            "-h" | "--help" => {
                println!(
                    "Usage: cargo run --bin bar_chart_snapshot -- --fixture <path> [--output <path>] [--theme <light|dark>]"
                );
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument `{arg}`"));
            }
        }
    }

    let fixture = fixture.ok_or_else(|| "missing required --fixture <path>".to_owned())?;
    Ok(CliArgs {
        fixture,
        output,
        theme,
    })
}
