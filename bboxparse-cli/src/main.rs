use bboxparse::lowlevel::row_stride;
use bboxparse::{DetectConfig, Detection, Detector, PredictionView};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode and suppress a raw detection tensor (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the decode and suppression stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TensorFormat {
    /// Raw little-endian `f32` values.
    #[default]
    F32le,
    /// A JSON array, flat or one inner array per cell.
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TensorJson {
    Flat(Vec<f32>),
    Rows(Vec<Vec<f32>>),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    /// Zero derives the count from the tensor length.
    grid_cell_count: usize,
    network_width: u32,
    network_height: u32,
    num_classes: usize,
    class_threshold: f32,
    class_thresholds: Option<Vec<f32>>,
    objectness_gate: f32,
    iou_threshold: f32,
    parallel: bool,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            grid_cell_count: 0,
            network_width: cfg.network_width,
            network_height: cfg.network_height,
            num_classes: cfg.num_classes,
            class_threshold: cfg.class_thresholds[0],
            class_thresholds: None,
            objectness_gate: cfg.objectness_gate,
            iou_threshold: cfg.iou_threshold,
            parallel: cfg.parallel,
        }
    }
}

impl From<DetectConfigJson> for DetectConfig {
    fn from(value: DetectConfigJson) -> Self {
        let class_thresholds = value
            .class_thresholds
            .unwrap_or_else(|| vec![value.class_threshold; value.num_classes]);
        Self {
            grid_cell_count: value.grid_cell_count,
            network_width: value.network_width,
            network_height: value.network_height,
            num_classes: value.num_classes,
            class_thresholds,
            objectness_gate: value.objectness_gate,
            iou_threshold: value.iou_threshold,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    tensor_format: TensorFormat,
    output_path: Option<String>,
    labels: Vec<String>,
    detect: DetectConfigJson,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    class_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    confidence: f32,
}

impl DetectionRecord {
    fn new(det: Detection, labels: &[String]) -> Self {
        Self {
            left: det.bbox.left,
            top: det.bbox.top,
            width: det.bbox.width,
            height: det.bbox.height,
            class_id: det.class_id,
            label: labels.get(det.class_id).cloned(),
            confidence: det.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    detections: Vec<DetectionRecord>,
}

/// Joins per-cell rows, rejecting any row whose width is not `stride`.
fn flatten_rows(rows: Vec<Vec<f32>>, stride: usize) -> Result<Vec<f32>, String> {
    if let Some((cell, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != stride) {
        return Err(format!(
            "tensor row {cell} has {} values, expected {stride}",
            row.len()
        ));
    }
    Ok(rows.concat())
}

fn load_tensor(
    path: &str,
    format: &TensorFormat,
    num_classes: usize,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    match format {
        TensorFormat::F32le => {
            let bytes = fs::read(path)?;
            if bytes.len() % 4 != 0 {
                return Err(format!("{path}: length {} is not a multiple of 4", bytes.len()).into());
            }
            let mut values = Vec::with_capacity(bytes.len() / 4);
            for chunk in bytes.chunks_exact(4) {
                values.push(f32::from_le_bytes(chunk.try_into()?));
            }
            Ok(values)
        }
        TensorFormat::Json => {
            let text = fs::read_to_string(path)?;
            Ok(match serde_json::from_str(&text)? {
                TensorJson::Flat(values) => values,
                TensorJson::Rows(rows) => flatten_rows(rows, row_stride(num_classes))?,
            })
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("bboxparse=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let tensor = load_tensor(
        &config.tensor_path,
        &config.tensor_format,
        config.detect.num_classes,
    )?;
    info!(values = tensor.len(), path = %config.tensor_path, "loaded tensor");

    let mut detect_cfg = DetectConfig::from(config.detect);
    let view = if detect_cfg.grid_cell_count == 0 {
        let view = PredictionView::from_rows(&tensor, detect_cfg.num_classes)?;
        detect_cfg.grid_cell_count = view.cells();
        view
    } else {
        PredictionView::new(&tensor, detect_cfg.grid_cell_count, detect_cfg.num_classes)?
    };

    let detector = Detector::new(detect_cfg)?;
    let detections = detector.detect_view(view)?;
    info!(count = detections.len(), "detections");

    let records: Vec<DetectionRecord> = detections
        .into_iter()
        .map(|det| DetectionRecord::new(det, &config.labels))
        .collect();
    let output = Output {
        count: records.len(),
        detections: records,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
