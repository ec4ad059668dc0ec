use tether_core::{BridgeParams, BridgeRun, NoiseGenerator, StepRuleKind, TerminalMode, CORRECTION_WINDOW, F};
use tether_sampler::Ensemble;
use anyhow::Context;
use arrow::array::{Array, BooleanArray, Float64Array, StringArray, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::{Serialize, Deserialize};
use std::fs::File;
use std::path::{Component, Path};
use std::process::Command;
use std::sync::Arc;
use uuid::Uuid;

pub mod cli;
pub use cli::*;

/// Run manifest for complete reproducibility
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub label: Option<String>,
    pub seed: Option<u64>,
    pub rule: String,         // "drift_blend" | "projection"
    pub terminal: String,     // "snap" | "redistribute"
    pub target: [F; 2],
    pub delta: F,
    pub n_steps: u32,
    pub n_paths: usize,
    pub correction_window: usize,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

/// Parquet writer for bridge points
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    schema: Arc<Schema>,
}

/// Single row in the point table
#[derive(Clone, Debug, PartialEq)]
pub struct PointRow {
    pub run_id: String,
    pub path_id: u64,
    pub step: u32,
    pub x: F,
    pub y: F,
    pub approximate: bool,
}

/// One line of a batch parameter file.
#[derive(Clone, Debug, Deserialize)]
pub struct BatchRow {
    pub label: String,
    pub target_x: F,
    pub target_y: F,
    pub delta: F,
    pub n_steps: i64,
    pub seed: Option<u64>,
    #[serde(default)]
    pub rule: Option<StepRuleKind>,
    #[serde(default)]
    pub terminal: Option<TerminalMode>,
}

impl BatchRow {
    /// Parameters for the row at `index` (0-based, in file order).
    ///
    /// An empty seed column resolves to `derive_seed(fallback_seed, index)`, so
    /// the returned params always carry the seed the run will use.
    pub fn to_params(&self, index: usize, fallback_seed: u64) -> tether_core::BridgeResult<BridgeParams> {
        let seed = self
            .seed
            .unwrap_or_else(|| NoiseGenerator::derive_seed(fallback_seed, index as u64));
        let params = BridgeParams::from_signed((self.target_x, self.target_y), self.delta, self.n_steps, Some(seed))?;
        Ok(params
            .with_rule(self.rule.unwrap_or_default())
            .with_terminal(self.terminal.unwrap_or_default()))
    }
}

/// True when `label` can be used as a file stem inside the output directory.
pub fn is_plain_label(label: &str) -> bool {
    if label.is_empty() || label.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(label).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Read every row of a batch CSV. Malformed lines are an error for the whole file.
pub fn read_batch_rows(path: &Path) -> anyhow::Result<Vec<BatchRow>> {
    tracing::info!("Loading batch parameters from {:?}", path);

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening batch file {}", path.display()))?;
    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: BatchRow = result.with_context(|| format!("parsing batch row {}", line + 1))?;
        rows.push(row);
    }

    tracing::info!("Loaded {} batch rows", rows.len());
    Ok(rows)
}

impl RunManifest {
    pub fn new(params: &BridgeParams, label: Option<&str>) -> Self {
        let run_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339();
        let rule = match params.rule {
            StepRuleKind::DriftBlend => "drift_blend",
            StepRuleKind::Projection => "projection",
        };
        let terminal = match params.terminal {
            TerminalMode::Snap => "snap",
            TerminalMode::Redistribute => "redistribute",
        };

        Self {
            run_id,
            timestamp,
            label: label.map(str::to_string),
            seed: params.seed,
            rule: rule.to_string(),
            terminal: terminal.to_string(),
            target: [params.target.x(), params.target.y()],
            delta: params.delta,
            n_steps: params.n_steps,
            n_paths: 0,  // Will be set when writing
            correction_window: CORRECTION_WINDOW,
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

pub fn point_schema() -> Schema {
    Schema::new(vec![
        Field::new("run_id", DataType::Utf8, false),
        Field::new("path_id", DataType::UInt64, false),
        Field::new("step", DataType::UInt32, false),
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("approximate", DataType::Boolean, false),
    ])
}

/// Flatten runs into one row per point.
pub fn point_rows<'a>(run_id: &str, runs: impl IntoIterator<Item = &'a BridgeRun>) -> Vec<PointRow> {
    let mut rows = Vec::new();
    for (path_id, run) in runs.into_iter().enumerate() {
        let trajectory = &run.trajectory;
        for (step, p) in trajectory.iter().enumerate() {
            rows.push(PointRow {
                run_id: run_id.to_string(),
                path_id: path_id as u64,
                step: step as u32,
                x: p.x(),
                y: p.y(),
                approximate: trajectory.is_approximate(step),
            });
        }
    }
    rows
}

impl ParquetWriter {
    pub fn new(file_path: &Path) -> anyhow::Result<Self> {
        let file = File::create(file_path)
            .with_context(|| format!("creating {}", file_path.display()))?;
        let schema = Arc::new(point_schema());
        let writer = ArrowWriter::try_new(file, schema.clone(), None)?;

        Ok(Self { writer, schema })
    }

    pub fn write_rows(&mut self, rows: &[PointRow]) -> anyhow::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(rows.iter().map(|r| r.run_id.clone()).collect::<Vec<_>>())),
            Arc::new(UInt64Array::from(rows.iter().map(|r| r.path_id).collect::<Vec<_>>())),
            Arc::new(UInt32Array::from(rows.iter().map(|r| r.step).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.x).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.y).collect::<Vec<_>>())),
            Arc::new(BooleanArray::from(rows.iter().map(|r| r.approximate).collect::<Vec<_>>())),
        ];

        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        self.writer.write(&batch)?;
        Ok(())
    }

    pub fn close(self) -> anyhow::Result<()> {
        self.writer.close()?;
        Ok(())
    }
}

/// Write runs to Parquet and the manifest next to it (`<out>.manifest.json`).
pub fn write_runs_with_manifest<'a>(
    runs: impl IntoIterator<Item = &'a BridgeRun>,
    manifest: &RunManifest,
    parquet_path: &Path,
) -> anyhow::Result<()> {
    let rows = point_rows(&manifest.run_id, runs);
    let n_paths = rows.iter().map(|r| r.path_id).max().map_or(0, |m| m as usize + 1);

    let mut writer = ParquetWriter::new(parquet_path)?;
    writer.write_rows(&rows)?;
    writer.close()?;

    let manifest_path = parquet_path.with_extension("manifest.json");
    let mut manifest_with_paths = manifest.clone();
    manifest_with_paths.n_paths = n_paths;
    manifest_with_paths.save_to_file(&manifest_path)?;

    tracing::info!(paths = n_paths, rows = rows.len(), "wrote {}", parquet_path.display());
    tracing::info!("wrote manifest to {}", manifest_path.display());

    Ok(())
}

pub fn write_ensemble_with_manifest(
    ensemble: &Ensemble,
    manifest: &RunManifest,
    parquet_path: &Path,
) -> anyhow::Result<()> {
    write_runs_with_manifest(&ensemble.runs, manifest, parquet_path)
}

/// Trimmed stdout of `program args`, or `None` if it cannot be run or exits non-zero.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string()).filter(|t| !t.is_empty())
}

fn get_git_commit() -> Option<String> {
    command_output("git", &["rev-parse", "HEAD"])
}

fn get_rust_version() -> String {
    command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string())
}
