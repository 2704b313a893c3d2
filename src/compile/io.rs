use crate::chart::spec::ChartSpec;
use crate::chart::template::render_base_chart;
use crate::compile::pipeline::{CompileOutput, Compiler};
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use anyhow::Context;
use rayon::prelude::*;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = ".vl.json";

fn read_json(path: &Path) -> ChartmarkResult<Value> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| ChartmarkError::serde(format!("parse '{}': {e}", path.display())))
}

/// Read and compile the annotation document at `path`.
#[tracing::instrument(skip(compiler), fields(path = %path.display()))]
pub fn compile_path(path: &Path, compiler: &Compiler) -> ChartmarkResult<CompileOutput> {
    let value = read_json(path)?;
    compiler.compile_value(&value)
}

/// Render only the base chart of the file at `path`: either a bare chart or a document's `chart`.
pub fn render_chart_path(path: &Path) -> ChartmarkResult<ChartIr> {
    let value = read_json(path)?;
    let (chart, at) = match value.get("chart") {
        Some(chart) => (chart, "$.chart"),
        None => (&value, "$"),
    };
    let spec = ChartSpec::from_json(chart).map_err(|e| e.at(at))?;
    render_base_chart(&spec)
}

/// Write `chart` as pretty JSON, creating parent directories as needed.
pub fn write_chart(path: &Path, chart: &ChartIr) -> ChartmarkResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(&chart.to_json())
        .map_err(|e| ChartmarkError::serde(format!("serialize chart: {e}")))?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

/// A document that compiled and was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchEntry {
    /// Input document.
    pub input: PathBuf,
    /// Written chart.
    pub output: PathBuf,
    /// Number of techniques skipped while compiling it.
    pub skipped: usize,
}

/// A document that could not be compiled or written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFailure {
    /// Input document.
    pub input: PathBuf,
    /// Rendered error.
    pub error: String,
}

/// Outcome of [`batch_compile`], in input-name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Documents written.
    pub written: Vec<BatchEntry>,
    /// Documents that failed.
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether every document was written.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `*.json` inputs of `in_dir`, sorted by name; earlier outputs (`*.vl.json`) are ignored.
fn batch_inputs(in_dir: &Path) -> ChartmarkResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(in_dir)
        .with_context(|| format!("read input directory '{}'", in_dir.display()))?;
    let mut inputs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("read input directory '{}'", in_dir.display()))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.ends_with(".json") && !name.ends_with(OUTPUT_SUFFIX) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

fn compile_one(input: &Path, out_dir: &Path, compiler: &Compiler) -> Result<BatchEntry, BatchFailure> {
    let output = output_path(out_dir, input);
    let result = compile_path(input, compiler).and_then(|out| {
        write_chart(&output, &out.chart)?;
        Ok(out.skipped.len())
    });
    match result {
        Ok(skipped) => Ok(BatchEntry {
            input: input.to_path_buf(),
            output,
            skipped,
        }),
        Err(e) => {
            tracing::warn!(input = %input.display(), error = %e, "batch document failed");
            Err(BatchFailure {
                input: input.to_path_buf(),
                error: e.to_string(),
            })
        }
    }
}

/// Compile every `*.json` document in `in_dir` into `out_dir/<stem>.vl.json`.
///
/// A failing document is recorded in the report and does not stop the batch. With `parallel`
/// the documents are compiled on the rayon pool; the report keeps name order either way.
#[tracing::instrument(skip(compiler), fields(in_dir = %in_dir.display(), out_dir = %out_dir.display()))]
pub fn batch_compile(
    in_dir: &Path,
    out_dir: &Path,
    compiler: &Compiler,
    parallel: bool,
) -> ChartmarkResult<BatchReport> {
    let inputs = batch_inputs(in_dir)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;

    let results: Vec<Result<BatchEntry, BatchFailure>> = if parallel {
        inputs
            .par_iter()
            .map(|input| compile_one(input, out_dir, compiler))
            .collect()
    } else {
        inputs
            .iter()
            .map(|input| compile_one(input, out_dir, compiler))
            .collect()
    };

    let mut report = BatchReport::default();
    for r in results {
        match r {
            Ok(entry) => report.written.push(entry),
            Err(failure) => report.failed.push(failure),
        }
    }
    tracing::debug!(
        written = report.written.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/io.rs"]
mod tests;
