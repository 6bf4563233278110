use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use gridcast_distribute::DistributeError;
use gridcast_stats as stats;

use crate::check_cmd;
use crate::cli::RunArgs;
use crate::config;

/// JSON document written by `run`.
#[derive(Debug, Serialize)]
struct RunOutput {
    /// `[rows, cols]` of every raster.
    shape: [usize; 2],
    x: Vec<f64>,
    y: Vec<f64>,
    steps: Vec<StepOutput>,
}

#[derive(Debug, Serialize)]
struct StepOutput {
    label: String,
    /// Distributed fields keyed by variable name; kriging adds
    /// `<name>_variance`.
    fields: BTreeMap<String, FieldOutput>,
}

/// Summary of one raster. Statistics cover non-null cells only; `NaN`
/// cells serialise as `null`.
#[derive(Debug, Serialize)]
struct FieldOutput {
    mean: Option<f64>,
    std: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    n_null: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Vec<f64>>>,
}

impl FieldOutput {
    fn summarize(raster: &Array2<f64>, with_values: bool) -> Self {
        let valid: Vec<f64> = raster.iter().copied().filter(|v| !v.is_nan()).collect();
        let n_null = raster.len() - valid.len();
        let (mean, std, min, max) = if valid.is_empty() {
            (None, None, None, None)
        } else {
            (
                Some(stats::mean(&valid)),
                Some(stats::variance(&valid).sqrt()),
                valid.iter().copied().reduce(f64::min),
                valid.iter().copied().reduce(f64::max),
            )
        };
        Self {
            mean,
            std,
            min,
            max,
            n_null,
            values: with_values.then(|| raster.outer_iter().map(|row| row.to_vec()).collect()),
        }
    }
}

/// Distribute every configured step and write the JSON output.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("run").entered();
    let config = config::load(&args.config)?;

    let output = args
        .output
        .or_else(|| config.output.path.clone())
        .ok_or_else(|| anyhow!("no output path: set [output].path in config or use --output"))?;
    if config.steps.is_empty() {
        bail!("no steps configured: add at least one [[steps]] table");
    }

    let mut project = check_cmd::initialize(&config)?;
    check_cmd::check_steps(&config)?;
    let with_values = config.output.rasters;

    let mut steps = Vec::with_capacity(config.steps.len());
    let mut skipped = 0usize;
    for step in &config.steps {
        let _step = info_span!("step", label = %step.label).entered();

        let mut fields = BTreeMap::new();
        for d in project.distributions.iter_mut() {
            let Some(row) = step.values.get(d.name()) else {
                debug!(variable = d.name(), "no values for this step");
                continue;
            };
            let name = d.name().to_string();
            let (ids, values): (Vec<&str>, Vec<f64>) =
                row.iter().map(|(id, v)| (id.as_str(), *v)).unzip();

            let field = match d.distribute_by_id(&ids, &values) {
                Ok(out) => FieldOutput::summarize(out, with_values),
                Err(DistributeError::AllNull { .. }) => {
                    warn!(variable = %name, "every station is null, step skipped");
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("failed to distribute {name:?} at step {:?}", step.label)
                    });
                }
            };
            fields.insert(name, field);
            if let Some(var) = d.variance() {
                fields.insert(d.variance_name(), FieldOutput::summarize(var, with_values));
            }
        }
        steps.push(StepOutput {
            label: step.label.clone(),
            fields,
        });
    }
    info!(n_steps = steps.len(), skipped, "distribution finished");

    let (rows, cols) = project.grid.shape();
    let doc = RunOutput {
        shape: [rows, cols],
        x: project.grid.x_axis().to_vec(),
        y: project.grid.y_axis().to_vec(),
        steps,
    };
    let json = serde_json::to_string_pretty(&doc).context("failed to serialise output")?;
    std::fs::write(&output, json)
        .with_context(|| format!("failed to write output: {}", output.display()))?;
    info!(path = %output.display(), "output written");

    Ok(())
}
