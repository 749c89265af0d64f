//! ONNX graph execution through tract

use crate::InferenceError;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info};

/// An optimized, runnable ONNX graph taking a single `[1, n]` f32 input
pub(crate) struct OnnxGraph {
    plan: TypedRunnableModel<TypedModel>,
    input_width: usize,
}

impl OnnxGraph {
    /// Load and optimize a graph for `input_width` features per row
    pub(crate) fn load(path: &Path, input_width: usize) -> Result<Self, InferenceError> {
        let load_err = |e: TractError| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact([1, input_width]).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        info!(path = %path.display(), input_width, "ONNX model loaded");
        Ok(Self { plan, input_width })
    }

    /// Run one row, returning every graph output
    pub(crate) fn run(&self, values: &[f64]) -> Result<TVec<TValue>, InferenceError> {
        if values.len() != self.input_width {
            return Err(InferenceError::InferenceFailed(format!(
                "expected {} input values, got {}",
                self.input_width,
                values.len()
            )));
        }

        let row: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_shape(&[1, self.input_width], &row)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let start = std::time::Instant::now();
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        debug!(latency_us = start.elapsed().as_micros() as u64, "ONNX inference completed");

        Ok(outputs)
    }
}

/// Read output `index` as a flat f64 vector
pub(crate) fn output_f64(outputs: &TVec<TValue>, index: usize) -> Result<Vec<f64>, InferenceError> {
    let tensor = outputs
        .get(index)
        .ok_or_else(|| InferenceError::InvalidOutput(format!("graph has no output {}", index)))?;
    let cast = tensor
        .cast_to::<f64>()
        .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
    let values = cast
        .as_slice::<f64>()
        .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
    Ok(values.to_vec())
}

/// Read output `index` as a flat i64 vector
pub(crate) fn output_i64(outputs: &TVec<TValue>, index: usize) -> Result<Vec<i64>, InferenceError> {
    let tensor = outputs
        .get(index)
        .ok_or_else(|| InferenceError::InvalidOutput(format!("graph has no output {}", index)))?;
    let cast = tensor
        .cast_to::<i64>()
        .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
    let values = cast
        .as_slice::<i64>()
        .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
    Ok(values.to_vec())
}
