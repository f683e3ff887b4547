//! Model adapter - ONNX Runtime integration
//!
//! Loads the serialized classifier once at startup and keeps it behind
//! the `Classifier` trait so the pipeline can be exercised with a
//! scripted stub and no artifact on disk.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Feature matrix handed to the classifier: one row per traffic sample
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.len()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }
}

/// Engine status for the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

/// Inference engines produce one class id per input row, in input order
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureMatrix) -> AppResult<Vec<i64>>;
    fn status(&self) -> EngineStatus;
}

/// The production engine: a multi-class classifier exported to ONNX
#[derive(Debug)]
pub struct OnnxClassifier {
    session: RwLock<Session>,
    model_path: String,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl OnnxClassifier {
    /// Load the ONNX artifact from disk. There is no fallback model;
    /// callers treat a failure here as fatal to the whole service.
    pub fn load(model_path: &str) -> AppResult<Self> {
        tracing::info!("Loading ONNX model from: {}", model_path);

        if !std::path::Path::new(model_path).exists() {
            return Err(AppError::ModelLoad(format!("model not found: {}", model_path)));
        }

        let session = Session::builder()
            .map_err(|e| AppError::ModelLoad(format!("failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::ModelLoad(format!("failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| AppError::ModelLoad(format!("failed to load model: {}", e)))?;

        tracing::info!("ONNX model loaded successfully");

        Ok(Self {
            session: RwLock::new(session),
            model_path: model_path.to_string(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureMatrix) -> AppResult<Vec<i64>> {
        let start_time = std::time::Instant::now();

        let n_rows = features.n_rows();
        let n_features = features.n_features();

        let mut input_data = Vec::with_capacity(n_rows * n_features);
        for row in &features.values {
            input_data.extend_from_slice(row);
        }

        let input_array = Array2::<f32>::from_shape_vec((n_rows, n_features), input_data)
            .map_err(|e| AppError::Prediction(format!("array error: {}", e)))?;

        let mut session_guard = self.session.write();
        let session = &mut *session_guard;

        // skl2onnx exports put the label tensor first
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| AppError::Prediction("model defines no output".to_string()))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| AppError::Prediction(format!("tensor error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| AppError::Prediction(format!("model rejected input: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| AppError::Prediction("no output produced".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<i64>()
            .map_err(|e| AppError::Prediction(format!("extract error: {}", e)))?;

        let labels = output_tensor.1;
        if labels.len() != n_rows {
            return Err(AppError::Prediction(format!(
                "expected {} labels, model produced {}",
                n_rows,
                labels.len()
            )));
        }

        self.latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Ok(labels.to_vec())
    }

    fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        };

        EngineStatus {
            model_loaded: true,
            model_name: self.model_path.clone(),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}
