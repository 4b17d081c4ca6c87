//! Prediction service: immutable state built once at startup.
//!
//! [`Predictor`] bundles the loaded model, the category vocabularies,
//! and the fixed feature schema into one value. The startup routine
//! either produces a fully-built `Predictor` or fails with a
//! [`PanenError::StartupLoad`]; request handlers only ever see the
//! published immutable value behind an `Arc`, so no request can observe
//! a partially-initialized state and steady-state serving needs no
//! locks.

use std::collections::HashMap;
use std::path::Path;

use crate::encode::{encode_batch, LandRecord, FEATURE_COUNT};
use crate::error::{PanenError, Result};
use crate::model::GbtModel;
use crate::vocab::{build_vocabularies, CategoryVocabulary, ReferenceDataset, CATEGORICAL_COLS};

/// Loaded model plus preprocessing tables, read-only after startup.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: GbtModel,
    vocabularies: HashMap<String, CategoryVocabulary>,
}

impl Predictor {
    /// Build a predictor from a model artifact and a reference CSV.
    ///
    /// The reference dataset is read once, only to factorize the
    /// categorical columns; it is never used for inference.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::StartupLoad`] if either input cannot be
    /// loaded or the model's feature count does not match the serving
    /// schema.
    pub fn load(model_path: &Path, dataset_path: &Path) -> Result<Self> {
        let model = GbtModel::load(model_path)?;
        let dataset = ReferenceDataset::from_csv_path(dataset_path)?;
        Self::from_parts(model, &dataset)
    }

    /// Assemble a predictor from already-loaded parts.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::StartupLoad`] if the model's feature count
    /// does not match [`FEATURE_COUNT`].
    pub fn from_parts(model: GbtModel, dataset: &ReferenceDataset) -> Result<Self> {
        if model.n_features() != FEATURE_COUNT {
            return Err(PanenError::StartupLoad {
                reason: format!(
                    "model expects {} features but the serving schema has {FEATURE_COUNT}",
                    model.n_features()
                ),
            });
        }
        let vocabularies = build_vocabularies(dataset, &CATEGORICAL_COLS);
        Ok(Self {
            model,
            vocabularies,
        })
    }

    /// Encode and score a batch, rounding each prediction to 3 decimal
    /// places. Output order matches input order; an empty batch yields
    /// an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::Inference`] if the model rejects the
    /// assembled matrix; the whole batch fails, no partial output.
    pub fn predict(&self, records: &[LandRecord]) -> Result<Vec<f32>> {
        let matrix = encode_batch(records, &self.vocabularies);
        let raw = self.model.predict_batch(matrix.iter().map(|row| row.as_slice()))?;
        Ok(raw.into_iter().map(round3).collect())
    }

    /// Build a small deterministic predictor for demos and tests, in
    /// memory, without touching the filesystem.
    ///
    /// The ensemble splits on NDVI (threshold 0.5, leaves -0.5 / 0.5)
    /// and on the encoded soil type (threshold 0.5, leaves 0.1 / 0.2)
    /// over a base score of 4.0; the reference dataset carries two
    /// categories per column.
    ///
    /// # Errors
    ///
    /// Returns an error if the demo parts fail validation, which would
    /// indicate a bug in this crate.
    pub fn demo() -> Result<Self> {
        Self::from_parts(demo_model()?, &demo_dataset())
    }

    /// Vocabulary for one categorical column, if built.
    #[must_use]
    pub fn vocabulary(&self, column: &str) -> Option<&CategoryVocabulary> {
        self.vocabularies.get(column)
    }

    /// Number of trees in the loaded ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.model.tree_count()
    }
}

/// Round to 3 decimal places, the serving contract for predictions.
#[must_use]
pub fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}

/// Reference dataset backing [`Predictor::demo`]: all four categorical
/// columns, two categories each.
fn demo_dataset() -> ReferenceDataset {
    let col = |name: &str, values: [&str; 3]| {
        (
            name.to_string(),
            values.iter().map(|v| (*v).to_string()).collect::<Vec<_>>(),
        )
    };
    ReferenceDataset::from_columns(vec![
        col("penanggung_jawab", ["Tim A", "Tim B", "Tim A"]),
        col("jenis_tanah", ["Alluvial", "Latosol", "Alluvial"]),
        col("sistem_irigasi", ["Teknis", "Tanpa Irigasi", "Teknis"]),
        col("lahan_kabupaten", ["Siak", "Kampar", "Siak"]),
    ])
}

/// Deterministic ensemble backing [`Predictor::demo`].
fn demo_model() -> Result<GbtModel> {
    use crate::model::{RegressionTree, TreeNode};

    GbtModel::new(
        FEATURE_COUNT,
        4.0,
        vec![
            RegressionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 0.5,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { value: -0.5 },
                    TreeNode::Leaf { value: 0.5 },
                ],
            },
            RegressionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 11,
                        threshold: 0.5,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { value: 0.1 },
                    TreeNode::Leaf { value: 0.2 },
                ],
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::sample_record;

    fn demo_predictor() -> Predictor {
        Predictor::demo().expect("demo predictor builds")
    }

    #[test]
    fn test_predict_known_values() {
        let predictor = demo_predictor();
        let mut record = sample_record();

        // NDVI 0.71 >= 0.5 -> +0.5; Latosol encodes to 1 -> +0.2
        record.jenis_tanah = "Latosol".to_string();
        let out = predictor.predict(&[record.clone()]).expect("test");
        assert_eq!(out.len(), 1);
        assert!((out[0] - 4.7).abs() < 1e-6);

        // Alluvial encodes to 0 -> +0.1
        record.jenis_tanah = "Alluvial".to_string();
        let out = predictor.predict(&[record]).expect("test");
        assert!((out[0] - 4.6).abs() < 1e-6);
    }

    #[test]
    fn test_unseen_category_predicts_like_code_zero() {
        let predictor = demo_predictor();
        let mut unseen = sample_record();
        unseen.jenis_tanah = "Peat".to_string();
        let mut first = sample_record();
        first.jenis_tanah = "Alluvial".to_string();

        let out = predictor.predict(&[unseen, first]).expect("test");
        assert!((out[0] - out[1]).abs() < 1e-6);
    }

    #[test]
    fn test_empty_batch_yields_empty_predictions() {
        let predictor = demo_predictor();
        let out = predictor.predict(&[]).expect("test");
        assert!(out.is_empty());
    }

    #[test]
    fn test_batch_order_matches_input() {
        let predictor = demo_predictor();
        let mut low = sample_record();
        low.ndvi = 0.1; // below the NDVI split -> lower prediction
        let high = sample_record();

        let out = predictor.predict(&[low, high]).expect("test");
        assert_eq!(out.len(), 2);
        assert!(out[0] < out[1]);
    }

    #[test]
    fn test_feature_count_mismatch_fails_startup() {
        let model = crate::model::GbtModel::new(
            2,
            0.0,
            vec![crate::model::RegressionTree {
                nodes: vec![crate::model::TreeNode::Leaf { value: 1.0 }],
            }],
        )
        .expect("test");
        let err = Predictor::from_parts(model, &demo_dataset()).expect_err("must fail");
        match err {
            PanenError::StartupLoad { reason } => {
                assert!(reason.contains("serving schema"));
            }
            other => panic!("expected StartupLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_determinism_across_rebuilds() {
        let a = Predictor::demo().expect("test");
        let b = Predictor::demo().expect("test");
        let batch = vec![sample_record(), sample_record()];
        assert_eq!(a.predict(&batch).expect("test"), b.predict(&batch).expect("test"));
    }

    #[test]
    fn test_round3() {
        assert!((round3(4.123_456) - 4.123).abs() < 1e-6);
        assert!((round3(4.123_6) - 4.124).abs() < 1e-6);
        assert!((round3(-1.000_4) - (-1.0)).abs() < 1e-6);
        assert!((round3(0.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_from_disk() {
        use std::io::Write;

        let dir = tempfile::tempdir().expect("test");
        let model_path = dir.path().join("xgb_model_palm.json");
        let model = demo_model().expect("test");
        std::fs::write(&model_path, serde_json::to_vec(&model).expect("test")).expect("test");

        let csv_path = dir.path().join("palm_productivity_timeseries.csv");
        let mut csv = std::fs::File::create(&csv_path).expect("test");
        writeln!(csv, "jenis_tanah,sistem_irigasi").expect("test");
        writeln!(csv, "Alluvial,Teknis").expect("test");
        writeln!(csv, "Latosol,Tanpa Irigasi").expect("test");
        drop(csv);

        let predictor = Predictor::load(&model_path, &csv_path).expect("test");
        assert_eq!(predictor.tree_count(), 2);
        let soil = predictor.vocabulary("jenis_tanah").expect("test");
        assert_eq!(soil.code("Latosol"), Some(1));
        // Column absent from the CSV: injected default only
        let team = predictor.vocabulary("penanggung_jawab").expect("test");
        assert_eq!(team.code("Tim A"), Some(0));
        assert_eq!(team.len(), 1);
    }
}
