//! Feature assembly: typed input records to fixed-order feature vectors.
//!
//! Each [`LandRecord`] carries 10 numeric fields and 4 categorical text
//! fields. Encoding substitutes each categorical field with its integer
//! code from the column's [`CategoryVocabulary`] (0 for unseen values)
//! and concatenates everything in [`FEATURE_COLS`] order. The result
//! always has exactly [`FEATURE_COUNT`] entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::vocab::CategoryVocabulary;

/// Number of features the model expects per record.
pub const FEATURE_COUNT: usize = 14;

/// Feature column order used when the model was trained.
///
/// Load-bearing constant: the model receives columns in exactly this
/// order, and a silent reorder produces a wrong prediction rather than
/// an error.
pub const FEATURE_COLS: [&str; FEATURE_COUNT] = [
    "NDVI",
    "pupuk_kg_per_ha",
    "umur_tanaman_tahun",
    "curah_hujan_mm",
    "suhu_rata2_c",
    "NDVI_lag1",
    "pupuk_lag1",
    "prod_lag1",
    "NDVI_roll3",
    "pupuk_roll3",
    "penanggung_jawab_enc",
    "jenis_tanah_enc",
    "sistem_irigasi_enc",
    "lahan_kabupaten_enc",
];

/// One land plot observation, as received on the wire.
///
/// All 14 fields are required; the JSON boundary rejects records with
/// missing or uncoercible fields before encoding runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandRecord {
    /// Normalized difference vegetation index
    #[serde(rename = "NDVI")]
    pub ndvi: f32,
    /// Fertilizer rate in kg per hectare
    pub pupuk_kg_per_ha: f32,
    /// Plant age in years
    pub umur_tanaman_tahun: f32,
    /// Rainfall in millimeters
    pub curah_hujan_mm: f32,
    /// Mean temperature in degrees Celsius
    pub suhu_rata2_c: f32,
    /// NDVI, previous period
    #[serde(rename = "NDVI_lag1")]
    pub ndvi_lag1: f32,
    /// Fertilizer rate, previous period
    pub pupuk_lag1: f32,
    /// Production, previous period
    pub prod_lag1: f32,
    /// NDVI, 3-period rolling mean
    #[serde(rename = "NDVI_roll3")]
    pub ndvi_roll3: f32,
    /// Fertilizer rate, 3-period rolling mean
    pub pupuk_roll3: f32,
    /// Responsible team
    pub penanggung_jawab: String,
    /// Soil type
    pub jenis_tanah: String,
    /// Irrigation system
    pub sistem_irigasi: String,
    /// Regency the plot belongs to
    pub lahan_kabupaten: String,
}

impl LandRecord {
    /// Assemble the feature vector in [`FEATURE_COLS`] order.
    ///
    /// Unseen categories and absent vocabularies encode to 0; this never
    /// fails.
    #[must_use]
    pub fn feature_vector(
        &self,
        vocabularies: &HashMap<String, CategoryVocabulary>,
    ) -> [f32; FEATURE_COUNT] {
        let code = |column: &str, value: &str| -> f32 {
            vocabularies
                .get(column)
                .map_or(0, |vocab| vocab.code_or_default(value)) as f32
        };
        [
            self.ndvi,
            self.pupuk_kg_per_ha,
            self.umur_tanaman_tahun,
            self.curah_hujan_mm,
            self.suhu_rata2_c,
            self.ndvi_lag1,
            self.pupuk_lag1,
            self.prod_lag1,
            self.ndvi_roll3,
            self.pupuk_roll3,
            code("penanggung_jawab", &self.penanggung_jawab),
            code("jenis_tanah", &self.jenis_tanah),
            code("sistem_irigasi", &self.sistem_irigasi),
            code("lahan_kabupaten", &self.lahan_kabupaten),
        ]
    }
}

/// Encode a batch of records; output order matches input order.
#[must_use]
pub fn encode_batch(
    records: &[LandRecord],
    vocabularies: &HashMap<String, CategoryVocabulary>,
) -> Vec<[f32; FEATURE_COUNT]> {
    records
        .iter()
        .map(|record| record.feature_vector(vocabularies))
        .collect()
}

/// Fully-populated record used across the crate's test modules.
#[cfg(test)]
pub(crate) fn sample_record() -> LandRecord {
    LandRecord {
        ndvi: 0.71,
        pupuk_kg_per_ha: 120.0,
        umur_tanaman_tahun: 8.0,
        curah_hujan_mm: 210.0,
        suhu_rata2_c: 27.5,
        ndvi_lag1: 0.68,
        pupuk_lag1: 115.0,
        prod_lag1: 4.2,
        ndvi_roll3: 0.7,
        pupuk_roll3: 118.0,
        penanggung_jawab: "Tim B".to_string(),
        jenis_tanah: "Latosol".to_string(),
        sistem_irigasi: "Teknis".to_string(),
        lahan_kabupaten: "Kampar".to_string(),
    }
}
