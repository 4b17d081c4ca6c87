//! Property-based tests for the prediction pipeline.
//!
//! Checks the batch contract over arbitrary valid inputs: output length
//! and order, graceful handling of unseen categories, rounding, and
//! determinism across rebuilt predictors.

use panen::encode::{LandRecord, FEATURE_COLS, FEATURE_COUNT};
use panen::service::{round3, Predictor};
use proptest::prelude::*;

fn arb_category() -> impl Strategy<Value = String> {
    // Mix of categories seen in the demo reference dataset and ones
    // that were never seen at vocabulary-build time.
    prop_oneof![
        Just("Alluvial".to_string()),
        Just("Latosol".to_string()),
        Just("Peat".to_string()),
        "[A-Z][a-z]{2,10}",
    ]
}

prop_compose! {
    fn arb_record()(
        ndvi in 0.0f32..1.0,
        pupuk in 0.0f32..500.0,
        umur in 0.0f32..30.0,
        hujan in 0.0f32..600.0,
        suhu in 15.0f32..40.0,
        ndvi_lag1 in 0.0f32..1.0,
        pupuk_lag1 in 0.0f32..500.0,
        prod_lag1 in 0.0f32..20.0,
        ndvi_roll3 in 0.0f32..1.0,
        pupuk_roll3 in 0.0f32..500.0,
        team in arb_category(),
        soil in arb_category(),
        irrigation in arb_category(),
        regency in arb_category(),
    ) -> LandRecord {
        LandRecord {
            ndvi,
            pupuk_kg_per_ha: pupuk,
            umur_tanaman_tahun: umur,
            curah_hujan_mm: hujan,
            suhu_rata2_c: suhu,
            ndvi_lag1,
            pupuk_lag1,
            prod_lag1,
            ndvi_roll3,
            pupuk_roll3,
            penanggung_jawab: team,
            jenis_tanah: soil,
            sistem_irigasi: irrigation,
            lahan_kabupaten: regency,
        }
    }
}

#[test]
fn test_schema_has_fourteen_columns() {
    assert_eq!(FEATURE_COLS.len(), FEATURE_COUNT);
    assert_eq!(FEATURE_COLS[0], "NDVI");
    assert_eq!(FEATURE_COLS[10], "penanggung_jawab_enc");
    assert_eq!(FEATURE_COLS[13], "lahan_kabupaten_enc");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_batch_length_preserved(records in prop::collection::vec(arb_record(), 0..20)) {
        let predictor = Predictor::demo().expect("demo predictor builds");
        let predictions = predictor.predict(&records).expect("valid batch never fails");
        prop_assert_eq!(predictions.len(), records.len());
    }

    #[test]
    fn prop_batch_order_matches_per_record_predictions(
        records in prop::collection::vec(arb_record(), 1..10)
    ) {
        let predictor = Predictor::demo().expect("demo predictor builds");
        let batch = predictor.predict(&records).expect("valid batch never fails");
        for (record, expected) in records.iter().zip(&batch) {
            let single = predictor
                .predict(std::slice::from_ref(record))
                .expect("single record never fails");
            prop_assert_eq!(single[0].to_bits(), expected.to_bits());
        }
    }

    #[test]
    fn prop_unseen_categories_never_error(record in arb_record()) {
        // Whatever text the categorical fields carry, encoding degrades
        // to code 0 instead of failing.
        let predictor = Predictor::demo().expect("demo predictor builds");
        let result = predictor.predict(std::slice::from_ref(&record));
        prop_assert!(result.is_ok());
    }

    #[test]
    fn prop_predictions_are_rounded_to_3_decimals(
        records in prop::collection::vec(arb_record(), 1..10)
    ) {
        let predictor = Predictor::demo().expect("demo predictor builds");
        for p in predictor.predict(&records).expect("valid batch never fails") {
            let scaled = p * 1000.0;
            prop_assert!(
                (scaled - scaled.round()).abs() < 1e-2,
                "prediction {p} carries more than 3 decimals"
            );
        }
    }

    #[test]
    fn prop_rebuilt_predictor_is_deterministic(
        records in prop::collection::vec(arb_record(), 1..10)
    ) {
        let a = Predictor::demo().expect("demo predictor builds");
        let b = Predictor::demo().expect("demo predictor builds");
        let first = a.predict(&records).expect("valid batch never fails");
        let second = b.predict(&records).expect("valid batch never fails");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_round3_is_idempotent(x in -1000.0f32..1000.0) {
        let once = round3(x);
        prop_assert_eq!(round3(once).to_bits(), once.to_bits());
    }

    #[test]
    fn prop_feature_vector_always_fourteen_entries(record in arb_record()) {
        let vector = record.feature_vector(&std::collections::HashMap::new());
        prop_assert_eq!(vector.len(), FEATURE_COUNT);
    }
}
