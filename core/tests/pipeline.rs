//! End-to-end engine tests over the in-memory store.

use officer_risk_core::{
    allegation::{AllegationEvent, FadoCategory},
    config::PipelineConfig,
    dataset::CareerDates,
    disposition::Disposition,
    engine::{PipelineEngine, MODELING_TABLE},
    error::PipelineError,
    lawsuit::LawsuitEvent,
    store::PanelStore,
    types::Date,
};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

fn seeded_store(with_careers: bool) -> PanelStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = PanelStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.insert_roster(&[7, 8, 9, 10]).unwrap();
    store
        .insert_allegations(&[
            AllegationEvent {
                complaint_id:  1,
                tax_id:        7,
                incident_date: Some(d(2015, 6, 1)),
                received_date: Some(d(2015, 6, 10)),
                close_date:    None,
                fado:          FadoCategory::Force,
                disposition:   Disposition::Substantiated,
            },
            AllegationEvent {
                complaint_id:  2,
                tax_id:        8,
                incident_date: Some(d(2016, 2, 1)),
                received_date: Some(d(2016, 2, 3)),
                close_date:    Some(d(2016, 9, 1)),
                fado:          FadoCategory::Discourtesy,
                disposition:   Disposition::NotSubstantiated,
            },
        ])
        .unwrap();
    store
        .upsert_lawsuits(&[LawsuitEvent {
            docket_number:    "2016-CV-9".into(),
            tax_id:           9,
            lit_start:        Some(d(2016, 9, 1)),
            disp_date:        Some(d(2017, 5, 1)),
            officer_payout:   120_000.0,
            high_payout_suit: true,
            allegations:      [true, false, false, true],
        }])
        .unwrap();
    if with_careers {
        let careers: Vec<CareerDates> = [7, 8, 9, 10]
            .into_iter()
            .map(|tax_id| CareerDates {
                tax_id,
                career_start_date: Some(d(2010, 1, 1)),
                career_end_date:   if tax_id == 10 { None } else { Some(d(2020, 12, 31)) },
            })
            .collect();
        store.upsert_career_dates(&careers).unwrap();
    }
    store
}

/// Features and outcomes are written with one row per observation.
#[test]
fn run_writes_both_panels() {
    let engine =
        PipelineEngine::build("pipeline-test".into(), PipelineConfig::default(), seeded_store(false))
            .unwrap();
    let manifest = engine.run().unwrap();

    assert_eq!(manifest.officers, 4);
    assert_eq!(manifest.observation_dates.len(), 8);
    assert_eq!(manifest.allegations, 2);
    assert_eq!(manifest.lawsuits, 1);
    assert_eq!(manifest.panel("features").unwrap().rows, 32);
    assert_eq!(manifest.panel("features").unwrap().columns, 3 * 39);
    assert_eq!(manifest.panel("outcomes").unwrap().columns, 2 * 5);
    assert_eq!(manifest.modeling_rows, None);

    let features = engine.store().load_panel("features").unwrap();
    assert_eq!(features.len(), 32);
    assert_eq!(
        features.get(7, d(2016, 1, 1), "past_year.complaints.disposition_pending"),
        Some(1.0)
    );
    let outcomes = engine.store().load_panel("outcomes").unwrap();
    assert_eq!(
        outcomes.get(9, d(2016, 1, 1), "future_one_year.lawsuits.officer_payout"),
        Some(120_000.0)
    );
}

/// The manifest is recorded on the run row.
#[test]
fn manifest_is_stored() {
    let engine =
        PipelineEngine::build("manifest-test".into(), PipelineConfig::default(), seeded_store(false))
            .unwrap();
    assert!(engine.stored_manifest().unwrap().is_none());
    let manifest = engine.run().unwrap();
    assert_eq!(engine.stored_manifest().unwrap(), Some(manifest));
}

/// A written panel reads back unchanged, dotted column names included.
#[test]
fn stored_panel_round_trips() {
    let engine =
        PipelineEngine::build("roundtrip-test".into(), PipelineConfig::default(), seeded_store(false))
            .unwrap();
    engine.run().unwrap();
    let loaded = engine.store().load_panel("outcomes").unwrap();
    assert_eq!(loaded.columns()[0], "future_one_year.complaints.total");
    assert_eq!(
        loaded.keys(),
        engine.store().load_observation_table().unwrap().unwrap().keys()
    );
}

/// Reading a panel that was never written is a distinct error.
#[test]
fn missing_panel_is_reported() {
    let store = seeded_store(false);
    assert!(matches!(
        store.load_panel("features"),
        Err(PipelineError::MissingSnapshot { .. })
    ));
}

/// An empty roster cannot produce an observation table.
#[test]
fn empty_roster_is_rejected() {
    let store = PanelStore::in_memory().unwrap();
    store.migrate().unwrap();
    let engine = PipelineEngine::build("empty".into(), PipelineConfig::default(), store).unwrap();
    assert!(matches!(engine.run(), Err(PipelineError::Config(_))));
}

/// A repeated trailing window is refused before the run is recorded.
#[test]
fn repeated_window_fails_to_build() {
    let mut config = PipelineConfig::default();
    config.features.trailing_years = vec![1, 2, 1];
    let result = PipelineEngine::build("repeat".into(), config, seeded_store(false));
    assert!(matches!(result, Err(PipelineError::Config(_))));
}

/// The stored observation table is reused even if the config changes.
#[test]
fn observation_table_is_built_once() {
    let store = seeded_store(false);
    let first = PipelineEngine::build("first".into(), PipelineConfig::default(), store).unwrap();
    let table = first.ensure_observation_table().unwrap();
    assert_eq!(table.len(), 32);

    let again = first.ensure_observation_table().unwrap();
    assert_eq!(again.keys(), table.keys());
}

/// With career dates on file the modeling dataset and folds are written.
/// Officer 10 has no end date and is excluded.
#[test]
fn run_with_careers_writes_modeling_dataset() {
    let engine =
        PipelineEngine::build("modeling-test".into(), PipelineConfig::default(), seeded_store(true))
            .unwrap();
    let manifest = engine.run().unwrap();

    // Three officers x the 2015..=2019 Jan 1 dates inside the prediction range.
    assert_eq!(manifest.modeling_rows, Some(15));
    let dataset = engine.store().load_panel(MODELING_TABLE).unwrap();
    assert_eq!(dataset.len(), 15);
    assert!(dataset.keys().iter().all(|k| k.tax_id != 10));
    assert!(dataset
        .columns()
        .iter()
        .any(|c| c == "future_two_years.complaints.disposition_substantiated"));
    assert!(dataset.columns().iter().any(|c| c == "past_five_years.complaints.total"));

    let folds = engine.store().load_fold_rows().unwrap();
    // mc_iters (5) x 3 officers.
    assert_eq!(folds.len(), 15);
    assert!(folds.iter().all(|(_, _, fold)| *fold < 3));
}
