//! Feature panel tests: trailing windows, censored.

use officer_risk_core::{
    allegation::{AllegationEvent, FadoCategory},
    builder::{PanelBuilder, PanelInputs},
    config::FeatureConfig,
    disposition::Disposition,
    features::FeatureBuilder,
    lawsuit::LawsuitEvent,
    observation::ObservationTable,
    types::Date,
};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

/// Officer 7: one substantiated force complaint, incident 2015-06-01,
/// received 2015-06-10, still open.
fn open_complaint() -> AllegationEvent {
    AllegationEvent {
        complaint_id:  500,
        tax_id:        7,
        incident_date: Some(d(2015, 6, 1)),
        received_date: Some(d(2015, 6, 10)),
        close_date:    None,
        fado:          FadoCategory::Force,
        disposition:   Disposition::Substantiated,
    }
}

fn observations() -> ObservationTable {
    ObservationTable::cross_product(&[7, 8], &[d(2015, 1, 1), d(2016, 1, 1), d(2017, 1, 1)])
}

/// All 39 metrics for each of the three trailing windows.
#[test]
fn feature_schema_has_all_trailing_columns() {
    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    let names = builder.schema().names();
    assert_eq!(names.len(), 3 * 39);
    assert_eq!(names[0], "past_year.complaints.disposition_substantiated");
    assert!(names.iter().any(|n| n == "past_two_years.all_allegations.FADO_force"));
    assert!(names.iter().any(|n| n == "past_five_years.lawsuits.officer_payout"));
    assert!(names.iter().all(|n| n.starts_with("past_")));
}

/// An open complaint counts as pending, never substantiated, in features.
#[test]
fn open_complaint_counts_as_pending() {
    let obs = observations();
    let allegations = [open_complaint()];
    let inputs = PanelInputs::new(&obs, &allegations, &[]);
    let panel = FeatureBuilder::new(&FeatureConfig::default())
        .unwrap()
        .build(&inputs)
        .unwrap();

    let at = d(2016, 1, 1);
    assert_eq!(panel.get(7, at, "past_year.complaints.disposition_pending"), Some(1.0));
    assert_eq!(panel.get(7, at, "past_year.complaints.disposition_substantiated"), Some(0.0));
    assert_eq!(panel.get(7, at, "past_year.complaints.total"), Some(1.0));
    assert_eq!(panel.get(7, at, "past_year.pending.FADO_force"), Some(1.0));
    assert_eq!(panel.get(7, at, "past_year.substantiated_allegations.FADO_force"), Some(0.0));
    // The incident lies after 2015-01-01.
    assert_eq!(panel.get(7, d(2015, 1, 1), "past_year.complaints.total"), Some(0.0));
    // Outside the one-year window at 2017-01-01, inside the two-year one.
    assert_eq!(panel.get(7, d(2017, 1, 1), "past_year.complaints.total"), Some(0.0));
    assert_eq!(panel.get(7, d(2017, 1, 1), "past_two_years.complaints.total"), Some(1.0));
}

/// Every observation gets a row; officers with no history are all zero.
#[test]
fn panel_has_one_zero_filled_row_per_observation() {
    let obs = observations();
    let allegations = [open_complaint()];
    let inputs = PanelInputs::new(&obs, &allegations, &[]);
    let panel = FeatureBuilder::new(&FeatureConfig::default())
        .unwrap()
        .build(&inputs)
        .unwrap();

    assert_eq!(panel.len(), obs.len());
    assert_eq!(panel.keys(), obs.keys());
    for (key, row) in panel.rows() {
        if key.tax_id == 8 {
            assert!(row.iter().all(|v| *v == 0.0), "officer 8 should be all zero");
        }
    }
}

/// Unresolved lawsuit payouts are masked in features.
#[test]
fn unresolved_lawsuit_payout_is_hidden() {
    let obs = observations();
    let suits = [LawsuitEvent {
        docket_number:    "D1".into(),
        tax_id:           8,
        lit_start:        Some(d(2015, 4, 1)),
        disp_date:        Some(d(2016, 8, 1)),
        officer_payout:   75_000.0,
        high_payout_suit: true,
        allegations:      [false, true, false, false],
    }];
    let inputs = PanelInputs::new(&obs, &[], &suits);
    let panel = FeatureBuilder::new(&FeatureConfig::default())
        .unwrap()
        .build(&inputs)
        .unwrap();

    let at = d(2016, 1, 1);
    assert_eq!(panel.get(8, at, "past_year.lawsuits.total"), Some(1.0));
    assert_eq!(panel.get(8, at, "past_year.lawsuits.pending"), Some(1.0));
    assert_eq!(panel.get(8, at, "past_year.lawsuits.officer_payout"), Some(0.0));
    assert_eq!(panel.get(8, at, "past_year.lawsuits.high_payout_suit"), Some(0.0));
    assert_eq!(panel.get(8, at, "past_year.lawsuits.assault_battery_allegation"), Some(1.0));

    // Disposed by 2017-01-01: payout visible in the two-year window.
    let later = d(2017, 1, 1);
    assert_eq!(panel.get(8, later, "past_two_years.lawsuits.officer_payout"), Some(75_000.0));
    assert_eq!(panel.get(8, later, "past_two_years.lawsuits.closed"), Some(1.0));
}

/// Activity by officers outside the observation table is ignored.
#[test]
fn unknown_officers_are_dropped() {
    let obs = observations();
    let mut stranger = open_complaint();
    stranger.tax_id = 999;
    let allegations = [stranger];
    let inputs = PanelInputs::new(&obs, &allegations, &[]);
    let panel = FeatureBuilder::new(&FeatureConfig::default())
        .unwrap()
        .build(&inputs)
        .unwrap();
    assert_eq!(panel.len(), obs.len());
    assert!(panel.rows().all(|(_, row)| row.iter().all(|v| *v == 0.0)));
}

/// Building twice gives identical panels.
#[test]
fn feature_build_is_idempotent() {
    let obs = observations();
    let allegations = [open_complaint()];
    let inputs = PanelInputs::new(&obs, &allegations, &[]);
    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    assert_eq!(builder.build(&inputs).unwrap(), builder.build(&inputs).unwrap());
}
