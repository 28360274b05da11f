//! Cleaned allegation rows to events: disposition, category and date parsing.

use officer_risk_core::{
    allegation::{AllegationRecord, FadoCategory},
    disposition::Disposition,
    error::PipelineError,
    types::Date,
};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

fn record(json: &str) -> AllegationRecord {
    serde_json::from_str(json).unwrap()
}

/// The collapsed label wins over a raw label that says otherwise.
#[test]
fn collapsed_label_takes_precedence() {
    let event = record(
        r#"{"complaint_id": 10, "tax_id": 7, "incident_date": "2015-06-01",
            "received_date": "2015-06-10", "close_date": "2016-01-05",
            "fado_type": "Force",
            "ccrb_disposition__collapsed": "not_substantiated",
            "ccrb_allegation_disposition": "Substantiated (Charges)"}"#,
    )
    .into_event()
    .unwrap()
    .unwrap();
    assert_eq!(event.disposition, Disposition::NotSubstantiated);
    assert_eq!(event.fado, FadoCategory::Force);
    assert_eq!(event.received_date, Some(d(2015, 6, 10)));
    assert_eq!(event.close_date, Some(d(2016, 1, 5)));
}

/// Without a collapsed label the raw CCRB text is classified.
#[test]
fn raw_label_is_classified() {
    let event = record(
        r#"{"complaint_id": 11, "tax_id": 7, "incident_date": "2015-06-01",
            "received_date": "2015-06-10", "close_date": "",
            "fado_type": "Abuse of Authority",
            "ccrb_allegation_disposition": "Substantiated (Charges)"}"#,
    )
    .into_event()
    .unwrap()
    .unwrap();
    assert_eq!(event.disposition, Disposition::Substantiated);
    assert_eq!(event.fado, FadoCategory::AbuseOfAuthority);
    assert_eq!(event.close_date, None);
}

/// A record carrying neither label is "none".
#[test]
fn missing_labels_mean_none() {
    let event = record(
        r#"{"complaint_id": 12, "tax_id": 7, "incident_date": "2015-06-01",
            "received_date": null, "close_date": null, "fado_type": "discourtesy"}"#,
    )
    .into_event()
    .unwrap()
    .unwrap();
    assert_eq!(event.disposition, Disposition::None);
    assert_eq!(event.fado, FadoCategory::Discourtesy);
    assert_eq!(event.received_date, None);
}

/// A raw label outside the fixed table is an error, not a silent default.
#[test]
fn unknown_raw_label_is_rejected() {
    let result = record(
        r#"{"complaint_id": 13, "tax_id": 7, "incident_date": "2015-06-01",
            "received_date": "2015-06-10", "close_date": null, "fado_type": "Force",
            "ccrb_allegation_disposition": "Bogus"}"#,
    )
    .into_event();
    assert!(matches!(result, Err(PipelineError::UnknownDisposition { raw }) if raw == "Bogus"));
}

/// An unknown collapsed label is rejected the same way.
#[test]
fn unknown_collapsed_label_is_rejected() {
    let result = record(
        r#"{"complaint_id": 14, "tax_id": 7, "incident_date": "2015-06-01",
            "received_date": "2015-06-10", "close_date": null, "fado_type": "Force",
            "ccrb_disposition__collapsed": "sustained"}"#,
    )
    .into_event();
    assert!(matches!(result, Err(PipelineError::UnknownDisposition { .. })));
}

/// A FADO type outside the five categories names the complaint.
#[test]
fn unknown_fado_type_is_rejected() {
    let result = record(
        r#"{"complaint_id": 15, "tax_id": 7, "incident_date": "2015-06-01",
            "received_date": "2015-06-10", "close_date": null, "fado_type": "Trespass",
            "ccrb_disposition__collapsed": "substantiated"}"#,
    )
    .into_event();
    assert!(matches!(
        result,
        Err(PipelineError::UnknownFadoType { complaint_id: 15, raw }) if raw == "Trespass"
    ));
}

/// Rows with no identified officer are skipped, even when other fields are bad.
#[test]
fn missing_tax_id_is_skipped() {
    let event = record(
        r#"{"complaint_id": 16, "tax_id": null, "incident_date": "2015-06-01",
            "received_date": "2015-06-10", "close_date": null, "fado_type": "Trespass"}"#,
    )
    .into_event()
    .unwrap();
    assert!(event.is_none());
}

/// A malformed date names the column it came from.
#[test]
fn malformed_date_is_rejected() {
    let result = record(
        r#"{"complaint_id": 17, "tax_id": 7, "incident_date": "06/01/2015",
            "received_date": "2015-06-10", "close_date": null, "fado_type": "Force"}"#,
    )
    .into_event();
    assert!(matches!(
        result,
        Err(PipelineError::InvalidDate { column, .. }) if column == "incident_date"
    ));
}
