//! Window filtering tests: censoring for features, hindsight for outcomes.

use officer_risk_core::{
    allegation::{AllegationEvent, FadoCategory},
    disposition::Disposition,
    lawsuit::LawsuitEvent,
    types::Date,
    window::{filter_allegations, filter_lawsuits, Knowledge, TimeWindow},
};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

fn allegation(received: Option<Date>, close: Option<Date>) -> AllegationEvent {
    AllegationEvent {
        complaint_id:  1,
        tax_id:        7,
        incident_date: Some(d(2015, 6, 1)),
        received_date: received,
        close_date:    close,
        fado:          FadoCategory::Force,
        disposition:   Disposition::Substantiated,
    }
}

fn lawsuit(lit_start: Date, disp_date: Option<Date>) -> LawsuitEvent {
    LawsuitEvent {
        docket_number:    "2015-CV-001".into(),
        tax_id:           7,
        lit_start:        Some(lit_start),
        disp_date,
        officer_payout:   80_000.0,
        high_payout_suit: true,
        allegations:      [true, false, false, false],
    }
}

/// An allegation still open at the window end is visible but pending.
#[test]
fn open_allegation_is_pending_when_censored() {
    let events = [allegation(Some(d(2015, 6, 10)), None)];
    let window = TimeWindow::trailing(d(2016, 1, 1), 1).unwrap();

    let censored = filter_allegations(&events, window, Knowledge::Censored);
    assert_eq!(censored.len(), 1);
    assert_eq!(censored[0].disposition, Disposition::Pending);
    // The input is not modified.
    assert_eq!(events[0].disposition, Disposition::Substantiated);
}

/// A disposition closed after the window end is masked; one closed on the
/// end date is not.
#[test]
fn close_after_end_is_masked_close_on_end_is_not() {
    let window = TimeWindow::trailing(d(2016, 1, 1), 1).unwrap();

    let late = [allegation(Some(d(2015, 6, 10)), Some(d(2016, 1, 2)))];
    let on_end = [allegation(Some(d(2015, 6, 10)), Some(d(2016, 1, 1)))];

    assert_eq!(
        filter_allegations(&late, window, Knowledge::Censored)[0].disposition,
        Disposition::Pending
    );
    assert_eq!(
        filter_allegations(&on_end, window, Knowledge::Censored)[0].disposition,
        Disposition::Substantiated
    );
}

/// A complaint filed after the window end is invisible when censored but
/// counted with hindsight.
#[test]
fn complaint_received_after_end_is_dropped_when_censored() {
    let events = [allegation(Some(d(2016, 3, 1)), Some(d(2016, 9, 1)))];
    let window = TimeWindow::trailing(d(2016, 1, 1), 1).unwrap();

    assert!(filter_allegations(&events, window, Knowledge::Censored).is_empty());
    let known = filter_allegations(&events, window, Knowledge::Omniscient);
    assert_eq!(known.len(), 1);
    assert_eq!(known[0].disposition, Disposition::Substantiated);
}

/// Missing received date: never visible to a censored pass.
#[test]
fn missing_received_date_is_dropped_when_censored() {
    let events = [allegation(None, Some(d(2015, 8, 1)))];
    let window = TimeWindow::trailing(d(2016, 1, 1), 1).unwrap();
    assert!(filter_allegations(&events, window, Knowledge::Censored).is_empty());
}

/// Window membership is decided by incident date alone.
#[test]
fn incident_outside_window_is_excluded_in_both_modes() {
    let events = [allegation(Some(d(2015, 6, 10)), Some(d(2015, 8, 1)))];
    let window = TimeWindow::trailing(d(2015, 1, 1), 1).unwrap();
    assert!(filter_allegations(&events, window, Knowledge::Censored).is_empty());
    assert!(filter_allegations(&events, window, Knowledge::Omniscient).is_empty());
}

/// A lawsuit not disposed by the window end shows no payout and no
/// high-payout flag, and counts as pending.
#[test]
fn unresolved_lawsuit_payout_is_masked_when_censored() {
    let suits = [lawsuit(d(2015, 3, 1), Some(d(2016, 6, 1)))];
    let window = TimeWindow::trailing(d(2016, 1, 1), 1).unwrap();

    let censored = filter_lawsuits(&suits, window, Knowledge::Censored);
    assert_eq!(censored.len(), 1);
    assert!(censored[0].pending);
    assert_eq!(censored[0].event.officer_payout, 0.0);
    assert!(!censored[0].event.high_payout_suit);
    // Allegation flags are known at filing and are not masked.
    assert!(censored[0].event.allegations[0]);

    let known = filter_lawsuits(&suits, window, Knowledge::Omniscient);
    assert!(!known[0].pending);
    assert!(known[0].closed());
    assert_eq!(known[0].event.officer_payout, 80_000.0);
}

/// A suit with no disposition date is pending with its payout hidden.
#[test]
fn null_disposition_date_is_masked_when_censored() {
    let suits = [lawsuit(d(2015, 3, 1), None)];
    let window = TimeWindow::trailing(d(2016, 1, 1), 1).unwrap();

    let censored = filter_lawsuits(&suits, window, Knowledge::Censored);
    assert_eq!(censored.len(), 1);
    assert!(censored[0].pending);
    assert!(!censored[0].closed());
    assert_eq!(censored[0].event.officer_payout, 0.0);
    assert!(!censored[0].event.high_payout_suit);
}

/// With hindsight, only a null disposition date means pending.
#[test]
fn null_disposition_date_is_pending_with_hindsight() {
    let suits = [lawsuit(d(2015, 3, 1), None)];
    let window = TimeWindow::forward(d(2015, 1, 1), 1).unwrap();
    let known = filter_lawsuits(&suits, window, Knowledge::Omniscient);
    assert!(known[0].pending);
}

/// Lawsuit windows can be shifted; allegation windows are unaffected by
/// the shift because they use their own window.
#[test]
fn lawsuit_offset_moves_the_window() {
    let suits = [lawsuit(d(2017, 3, 1), Some(d(2017, 9, 1)))];
    let window = TimeWindow::forward(d(2015, 1, 1), 2).unwrap();

    assert!(filter_lawsuits(&suits, window, Knowledge::Omniscient).is_empty());
    let shifted = window.offset_months(6).unwrap();
    assert_eq!(filter_lawsuits(&suits, shifted, Knowledge::Omniscient).len(), 1);
}
