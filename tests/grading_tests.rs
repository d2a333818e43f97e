use funnel_core::catalog::Segment;
use funnel_core::core::grading::{grade_funnel, grade_lead, score_lead, segment_for_make};
use funnel_core::domain::{FunnelData, Grade, Service};

#[test]
fn total_of_four_is_grade_c() {
    // Detailing 2 + flexible 1 + entry 1
    let score = score_lead(Some(Service::Detailing), Some("interior"), Some("flexible"), Some("Tesla"));
    assert_eq!(score.total(), 4);
    assert_eq!(score.grade(), Grade::C);
}

#[test]
fn total_of_five_is_grade_b() {
    // Detailing 2 + flexible 1 + mid 2
    let score = score_lead(Some(Service::Detailing), Some("full"), Some("flexible"), Some("Toyota"));
    assert_eq!(score.total(), 5);
    assert_eq!(score.grade(), Grade::B);
}

#[test]
fn total_of_seven_is_grade_b() {
    // Track pack 3 + this week 2 + mid 2
    let score = score_lead(Some(Service::Ppf), Some("track_pack"), Some("this_week"), Some("Honda"));
    assert_eq!(score.total(), 7);
    assert_eq!(score.grade(), Grade::B);
}

#[test]
fn total_of_eight_is_grade_a() {
    // Full front 3 + this week 2 + luxury 3
    let score = score_lead(Some(Service::Ppf), Some("full_front"), Some("this_week"), Some("Audi"));
    assert_eq!(score.total(), 8);
    assert_eq!(score.grade(), Grade::A);
}

#[test]
fn empty_lead_still_scores_timing_and_segment_defaults() {
    let score = score_lead(None, None, None, None);
    assert_eq!((score.service, score.timing, score.segment), (0, 1, 1));
    assert_eq!(grade_lead(None, None, None, None), Grade::C);
}

#[test]
fn typed_makes_outside_the_lists_are_entry() {
    assert_eq!(segment_for_make(Some("Mercedes-Benz")), Segment::Luxury);
    assert_eq!(segment_for_make(Some("Mercedes")), Segment::Entry);
    assert_eq!(segment_for_make(Some("Chery")), Segment::Entry);
}

#[test]
fn funnel_record_grades_from_its_fields() {
    let data = FunnelData {
        service: Some(Service::Wrapping),
        package: Some("full_wrap".into()),
        timing: Some("asap".into()),
        make: Some("Lamborghini".into()),
        ..FunnelData::default()
    };
    assert_eq!(grade_funnel(&data), Grade::A);

    let partial = FunnelData {
        package: Some("partial_wrap".into()),
        ..data
    };
    // 0 + 3 + 3
    assert_eq!(grade_funnel(&partial), Grade::B);
}
