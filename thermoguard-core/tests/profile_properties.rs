//! Property tests for profile interpolation

use chrono::{NaiveTime, Timelike};
use proptest::prelude::*;
use thermoguard_core::{Milestone, Profile};

const EPSILON: f64 = 1e-9;

fn time_of_day(secs: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap()
}

fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-50.0f64..50.0, 1..24)
}

/// Distinct anchors paired with values
fn explicit_milestones() -> impl Strategy<Value = Vec<Milestone>> {
    prop::collection::btree_map(0u32..86_400, -50.0f64..50.0, 1..16).prop_map(|anchors| {
        anchors
            .into_iter()
            .map(|(secs, value)| Milestone::new(time_of_day(secs), value))
            .collect()
    })
}

proptest! {
    #[test]
    fn evenly_spaced_never_overshoots(values in values(), secs in 0u32..86_400) {
        let profile = Profile::evenly_spaced(values).unwrap();
        let v = profile.expected_value(time_of_day(secs));
        prop_assert!(v >= profile.min_value() - EPSILON);
        prop_assert!(v <= profile.max_value() + EPSILON);
    }

    #[test]
    fn explicit_never_overshoots(milestones in explicit_milestones(), secs in 0u32..86_400) {
        let profile = Profile::new(milestones).unwrap();
        let v = profile.expected_value(time_of_day(secs));
        prop_assert!(v >= profile.min_value() - EPSILON);
        prop_assert!(v <= profile.max_value() + EPSILON);
    }

    #[test]
    fn exact_at_milestones(milestones in explicit_milestones()) {
        let profile = Profile::new(milestones).unwrap();
        for m in profile.milestones() {
            prop_assert!((profile.expected_value(m.time) - m.value).abs() < EPSILON);
        }
    }

    #[test]
    fn continuous_across_midnight(milestones in explicit_milestones()) {
        let profile = Profile::new(milestones).unwrap();

        // Largest slope between neighbouring milestones, per second
        let ms = profile.milestones();
        let max_slope = (0..ms.len())
            .map(|i| {
                let a = ms[i];
                let b = ms[(i + 1) % ms.len()];
                let gap = (b.time.num_seconds_from_midnight() as i64
                    - a.time.num_seconds_from_midnight() as i64)
                    .rem_euclid(86_400);
                let gap = if gap == 0 { 86_400 } else { gap };
                (b.value - a.value).abs() / gap as f64
            })
            .fold(0.0, f64::max);

        let before = profile.expected_value(time_of_day(86_399));
        let after = profile.expected_value(NaiveTime::MIN);
        prop_assert!((before - after).abs() <= max_slope + EPSILON);
    }
}

#[test]
fn duplicate_anchor_is_rejected() {
    let t = time_of_day(3600);
    assert!(Profile::new(vec![Milestone::new(t, 1.0), Milestone::new(t, 2.0)]).is_err());
}
