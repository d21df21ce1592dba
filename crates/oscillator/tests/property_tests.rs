#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use oscillator::{
    FrameScheduler, ManualFrameHost, angular_frequency, displacement, fps, round_to,
};
use proptest::prelude::*;

// =============================================================================
// Physics properties
// =============================================================================

proptest! {
    #[test]
    fn angular_frequency_is_rounded_root(
        stiffness in 1e-3f64..1e4,
        mass in 1e-3f64..1e4,
    ) {
        let w0 = angular_frequency(stiffness, mass).unwrap();
        prop_assert_eq!(w0, round_to((stiffness / mass).sqrt(), 3));
    }

    #[test]
    fn angular_frequency_rejects_non_positive(
        value in -1e4f64..=0.0,
        other in 1e-3f64..1e4,
    ) {
        prop_assert!(angular_frequency(value, other).is_err());
        prop_assert!(angular_frequency(other, value).is_err());
    }

    #[test]
    fn displacement_matches_closed_form(
        x0 in -1e3f64..1e3,
        w in 0.0f64..100.0,
        t in 0.0f64..1e3,
    ) {
        prop_assert_eq!(displacement(x0, w, t), x0 * (w * t).cos());
    }

    #[test]
    fn displacement_starts_at_initial(
        x0 in -1e6f64..1e6,
        w in 0.0f64..1e3,
    ) {
        prop_assert_eq!(displacement(x0, w, 0.0), x0);
    }

    #[test]
    fn displacement_bounded_by_amplitude(
        x0 in -1e3f64..1e3,
        w in 0.0f64..100.0,
        t in 0.0f64..1e3,
    ) {
        prop_assert!(displacement(x0, w, t).abs() <= x0.abs());
    }
}

// =============================================================================
// Frame scheduler properties
// =============================================================================

proptest! {
    #[test]
    fn frames_strictly_increase_and_match_elapsed(
        base in 0.0f64..1e6,
        gaps in prop::collection::vec(0.0f64..50.0, 1..200),
    ) {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new(60);
        scheduler.start(&mut host).unwrap();

        let mut timestamp = base;
        let mut last: Option<u64> = None;
        let mut fired = 0usize;

        let mut stamps = vec![base];
        for gap in &gaps {
            timestamp += gap;
            stamps.push(timestamp);
        }

        for stamp in stamps {
            prop_assert!(host.fire().is_some());
            if let Some(frame) = scheduler.tick(stamp, &mut host).unwrap() {
                let expected = ((stamp - base) / fps(60)).floor() as u64;
                prop_assert_eq!(frame.index, expected);
                if let Some(prev) = last {
                    prop_assert!(frame.index > prev, "index {} after {}", frame.index, prev);
                }
                last = Some(frame.index);
                fired += 1;
            }
        }

        // At most one callback per distinct logical frame index
        let distinct = last.map_or(0, |l| l as usize + 1);
        prop_assert!(fired <= distinct);
        prop_assert_eq!(host.pending().len(), 1);
    }

    #[test]
    fn no_skipped_frames_at_display_rate(
        base in 0.0f64..1e5,
        gaps in prop::collection::vec(0.0f64..16.0, 1..300),
    ) {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new(60);
        scheduler.start(&mut host).unwrap();

        let mut timestamp = base;
        let mut indices = Vec::new();
        if let Some(frame) = scheduler.tick(timestamp, &mut host).unwrap() {
            indices.push(frame.index);
        }
        for gap in gaps {
            timestamp += gap;
            if let Some(frame) = scheduler.tick(timestamp, &mut host).unwrap() {
                indices.push(frame.index);
            }
        }

        for (expected, index) in indices.iter().enumerate() {
            prop_assert_eq!(*index, expected as u64);
        }
    }

    #[test]
    fn elapsed_is_continuous(
        base in 0.0f64..1e5,
        offset in 0.0f64..1e4,
    ) {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new(60);
        scheduler.start(&mut host).unwrap();
        scheduler.tick(base, &mut host).unwrap();
        scheduler.tick(base + offset, &mut host).unwrap();
        prop_assert!((scheduler.elapsed() - offset / 1000.0).abs() < 1e-9);
    }
}
