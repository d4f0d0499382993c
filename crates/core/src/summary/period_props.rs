//! Property-based tests for period resolution.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use proptest::prelude::*;

use crate::summary::period::{days_since_cutoff, period_start};

// 2000-01-01 .. 2100-01-01
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800_i64..4_102_444_800_i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

fn arb_tz() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(chrono_tz::Asia::Tokyo),
        Just(chrono_tz::Asia::Kolkata),
        Just(chrono_tz::Europe::Berlin),
        Just(chrono_tz::Asia::Amman),
        Just(chrono_tz::America::Sao_Paulo),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The window never starts in the future nor more than five local days
    /// back. A DST fall-back inside the window adds one real hour.
    #[test]
    fn prop_start_is_recent(now in arb_instant(), tz in arb_tz()) {
        let start = period_start(now, tz);
        prop_assert!(start <= now);
        prop_assert!(now - start < Duration::days(5) + Duration::hours(1));
    }

    /// Outside DST gaps the window opens at local midnight on a Tuesday or Friday.
    #[test]
    fn prop_start_is_cutoff_midnight(now in arb_instant()) {
        for tz in [Tz::UTC, chrono_tz::Asia::Tokyo, chrono_tz::Asia::Kolkata] {
            let local = period_start(now, tz).with_timezone(&tz);
            prop_assert_eq!(local.time(), NaiveTime::MIN);
            prop_assert!(matches!(local.weekday(), Weekday::Tue | Weekday::Fri));
        }
    }

    /// The window opens with the first instant of a local Tuesday or Friday,
    /// DST gaps included.
    #[test]
    fn prop_start_opens_the_local_day(now in arb_instant(), tz in arb_tz()) {
        let start = period_start(now, tz);
        let local = start.with_timezone(&tz);
        let before = (start - Duration::seconds(1)).with_timezone(&tz);
        prop_assert!(before.date_naive() < local.date_naive());
        prop_assert!(matches!(local.weekday(), Weekday::Tue | Weekday::Fri));
    }

    /// UTC starts are exact midnights.
    #[test]
    fn prop_utc_start_has_no_time_part(now in arb_instant()) {
        let start = period_start(now, Tz::UTC);
        prop_assert_eq!(start.hour(), 0);
        prop_assert_eq!(start.minute(), 0);
        prop_assert_eq!(start.second(), 0);
    }

    /// Stepping back the cutoff distance always lands on Tuesday or Friday.
    #[test]
    fn prop_cutoff_lands_on_tuesday_or_friday(weekday in 0u32..7) {
        let landed = (weekday + 7 - days_since_cutoff(weekday)) % 7;
        prop_assert!(landed == 2 || landed == 5);
    }
}
