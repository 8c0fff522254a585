//! Tests for the plan module.

#[cfg(test)]
mod tests {
    use super::super::plan::*;
    use crate::event::CalendarEvent;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap()
    }

    fn event(id: &str, minutes_from_now: i64) -> CalendarEvent {
        CalendarEvent::new(
            id,
            format!("Event {id}"),
            now() + Duration::minutes(minutes_from_now),
        )
    }

    #[test]
    fn keeps_only_events_starting_after_now() {
        let fetched = vec![event("past", -30), event("boundary", 0), event("future", 30)];
        let plan = plan(fetched, &[], now());

        let ids: Vec<&str> = plan.future.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["future"]);
    }

    #[test]
    fn sorts_by_start_with_id_tiebreak() {
        let fetched = vec![event("b", 60), event("a", 60), event("c", 30)];
        let plan = plan(fetched, &[], now());

        let ids: Vec<&str> = plan.future.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn removed_ids_cover_deleted_and_started_events() {
        let previous = vec![event("gone", 60), event("started", 5), event("kept", 90)];
        let fetched = vec![event("kept", 90), event("started", -5)];

        let plan = plan(fetched, &previous, now());
        assert_eq!(plan.removed_ids, vec!["gone", "started"]);
    }

    #[test]
    fn drops_untitled_and_duplicate_events() {
        let untitled = CalendarEvent::new("u1", "  ", now() + Duration::minutes(30));
        let first = event("dup", 30);
        let mut second = event("dup", 30);
        second.title = "Renamed".to_string();

        let plan = plan(vec![untitled, first, second], &[], now());
        assert_eq!(plan.future.len(), 1);
        assert_eq!(plan.future[0].title, "Renamed");
    }

    #[test]
    fn truncation_flag_reflects_ceiling() {
        let under: Vec<CalendarEvent> = (0..MAX_SCHEDULED_EVENTS)
            .map(|i| event(&format!("e{i}"), 10 + i as i64))
            .collect();
        let plan_under = plan(under, &[], now());
        assert!(!plan_under.truncated);
        assert_eq!(plan_under.scheduled().len(), MAX_SCHEDULED_EVENTS);

        let over: Vec<CalendarEvent> = (0..MAX_SCHEDULED_EVENTS + 3)
            .map(|i| event(&format!("e{i}"), 10 + i as i64))
            .collect();
        let plan_over = plan(over, &[], now());
        assert!(plan_over.truncated);
        assert_eq!(plan_over.scheduled().len(), MAX_SCHEDULED_EVENTS);
        assert_eq!(plan_over.future.len(), MAX_SCHEDULED_EVENTS + 3);
    }

    #[test]
    fn scheduled_prefix_holds_the_soonest_events() {
        let over: Vec<CalendarEvent> = (0..MAX_SCHEDULED_EVENTS + 5)
            .map(|i| event(&format!("e{i:02}"), 10 + i as i64))
            .collect();
        let plan = plan(over, &[], now());

        let last_scheduled = plan.scheduled().last().unwrap();
        let first_cut = &plan.future[MAX_SCHEDULED_EVENTS];
        assert!(last_scheduled.start <= first_cut.start);
    }

    #[test]
    fn empty_fetch_removes_everything_previous() {
        let previous = vec![event("a", 30), event("b", 60)];
        let plan = plan(Vec::new(), &previous, now());

        assert!(plan.future.is_empty());
        assert_eq!(plan.removed_ids, vec!["a", "b"]);
        assert!(!plan.truncated);
    }

    proptest! {
        #[test]
        fn future_is_always_sorted_and_strictly_upcoming(
            offsets in prop::collection::vec(-600i64..600, 0..40)
        ) {
            let fetched: Vec<CalendarEvent> = offsets
                .iter()
                .enumerate()
                .map(|(i, m)| event(&format!("e{i}"), *m))
                .collect();

            let plan = plan(fetched, &[], now());

            for e in &plan.future {
                prop_assert!(e.start > now());
            }
            for pair in plan.future.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
            }
            prop_assert_eq!(plan.truncated, plan.future.len() > MAX_SCHEDULED_EVENTS);
        }

        #[test]
        fn removed_and_future_ids_never_overlap(
            prev_count in 0usize..20,
            fetched_keep in 0usize..20
        ) {
            let previous: Vec<CalendarEvent> = (0..prev_count)
                .map(|i| event(&format!("e{i}"), 30 + i as i64))
                .collect();
            let fetched: Vec<CalendarEvent> = previous
                .iter()
                .take(fetched_keep)
                .cloned()
                .collect();

            let plan = plan(fetched, &previous, now());

            for id in &plan.removed_ids {
                prop_assert!(!plan.future.iter().any(|e| &e.id == id));
            }
        }
    }
}
