//! End-to-end create/edit/move/delete flows through the planner and the store.

use calendar_engine::{
    plan_create, plan_edit, plan_move, Action, CalendarError, EditScope, EventDraft, EventStore,
    EventsPayload, GroupId, PlanOptions, RepeatRule, RepeatType, SequentialIds,
};
use chrono::{NaiveDate, NaiveTime};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(title: &str, on: NaiveDate, start: u32, end: u32) -> EventDraft {
    EventDraft::new(
        title,
        on,
        NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
    )
}

fn weekly_series(store: &mut EventStore, ids: &mut SequentialIds) {
    let weekly = draft("주간 회의", date(2025, 11, 10), 10, 11).with_repeat(RepeatRule::new(
        RepeatType::Weekly,
        1,
        Some(date(2025, 11, 30)),
    ));
    let plan = plan_create(weekly, store, &PlanOptions::default()).unwrap();
    plan.commit(store, ids).unwrap();
}

#[test]
fn identical_second_event_needs_confirmation() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();

    let a = draft("이벤트 A", date(2025, 11, 20), 14, 15);
    let plan = plan_create(a, &store, &PlanOptions::default()).unwrap();
    assert!(!plan.requires_confirmation());
    plan.commit(&mut store, &mut ids).unwrap();

    let b = draft("이벤트 B", date(2025, 11, 20), 14, 15);
    let plan = plan_create(b, &store, &PlanOptions::default()).unwrap();
    assert!(plan.requires_confirmation(), "B must be blocked until confirmed");
    let titles: Vec<&str> = plan
        .conflicting_events()
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["이벤트 A"]);

    // User chooses "계속 진행"
    plan.commit(&mut store, &mut ids).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn weekly_series_creates_three_instances() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    weekly_series(&mut store, &mut ids);

    let dates: Vec<NaiveDate> = store.all().iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![date(2025, 11, 10), date(2025, 11, 17), date(2025, 11, 24)]
    );

    let group = store.get("1").unwrap().group_id().cloned().unwrap();
    assert_eq!(store.series(&group).len(), 3);
}

#[test]
fn new_series_flags_existing_overlap_per_instance() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    store.create(draft("점심", date(2025, 11, 17), 10, 12), &mut ids);

    let weekly = draft("주간 회의", date(2025, 11, 10), 10, 11).with_repeat(RepeatRule::new(
        RepeatType::Weekly,
        1,
        Some(date(2025, 11, 30)),
    ));
    let plan = plan_create(weekly, &store, &PlanOptions::default()).unwrap();

    assert_eq!(plan.drafts.len(), 3);
    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].index, 1);
    assert_eq!(plan.conflicts[0].existing[0].overlap_minutes, 60);
}

#[test]
fn edit_one_instance_keeps_the_rest_of_series() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    weekly_series(&mut store, &mut ids);
    let group = store.get("2").unwrap().group_id().cloned().unwrap();

    let mut edited = store.get("2").unwrap().to_draft();
    edited.title = "수정된 회의".to_string();
    let plan = plan_edit(
        "2",
        edited,
        EditScope::Instance,
        &store,
        &PlanOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.action, Action::UpdateInstance { id: "2".into() });
    assert!(!plan.requires_confirmation(), "an event cannot overlap itself");
    plan.commit(&mut store, &mut ids).unwrap();

    assert_eq!(store.len(), 3, "editing one instance keeps the instance count");
    let detached = store.get("2").unwrap();
    assert_eq!(detached.title, "수정된 회의");
    assert!(!detached.is_recurring());
    assert_eq!(store.series(&group).len(), 2);
    assert!(store.all().iter().any(|e| e.title == "주간 회의"));
}

#[test]
fn edit_whole_series_replaces_every_instance() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    weekly_series(&mut store, &mut ids);
    let group = store.get("2").unwrap().group_id().cloned().unwrap();

    let mut edited = store.get("2").unwrap().to_draft();
    edited.title = "변경된 주간 회의".to_string();
    edited.start_time = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
    edited.end_time = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
    let plan = plan_edit(
        "2",
        edited,
        EditScope::Series,
        &store,
        &PlanOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.action, Action::ReplaceSeries { group: group.clone() });
    assert!(!plan.requires_confirmation());
    plan.commit(&mut store, &mut ids).unwrap();

    let series = store.series(&group);
    let dates: Vec<NaiveDate> = series.iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![date(2025, 11, 10), date(2025, 11, 17), date(2025, 11, 24)],
        "re-expansion restarts from the series anchor"
    );
    assert!(series.iter().all(|e| e.title == "변경된 주간 회의"));
    assert!(store.all().iter().all(|e| e.title != "주간 회의"));
}

#[test]
fn series_edit_with_repeat_turned_off_leaves_one_plain_event() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    weekly_series(&mut store, &mut ids);
    let group = store.get("1").unwrap().group_id().cloned().unwrap();

    // The form keeps the old interval, end date and group id; only the type changes.
    let mut edited = store.get("1").unwrap().to_draft();
    edited.repeat.kind = RepeatType::None;
    let plan = plan_edit(
        "1",
        edited,
        EditScope::Series,
        &store,
        &PlanOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.action, Action::ReplaceSeries { group: group.clone() });
    assert_eq!(plan.drafts.len(), 1);
    assert_eq!(plan.drafts[0].repeat, RepeatRule::none());

    let created = plan.commit(&mut store, &mut ids).unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].repeat, RepeatRule::none());
    assert_eq!(store.len(), 1);
    assert!(store.series_ids(&group).is_none());

    // A later series-scope edit of the plain event is an ordinary update.
    let id = created[0].id.clone();
    let again = store.get(&id).unwrap().to_draft();
    let plan = plan_edit(
        &id,
        again,
        EditScope::Series,
        &store,
        &PlanOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.action, Action::UpdateInstance { id });
}

#[test]
fn non_recurring_draft_drops_stale_rule_fields() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    let mut stale = RepeatRule::new(RepeatType::None, 1, Some(date(2025, 11, 30)));
    stale.id = Some(GroupId::from("stale"));
    let single = draft("단일 일정", date(2025, 11, 20), 9, 10).with_repeat(stale);

    let plan = plan_create(single, &store, &PlanOptions::default()).unwrap();
    assert_eq!(plan.drafts[0].repeat, RepeatRule::none());

    let created = plan.commit(&mut store, &mut ids).unwrap();
    assert_eq!(created[0].repeat, RepeatRule::none());
    assert!(store.series_ids(&GroupId::from("stale")).is_none());
}

#[test]
fn single_event_given_a_rule_becomes_a_series() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    store.create(draft("운동", date(2025, 11, 3), 7, 8), &mut ids);

    let edited = store
        .get("1")
        .unwrap()
        .to_draft()
        .with_repeat(RepeatRule::new(RepeatType::Daily, 1, Some(date(2025, 11, 5))));
    let plan = plan_edit(
        "1",
        edited,
        EditScope::Instance,
        &store,
        &PlanOptions::default(),
    )
    .unwrap();
    assert_eq!(plan.action, Action::ConvertToSeries { id: "1".into() });
    let created = plan.commit(&mut store, &mut ids).unwrap();

    assert_eq!(created.len(), 3);
    assert!(store.get("1").is_none());
    let group = created[0].group_id().cloned().unwrap();
    assert_eq!(store.series(&group).len(), 3);
}

#[test]
fn delete_one_instance_then_whole_series() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    weekly_series(&mut store, &mut ids);
    let group = store.get("1").unwrap().group_id().cloned().unwrap();

    store.delete_instance("2").unwrap();
    assert_eq!(store.series(&group).len(), 2);

    store.delete_series(&group).unwrap();
    assert!(store.is_empty());
}

#[test]
fn drag_and_drop_moves_date_and_keeps_times() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    store.create(draft("드래그 테스트 이벤트", date(2025, 10, 1), 14, 15), &mut ids);

    let plan = plan_move("1", date(2025, 10, 3), &store).unwrap();
    assert!(!plan.requires_confirmation());
    let moved = plan.commit(&mut store, &mut ids).unwrap();

    assert_eq!(moved[0].date, date(2025, 10, 3));
    assert_eq!(moved[0].start_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    assert_eq!(moved[0].end_time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
}

#[test]
fn drop_onto_busy_date_warns() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    store.create(draft("이동할 일정", date(2025, 10, 1), 14, 15), &mut ids);
    store.create(draft("기존 일정", date(2025, 10, 3), 14, 16), &mut ids);

    let plan = plan_move("1", date(2025, 10, 3), &store).unwrap();
    assert!(plan.requires_confirmation());
    assert_eq!(plan.conflicting_events()[0].id, "2");

    // Cancelling means simply not committing: the store is untouched.
    assert_eq!(store.get("1").unwrap().date, date(2025, 10, 1));
}

#[test]
fn recurring_instance_cannot_be_dragged() {
    let mut store = EventStore::new();
    let mut ids = SequentialIds::default();
    weekly_series(&mut store, &mut ids);

    let result = plan_move("1", date(2025, 11, 12), &store);
    assert!(matches!(result, Err(CalendarError::RecurringMove(_))));
}

#[test]
fn invalid_form_never_reaches_expansion() {
    let store = EventStore::new();
    let inverted = draft("잘못된 시간", date(2025, 11, 20), 15, 14)
        .with_repeat(RepeatRule::new(RepeatType::Daily, 1, None));
    let result = plan_create(inverted, &store, &PlanOptions::default());
    assert!(matches!(result, Err(CalendarError::InvalidTimeRange(_))));

    let blank = draft(" ", date(2025, 11, 20), 9, 10);
    assert!(matches!(
        plan_create(blank, &store, &PlanOptions::default()),
        Err(CalendarError::MissingField(_))
    ));
}

#[test]
fn batch_payload_serializes_for_api() {
    let store = EventStore::new();
    let weekly = draft("주간 회의", date(2025, 11, 10), 10, 11).with_repeat(RepeatRule::new(
        RepeatType::Weekly,
        1,
        Some(date(2025, 11, 30)),
    ));
    let plan = plan_create(weekly, &store, &PlanOptions::default()).unwrap();
    let payload = EventsPayload {
        events: plan.drafts,
    };

    let json = serde_json::to_value(&payload).unwrap();
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2]["date"], "2025-11-24");
    assert_eq!(events[0]["repeat"]["type"], "weekly");
    assert_eq!(events[0]["repeat"]["endDate"], "2025-11-30");
    assert_eq!(events[0]["repeat"]["id"], events[2]["repeat"]["id"]);
}
