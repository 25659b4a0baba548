//! Integration tests for the clock variants and the factory.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use hex_engine::time_control::{
    AbsoluteOptions, ByoyomiOptions, FischerOptions, MAX_BUDGET_SECONDS, SimpleOptions,
};
use hex_engine::{
    ClockState, PeriodValues, Player, TimeControl, TimeControlError, TimeControlEvent,
    TimeControlKind, TimeControlType, create_time_control,
};
use std::sync::{Arc, Mutex};

fn at(millis: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap() + TimeDelta::milliseconds(millis)
}

fn secs(seconds: i64) -> i64 {
    seconds * 1000
}

fn create(config: TimeControlType) -> Box<dyn TimeControl> {
    create_time_control(&config, None, at(0)).unwrap()
}

fn record(control: &mut dyn TimeControl) -> Arc<Mutex<Vec<TimeControlEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    control.on_event(Box::new(move |e| sink.lock().unwrap().push(*e)));
    events
}

fn fischer(initial_seconds: u64, increment_seconds: u64) -> TimeControlType {
    TimeControlType::Fischer(FischerOptions {
        initial_seconds,
        increment_seconds,
        max_seconds: None,
    })
}

fn byoyomi(initial_seconds: u64, periods_count: u32, period_seconds: u64) -> TimeControlType {
    TimeControlType::Byoyomi(ByoyomiOptions {
        initial_seconds,
        periods_count,
        period_seconds,
    })
}

#[test]
fn test_fischer_adds_increment_after_move() {
    let mut control = create(fischer(60, 5));
    assert_eq!(control.kind(), TimeControlKind::Fischer);
    assert_eq!(control.state(), ClockState::Ready);

    control.start(Player::First, at(0)).unwrap();
    control.switch_player(at(secs(12))).unwrap();

    let values = control.values(at(secs(12)));
    assert_eq!(values.current_player, Player::Second);
    assert_eq!(values.player(Player::First).remaining_time, TimeDelta::seconds(53));
    assert_eq!(values.player(Player::Second).remaining_time, TimeDelta::seconds(60));

    let values = control.values(at(secs(20)));
    assert_eq!(values.player(Player::Second).remaining_time, TimeDelta::seconds(52));
}

#[test]
fn test_byoyomi_elapses_after_all_periods() {
    let mut control = create(byoyomi(0, 3, 10));
    let events = record(control.as_mut());

    control.start(Player::First, at(0)).unwrap();
    assert_eq!(control.deadline(), Some(at(secs(30))));
    assert_eq!(control.tick(at(secs(29))), ClockState::Running);
    assert!(events.lock().unwrap().is_empty());

    assert_eq!(control.tick(at(secs(31))), ClockState::Elapsed);
    assert_eq!(
        *events.lock().unwrap(),
        vec![TimeControlEvent::Elapsed {
            player: Player::First,
            at: at(secs(30)),
        }]
    );
    assert!(control.is_player_elapsed(Player::First));
}

#[test]
fn test_byoyomi_move_within_period_resets_it() {
    let mut control = create(byoyomi(0, 3, 10));
    control.start(Player::First, at(0)).unwrap();
    control.switch_player(at(secs(25))).unwrap();

    let values = control.values(at(secs(25)));
    assert_eq!(
        values.player(Player::First).periods,
        Some(PeriodValues {
            remaining_periods: 1,
            period_remaining_time: TimeDelta::seconds(10),
        })
    );
}

#[test]
fn test_byoyomi_pause_keeps_partial_period() {
    let mut control = create(byoyomi(2, 2, 10));
    control.start(Player::Second, at(0)).unwrap();
    control.pause(at(secs(6))).unwrap();
    assert_eq!(control.state(), ClockState::Paused);
    assert_eq!(control.deadline(), None);

    control.resume(at(secs(100))).unwrap();
    let values = control.values(at(secs(100)));
    assert_eq!(values.player(Player::Second).remaining_time, TimeDelta::zero());
    assert_eq!(
        values.player(Player::Second).periods,
        Some(PeriodValues {
            remaining_periods: 2,
            period_remaining_time: TimeDelta::seconds(6),
        })
    );
    assert_eq!(control.deadline(), Some(at(secs(116))));
}

#[test]
fn test_simple_resets_each_move() {
    let mut control = create(TimeControlType::Simple(SimpleOptions { seconds_per_move: 10 }));
    control.start(Player::First, at(0)).unwrap();
    control.switch_player(at(secs(8))).unwrap();
    control.switch_player(at(secs(17))).unwrap();

    let values = control.values(at(secs(19)));
    assert_eq!(values.player(Player::First).remaining_time, TimeDelta::seconds(8));
    assert_eq!(values.player(Player::Second).remaining_time, TimeDelta::seconds(10));
}

#[test]
fn test_absolute_is_never_replenished() {
    let mut control = create(TimeControlType::Absolute(AbsoluteOptions {
        seconds_per_player: 10,
    }));
    let events = record(control.as_mut());
    control.start(Player::First, at(0)).unwrap();
    control.switch_player(at(secs(6))).unwrap();
    control.switch_player(at(secs(7))).unwrap();

    // Player 0 has 4s left and is flagged at 11s; switch only settles.
    control.switch_player(at(secs(12))).unwrap();
    assert_eq!(control.state(), ClockState::Elapsed);
    assert_eq!(control.current_player(), Player::First);
    assert_eq!(control.elapsed(), Some((Player::First, at(secs(11)))));
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn test_restore_values_continue_counting() {
    let mut original = create(fischer(60, 0));
    original.start(Player::First, at(0)).unwrap();
    original.switch_player(at(secs(10))).unwrap();
    let values = original.values(at(secs(15)));

    let mut restored = create_time_control(&original.config(), Some(&values), at(secs(15))).unwrap();
    assert_eq!(restored.state(), ClockState::Ready);
    assert_eq!(restored.current_player(), Player::Second);
    let player = restored.current_player();
    restored.start(player, at(secs(15))).unwrap();

    let values = restored.values(at(secs(20)));
    assert_eq!(values.player(Player::First).remaining_time, TimeDelta::seconds(50));
    assert_eq!(values.player(Player::Second).remaining_time, TimeDelta::seconds(50));
}

#[test]
fn test_restore_exhausted_values_flags_once() {
    let config = fischer(60, 5);
    let mut control = create(config);
    let mut values = control.values(at(0));
    values.current_player = Player::Second;
    values.players[1].remaining_time = TimeDelta::zero();

    let events = record(control.as_mut());
    control.set_values(&values, at(secs(1))).unwrap();
    assert_eq!(control.state(), ClockState::Elapsed);
    assert_eq!(events.lock().unwrap().len(), 1);

    let restored = create_time_control(&config, Some(&values), at(secs(2))).unwrap();
    assert_eq!(restored.elapsed(), Some((Player::Second, at(secs(2)))));
}

#[test]
fn test_byoyomi_values_require_periods() {
    let config = byoyomi(60, 3, 10);
    let mut values = create(fischer(60, 5)).values(at(0));
    values.current_player = Player::First;

    let result = create_time_control(&config, Some(&values), at(0));
    assert!(matches!(result, Err(TimeControlError::InvalidConfiguration(_))));
}

#[test]
fn test_invalid_options_rejected() {
    let invalid = [
        TimeControlType::Absolute(AbsoluteOptions { seconds_per_player: 0 }),
        TimeControlType::Simple(SimpleOptions { seconds_per_move: 0 }),
        fischer(0, 5),
        TimeControlType::Fischer(FischerOptions {
            initial_seconds: 60,
            increment_seconds: 5,
            max_seconds: Some(59),
        }),
        byoyomi(60, 3, 0),
        byoyomi(0, 0, 10),
    ];
    for config in invalid {
        let result = create_time_control(&config, None, at(0));
        assert!(
            matches!(result, Err(TimeControlError::InvalidConfiguration(_))),
            "{:?} should be rejected",
            config
        );
    }
}

#[test]
fn test_budgets_beyond_limit_rejected() {
    let configs = [
        TimeControlType::Absolute(AbsoluteOptions {
            seconds_per_player: 10_000_000_000_000,
        }),
        TimeControlType::Simple(SimpleOptions {
            seconds_per_move: MAX_BUDGET_SECONDS + 1,
        }),
        fischer(9_000_000_000_000_000, 9_000_000_000_000_000),
        fischer(MAX_BUDGET_SECONDS, 1),
        byoyomi(0, 3_000_000_000, 10),
        byoyomi(0, 2_000_000, 9_000_000_000_000),
        byoyomi(MAX_BUDGET_SECONDS, 1, 1),
    ];
    for config in configs {
        assert!(
            matches!(
                create_time_control(&config, None, at(0)),
                Err(TimeControlError::InvalidConfiguration(_))
            ),
            "{:?} should be rejected",
            config
        );
    }
}

#[test]
fn test_largest_budgets_run_without_overflow() {
    let configs = [
        TimeControlType::Absolute(AbsoluteOptions {
            seconds_per_player: MAX_BUDGET_SECONDS,
        }),
        fischer(MAX_BUDGET_SECONDS - 1, 1),
        byoyomi(0, 3_000_000_000, 1),
    ];
    for config in configs {
        let mut control = create(config);
        control.start(Player::First, at(0)).unwrap();
        assert_eq!(control.state(), ClockState::Running);
        assert!(control.deadline().is_some());

        control.switch_player(at(secs(1))).unwrap();
        control.switch_player(at(secs(2))).unwrap();
        assert_eq!(control.tick(at(secs(3))), ClockState::Running);
        assert_eq!(control.elapsed(), None);
    }
}

#[test]
fn test_restore_above_budget_rejected() {
    let config = fischer(60, 0);
    let mut values = create(config).values(at(0));
    values.players[1].remaining_time = TimeDelta::seconds(MAX_BUDGET_SECONDS as i64 + 1);
    assert!(matches!(
        create_time_control(&config, Some(&values), at(0)),
        Err(TimeControlError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_config_round_trips_through_control() {
    let config = TimeControlType::from_json(
        r#"{ "type": "fischer", "options": { "initialSeconds": 300, "incrementSeconds": 3, "maxSeconds": 600 } }"#,
    )
    .unwrap();
    let control = create(config);
    assert_eq!(control.config(), config);
    assert_eq!(
        serde_json::to_string(&control.config()).unwrap(),
        r#"{"type":"fischer","options":{"initialSeconds":300,"incrementSeconds":3,"maxSeconds":600}}"#
    );
}
