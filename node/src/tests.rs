use super::*;
use arcade_execution::{mocks::ManualClock, Memory};
use arcade_types::{
    casino::{ClimbPhase, Multiplier, Wager, ERROR_NO_SESSION},
    execution::{AdminCommand, Command, Event, OutcomeKind},
    AccountId,
};
use console::{serve, Request, Response};
use engine::Engine;
use std::sync::Arc;
use tokio::sync::mpsc;

const SAMPLE: &str = r#"
directory: /tmp/arcade
log_level: debug
json_logs: true
pick_positions: 3
market:
  period_secs: 60
  history_capacity: 10
  floor: 0.5
  drift: 0.05
  weekend_drift: 0.1
rng_seed: 42
"#;

fn sample() -> ValidatedConfig {
    let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
    config.validate().unwrap()
}

#[test]
fn test_config_defaults_and_overrides() {
    let config = sample();
    assert_eq!(config.directory, PathBuf::from("/tmp/arcade"));
    assert_eq!(config.log_level, Level::DEBUG);
    assert!(config.json_logs);
    assert_eq!(config.layer.min_wager, MIN_WAGER);
    assert_eq!(config.layer.pick_positions, 3);
    assert_eq!(config.layer.duel_window_secs, DUEL_WINDOW_SECS);
    assert_eq!(config.climb_tick, Duration::from_millis(CLIMB_TICK_MILLIS));
    assert_eq!(config.reaper_interval, Duration::from_secs(15));
    assert_eq!(config.rng_seed, Some(42));

    let market = &config.layer.market;
    assert_eq!(market.period, Duration::from_secs(60));
    assert_eq!(market.history_capacity, 10);
    assert_eq!(market.floor, "0.5".parse::<Decimal>().unwrap());
    assert_eq!(
        market.drift,
        DriftProfile::Weekly {
            weekday: DriftRange::symmetric(0.05),
            weekend: DriftRange::symmetric(0.1),
        }
    );
}

#[test]
fn test_config_rejects_bad_values() {
    let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
    config.log_level = "loud".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidLogLevel { .. })
    ));

    let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
    config.pick_positions = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidNonZero {
            field: "pick_positions",
            ..
        })
    ));

    let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
    config.market.floor = 0.001;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "market.floor",
            ..
        })
    ));

    let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
    config.market.drift = 1.5;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            field: "market.drift",
            ..
        })
    ));
}

fn engine() -> Engine {
    Engine::with_store(
        &sample(),
        Arc::new(Memory::default()),
        Arc::new(ManualClock::new(1_700_000_000)),
    )
}

fn line(request: &Request) -> String {
    let mut line = serde_json::to_string(request).unwrap();
    line.push('\n');
    line
}

#[tokio::test]
async fn test_console_round_trip() {
    let engine = engine();
    let alice = AccountId::from("alice");
    let mut input = String::new();
    input.push_str(&line(&Request::Admin {
        command: AdminCommand::SetBalance {
            account: alice.clone(),
            amount: 500,
        },
    }));
    input.push_str("\n{not json}\n");
    input.push_str(&line(&Request::Play {
        caller: alice.clone(),
        command: Command::PickChoose { position: 1 },
    }));
    input.push_str(&line(&Request::Play {
        caller: alice.clone(),
        command: Command::Profile { account: None },
    }));

    let (tx, mut rx) = mpsc::channel(16);
    serve(
        engine.layer().clone(),
        engine.climb_tick(),
        input.as_bytes(),
        tx,
    )
    .await
    .unwrap();

    let mut responses = Vec::new();
    while let Some(response) = rx.recv().await {
        responses.push(response);
    }
    assert_eq!(responses.len(), 4);
    assert!(matches!(&responses[0], Response::Receipt(receipt) if receipt.balance == 500));
    assert!(matches!(&responses[1], Response::Malformed { .. }));
    assert!(matches!(
        &responses[2],
        Response::Rejected {
            kind: OutcomeKind::NoSession,
            code: ERROR_NO_SESSION,
            ..
        }
    ));
    let Response::Receipt(receipt) = &responses[3] else {
        panic!("unexpected response {:?}", responses[3]);
    };
    assert!(matches!(
        &receipt.event,
        Event::Profile { balance: 500, .. }
    ));
}

#[tokio::test]
async fn test_console_streams_climb_frames() {
    let engine = engine();
    let alice = AccountId::from("alice");
    engine.layer().ledger().set_balance(&alice, 1_000).await;

    let mut input = line(&Request::Play {
        caller: alice.clone(),
        command: Command::ClimbStart {
            wager: Wager::Amount(100),
            target: Multiplier::from_hundredths(120),
        },
    });
    input.push_str(&line(&Request::WatchClimb {
        caller: alice.clone(),
    }));

    // Fast ticks keep the test short.
    let (tx, mut rx) = mpsc::channel(64);
    serve(
        engine.layer().clone(),
        Duration::from_millis(1),
        input.as_bytes(),
        tx,
    )
    .await
    .unwrap();

    let mut frames = Vec::new();
    while let Some(response) = rx.recv().await {
        if let Response::Frame(frame) = response {
            frames.push(frame);
        }
    }
    let last = frames.last().expect("no frames streamed");
    assert!(matches!(last.phase, ClimbPhase::CashedOut | ClimbPhase::Crashed));
    assert!(last.crash_point.is_some());
}

#[tokio::test]
async fn test_background_tasks_stop_on_shutdown() {
    let engine = engine();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let tasks = engine.start(shutdown_rx);
    shutdown_tx.send(true).unwrap();
    for task in tasks {
        task.await.unwrap();
    }
    // The first market tick is immediate; histories may already hold a point.
    let quotes = engine.layer().market().quotes().await;
    assert_eq!(quotes.len(), 3);
}
