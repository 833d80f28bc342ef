use std::sync::mpsc::Receiver;
use std::time::Duration;

use rampread::config::Settings;
use rampread::document::Document;
use rampread::ramp::{DemoConfig, FixedConfig, Mode, ModeConfig, Phase, TrainingConfig};
use rampread::strain::StrainSignal;
use rampread::{ManualClock, Notifier, RampEvent, Reader, SpeedChangeReason, SpeedControl};

/// End-to-end ramp sessions through the controller facade and the reader.

fn training(cfg: TrainingConfig) -> (SpeedControl<ManualClock>, Receiver<RampEvent>) {
    let (notifier, rx) = Notifier::channel();
    let mut control = SpeedControl::new(ModeConfig::Training(cfg), ManualClock::new(), notifier);
    control.start();
    (control, rx)
}

fn read_sentences(control: &mut SpeedControl<ManualClock>, words: u32) {
    for _ in 0..words {
        control.on_word_read("done.", true);
    }
}

fn ramp_speeds(events: &[RampEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            RampEvent::SpeedChanged {
                speed,
                reason: SpeedChangeReason::Ramp,
            } => Some(*speed),
            _ => None,
        })
        .collect()
}

#[test]
fn training_session_runs_to_plateau() {
    let (mut control, rx) = training(TrainingConfig {
        start_speed: 300,
        max_speed: 400,
        ..TrainingConfig::default()
    });

    read_sentences(&mut control, 499);
    assert_eq!(control.phase(), Phase::Acceleration);
    read_sentences(&mut control, 1);

    let state = control.state();
    assert_eq!(state.phase, Phase::Plateau);
    assert_eq!(state.current_speed, 400);
    assert_eq!(state.words_read, 500);
    assert_eq!(control.progress(), 100.0);

    let events: Vec<RampEvent> = rx.try_iter().collect();
    let phases: Vec<Phase> = events
        .iter()
        .filter_map(|e| match e {
            RampEvent::PhaseChanged(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![Phase::Stabilization, Phase::Acceleration, Phase::Plateau]
    );

    let speeds = ramp_speeds(&events);
    assert!(speeds.windows(2).all(|w| w[0] < w[1]), "ramp never slows: {speeds:?}");
    assert_eq!(speeds.last(), Some(&400));
    assert_eq!(
        events.iter().filter(|e| **e == RampEvent::MaxReached).count(),
        1
    );
}

#[test]
fn words_without_sentence_end_hold_speed() {
    let (mut control, _rx) = training(TrainingConfig::default());
    for _ in 0..150 {
        control.on_word_read("and", false);
    }
    assert_eq!(control.current_speed(), 300);
    // the next sentence end catches up in one step
    control.on_word_read("end.", true);
    assert_eq!(control.current_speed(), 308);
}

#[test]
fn rewind_strain_cools_down_and_returns() {
    let (mut control, rx) = training(TrainingConfig {
        start_speed: 300,
        max_speed: 600,
        strain_dropback: 10,
        ..TrainingConfig::default()
    });

    read_sentences(&mut control, 250);
    assert_eq!(control.phase(), Phase::Acceleration);
    assert_eq!(control.current_speed(), 318);
    rx.try_iter().for_each(drop);

    control.on_user_rewind(25);
    assert_eq!(control.phase(), Phase::Cooldown);
    assert_eq!(control.current_speed(), 308);
    let events: Vec<RampEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            RampEvent::StrainDetected(StrainSignal::Rewind { words: 25 }),
            RampEvent::PhaseChanged(Phase::Cooldown),
            RampEvent::SpeedChanged {
                speed: 308,
                reason: SpeedChangeReason::StrainAdapt
            },
        ]
    );

    // No ramping while cooling down
    read_sentences(&mut control, 99);
    assert_eq!(control.phase(), Phase::Cooldown);
    assert_eq!(control.current_speed(), 308);
    read_sentences(&mut control, 1);
    assert_eq!(control.phase(), Phase::Acceleration);
    rx.try_iter().for_each(drop);

    // Ramp restarts from the phase's first step
    read_sentences(&mut control, 1);
    assert_eq!(control.current_speed(), 310);
    read_sentences(&mut control, 24);
    assert_eq!(control.current_speed(), 314);
    assert_eq!(ramp_speeds(&rx.try_iter().collect::<Vec<_>>()), vec![310, 314]);
}

#[test]
fn short_rewinds_and_pauses_are_not_strain() {
    let (mut control, rx) = training(TrainingConfig::default());
    read_sentences(&mut control, 50);
    control.on_user_rewind(19);
    control.on_user_pause(2_999);
    assert_eq!(control.phase(), Phase::Stabilization);
    assert!(!rx
        .try_iter()
        .any(|e| matches!(e, RampEvent::StrainDetected(_))));
}

#[test]
fn demo_reader_eases_to_max_and_shortens_pauses() {
    let clock = ManualClock::new();
    let settings = Settings {
        mode: Mode::Demo,
        demo: DemoConfig {
            start_speed: 300,
            max_speed: 600,
            ramp_duration_seconds: 10.0,
            reduce_punctuation_pauses: true,
            punctuation_reduction_factor: 0.5,
        },
        ..Settings::default()
    };
    let text = "word. ".repeat(400);
    let mut reader = Reader::new(Document::parse(&text), settings, clock.clone());
    reader.start();
    assert_eq!(reader.state().phase, Phase::Acceleration);
    assert_eq!(reader.current_interval_ms(), 200 + 150);

    let mut elapsed = Duration::ZERO;
    while reader.state().phase != Phase::Plateau && elapsed < Duration::from_secs(30) {
        clock.advance(Duration::from_millis(5));
        elapsed += Duration::from_millis(5);
        reader.on_frame();
    }

    assert_eq!(reader.state().phase, Phase::Plateau);
    assert_eq!(reader.state().current_speed, 600);
    // ease-out rounds up to the max a little before the full duration
    assert!(elapsed >= Duration::from_secs(9));
    // 100ms base plus half of the 150ms period pause
    assert_eq!(reader.current_interval_ms(), 175);
    assert_eq!(reader.notice(), Some("top speed reached"));

    let samples = reader.session().samples();
    assert!(samples.windows(2).all(|w| w[0].wpm <= w[1].wpm));
    assert_eq!(reader.summary().peak_wpm, 600.0);
}

#[test]
fn demo_pause_stops_the_ramp_clock() {
    let clock = ManualClock::new();
    let settings = Settings {
        mode: Mode::Demo,
        demo: DemoConfig {
            start_speed: 300,
            max_speed: 700,
            ramp_duration_seconds: 60.0,
            ..DemoConfig::default()
        },
        ..Settings::default()
    };
    let mut reader = Reader::new(Document::parse(&"w ".repeat(50)), settings, clock.clone());
    reader.start();

    reader.toggle_pause();
    clock.advance(Duration::from_secs(30));
    reader.toggle_pause();
    clock.advance(Duration::from_secs(1));
    while !reader.on_frame() {
        clock.advance(Duration::from_millis(1));
    }

    // Only about a second of ramp time has passed
    assert!(reader.state().current_speed < 350, "{}", reader.state().current_speed);
}

#[test]
fn switching_modes_mid_session_starts_fresh() {
    let clock = ManualClock::new();
    let settings = Settings {
        mode: Mode::Training,
        ..Settings::default()
    };
    let text = "go. ".repeat(300);
    let mut reader = Reader::new(Document::parse(&text), settings, clock.clone());
    reader.start();
    for _ in 0..250_000 {
        clock.advance(Duration::from_millis(1));
        reader.on_frame();
        if reader.state().phase == Phase::Acceleration {
            break;
        }
    }
    assert_eq!(reader.state().phase, Phase::Acceleration);
    let speed = reader.state().current_speed;

    assert!(speed > 300);

    reader.cycle_mode();
    assert_eq!(reader.control().mode(), Mode::Demo);
    let state = reader.state();
    assert_eq!(state.words_read, 0);
    assert_eq!(state.start_speed, DemoConfig::default().start_speed);
    assert_eq!(state.phase, Phase::Acceleration);
    assert!(state.is_running);
}

#[test]
fn cycling_through_every_mode_keeps_each_tuning() {
    let training = TrainingConfig {
        start_speed: 250,
        max_speed: 900,
        stabilization_words: 50,
        ..TrainingConfig::default()
    };
    let demo = DemoConfig {
        start_speed: 320,
        max_speed: 780,
        ramp_duration_seconds: 45.0,
        ..DemoConfig::default()
    };
    let settings = Settings {
        mode: Mode::Fixed,
        fixed: FixedConfig { speed: 410 },
        training,
        demo,
        ..Settings::default()
    };
    let mut reader = Reader::new(Document::parse("a b c"), settings.clone(), ManualClock::new());
    reader.start();

    reader.cycle_mode();
    assert_eq!(reader.control().config(), &ModeConfig::Training(training));
    assert_eq!(reader.state().max_speed, 900);
    reader.cycle_mode();
    assert_eq!(reader.control().config(), &ModeConfig::Demo(demo));
    reader.cycle_mode();
    assert_eq!(reader.control().mode(), Mode::Fixed);
    assert_eq!(reader.state().current_speed, 410);

    assert_eq!(reader.settings(), &settings);
}
