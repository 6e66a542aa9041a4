use std::path::PathBuf;

use dutyscope::*;

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dutyscope-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_match_the_led_testbench() {
    let c = PlaybackConfig::default();
    assert_eq!(c.signal, "led_controller_tb.LEDS[3:0]");
    assert_eq!(c.fps, 25);
    assert_eq!(c.speed, 1.0);
    assert_eq!(c.width, 4);
    assert_eq!(c.bit_order, BitOrder::MsbFirst);
    assert_eq!(c.strategy, DutyStrategy::BinarySearch);
    assert!(c.validate().is_ok());
}

#[test]
fn partial_yaml_keeps_defaults() {
    let c = PlaybackConfig::from_yaml_str(
        "fps: 60\nstrategy: linear_scan\nbit_order: lsb_first\nelapsed:\n  decimal_places: 3\n",
    )
    .unwrap();
    assert_eq!(c.fps, 60);
    assert_eq!(c.strategy, DutyStrategy::LinearScan);
    assert_eq!(c.bit_order, BitOrder::LsbFirst);
    assert_eq!(c.elapsed.decimal_places, 3);
    assert_eq!(c.elapsed.display_unit, TimeUnit::Milliseconds);
    assert_eq!(c.signal, PlaybackConfig::default().signal);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        PlaybackConfig::from_yaml_str("fps: 0"),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        PlaybackConfig::from_yaml_str("speed: -1.0"),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        PlaybackConfig::from_yaml_str("fps: 1001"),
        Err(Error::InvalidConfig(_))
    ));
    assert_eq!(PlaybackConfig::from_yaml_str("fps: 1000").unwrap().fps, 1000);
}

#[test]
fn load_json_and_yaml_files() {
    let json = scratch_file("run.json", r#"{ "speed": 0.5, "source": "trace.yaml" }"#);
    let c = PlaybackConfig::load(&json).unwrap();
    assert_eq!(c.speed, 0.5);
    assert_eq!(c.source, PathBuf::from("trace.yaml"));

    let yaml = scratch_file("run.yml", "signal: top.leds\n");
    assert_eq!(PlaybackConfig::load(&yaml).unwrap().signal, "top.leds");
}

#[test]
fn unknown_extension_is_rejected() {
    let path = scratch_file("run.toml", "fps = 10");
    assert!(matches!(
        PlaybackConfig::load(&path),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let err = PlaybackConfig::load("/nonexistent/dutyscope.yaml").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
