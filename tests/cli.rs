use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn shadow_lab() -> Command {
    let mut cmd = Command::cargo_bin("shadow-lab").expect("binary exists");
    cmd.arg("--headless");
    cmd
}

#[test]
fn baked_first_frame_starts_the_hop_on_the_orbit() {
    let mut cmd = shadow_lab();
    cmd.args(["--variant", "baked", "--frames", "1"]);
    cmd.assert()
        .success()
        .stdout(contains("Scene: baked"))
        .stdout(contains("Final state after 1 frame(s):"))
        .stdout(contains(" - sphere pos=(1.50, 0.00, 0.00)"))
        .stdout(contains(" - sphere-shadow pos=(1.50, 0.00) opacity=0.30"))
        .stdout(contains(" - point helper hidden"));
}

#[test]
fn baked_shadow_follows_the_sphere_over_time() {
    let mut cmd = shadow_lab();
    cmd.args(["--variant", "baked", "--frames", "3", "--frame-time", "0.5"]);
    cmd.assert()
        .success()
        .stdout(contains(" - sphere pos=(0.81, 0.14, 1.26)"))
        .stdout(contains(" - sphere-shadow pos=(0.81, 1.26) opacity=0.26"));
}

#[test]
fn realtime_scene_keeps_the_sphere_and_camera_still() {
    let mut cmd = shadow_lab();
    cmd.args(["--frames", "10"]);
    cmd.assert()
        .success()
        .stdout(contains("Scene: realtime"))
        .stdout(contains(" - sphere pos=(0.00, 0.00, 0.00)"))
        .stdout(contains(" - camera pos=(1.00, 1.00, 2.00) aspect=1.778"))
        .stdout(contains("sphere-shadow").not());
}

#[test]
fn pressed_keys_toggle_helpers() {
    let mut cmd = shadow_lab();
    cmd.args(["--press", "hhh"]);
    cmd.assert()
        .success()
        .stdout(contains(" - directional helper visible"));

    let mut cmd = shadow_lab();
    cmd.args(["--variant", "baked", "--press", "dspsh"]);
    cmd.assert()
        .success()
        .stdout(contains(" - directional helper visible"))
        .stdout(contains(" - spot helper hidden"))
        .stdout(contains(" - point helper visible"));
}

#[test]
fn config_file_is_overridden_by_flags() {
    let mut config = NamedTempFile::new().expect("temp config");
    writeln!(config, "variant = \"baked\"\nwidth = 800\nheight = 800").expect("write config");

    let mut cmd = shadow_lab();
    cmd.arg("--config").arg(config.path());
    cmd.assert()
        .success()
        .stdout(contains("Scene: baked"))
        .stdout(contains("aspect=1.000"));

    let mut cmd = shadow_lab();
    cmd.arg("--config")
        .arg(config.path())
        .args(["--variant", "realtime"]);
    cmd.assert().success().stdout(contains("Scene: realtime"));
}

#[test]
fn invalid_arguments_fail() {
    let mut cmd = shadow_lab();
    cmd.arg("--wat");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --wat"));

    let mut cmd = shadow_lab();
    cmd.args(["--variant", "cartoon"]);
    cmd.assert()
        .failure()
        .stderr(contains("unknown variant `cartoon`"));
}

#[test]
fn broken_config_file_is_reported() {
    let mut config = NamedTempFile::new().expect("temp config");
    writeln!(config, "damping_factor = 4.0").expect("write config");

    let mut cmd = shadow_lab();
    cmd.arg("--config").arg(config.path());
    cmd.assert()
        .failure()
        .stderr(contains("failed to load config"))
        .stderr(contains("damping_factor must be within [0, 1]"));
}
