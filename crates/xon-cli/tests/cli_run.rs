use assert_cmd::prelude::*;
use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

#[test]
fn init_then_run_json() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let scenario = tmp.path().join("scenario.toml");
    let scenario_str = scenario.to_str().expect("temp path to UTF-8");

    let mut init = Command::cargo_bin("xon")?;
    init.args(["init", scenario_str]);
    init.assert().success();
    assert!(scenario.exists(), "scenario file should be created");

    let out = tmp.path().join("out").join("trace.json");
    let out_str = out.to_str().expect("temp path to UTF-8");
    let mut run = Command::cargo_bin("xon")?;
    run.args(["run", scenario_str, "--output", out_str]);
    run.assert().success();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(value["ticks"], 101);
    assert_eq!(value["cancelled"], false);
    let spikes = value["neurons"][0]["spikes"].as_array().expect("spike array");
    assert_eq!(spikes.len(), 4);
    assert_eq!(spikes[1]["timestamp"], 31.0);

    Ok(())
}

#[test]
fn init_refuses_to_overwrite() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let scenario = tmp.path().join("scenario.toml");
    fs::write(&scenario, "# keep me\n")?;
    let scenario_str = scenario.to_str().expect("temp path to UTF-8");

    let mut init = Command::cargo_bin("xon")?;
    init.args(["init", scenario_str]);
    init.assert().failure();
    assert_eq!(fs::read_to_string(&scenario)?, "# keep me\n");

    let mut forced = Command::cargo_bin("xon")?;
    forced.args(["init", scenario_str, "--force"]);
    forced.assert().success();
    assert!(fs::read_to_string(&scenario)?.contains("[[neurons]]"));

    Ok(())
}

#[test]
fn run_default_scenario_to_stdout_csv() -> Result<(), Box<dyn Error>> {
    let mut run = Command::cargo_bin("xon")?;
    run.args(["run", "--format", "csv", "--iterations", "2"]);
    let output = run.assert()
        .success()
        .stdout(predicate::str::starts_with("neuron,time,voltage,event\n"))
        .get_output()
        .stdout
        .clone();

    let mut rdr = csv::Reader::from_reader(output.as_slice());
    let rows: Vec<(String, f64, f64, String)> = rdr.deserialize().collect::<Result<_, _>>()?;
    assert!(rows.contains(&("lif-0".to_string(), 1.0, 125.0, "sample".to_string())));
    assert!(rows.contains(&("lif-0".to_string(), 1.0, 125.0, "spike".to_string())));
    assert_eq!(rows.iter().filter(|row| row.3 == "sample").count(), 2);

    Ok(())
}

#[test]
fn run_to_closed_pipe_exits_cleanly() -> Result<(), Box<dyn Error>> {
    use std::io::Read;
    use std::process::Stdio;

    let mut child = std::process::Command::cargo_bin("xon")?
        .args(["run", "--format", "csv", "--iterations", "200000"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    // Read a little, then hang up like `head -1` would
    let mut stdout = child.stdout.take().expect("piped stdout");
    let mut first = [0u8; 16];
    stdout.read_exact(&mut first)?;
    drop(stdout);

    let status = child.wait()?;
    assert!(status.success(), "expected clean exit, got {:?}", status);

    Ok(())
}

#[test]
fn run_rejects_invalid_scenario() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let scenario = tmp.path().join("bad.toml");
    fs::write(&scenario, "[[neurons]]\nname = \"a\"\nleak_fraction = 2.0\n")?;

    let mut run = Command::cargo_bin("xon")?;
    run.args(["run", scenario.to_str().expect("temp path to UTF-8")]);
    run.assert().failure();

    let mut bad_step = Command::cargo_bin("xon")?;
    bad_step.args(["run", "--step-size", "0"]);
    bad_step.assert().failure();

    Ok(())
}
