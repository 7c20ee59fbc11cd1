#![cfg(unix)]

mod common;

use std::fs;
use std::time::Duration;

use common::{entries, fake_rscript, GRAB_SCRIPT};
use rinterface::{ColumnData, Error, RInterface, RInterfaceConfig, RunOptions, Value};
use tempfile::TempDir;

fn interface(fake: &str, temp_root: &TempDir) -> RInterface {
    RInterface::new(
        RInterfaceConfig::default()
            .with_rscript(fake_rscript(fake))
            .with_temp_root(temp_root.path()),
    )
}

#[tokio::test]
async fn captures_stdout_and_stderr() {
    let tmp = TempDir::new().unwrap();
    let out = interface("echo", &tmp)
        .run("print('hello')", &RunOptions::capture())
        .await
        .unwrap();

    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout.as_deref(), Some("hello from R\n"));
    assert_eq!(out.stderr.as_deref(), Some("a warning\n"));
    assert!(out.values.is_empty());
    assert!(entries(tmp.path()).is_empty(), "temp dir should be removed");
}

#[tokio::test]
async fn uncaptured_run_returns_no_streams() {
    let tmp = TempDir::new().unwrap();
    let out = interface("silent", &tmp)
        .run("x <- 1", &RunOptions::default())
        .await
        .unwrap();
    assert!(out.stdout.is_none());
    assert!(out.stderr.is_none());
}

#[tokio::test]
async fn interpreter_receives_the_script() {
    let tmp = TempDir::new().unwrap();
    let out = interface("cat", &tmp)
        .run("x <- 1\nprint(x)", &RunOptions::capture())
        .await
        .unwrap();
    assert_eq!(out.stdout.as_deref(), Some("x <- 1\nprint(x)"));
}

#[tokio::test]
async fn grab_instrumentation_is_appended() {
    let tmp = TempDir::new().unwrap();
    let options = RunOptions::capture().with_grab(true);
    // the fake only echoes the script, so no side file is written
    let err = interface("cat", &tmp).run(GRAB_SCRIPT, &options).await.unwrap_err();
    assert!(matches!(err, Error::MissingGrabOutput(_)), "{err}");

    let dir = TempDir::new().unwrap();
    let rinterface = RInterface::new(
        RInterfaceConfig::default()
            .with_rscript(fake_rscript("cat"))
            .with_temp_root(dir.path())
            .with_keep_temp(true),
    );
    let _ = rinterface.run(GRAB_SCRIPT, &options).await;
    let kept = entries(dir.path());
    assert_eq!(kept.len(), 1);
    let script = fs::read_to_string(kept[0].join("script.R")).unwrap();
    assert!(script.starts_with(GRAB_SCRIPT));
    assert!(script.contains(".rinterface_emit(\"df\", `df`, 4L)"));
}

#[tokio::test]
async fn failure_surfaces_exit_code_and_streams() {
    let tmp = TempDir::new().unwrap();
    let err = interface("fail", &tmp)
        .run("stop()", &RunOptions::capture())
        .await
        .unwrap_err();
    match &err {
        Error::Execution { code, stdout, stderr } => {
            assert_eq!(*code, Some(3));
            assert_eq!(stdout, "partial output\n");
            assert!(stderr.contains("object 'y' not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("exit code=3"));
    assert!(message.contains("--- R stderr ---"));
    assert!(entries(tmp.path()).is_empty());
}

#[tokio::test]
async fn missing_interpreter() {
    let tmp = TempDir::new().unwrap();
    let rinterface = RInterface::new(
        RInterfaceConfig::default()
            .with_rscript("/nonexistent/bin/Rscript")
            .with_temp_root(tmp.path()),
    );
    let err = rinterface.run("1", &RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::InterpreterNotFound { .. }), "{err}");
    assert!(matches!(rinterface.check().await, Err(Error::InterpreterNotFound { .. })));
}

#[tokio::test]
async fn timeout_kills_the_interpreter() {
    let tmp = TempDir::new().unwrap();
    let rinterface = RInterface::new(
        RInterfaceConfig::default()
            .with_rscript(fake_rscript("sleep"))
            .with_temp_root(tmp.path())
            .with_timeout(Some(Duration::from_millis(200))),
    );
    let started = std::time::Instant::now();
    let err = rinterface.run("Sys.sleep(5)", &RunOptions::capture()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn grabs_typed_values() {
    let tmp = TempDir::new().unwrap();
    let out = interface("grab", &tmp)
        .run(GRAB_SCRIPT, &RunOptions::grab().with_capture(true))
        .await
        .unwrap();

    let names: Vec<_> = out.values.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["n", "labels", "m", "df"]);
    assert_eq!(out.value("n"), Some(&Value::Int(42)));
    assert_eq!(
        out.value("labels"),
        Some(&Value::StrList(vec!["a".into(), "b, c".into()]))
    );

    let m = out.value("m").and_then(Value::as_array).unwrap();
    assert_eq!(m.shape(), &[2, 2]);
    assert_eq!(m.data(), &[1.0, 3.0, 2.0, 4.0]);

    let df = out.value("df").and_then(Value::as_data_frame).unwrap();
    assert_eq!(df.column("id"), Some(&ColumnData::Int(vec![Some(1), Some(2)])));
    assert_eq!(
        df.column("species"),
        Some(&ColumnData::Str(vec![Some("setosa".into()), None]))
    );

    assert_eq!(out.stdout.as_deref(), Some("done\n"));
    assert!(entries(tmp.path()).is_empty(), "temp files should be cleaned up");
}

#[tokio::test]
async fn grab_disabled_ignores_tags() {
    let tmp = TempDir::new().unwrap();
    let out = interface("grab", &tmp)
        .run(GRAB_SCRIPT, &RunOptions::capture())
        .await
        .unwrap();
    assert!(out.values.is_empty());
}

#[tokio::test]
async fn invalid_tags_fail_before_running() {
    let tmp = TempDir::new().unwrap();
    let err = interface("fail", &tmp)
        .run("x <- 1\n# @grab{int}\nprint(x)\n", &RunOptions::grab())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTag { line: 2, .. }), "{err}");
    assert!(entries(tmp.path()).is_empty());
}

#[tokio::test]
async fn tagless_grab_needs_no_side_file() {
    let tmp = TempDir::new().unwrap();
    let out = interface("silent", &tmp)
        .run("x <- 1", &RunOptions::grab())
        .await
        .unwrap();
    assert!(out.values.is_empty());
}

#[tokio::test]
async fn saves_the_script() {
    let tmp = TempDir::new().unwrap();
    let saved = tmp.path().join("saved.R");
    let work = TempDir::new().unwrap();
    interface("grab", &work)
        .run(GRAB_SCRIPT, &RunOptions::grab().save_to(&saved))
        .await
        .unwrap();
    let script = fs::read_to_string(&saved).unwrap();
    assert!(script.starts_with(GRAB_SCRIPT));
    assert!(script.contains(".rinterface_emit <- function"));
    assert!(script.contains(".rinterface_emit(\"df\", `df`, 4L)"));
    assert!(entries(work.path()).is_empty());
}

#[tokio::test]
async fn kept_temp_dir_retains_data_frame_csv() {
    let dir = TempDir::new().unwrap();
    let rinterface = RInterface::new(
        RInterfaceConfig::default()
            .with_rscript(fake_rscript("grab"))
            .with_temp_root(dir.path())
            .with_keep_temp(true),
    );
    let out = rinterface
        .run(GRAB_SCRIPT, &RunOptions::grab().with_capture(true))
        .await
        .unwrap();
    let df = out.value("df").and_then(Value::as_data_frame).unwrap();
    assert_eq!(df.nrows(), 2);

    let kept = entries(dir.path());
    assert_eq!(kept.len(), 1);
    assert!(kept[0].join("script.R").exists());
    assert!(kept[0].join("grab_output.txt").exists());
    assert!(kept[0].join("grab_df_4.csv").exists());
}

#[tokio::test]
async fn runs_in_the_configured_work_dir() {
    let tmp = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let rinterface = RInterface::new(
        RInterfaceConfig::default()
            .with_rscript(fake_rscript("pwd"))
            .with_temp_root(tmp.path())
            .with_work_dir(work.path()),
    );
    let out = rinterface.run("getwd()", &RunOptions::capture()).await.unwrap();
    let reported = std::path::PathBuf::from(out.stdout.unwrap().trim());
    assert_eq!(
        reported.canonicalize().unwrap(),
        work.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn run_file_reads_the_script() {
    let tmp = TempDir::new().unwrap();
    let script = tmp.path().join("analysis.R");
    fs::write(&script, "summary(cars)\n").unwrap();
    let work = TempDir::new().unwrap();
    let out = interface("cat", &work)
        .run_file(&script, &RunOptions::capture())
        .await
        .unwrap();
    assert_eq!(out.stdout.as_deref(), Some("summary(cars)\n"));
}

#[tokio::test]
async fn check_reports_the_version_banner() {
    let tmp = TempDir::new().unwrap();
    let banner = interface("version", &tmp).check().await.unwrap();
    assert_eq!(banner, "Rscript (R) version 4.3.1 (2023-06-16)");

    let banner = interface("old-version", &tmp).check().await.unwrap();
    assert_eq!(banner, "R scripting front-end version 3.6.3");
}
