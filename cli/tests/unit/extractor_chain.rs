//! Extractor strategies and the fallback chain, driven against the
//! recording runtime mock.

#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use slipway_cli::application::ports::{ExtractContext, ExtractError, Extractor, SilentReporter};
use slipway_cli::application::services::extractor::{
    CommandExtractor, FileExtractor, MultiExtractor, default_chain,
};
use slipway_cli::domain::Image;
use slipway_procfile::Procfile;
use tokio_util::sync::CancellationToken;

use crate::helpers::{CollectingReporter, empty_archive};
use crate::mocks::{CopyOutcome, RecordingRuntime};

fn image() -> Image {
    Image::new("acme/web", "v42")
}

// ── FileExtractor ────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_extractor_returns_procfile_and_removes_container() {
    let runtime = Arc::new(RecordingRuntime::with_procfile("web: ./bin/web\n"));
    let ctx = ExtractContext::new(&SilentReporter);

    let raw = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect("extract");

    assert_eq!(raw, b"web: ./bin/web\n");
    assert_eq!(
        runtime.calls(),
        ["create_container", "inspect_container", "copy_out", "remove_container"]
    );
}

#[tokio::test]
async fn file_extractor_missing_file_is_not_found_and_still_removes() {
    let runtime = Arc::new(RecordingRuntime::without_procfile());
    let ctx = ExtractContext::new(&SilentReporter);

    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("no Procfile");

    assert!(err.is_not_found(), "got: {err}");
    assert_eq!(runtime.count("create_container"), 1);
    assert_eq!(runtime.count("remove_container"), 1);
}

#[tokio::test]
async fn file_extractor_empty_archive_is_not_found() {
    let runtime = Arc::new(RecordingRuntime::new(CopyOutcome::Archive(empty_archive())));
    let ctx = ExtractContext::new(&SilentReporter);

    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("empty archive");

    assert!(err.is_not_found(), "got: {err}");
    assert_eq!(runtime.count("remove_container"), 1);
}

#[tokio::test]
async fn file_extractor_transport_error_propagates_and_still_removes() {
    let runtime = Arc::new(RecordingRuntime::new(CopyOutcome::Fail));
    let ctx = ExtractContext::new(&SilentReporter);

    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("copy fails");

    assert!(matches!(err, ExtractError::Transport(_)), "got: {err}");
    assert_eq!(err.to_string(), "copy interrupted");
    assert_eq!(runtime.count("remove_container"), 1);
}

#[tokio::test]
async fn file_extractor_remove_failure_does_not_override_result() {
    let runtime = Arc::new(RecordingRuntime::with_procfile("web: ./bin/web\n").failing_remove());
    let ctx = ExtractContext::new(&SilentReporter);

    let raw = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect("remove failure is only logged");

    assert_eq!(raw, b"web: ./bin/web\n");
    assert_eq!(runtime.count("remove_container"), 1);
}

#[tokio::test]
async fn file_extractor_create_failure_skips_remove() {
    let runtime = Arc::new(RecordingRuntime::without_procfile().failing_create());
    let ctx = ExtractContext::new(&SilentReporter);

    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("create fails");

    assert!(matches!(err, ExtractError::Transport(_)), "got: {err}");
    assert_eq!(runtime.calls(), ["create_container"]);
}

#[tokio::test]
async fn file_extractor_cancelled_mid_copy_still_removes_container() {
    let runtime = Arc::new(RecordingRuntime::new(CopyOutcome::Hang));
    let cancel = CancellationToken::new();
    let ctx = ExtractContext::new(&SilentReporter).with_cancel(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });
    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("cancelled");
    canceller.await.expect("canceller");

    assert!(matches!(err, ExtractError::Cancelled), "got: {err}");
    assert_eq!(runtime.count("copy_out"), 1);
    assert_eq!(runtime.count("remove_container"), 1);
}

#[tokio::test(start_paused = true)]
async fn file_extractor_cancelled_during_create_removes_late_container() {
    let runtime = Arc::new(
        RecordingRuntime::with_procfile("web: ./bin/web\n").slow_create(Duration::from_secs(5)),
    );
    let cancel = CancellationToken::new();
    let ctx = ExtractContext::new(&SilentReporter).with_cancel(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });
    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("cancelled");
    canceller.await.expect("canceller");

    assert!(matches!(err, ExtractError::Cancelled), "got: {err}");
    assert_eq!(runtime.calls(), ["create_container", "remove_container"]);
}

#[tokio::test]
async fn file_extractor_already_cancelled_makes_no_calls() {
    let runtime = Arc::new(RecordingRuntime::with_procfile("web: ./bin/web\n"));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = ExtractContext::new(&SilentReporter).with_cancel(cancel);

    let err = FileExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect_err("cancelled");

    assert!(matches!(err, ExtractError::Cancelled));
    assert!(runtime.calls().is_empty());
}

// ── CommandExtractor ─────────────────────────────────────────────────────────

#[tokio::test]
async fn command_extractor_synthesizes_web_process() {
    let runtime = Arc::new(
        RecordingRuntime::without_procfile().with_command(&["/go/bin/app"], &["server"]),
    );
    let ctx = ExtractContext::new(&SilentReporter);

    let raw = CommandExtractor::new(Arc::clone(&runtime))
        .extract(&ctx, &image())
        .await
        .expect("extract");

    assert_eq!(
        String::from_utf8(raw.clone()).expect("utf8"),
        "web:\n  command:\n  - /go/bin/app\n  - server\n"
    );
    assert_eq!(
        slipway_procfile::parse(&raw).expect("parse"),
        Procfile::from_argv("web", vec!["/go/bin/app".into(), "server".into()])
    );
    assert_eq!(runtime.calls(), ["inspect_image"]);
}

#[tokio::test]
async fn command_extractor_without_default_command_is_not_found() {
    let runtime = Arc::new(RecordingRuntime::without_procfile());
    let ctx = ExtractContext::new(&SilentReporter);

    let err = CommandExtractor::new(runtime)
        .extract(&ctx, &image())
        .await
        .expect_err("no command");

    assert!(err.is_not_found(), "got: {err}");
}

// ── MultiExtractor ───────────────────────────────────────────────────────────

#[tokio::test]
async fn chain_prefers_in_image_procfile() {
    let runtime = Arc::new(
        RecordingRuntime::with_procfile("web: ./bin/web\nworker: ./bin/worker\n")
            .with_command(&["/go/bin/app"], &[]),
    );
    let reporter = CollectingReporter::default();
    let ctx = ExtractContext::new(&reporter);

    let raw = default_chain(&runtime)
        .extract(&ctx, &image())
        .await
        .expect("extract");

    assert_eq!(raw, b"web: ./bin/web\nworker: ./bin/worker\n");
    assert_eq!(runtime.count("inspect_image"), 0);
    assert_eq!(
        reporter.events(),
        ["step: looking for /home/app/Procfile in acme/web:v42"]
    );
}

#[tokio::test]
async fn chain_falls_back_to_default_command_when_file_missing() {
    let chained = Arc::new(
        RecordingRuntime::without_procfile().with_command(&["/go/bin/app"], &["server"]),
    );
    let direct = Arc::new(
        RecordingRuntime::without_procfile().with_command(&["/go/bin/app"], &["server"]),
    );
    let ctx = ExtractContext::new(&SilentReporter);

    let via_chain = default_chain(&chained)
        .extract(&ctx, &image())
        .await
        .expect("fallback");
    let via_command = CommandExtractor::new(direct)
        .extract(&ctx, &image())
        .await
        .expect("direct");

    assert_eq!(via_chain, via_command);
    assert_eq!(chained.count("create_container"), 1);
    assert_eq!(chained.count("remove_container"), 1);
    assert_eq!(chained.count("inspect_image"), 1);
}

#[tokio::test]
async fn chain_falls_back_on_transport_error_too() {
    let runtime = Arc::new(RecordingRuntime::new(CopyOutcome::Fail).with_command(&[], &["run"]));
    let ctx = ExtractContext::new(&SilentReporter);

    let raw = default_chain(&runtime)
        .extract(&ctx, &image())
        .await
        .expect("fallback");

    assert_eq!(
        slipway_procfile::parse(&raw).expect("parse"),
        Procfile::from_argv("web", vec!["run".into()])
    );
}

#[tokio::test]
async fn chain_returns_last_error_when_all_fail() {
    let runtime = Arc::new(RecordingRuntime::without_procfile().failing_inspect());
    let ctx = ExtractContext::new(&SilentReporter);

    let err = default_chain(&runtime)
        .extract(&ctx, &image())
        .await
        .expect_err("both fail");

    assert!(matches!(err, ExtractError::Transport(_)), "got: {err}");
    assert!(err.to_string().contains("daemon unavailable"), "got: {err}");
    assert_eq!(runtime.count("create_container"), 1);
    assert_eq!(runtime.count("remove_container"), 1);
}

#[tokio::test]
async fn chain_stops_on_cancellation() {
    let runtime = Arc::new(RecordingRuntime::new(CopyOutcome::Hang).with_command(&["app"], &[]));
    let cancel = CancellationToken::new();
    let ctx = ExtractContext::new(&SilentReporter).with_cancel(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });
    let err = default_chain(&runtime)
        .extract(&ctx, &image())
        .await
        .expect_err("cancelled");
    canceller.await.expect("canceller");

    assert!(matches!(err, ExtractError::Cancelled));
    assert_eq!(runtime.count("remove_container"), 1);
    assert_eq!(runtime.count("inspect_image"), 0);
}

#[tokio::test]
async fn empty_chain_is_not_found() {
    let chain = MultiExtractor::default();
    assert!(chain.is_empty());

    let err = chain
        .extract(&ExtractContext::new(&SilentReporter), &image())
        .await
        .expect_err("nothing to try");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn each_invocation_creates_and_removes_exactly_once() {
    let runtime = Arc::new(RecordingRuntime::with_procfile("web: ./bin/web\n"));
    let chain = default_chain(&runtime);
    let ctx = ExtractContext::new(&SilentReporter);

    for _ in 0..3 {
        chain.extract(&ctx, &image()).await.expect("extract");
    }

    assert_eq!(chain.len(), 2);
    assert_eq!(runtime.count("create_container"), 3);
    assert_eq!(runtime.count("remove_container"), 3);
}
