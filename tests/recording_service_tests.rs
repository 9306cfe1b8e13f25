// Integration tests for the recording service
//
// These tests run ServiceAudioRecorder over a fake recorder with tokio's
// clock paused, so duration ticks and amplitude polls are deterministic.

mod support;

use anyhow::Result;
use audiorecorder::recorder::{
    MediaRecorderRecorder, Microphone, Output, Recorder, SimulatedMediaRecorder,
};
use audiorecorder::recording::{AudioRecorder, RecordingSession, ServiceAudioRecorder, UpdateIntervals};
use audiorecorder::{RecorderError, RecorderResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use support::FakeRecorder;
use tempfile::TempDir;
use tokio::time::sleep;

fn service() -> (ServiceAudioRecorder, FakeRecorder) {
    let fake = FakeRecorder::new();
    let service = ServiceAudioRecorder::new(Box::new(fake.clone()), UpdateIntervals::default());
    (service, fake)
}

fn current(service: &ServiceAudioRecorder) -> Option<RecordingSession> {
    service.current_session().borrow().clone()
}

#[tokio::test(start_paused = true)]
async fn test_start_passes_output_to_recorder() -> Result<()> {
    let (service, fake) = service();

    for output in Output::ALL {
        service.start("blah".to_string(), output).await?;
        service.stop().await?;
        assert_eq!(fake.output(), Some(output));
    }

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_start_publishes_session() -> Result<()> {
    let (service, _fake) = service();
    assert!(current(&service).is_none());

    service.start("question-1".to_string(), Output::Aac).await?;

    let session = current(&service).expect("session published");
    assert_eq!(session.id, "question-1");
    assert_eq!(session.file, None);
    assert_eq!(session.duration_ms, 0);
    assert!(service.is_recording());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_start_increments_duration_every_second() -> Result<()> {
    let (service, _fake) = service();
    service.start("blah".to_string(), Output::Aac).await?;

    assert_eq!(current(&service).map(|s| s.duration_ms), Some(0));

    sleep(Duration::from_millis(500)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(0));

    sleep(Duration::from_millis(550)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(1000));

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(3000));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_start_updates_amplitude() -> Result<()> {
    let (service, fake) = service();
    service.start("blah".to_string(), Output::Aac).await?;

    fake.set_amplitude(12);
    sleep(Duration::from_millis(150)).await;
    assert_eq!(current(&service).map(|s| s.amplitude), Some(12));

    fake.set_amplitude(45);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(current(&service).map(|s| s.amplitude), Some(45));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_start_when_recorder_fails_sets_failed_to_start() -> Result<()> {
    let (service, fake) = service();
    fake.fail_on_start(RecorderError::MicInUse);

    service.start("blah".to_string(), Output::Aac).await?;

    let session = current(&service).expect("failed session published");
    assert_eq!(session.failed_to_start, Some(RecorderError::MicInUse));
    assert!(!service.is_recording());
    assert!(fake.was_cancelled(), "Recorder should be cleaned up after failing");

    // No updates run for a session that never started
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(0));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_start_while_recording_is_ignored() -> Result<()> {
    let (service, fake) = service();

    assert!(service.start("first".to_string(), Output::Aac).await?);
    assert!(!service.start("second".to_string(), Output::Amr).await?);

    assert!(!fake.was_cancelled(), "Live session must not be cancelled");
    assert_eq!(current(&service).map(|s| s.id), Some("first".to_string()));
    assert_eq!(fake.output(), Some(Output::Aac));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_sets_file_and_stops_updates() -> Result<()> {
    let (service, _fake) = service();
    service.start("blah".to_string(), Output::Amr).await?;
    sleep(Duration::from_millis(1050)).await;

    let session = service.stop().await?.expect("finished session");
    assert_eq!(session.file, Some(FakeRecorder::file_for(Output::Amr)));
    assert_eq!(session.duration_ms, 1000);
    assert!(!service.is_recording());

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(1000));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_without_recording_returns_none() -> Result<()> {
    let (service, _fake) = service();

    assert!(service.stop().await?.is_none());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_duration_until_resume() -> Result<()> {
    let (service, fake) = service();
    service.start("blah".to_string(), Output::Aac).await?;
    sleep(Duration::from_millis(1050)).await;

    service.pause().await?;
    assert!(fake.is_paused());
    assert_eq!(current(&service).map(|s| s.paused), Some(true));
    assert!(service.is_recording(), "Paused session is still live");

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(1000));

    service.resume().await?;
    assert_eq!(current(&service).map(|s| s.paused), Some(false));

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(current(&service).map(|s| s.duration_ms), Some(2000));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_pause_without_recording_fails() -> Result<()> {
    let (service, _fake) = service();

    assert!(service.pause().await.is_err());
    assert!(service.resume().await.is_err());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_clean_up_cancels_recorder_and_clears_session() -> Result<()> {
    let (service, fake) = service();
    service.start("blah".to_string(), Output::Aac).await?;

    service.clean_up().await?;

    assert!(fake.was_cancelled());
    assert!(current(&service).is_none());
    assert!(!service.is_recording());

    // A new session can start afterwards
    service.start("again".to_string(), Output::Amr).await?;
    assert!(service.is_recording());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_observers_are_notified_of_changes() -> Result<()> {
    let (service, _fake) = service();
    let mut rx = service.current_session();

    service.start("blah".to_string(), Output::Aac).await?;
    rx.changed().await?;
    assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.id.clone()), Some("blah".to_string()));

    service.stop().await?;
    rx.changed().await?;
    assert!(rx.borrow().as_ref().and_then(|s| s.file.clone()).is_some());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_failure_discards_session() -> Result<()> {
    let (service, fake) = service();
    service.start("blah".to_string(), Output::Aac).await?;
    sleep(Duration::from_millis(1050)).await;

    fake.fail_on_stop(RecorderError::Device("Encoder failed to finalize".to_string()));
    let err = service.stop().await.unwrap_err();

    assert!(format!("{:#}", err).contains("Encoder failed to finalize"));
    assert!(current(&service).is_none(), "Failed session should be cleared");
    assert!(!service.is_recording());

    // No updates are left running, and the next start is not ignored
    sleep(Duration::from_millis(2000)).await;
    assert!(current(&service).is_none());

    assert!(service.start("again".to_string(), Output::Amr).await?);
    assert!(service.is_recording());

    Ok(())
}

/// Recorder whose start holds its thread for a while, like a slow device
struct SlowStart<R> {
    inner: R,
    delay: Duration,
}

impl<R: Recorder> Recorder for SlowStart<R> {
    fn start(&mut self, output: Output) -> RecorderResult<()> {
        self.inner.start(output)?;
        std::thread::sleep(self.delay);
        Ok(())
    }

    fn pause(&mut self) -> RecorderResult<()> {
        self.inner.pause()
    }

    fn resume(&mut self) -> RecorderResult<()> {
        self.inner.resume()
    }

    fn stop(&mut self) -> RecorderResult<PathBuf> {
        self.inner.stop()
    }

    fn cancel(&mut self) {
        self.inner.cancel()
    }

    fn is_recording(&self) -> bool {
        self.inner.is_recording()
    }

    fn amplitude(&mut self) -> i32 {
        self.inner.amplitude()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_overlapping_starts_keep_first_session() -> Result<()> {
    let cache_dir = TempDir::new()?;
    let microphone = Microphone::new();
    let guard = MediaRecorderRecorder::new(cache_dir.path(), move || {
        SimulatedMediaRecorder::new(microphone.clone())
    });
    let service = Arc::new(ServiceAudioRecorder::new(
        Box::new(SlowStart {
            inner: guard,
            delay: Duration::from_millis(100),
        }),
        UpdateIntervals::default(),
    ));

    let first = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.start("first".to_string(), Output::Amr).await }
    });
    sleep(Duration::from_millis(20)).await;
    let second = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.start("second".to_string(), Output::Aac).await }
    });

    assert!(first.await??);
    assert!(!second.await??, "Start during a live session should be ignored");

    let session = current(&service).expect("first session published");
    assert_eq!(session.id, "first");
    assert!(session.failed_to_start.is_none());
    assert!(service.is_recording());

    let files = std::fs::read_dir(cache_dir.path())?.count();
    assert_eq!(files, 1, "Only the first start should create a file");

    let finished = service.stop().await?.expect("finished session");
    let file = finished.file.expect("recorded file");
    assert!(file.exists());
    assert!(file.to_string_lossy().ends_with(".amr"));

    Ok(())
}
