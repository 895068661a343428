// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive session — the selected tool, its working set, text buffer and
// options, and the idle/running state machine around one dispatcher
// invocation.
//
// State lives behind `Arc<Mutex<>>` so clones of a `Session` can be handed to
// tasks. The lock is only held for short bookkeeping, never across an await.
// Each invocation runs as its own task and owns a `RunningGuard`, which is
// the only thing that returns the session to idle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::human_errors::{HumanError, humanize_error};
use pdfmaster_core::{FileId, InputKind, OptionMap, ToolId};
use tracing::{debug, info, warn};

use crate::delivery::{ArtifactSink, DeliveryReceipt};
use crate::dispatcher::{DispatchRequest, Dispatcher};
use crate::intake::{InputFile, WorkingSet};
use crate::operations::Notice;

/// Whether an invocation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
}

/// What a successful `process` call hands back.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub receipt: DeliveryReceipt,
    pub notices: Vec<Notice>,
}

#[derive(Default)]
struct SessionState {
    tool: Option<ToolId>,
    working_set: WorkingSet,
    text: String,
    options: OptionMap,
    status: SessionStatus,
    last_error: Option<HumanError>,
    /// Bumped whenever the session is reset; an invocation started under an
    /// older generation has its result discarded.
    generation: u64,
}

impl SessionState {
    fn reset(&mut self, tool: Option<ToolId>) {
        self.tool = tool;
        self.working_set.clear();
        self.text.clear();
        self.options.clear();
        self.last_error = None;
        self.generation += 1;
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.status {
            SessionStatus::Idle => Ok(()),
            SessionStatus::Running => Err(PdfMasterError::Busy),
        }
    }
}

/// Held by the task of an in-flight invocation; dropping it (normal return,
/// panic or runtime shutdown) puts the session back to idle.
struct RunningGuard {
    state: Arc<Mutex<SessionState>>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.status = SessionStatus::Idle;
    }
}

/// One user's interaction with the toolkit.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn ArtifactSink>,
}

impl Session {
    pub fn new(dispatcher: Dispatcher, sink: impl ArtifactSink + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            dispatcher: Arc::new(dispatcher),
            sink: Arc::new(sink),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Every critical section leaves the state consistent, so a panic in
        // another holder does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Tool selection -------------------------------------------------------

    /// Pick a tool. Files, text, options and any reported error are dropped.
    pub fn select_tool(&self, tool: ToolId) {
        let mut state = self.lock();
        state.reset(Some(tool));
        info!(tool = %tool, "Tool selected");
    }

    /// End the session. An invocation still in flight finishes, but its
    /// result is discarded; a file it already delivered is withdrawn.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.status == SessionStatus::Running {
            warn!("Session closed while an operation is running; its result will be discarded");
        }
        state.reset(None);
        debug!("Session closed");
    }

    // -- Staging --------------------------------------------------------------

    /// Add a batch of files; all-or-nothing on media type.
    pub fn submit(&self, batch: Vec<InputFile>) -> Result<usize> {
        let mut state = self.lock();
        state.ensure_idle()?;
        let tool = state.tool.ok_or(PdfMasterError::NoToolSelected)?;

        match state.working_set.submit(batch, tool) {
            Ok(added) => {
                state.last_error = None;
                Ok(added)
            }
            Err(err) => {
                state.last_error = Some(humanize_error(&err));
                Err(err)
            }
        }
    }

    /// Remove a staged file. Returns whether it was present.
    pub fn remove(&self, id: FileId) -> Result<bool> {
        let mut state = self.lock();
        state.ensure_idle()?;
        Ok(state.working_set.remove(id))
    }

    /// Set one raw option value. Legality is checked when processing starts.
    pub fn set_option(&self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut state = self.lock();
        state.ensure_idle()?;
        state.options.set(name, value);
        Ok(())
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<()> {
        let mut state = self.lock();
        state.ensure_idle()?;
        state.text = text.into();
        Ok(())
    }

    // -- Inspection -----------------------------------------------------------

    pub fn tool(&self) -> Option<ToolId> {
        self.lock().tool
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    /// Staged files in arrival order.
    pub fn files(&self) -> Vec<InputFile> {
        self.lock().working_set.files().to_vec()
    }

    /// The last error reported to the user, if it has not been cleared.
    pub fn last_error(&self) -> Option<HumanError> {
        self.lock().last_error.clone()
    }

    /// True when `process` would get past the entry guard.
    pub fn can_process(&self) -> bool {
        let state = self.lock();
        match state.tool {
            None => false,
            Some(_) if state.status == SessionStatus::Running => false,
            Some(tool) if tool.input_kind() == InputKind::Text => !state.text.trim().is_empty(),
            Some(_) => !state.working_set.is_empty(),
        }
    }

    // -- Processing -----------------------------------------------------------

    /// Run the selected tool over the staged input and deliver the result.
    ///
    /// Only one invocation runs at a time; a second call while one is in
    /// flight fails with [`PdfMasterError::Busy`] and changes nothing. On
    /// success the session is closed. On failure the error is recorded and
    /// the working set is kept for a retry.
    ///
    /// The invocation is spawned onto the runtime. Dropping the returned
    /// future (a timeout, a losing `select!` branch) does not cancel it: it
    /// still finishes its bookkeeping and the session becomes idle again.
    pub async fn process(&self) -> Result<SessionOutcome> {
        let (request, generation) = {
            let mut state = self.lock();
            state.ensure_idle()?;
            let tool = state.tool.ok_or(PdfMasterError::NoToolSelected)?;
            let request = DispatchRequest {
                tool,
                files: state.working_set.files().to_vec(),
                text: state.text.clone(),
                options: state.options.clone(),
            };
            state.status = SessionStatus::Running;
            state.last_error = None;
            (request, state.generation)
        };
        let guard = RunningGuard {
            state: Arc::clone(&self.state),
        };

        let session = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            session.complete(request, generation).await
        })
        .await
        .map_err(|err| PdfMasterError::Task(err.to_string()))?
    }

    /// Run, then record the outcome. A result whose session was reset in the
    /// meantime is discarded, and withdrawn from the sink if it got there.
    async fn complete(&self, request: DispatchRequest, generation: u64) -> Result<SessionOutcome> {
        let outcome = self.run(request, generation).await;

        let late = {
            let mut state = self.lock();
            if state.generation == generation {
                return match outcome {
                    Ok(outcome) => {
                        state.reset(None);
                        Ok(outcome)
                    }
                    Err(err) => {
                        warn!(error = %err, "Operation failed");
                        state.last_error = Some(humanize_error(&err));
                        Err(err)
                    }
                };
            }
            outcome.ok()
        };

        if let Some(outcome) = late {
            let sink = Arc::clone(&self.sink);
            let receipt = outcome.receipt;
            match tokio::task::spawn_blocking(move || sink.withdraw(&receipt)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "Could not withdraw a discarded artifact"),
                Err(err) => warn!(error = %err, "Withdraw task failed"),
            }
        }
        debug!("Result discarded; session was reset while running");
        Err(PdfMasterError::Discarded)
    }

    async fn run(&self, request: DispatchRequest, generation: u64) -> Result<SessionOutcome> {
        let result = self.dispatcher.dispatch(request).await?;

        // Nothing is delivered for a session that was reset meanwhile.
        if self.lock().generation != generation {
            return Err(PdfMasterError::Discarded);
        }

        let sink = Arc::clone(&self.sink);
        let artifact = result.artifact;
        let receipt = tokio::task::spawn_blocking(move || sink.deliver(&artifact))
            .await
            .map_err(|err| PdfMasterError::Task(err.to_string()))??;

        Ok(SessionOutcome {
            receipt,
            notices: result.notices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::FileSystemSink;
    use crate::operations::{
        Artifact, Operation, OperationInput, OperationRegistry, ProcessingResult,
    };
    use pdfmaster_core::error::ErrorClass;
    use pdfmaster_core::{PDF_MIME, ToolOptions, ToolkitConfig};
    use pdfmaster_document::fixtures::{labeled_pdf, page_labels, prefixed_pdf};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn pdf(name: &str, bytes: Vec<u8>) -> InputFile {
        InputFile::from_bytes(name, PDF_MIME, bytes)
    }

    fn session() -> (Session, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ToolkitConfig {
            simulated_delay_ms: 0,
            output_dir: dir.path().to_path_buf(),
            ..ToolkitConfig::default()
        };
        let session = Session::new(
            Dispatcher::from_config(&config),
            FileSystemSink::from_config(&config),
        );
        (session, dir)
    }

    /// Sleeps, then counts how many times it produced an artifact.
    struct SlowOperation {
        runs: Arc<AtomicUsize>,
    }

    impl Operation for SlowOperation {
        fn execute(
            &self,
            _input: &OperationInput,
            _options: &ToolOptions,
        ) -> Result<ProcessingResult> {
            std::thread::sleep(Duration::from_millis(300));
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(Artifact::pdf(b"%PDF-slow".to_vec(), "merged.pdf").into())
        }
    }

    fn slow_session(runs: Arc<AtomicUsize>) -> (Session, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut registry = OperationRegistry::new();
        registry.register(ToolId::MergePdf, SlowOperation { runs });
        let session = Session::new(Dispatcher::new(registry), FileSystemSink::new(dir.path()));
        (session, dir)
    }

    /// Signals when a delivery starts, then takes its time writing.
    struct SlowSink {
        inner: FileSystemSink,
        started: Arc<AtomicBool>,
    }

    impl ArtifactSink for SlowSink {
        fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt> {
            self.started.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
            self.inner.deliver(artifact)
        }

        fn withdraw(&self, receipt: &DeliveryReceipt) -> Result<()> {
            self.inner.withdraw(receipt)
        }
    }

    #[tokio::test]
    async fn successful_run_delivers_and_closes() {
        let (session, dir) = session();
        session.select_tool(ToolId::MergePdf);
        session
            .submit(vec![pdf("a.pdf", prefixed_pdf("A", 2)), pdf("b.pdf", prefixed_pdf("B", 1))])
            .expect("submit");
        assert!(session.can_process());

        let outcome = session.process().await.expect("process");
        assert_eq!(outcome.receipt.path, dir.path().join("merged.pdf"));
        assert!(outcome.notices.is_empty());
        let delivered = std::fs::read(&outcome.receipt.path).expect("read");
        assert_eq!(page_labels(&delivered), vec!["A 1", "A 2", "B 1"]);

        assert_eq!(session.tool(), None);
        assert!(session.files().is_empty());
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn failure_keeps_the_working_set() {
        let (session, dir) = session();
        session.select_tool(ToolId::SplitPdf);
        session.submit(vec![pdf("doc.pdf", labeled_pdf(3))]).expect("submit");
        session.set_option("pages", "2-7").expect("option");

        let err = session.process().await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Processing);
        assert_eq!(session.tool(), Some(ToolId::SplitPdf));
        assert_eq!(session.files().len(), 1);
        assert!(session.last_error().is_some());
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);

        // Correct the range and retry.
        session.set_option("pages", "2-3").expect("option");
        let outcome = session.process().await.expect("retry");
        let delivered = std::fs::read(&outcome.receipt.path).expect("read");
        assert_eq!(page_labels(&delivered), vec!["Page 2", "Page 3"]);
    }

    #[tokio::test]
    async fn zero_result_delivers_nothing() {
        let (session, dir) = session();
        session.select_tool(ToolId::ExtractPdfImages);
        session.submit(vec![pdf("plain.pdf", labeled_pdf(1))]).expect("submit");

        let err = session.process().await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::ZeroResult);
        let message = session.last_error().expect("reported").message;
        assert!(message.contains("No compatible"), "{message}");
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
    }

    #[tokio::test]
    async fn rejected_batch_is_reported_and_cleared_by_the_next_good_one() {
        let (session, _dir) = session();
        session.select_tool(ToolId::MergePdf);
        let batch = vec![
            pdf("1.pdf", labeled_pdf(1)),
            pdf("2.pdf", labeled_pdf(1)),
            InputFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec()),
            pdf("3.pdf", labeled_pdf(1)),
            pdf("4.pdf", labeled_pdf(1)),
        ];
        assert!(session.submit(batch).is_err());
        assert!(session.files().is_empty());
        assert_eq!(
            session.last_error().expect("reported").message,
            "Please upload only PDF files for this tool."
        );

        session.submit(vec![pdf("1.pdf", labeled_pdf(1))]).expect("submit");
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn changing_tool_clears_staged_input() {
        let (session, _dir) = session();
        session.select_tool(ToolId::SplitPdf);
        session.submit(vec![pdf("doc.pdf", labeled_pdf(2))]).expect("submit");
        session.set_option("pages", "1").expect("option");

        session.select_tool(ToolId::RotatePdf);
        assert!(session.files().is_empty());

        // The old `pages` option must not leak into rotate.
        session.submit(vec![pdf("doc.pdf", labeled_pdf(2))]).expect("submit");
        session.process().await.expect("rotate with defaults");
    }

    #[tokio::test]
    async fn staging_needs_a_tool() {
        let (session, _dir) = session();
        let err = session.submit(vec![pdf("doc.pdf", labeled_pdf(1))]).unwrap_err();
        assert!(matches!(err, PdfMasterError::NoToolSelected));
        assert!(matches!(session.process().await, Err(PdfMasterError::NoToolSelected)));
    }

    #[tokio::test]
    async fn second_invocation_while_running_is_refused() {
        let runs = Arc::new(AtomicUsize::new(0));
        let (session, dir) = slow_session(Arc::clone(&runs));
        session.select_tool(ToolId::MergePdf);
        let staged = pdf("a.pdf", labeled_pdf(1));
        let staged_id = staged.id;
        session.submit(vec![staged]).expect("submit");

        let background = session.clone();
        let first = tokio::spawn(async move { background.process().await });
        while session.status() != SessionStatus::Running {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(matches!(session.process().await, Err(PdfMasterError::Busy)));
        assert!(matches!(
            session.submit(vec![pdf("b.pdf", labeled_pdf(1))]),
            Err(PdfMasterError::Busy)
        ));
        assert!(matches!(session.remove(staged_id), Err(PdfMasterError::Busy)));
        assert!(!session.can_process());
        assert_eq!(session.files().len(), 1);

        first.await.expect("join").expect("first run");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 1);
    }

    #[tokio::test]
    async fn closing_mid_run_discards_the_result() {
        let runs = Arc::new(AtomicUsize::new(0));
        let (session, dir) = slow_session(Arc::clone(&runs));
        session.select_tool(ToolId::MergePdf);
        session.submit(vec![pdf("a.pdf", labeled_pdf(1))]).expect("submit");

        let background = session.clone();
        let first = tokio::spawn(async move { background.process().await });
        while session.status() != SessionStatus::Running {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        session.close();

        let result = first.await.expect("join");
        assert!(matches!(result, Err(PdfMasterError::Discarded)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn abandoned_invocation_still_returns_to_idle() {
        let runs = Arc::new(AtomicUsize::new(0));
        let (session, dir) = slow_session(Arc::clone(&runs));
        session.select_tool(ToolId::MergePdf);
        session.submit(vec![pdf("a.pdf", labeled_pdf(1))]).expect("submit");

        // The caller gives up long before the 300 ms operation finishes.
        let waited = tokio::time::timeout(Duration::from_millis(50), session.process()).await;
        assert!(waited.is_err());
        assert_eq!(session.status(), SessionStatus::Running);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while session.status() != SessionStatus::Idle {
            assert!(tokio::time::Instant::now() < deadline, "session stuck in Running");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // The detached run completed normally and closed the session.
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 1);
        assert_eq!(session.tool(), None);

        session.select_tool(ToolId::MergePdf);
        session.submit(vec![pdf("b.pdf", labeled_pdf(1))]).expect("accepts new input");
        assert!(session.can_process());
    }

    #[tokio::test]
    async fn closing_during_delivery_withdraws_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let started = Arc::new(AtomicBool::new(false));
        let config = ToolkitConfig {
            simulated_delay_ms: 0,
            ..ToolkitConfig::default()
        };
        let sink = SlowSink {
            inner: FileSystemSink::new(dir.path()),
            started: Arc::clone(&started),
        };
        let session = Session::new(Dispatcher::from_config(&config), sink);
        session.select_tool(ToolId::MergePdf);
        session.submit(vec![pdf("a.pdf", labeled_pdf(1))]).expect("submit");

        let background = session.clone();
        let first = tokio::spawn(async move { background.process().await });
        while !started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        session.close();

        let result = first.await.expect("join");
        assert!(matches!(result, Err(PdfMasterError::Discarded)));
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn protect_notice_reaches_the_caller() {
        let (session, _dir) = session();
        session.select_tool(ToolId::ProtectPdf);
        session.submit(vec![pdf("doc.pdf", labeled_pdf(1))]).expect("submit");
        session.set_option("password", "secret").expect("option");

        let outcome = session.process().await.expect("process");
        assert_eq!(outcome.notices, vec![Notice::NotEncrypted]);
        assert!(outcome.receipt.path.ends_with("protected.pdf"));
    }

    #[tokio::test]
    async fn text_tool_processes_the_buffer() {
        let (session, _dir) = session();
        session.select_tool(ToolId::TextToPdf);
        assert!(!session.can_process());
        session.set_text("A short note.").expect("text");
        assert!(session.can_process());

        let outcome = session.process().await.expect("process");
        assert!(outcome.receipt.path.ends_with("text_converted.pdf"));
    }
}
