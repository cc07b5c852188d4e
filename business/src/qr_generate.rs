//! Generate command + compute cache: the Fetch/Resource Manager.
//!
//! `QrGenerateCompute` is the single slot holding the live [`ResourceHandle`]
//! together with the phase and status line the UI reflects. It is only ever
//! written by commands:
//! - `GenerateQrCommand` builds the request, releases the old resource,
//!   fetches, and publishes `Ready` or `Failed`. [`generate`] flushes it
//!   only for non-empty text;
//! - `ReleaseQrCommand` empties the slot on teardown;
//! - `ReportRenderErrorCommand` turns a local decode failure into `Failed`.
//!
//! Every value a generate task publishes is stamped with that task's
//! generation, and the compute drops assignments older than what it holds.
//! Together with the cancellation done on flush, the newest Generate always
//! wins.
//!
//! Setup:
//! ```ignore
//! ctx.add_state(QrServiceConfig::default());
//! ctx.add_state(QrInput::default());
//! ctx.record_compute(QrGenerateCompute::default());
//! ctx.record_command(GenerateQrCommand);
//!
//! ctx.update::<QrInput>(|input| input.text = "Hello".to_owned());
//! generate(&mut ctx)?;
//! // every frame
//! ctx.sync_computes();
//! ```

use std::any::Any;

use log::{debug, error, info, warn};
use qrgen_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, StateCtx, TaskHandle,
    Updater,
};

use crate::config::QrServiceConfig;
use crate::error::QrError;
use crate::http::Client;
use crate::qr_input::QrInput;
use crate::qr_request::{GenerationRequest, RequestDescriptor, build};
use crate::resource::ResourceHandle;

pub const GENERATING_MESSAGE: &str = "Generating QR…";
pub const READY_MESSAGE: &str = "QR generated. You can download or open it full size.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrPhase {
    #[default]
    Idle,
    Generating,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// What the UI shows, derived from [`QrGenerateCompute`] and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub can_download: bool,
    pub can_open: bool,
    pub is_generating: bool,
    pub status: Option<StatusMessage>,
}

/// Replaces only the status line of [`QrGenerateCompute`].
///
/// Phase, resource and generation are left as they are, so a request in
/// flight still lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrStatusNotice(pub StatusMessage);

#[derive(Debug, Clone, Default)]
pub struct QrGenerateCompute {
    pub phase: QrPhase,
    pub status: Option<StatusMessage>,
    pub resource: Option<ResourceHandle>,
    /// Generation of the generate task that produced this value, 0 before any.
    pub generation: u64,
}

impl QrGenerateCompute {
    pub fn generating(generation: u64) -> Self {
        Self {
            phase: QrPhase::Generating,
            status: Some(StatusMessage::info(GENERATING_MESSAGE)),
            resource: None,
            generation,
        }
    }

    pub fn ready(generation: u64, resource: ResourceHandle) -> Self {
        Self {
            phase: QrPhase::Ready,
            status: Some(StatusMessage::info(READY_MESSAGE)),
            resource: Some(resource),
            generation,
        }
    }

    /// Terminal failure: error status and no resource.
    pub fn failed(generation: u64, err: &QrError) -> Self {
        Self {
            phase: QrPhase::Failed,
            status: Some(StatusMessage::error(err.user_message())),
            resource: None,
            generation,
        }
    }

    /// Drops the live resource, if any, and goes back to `Idle`.
    pub fn release(&mut self) -> Option<ResourceHandle> {
        let released = self.resource.take();
        if released.is_some() {
            self.phase = QrPhase::Idle;
        }
        released
    }

    pub fn is_generating(&self) -> bool {
        self.phase == QrPhase::Generating
    }

    pub fn live_locator(&self) -> Option<&str> {
        self.resource.as_ref().map(ResourceHandle::locator)
    }

    pub fn ui_state(&self) -> UiState {
        let live = self.resource.is_some();
        UiState {
            can_download: live,
            can_open: live,
            is_generating: self.is_generating(),
            status: self.status.clone(),
        }
    }
}

impl Compute for QrGenerateCompute {
    fn deps(&self) -> ComputeDeps {
        // Cache written by commands only.
        (Vec::new(), Vec::new())
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        let new_self = match new_self.downcast::<QrStatusNotice>() {
            Ok(notice) => {
                self.status = Some(notice.0);
                return;
            }
            Err(new_self) => new_self,
        };
        match new_self.downcast::<Self>() {
            Ok(next) if next.generation < self.generation => {
                debug!(
                    target: "qr_generate",
                    "Ignoring stale result of generation {} (holding {})",
                    next.generation, self.generation
                );
            }
            Ok(next) => *self = *next,
            Err(_) => warn!(
                target: "qr_generate",
                "Failed to assign QrGenerateCompute: type mismatch"
            ),
        }
    }
}

/// Fetch the descriptor once; anything but a 2xx image is an error.
pub async fn fetch_qr(
    descriptor: &RequestDescriptor,
    source_text: &str,
) -> Result<ResourceHandle, QrError> {
    let response = Client::get(descriptor.as_str())
        .no_cache()
        .send()
        .await
        .map_err(|err| QrError::transport(err.message))?;

    if !response.is_success() {
        return Err(QrError::network_status(response.status));
    }

    if !response.is_image() {
        return Err(QrError::InvalidPayload {
            content_type: response.content_type().unwrap_or_default().to_owned(),
        });
    }

    let content_type = response.content_type().unwrap_or_default().to_owned();
    Ok(ResourceHandle::new(response.body, content_type, source_text))
}

fn empty_input_notice(err: &QrError) -> QrStatusNotice {
    QrStatusNotice(StatusMessage::error(err.user_message()))
}

/// What the Generate button does.
///
/// Empty text only updates the status line: no command is flushed, so a
/// request already in flight is neither cancelled nor hidden.
pub fn generate(ctx: &mut StateCtx) -> Result<(), QrError> {
    if let Err(err) = GenerationRequest::from_input(ctx.state::<QrInput>()) {
        info!(target: "qr_generate", "Generate refused: {err}");
        ctx.updater()
            .set_for::<QrGenerateCompute, _>(empty_input_notice(&err));
        return Err(err);
    }

    ctx.enqueue_command::<GenerateQrCommand>();
    ctx.flush_commands();
    Ok(())
}

/// Builds and fetches the current form. Dispatch it through [`generate`].
#[derive(Default, Debug)]
pub struct GenerateQrCommand;

impl Command for GenerateQrCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater, task: TaskHandle) -> CommandFuture {
        let generation = task.id().generation();
        let endpoint = snap.state::<QrServiceConfig>().endpoint();
        let input = snap.state::<QrInput>().clone();
        let built = build(endpoint.as_str(), &input);
        drop(snap);

        Box::pin(async move {
            let descriptor = match built {
                Ok(descriptor) => descriptor,
                Err(err @ QrError::EmptyInput) => {
                    info!(target: "qr_generate", "Generate #{generation}: {err}");
                    updater.set_for::<QrGenerateCompute, _>(empty_input_notice(&err));
                    return;
                }
                Err(err) => {
                    error!(target: "qr_generate", "Generate #{generation}: {err}");
                    updater.set(QrGenerateCompute::failed(generation, &err));
                    return;
                }
            };

            info!(target: "qr_generate", "Generate #{generation}: GET {descriptor}");
            updater.set(QrGenerateCompute::generating(generation));

            let source_text = input.text.trim().to_owned();
            let cancel = task.cancellation_token();
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(target: "qr_generate", "Generate #{generation}: superseded");
                    return;
                }
                outcome = fetch_qr(&descriptor, &source_text) => outcome,
            };

            if task.is_cancelled() {
                return;
            }

            match outcome {
                Ok(resource) => {
                    info!(
                        target: "qr_generate",
                        "Generate #{generation}: {} bytes at {}",
                        resource.bytes().len(),
                        resource.locator()
                    );
                    updater.set(QrGenerateCompute::ready(generation, resource));
                }
                Err(err) => {
                    error!(target: "qr_generate", "Generate #{generation} failed: {err}");
                    updater.set(QrGenerateCompute::failed(generation, &err));
                }
            }
        })
    }
}

/// Empties the resource slot.
///
/// Publishes from `run` itself, so the release is visible on the next
/// `sync_computes` even if the task is never polled (teardown).
#[derive(Default, Debug)]
pub struct ReleaseQrCommand;

impl Command for ReleaseQrCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater, _task: TaskHandle) -> CommandFuture {
        let mut current = snap.compute::<QrGenerateCompute>().clone();
        drop(snap);

        match current.release() {
            Some(resource) => {
                info!(target: "qr_generate", "Releasing {}", resource.locator());
                drop(resource);
                updater.set(current);
            }
            None => debug!(target: "qr_generate", "Release: nothing live"),
        }

        Box::pin(async {})
    }
}

/// The UI could not decode the resource named by `locator`.
///
/// Re-recorded with fresh values before each dispatch.
#[derive(Default, Debug, Clone)]
pub struct ReportRenderErrorCommand {
    pub locator: String,
    pub message: String,
}

impl Command for ReportRenderErrorCommand {
    fn run(&self, snap: CommandSnapshot, updater: Updater, _task: TaskHandle) -> CommandFuture {
        let current = snap.compute::<QrGenerateCompute>();
        let is_live = current.live_locator() == Some(self.locator.as_str());
        let generation = current.generation;
        drop(snap);

        let locator = self.locator.clone();
        let err = QrError::Render(self.message.clone());

        Box::pin(async move {
            if !is_live {
                debug!(target: "qr_generate", "Render error for released {locator} ignored");
                return;
            }
            error!(target: "qr_generate", "{locator}: {err}");
            updater.set(QrGenerateCompute::failed(generation, &err));
        })
    }
}
