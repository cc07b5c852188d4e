use qrgen_business::{
    QrGenerateCompute, QrServiceConfig, ReleaseQrCommand, ReportRenderErrorCommand,
    build_state_ctx, generate,
};
use qrgen_states::StateCtx;

use crate::utils::image_saver::{ImageSaver, SaveOutcome, SystemImageSaver};
use crate::widgets::{QrPreviewState, RenderFailure};

/// Everything the user can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrAction {
    Generate,
    Download,
    Open,
    Release,
}

/// The main application state.
pub struct State {
    /// Business states, computes and commands.
    pub ctx: StateCtx,
    pub preview: QrPreviewState,
    pub saver: Box<dyn ImageSaver>,
    /// Last failed download, shown under the actions.
    pub download_error: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        Self::new(QrServiceConfig::default(), Box::new(SystemImageSaver))
    }
}

impl State {
    pub fn new(config: QrServiceConfig, saver: Box<dyn ImageSaver>) -> Self {
        Self {
            ctx: build_state_ctx(config),
            preview: QrPreviewState::default(),
            saver,
            download_error: None,
        }
    }

    pub fn generated(&self) -> &QrGenerateCompute {
        self.ctx.compute::<QrGenerateCompute>()
    }

    /// Keeps the preview texture in step with the live resource and reports
    /// payloads that fail to decode.
    pub fn sync_preview(&mut self, egui_ctx: &egui::Context) {
        let resource = self.ctx.compute::<QrGenerateCompute>().resource.clone();
        if let Some(RenderFailure { locator, message }) =
            self.preview.sync(egui_ctx, resource.as_ref())
        {
            self.ctx
                .record_command(ReportRenderErrorCommand { locator, message });
            self.ctx.enqueue_command::<ReportRenderErrorCommand>();
            self.ctx.flush_commands();
        }
    }

    pub fn dispatch(&mut self, action: QrAction) {
        log::debug!("Action: {action:?}");
        match action {
            QrAction::Generate => {
                self.download_error = None;
                if let Err(err) = generate(&mut self.ctx) {
                    log::debug!("Generate refused: {err}");
                }
            }
            QrAction::Download => self.download(),
            QrAction::Open => {
                if self.generated().resource.is_some() {
                    self.preview.open_full_size();
                }
            }
            QrAction::Release => {
                self.ctx.enqueue_command::<ReleaseQrCommand>();
                self.ctx.flush_commands();
            }
        }
    }

    fn download(&mut self) {
        let Some(resource) = self.generated().resource.clone() else {
            return;
        };

        let file_name = resource.download_file_name();
        match self.saver.save(&file_name, &resource) {
            Ok(SaveOutcome::Saved(target)) => {
                log::info!("Saved {file_name} to {target}");
                self.download_error = None;
            }
            Ok(SaveOutcome::Cancelled) => {}
            Err(err) => {
                log::error!("Download of {file_name} failed: {err}");
                self.download_error = Some(err.to_string());
            }
        }
    }

    /// Session end: stop in-flight work and release the live resource.
    pub fn teardown(&mut self) {
        self.ctx.cancel_all();
        self.dispatch(QrAction::Release);
        self.ctx.sync_computes();
        self.preview.clear();
    }
}
