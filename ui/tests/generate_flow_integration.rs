//! End-to-end Generate / Download / Open flows against a mocked QR service.

mod common;

use common::{QR_PATH, TestCtx, png_bytes, png_response};
use kittest::Queryable;
use qrgen_business::{
    EMPTY_INPUT_MESSAGE, GENERATION_FAILED_MESSAGE, QrPhase, READY_MESSAGE, RENDER_FAILED_MESSAGE,
};
use qrgen_ui::widgets::{DOWNLOAD_LABEL, FULL_SIZE_TITLE, GENERATE_LABEL, OPEN_LABEL};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn phase(app: &qrgen_ui::QrApp) -> QrPhase {
    app.state.generated().phase
}

#[tokio::test]
async fn test_initial_frame_has_no_status_and_no_preview() {
    let mut ctx = TestCtx::new_app().await;
    let harness = ctx.harness_mut();
    harness.step();

    assert!(harness.query_by_label(GENERATE_LABEL).is_some());
    assert!(harness.query_by_label(DOWNLOAD_LABEL).is_some());
    assert!(harness.query_by_label(OPEN_LABEL).is_some());

    let ui_state = harness.state().state.generated().ui_state();
    assert!(!ui_state.can_download);
    assert!(!ui_state.can_open);
    assert!(ui_state.status.is_none());
    assert!(!harness.state().state.preview.has_texture());
}

#[tokio::test]
async fn test_generate_click_shows_preview_and_enables_actions() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QR_PATH))
        .and(query_param("size", "300x300"))
        .and(query_param("data", "Hello"))
        .and(query_param("ecc", "M"))
        .and(query_param("margin", "2"))
        .respond_with(png_response(64))
        .expect(1)
        .mount(&mock_server)
        .await;
    let mut ctx = TestCtx::with_server(mock_server);

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    let harness = ctx.harness();
    let ui_state = harness.state().state.generated().ui_state();
    assert!(ui_state.can_download);
    assert!(ui_state.can_open);
    assert!(harness.state().state.preview.has_texture());
    assert_eq!(harness.state().state.preview.size(), Some([64, 64]));
    assert!(harness.query_by_label(READY_MESSAGE).is_some());
}

#[tokio::test]
async fn test_empty_text_shows_error_without_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(png_response(8))
        .expect(0)
        .mount(&mock_server)
        .await;
    let mut ctx = TestCtx::with_server(mock_server);

    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("empty input status", |app| {
        app.state.generated().status.is_some()
    })
    .await;

    let harness = ctx.harness();
    assert!(harness.query_by_label(EMPTY_INPUT_MESSAGE).is_some());
    let status = harness.state().state.generated().status.clone().unwrap();
    assert!(status.is_error());
    assert!(!harness.state().state.generated().ui_state().can_download);
}

#[tokio::test]
async fn test_server_error_shows_failure_status() {
    let mut ctx = TestCtx::with_response(ResponseTemplate::new(500)).await;

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("failure", |app| phase(app) == QrPhase::Failed)
        .await;

    let harness = ctx.harness();
    assert!(harness.query_by_label(GENERATION_FAILED_MESSAGE).is_some());
    assert!(!harness.state().state.generated().ui_state().can_open);
    assert!(!harness.state().state.preview.has_texture());
}

#[tokio::test]
async fn test_html_response_shows_failure_status() {
    let mut ctx = TestCtx::with_response(
        ResponseTemplate::new(200).set_body_raw("<html>quota exceeded</html>", "text/html"),
    )
    .await;

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("failure", |app| phase(app) == QrPhase::Failed)
        .await;

    assert!(
        ctx.harness()
            .query_by_label(GENERATION_FAILED_MESSAGE)
            .is_some()
    );
}

#[tokio::test]
async fn test_undecodable_image_shows_render_error() {
    let mut ctx = TestCtx::with_response(
        ResponseTemplate::new(200).set_body_raw(b"not really a png".to_vec(), "image/png"),
    )
    .await;

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("render failure", |app| {
        app.state
            .generated()
            .status
            .as_ref()
            .is_some_and(|status| status.text == RENDER_FAILED_MESSAGE)
    })
    .await;

    let harness = ctx.harness();
    assert_eq!(phase(harness.state()), QrPhase::Failed);
    assert!(harness.state().state.generated().resource.is_none());
    assert!(harness.query_by_label(RENDER_FAILED_MESSAGE).is_some());
}

#[tokio::test]
async fn test_ctrl_enter_generates() {
    let mut ctx = TestCtx::new_app().await;

    ctx.set_text("ctrl");
    ctx.harness_mut().step();
    ctx.harness_mut()
        .key_press_modifiers(egui::Modifiers::CTRL, egui::Key::Enter);
    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    let generated = ctx.harness().state().state.generated();
    assert_eq!(generated.resource.as_ref().unwrap().source_text(), "ctrl");
}

#[tokio::test]
async fn test_empty_press_keeps_pending_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QR_PATH))
        .and(query_param("data", "Hello"))
        .respond_with(png_response(32).set_delay(std::time::Duration::from_millis(300)))
        .expect(1)
        .mount(&mock_server)
        .await;
    let mut ctx = TestCtx::with_server(mock_server);

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("generating", |app| phase(app) == QrPhase::Generating)
        .await;

    ctx.set_text("");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    // One frame dispatches, the next applies the status.
    ctx.harness_mut().step();
    ctx.harness_mut().step();
    let generated = ctx.harness().state().state.generated();
    assert_eq!(generated.phase, QrPhase::Generating);
    assert!(generated.status.as_ref().is_some_and(|status| status.is_error()));

    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    let harness = ctx.harness();
    let generated = harness.state().state.generated();
    assert_eq!(generated.resource.as_ref().unwrap().source_text(), "Hello");
    assert!(harness.state().state.preview.has_texture());
    assert!(harness.query_by_label(READY_MESSAGE).is_some());
}

#[tokio::test]
async fn test_command_enter_generates() {
    let mut ctx = TestCtx::new_app().await;

    ctx.set_text("shortcut");
    ctx.harness_mut().step();
    ctx.harness_mut()
        .key_press_modifiers(egui::Modifiers::COMMAND, egui::Key::Enter);
    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    let resource = ctx
        .harness()
        .state()
        .state
        .generated()
        .resource
        .clone()
        .unwrap();
    assert_eq!(resource.source_text(), "shortcut");
}

#[tokio::test]
async fn test_download_uses_sanitized_name() {
    let mut ctx = TestCtx::new_app().await;

    ctx.set_text("My Café URL!!");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    ctx.harness_mut().get_by_label(DOWNLOAD_LABEL).click();
    ctx.harness_mut().step();

    let saved = ctx.saver.saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "My_Caf__URL__.png");
    assert_eq!(saved[0].1, png_bytes(64));
}

#[tokio::test]
async fn test_download_without_resource_saves_nothing() {
    let mut ctx = TestCtx::new_app().await;
    let harness = ctx.harness_mut();
    harness.step();

    // Disabled button: the click never reaches the app.
    harness.get_by_label(DOWNLOAD_LABEL).click();
    harness.step();
    harness
        .state_mut()
        .state
        .dispatch(qrgen_ui::state::QrAction::Download);
    harness.step();

    assert!(ctx.saver.saved.borrow().is_empty());
}

#[tokio::test]
async fn test_open_shows_full_size_window() {
    let mut ctx = TestCtx::new_app().await;

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    assert!(ctx.harness().query_by_label(FULL_SIZE_TITLE).is_none());

    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    ctx.harness_mut().get_by_label(OPEN_LABEL).click();
    ctx.harness_mut().step();
    ctx.harness_mut().step();

    assert!(ctx.harness().state().state.preview.is_full_size_open());
    assert!(ctx.harness().query_by_label(FULL_SIZE_TITLE).is_some());
}

#[tokio::test]
async fn test_new_generate_replaces_preview() {
    let mut ctx = TestCtx::new_app().await;

    ctx.set_text("first");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("first ready", |app| phase(app) == QrPhase::Ready)
        .await;
    let first = ctx
        .harness()
        .state()
        .state
        .preview
        .locator()
        .map(str::to_owned)
        .unwrap();

    ctx.set_text("second");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("second ready", |app| {
        app.state
            .generated()
            .resource
            .as_ref()
            .is_some_and(|resource| resource.source_text() == "second")
    })
    .await;

    let preview = &ctx.harness().state().state.preview;
    assert!(preview.has_texture());
    assert_ne!(preview.locator(), Some(first.as_str()));
}

#[tokio::test]
async fn test_teardown_releases_resource() {
    let mut ctx = TestCtx::new_app().await;

    ctx.set_text("Hello");
    ctx.harness_mut().step();
    ctx.harness_mut().get_by_label(GENERATE_LABEL).click();
    ctx.step_until("ready", |app| phase(app) == QrPhase::Ready)
        .await;

    let state = &mut ctx.harness_mut().state_mut().state;
    state.teardown();

    assert!(state.generated().resource.is_none());
    assert!(!state.preview.has_texture());
    assert_eq!(state.generated().phase, QrPhase::Idle);
}
