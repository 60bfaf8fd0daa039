use axum::{http::StatusCode, routing::get, Router};
use goalboard_engine::Engine;
use goalboard_scene::{
    Bounds, HttpGoalSource, Key, OverlayState, SceneController, SceneEvent, SceneState, Vec2,
};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

fn temp_db() -> PathBuf {
    std::env::temp_dir().join(format!(
        "goalboard-e2e-{}.db",
        time::OffsetDateTime::now_utc().unix_timestamp_nanos()
    ))
}

fn near_whiteboard() -> SceneState {
    SceneState::with_layout(
        Vec2::new(468.0, 400.0),
        Bounds::new(Vec2::new(400.0, 400.0), Vec2::new(96.0, 64.0)),
    )
}

#[tokio::test]
async fn dialog_shows_goals_from_running_server() {
    let db = temp_db();
    Engine::new(&db).create_goal("Learn X", 5, false).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(goalboard_server::serve_listener(listener, db, async {
        let _ = stop_rx.await;
    }));

    let mut controller = SceneController::mount_with_state(
        near_whiteboard(),
        Box::new(HttpGoalSource::new(&base)),
        Handle::current(),
    );
    controller.handle(SceneEvent::KeyDown(Key::Space));
    assert!(controller.next_completion().await);
    assert_eq!(
        controller.state().overlay().unwrap().text(),
        "Goals:\nLearn X - 5 days - Completed: false\n"
    );

    controller.unmount();
    let _ = stop_tx.send(());
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn unreachable_server_fails_the_dialog() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut controller = SceneController::mount_with_state(
        near_whiteboard(),
        Box::new(HttpGoalSource::new(&format!("http://127.0.0.1:{port}"))),
        Handle::current(),
    );
    controller.handle(SceneEvent::KeyDown(Key::Space));
    assert!(controller.next_completion().await);

    let overlay = controller.state().overlay().unwrap();
    assert_eq!(overlay.state, OverlayState::Failed);
    assert_eq!(overlay.text(), "Failed to load goals.");
}

/// Serves `router` on an ephemeral port until the returned sender fires.
async fn spawn_stub(router: Router) -> (String, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
    });
    (base, stop_tx)
}

async fn overlay_after_fetch(base: &str) -> (OverlayState, String) {
    let mut controller = SceneController::mount_with_state(
        near_whiteboard(),
        Box::new(HttpGoalSource::new(base)),
        Handle::current(),
    );
    controller.handle(SceneEvent::KeyDown(Key::Space));
    assert!(controller.next_completion().await);
    let overlay = controller.state().overlay().unwrap();
    (overlay.state.clone(), overlay.text().to_string())
}

#[tokio::test]
async fn server_error_status_fails_the_dialog() {
    let router = Router::new().route(
        "/api/goals",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Server error") }),
    );
    let (base, stop) = spawn_stub(router).await;

    let (state, text) = overlay_after_fetch(&base).await;
    assert_eq!(state, OverlayState::Failed);
    assert_eq!(text, "Failed to load goals.");
    let _ = stop.send(());
}

#[tokio::test]
async fn non_json_body_fails_the_dialog() {
    let router = Router::new().route("/api/goals", get(|| async { "not json" }));
    let (base, stop) = spawn_stub(router).await;

    let (state, text) = overlay_after_fetch(&base).await;
    assert_eq!(state, OverlayState::Failed);
    assert_eq!(text, "Failed to load goals.");
    let _ = stop.send(());
}
