use axum::{extract::State, routing::post, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use vpendant::console::{Console, ConsoleCommand, Outcome};
use vpendant::{
    HttpJogTransport, JogMode, JogSessionController, JogSettingsProvider, LiveJogSettings,
    PendantClient,
};

type Commands = Arc<Mutex<Vec<(String, Value)>>>;

async fn record(commands: &Commands, path: &str, body: Value) -> Json<Value> {
    commands.lock().push((path.to_string(), body));
    Json(json!({"success": true, "message": "ok"}))
}

async fn spawn_pendant() -> (String, Commands) {
    let commands = Commands::default();
    let app = Router::new()
        .route(
            "/api/jog/mode",
            post(|State(c): State<Commands>, Json(body): Json<Value>| async move {
                record(&c, "mode", body).await
            }),
        )
        .route(
            "/api/jog/axis",
            post(|State(c): State<Commands>, Json(body): Json<Value>| async move {
                record(&c, "axis", body).await
            }),
        )
        .with_state(commands.clone());

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), commands)
}

fn console_for(url: &str, settings: Arc<LiveJogSettings>) -> Console {
    let client = PendantClient::new(url).unwrap();
    let transport = Arc::new(HttpJogTransport::from_client(client.clone()));
    let controller = Arc::new(JogSessionController::new(settings.clone(), transport));
    Console::new(controller, settings, client, 1)
}

async fn wait_for(commands: &Commands, count: usize) -> Vec<(String, Value)> {
    for _ in 0..100 {
        if commands.lock().len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    commands.lock().clone()
}

#[tokio::test]
async fn test_mode_command_also_selects_axis() {
    let (url, commands) = spawn_pendant().await;
    let settings = Arc::new(LiveJogSettings::new(JogMode::Joint, "joint3", 1.0));
    let console = console_for(&url, settings.clone());

    let outcome = console
        .execute(ConsoleCommand::Mode(JogMode::World))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Print("mode World, axis x".to_string()));
    assert_eq!(settings.axis(), "x");

    assert_eq!(
        wait_for(&commands, 2).await,
        vec![
            ("mode".to_string(), json!({"mode": "world"})),
            ("axis".to_string(), json!({"axis": 1, "robot": 1})),
        ]
    );
}

#[tokio::test]
async fn test_startup_sync_sends_mode_and_axis() {
    let (url, commands) = spawn_pendant().await;
    let settings = Arc::new(LiveJogSettings::new(JogMode::Tool, "rz", 1.0));
    let console = console_for(&url, settings);

    console.sync_backend().unwrap().await.unwrap();

    assert_eq!(
        commands.lock().clone(),
        vec![
            ("mode".to_string(), json!({"mode": "tool"})),
            ("axis".to_string(), json!({"axis": 6, "robot": 1})),
        ]
    );
}
