use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use vpendant_communication::{HttpJogTransport, PendantClient, StatePoller};
use vpendant_core::{
    AppEvent, AxisInfo, EventBus, JogDirection, JogMode, JogRequest, JogSessionConfig,
    JogSessionController, JogSettingsProvider, JogStopRequest, JogTransport, LiveJogSettings,
    RobotEvent, StepSize, TransportError,
};

#[derive(Clone, Default)]
struct Stub {
    jogs: Arc<Mutex<Vec<Value>>>,
    commands: Arc<Mutex<Vec<(String, Value)>>>,
    state: Arc<Mutex<Value>>,
    state_fails: Arc<AtomicBool>,
}

impl Stub {
    fn new() -> Self {
        let stub = Self::default();
        *stub.state.lock() = state_json(0.0, 1);
        stub
    }
}

fn state_json(j1: f64, mode: i32) -> Value {
    json!({
        "cartesian": [200.0, 0.0, 50.0, 0.0, 0.0, 0.0],
        "joint": [j1, 0.0, 50.0, 0.0],
        "tool": [0.0],
        "status": {
            "axis_count": 4,
            "allow_jog": true,
            "jog_mode": mode,
            "jog_mode_text": "Joint",
            "selected_axis": 1,
            "selected_axis_text": "J1",
            "power_state": 1,
            "error_desc": ""
        }
    })
}

async fn handle_jog(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.jogs.lock().push(body.clone());
    if body["axis"] == "joint9" {
        return Json(json!({"success": false, "message": "axis out of range"}));
    }
    Json(json!({
        "success": true,
        "message": format!("jog {} {}", body["axis"], body["dir"]),
        "command_sent": "JOG"
    }))
}

async fn handle_mode(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.commands.lock().push(("mode".to_string(), body));
    Json(json!({"success": true, "message": "mode set"}))
}

async fn handle_axis(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.commands.lock().push(("axis".to_string(), body));
    Json(json!({"success": true, "message": "axis set"}))
}

async fn handle_state(State(stub): State<Stub>) -> impl IntoResponse {
    if stub.state_fails.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "Failed to fetch jog state").into_response();
    }
    let state = stub.state.lock().clone();
    Json(state).into_response()
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_pendant() -> (String, Stub) {
    let stub = Stub::new();
    let app = Router::new()
        .route("/api/jog", post(handle_jog))
        .route("/api/jog/mode", post(handle_mode))
        .route("/api/jog/axis", post(handle_axis))
        .route("/api/jog/state", get(handle_state))
        .with_state(stub.clone());
    (serve(app).await, stub)
}

fn jog(axis: &str, direction: JogDirection, step: f64) -> JogRequest {
    JogRequest::new(
        axis,
        direction,
        StepSize::new(step).expect("valid step"),
        JogMode::Joint,
    )
}

#[tokio::test]
async fn test_jog_body_on_the_wire() {
    let (url, stub) = spawn_pendant().await;
    let transport = HttpJogTransport::new(&url, Duration::from_secs(2)).unwrap();

    let reply = transport
        .send_jog(jog("joint2", JogDirection::Negative, 2.5))
        .await
        .unwrap();
    assert!(reply.success);
    assert_eq!(reply.command_sent.as_deref(), Some("JOG"));

    assert_eq!(
        stub.jogs.lock()[0],
        json!({"axis": "joint2", "dir": "negative", "step": 2.5, "mode": "joint"})
    );
}

#[tokio::test]
async fn test_stop_body_on_the_wire() {
    let (url, stub) = spawn_pendant().await;
    let transport = HttpJogTransport::new(&url, Duration::from_secs(2)).unwrap();

    transport
        .send_jog_stop(JogStopRequest::new("x", JogMode::World))
        .await
        .unwrap();

    assert_eq!(
        stub.jogs.lock()[0],
        json!({"axis": "x", "dir": "stop", "step": 0.0, "mode": "world"})
    );
}

#[tokio::test]
async fn test_unsuccessful_reply_is_rejected() {
    let (url, _stub) = spawn_pendant().await;
    let transport = HttpJogTransport::new(&url, Duration::from_secs(2)).unwrap();

    let err = transport
        .send_jog(jog("joint9", JogDirection::Positive, 1.0))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::Rejected {
            message: "axis out of range".to_string()
        }
    );
}

#[tokio::test]
async fn test_http_status_and_decode_errors() {
    let app = Router::new()
        .route(
            "/api/jog",
            post(|| async { (StatusCode::BAD_GATEWAY, "Failed to send jog command") }),
        )
        .route("/api/jog/state", get(|| async { "not json" }));
    let url = serve(app).await;
    let client = PendantClient::with_timeout(&url, Duration::from_secs(2)).unwrap();

    match client.send_jog(&jog("joint1", JogDirection::Positive, 1.0)).await {
        Err(TransportError::HttpStatus { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "Failed to send jog command");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }

    assert!(matches!(
        client.fetch_state().await,
        Err(TransportError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PendantClient::with_timeout(&format!("http://{addr}"), Duration::from_millis(500))
        .unwrap();
    assert!(matches!(
        client.fetch_state().await,
        Err(TransportError::Network { .. })
    ));
}

#[tokio::test]
async fn test_mode_axis_and_state() {
    let (url, stub) = spawn_pendant().await;
    let client = PendantClient::new(&url).unwrap();

    client.set_mode(JogMode::Tool).await.unwrap();
    client.select_axis(3, 1).await.unwrap();
    let state = client.fetch_state().await.unwrap();

    let commands = stub.commands.lock().clone();
    assert_eq!(
        commands,
        vec![
            ("mode".to_string(), json!({"mode": "tool"})),
            ("axis".to_string(), json!({"axis": 3, "robot": 1})),
        ]
    );
    assert_eq!(state.joint, vec![0.0, 0.0, 50.0, 0.0]);
    assert_eq!(state.status.mode(), Some(JogMode::Joint));
    assert_eq!(state.status.selected_axis_label(), "J1");
}

#[tokio::test]
async fn test_mode_change_follows_with_axis() {
    let (url, stub) = spawn_pendant().await;
    let client = PendantClient::new(&url).unwrap();
    let settings = LiveJogSettings::new(JogMode::Joint, "joint3", 1.0);

    // joint3 does not exist in world mode, so the axis falls back to x.
    settings.set_mode(JogMode::World);
    let axis = AxisInfo::lookup(settings.mode(), &settings.axis()).unwrap();
    client
        .sync_selection(settings.mode(), axis.number, 2)
        .await
        .unwrap();

    assert_eq!(
        stub.commands.lock().clone(),
        vec![
            ("mode".to_string(), json!({"mode": "world"})),
            ("axis".to_string(), json!({"axis": 1, "robot": 2})),
        ]
    );
}

#[tokio::test]
async fn test_session_over_http() {
    let (url, stub) = spawn_pendant().await;
    let transport = Arc::new(HttpJogTransport::new(&url, Duration::from_secs(2)).unwrap());
    let settings = Arc::new(LiveJogSettings::new(JogMode::Joint, "joint1", 2.0));
    let controller = JogSessionController::with_config(
        settings,
        transport,
        JogSessionConfig::default(),
        Arc::new(EventBus::new()),
    );

    controller.start(JogDirection::Positive).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.stop();
    controller.shutdown().await;

    let count = controller.snapshot().command_count as usize;
    let bodies = stub.jogs.lock().clone();
    assert!(count >= 2);
    assert_eq!(bodies.len(), count + 1);
    assert_eq!(bodies.iter().filter(|b| b["dir"] == "stop").count(), 1);
    assert!(bodies
        .iter()
        .filter(|b| b["dir"] != "stop")
        .all(|b| b["step"] == 2.0 && b["axis"] == "joint1"));
}

#[tokio::test]
async fn test_poller_publishes_changes_only() {
    let (url, stub) = spawn_pendant().await;
    let events = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    events.subscribe(vpendant_core::EventFilter::All, move |event| {
        if let AppEvent::Robot(robot) = event {
            sink.lock().push(robot);
        }
    });

    let poller = StatePoller::new(PendantClient::new(&url).unwrap(), events);

    poller.poll_once().await.unwrap();
    poller.poll_once().await.unwrap();
    *stub.state.lock() = state_json(0.05, 1);
    poller.poll_once().await.unwrap();
    *stub.state.lock() = state_json(5.0, 1);
    poller.poll_once().await.unwrap();
    *stub.state.lock() = state_json(5.0, 2);
    poller.poll_once().await.unwrap();

    stub.state_fails.store(true, Ordering::SeqCst);
    assert!(poller.poll_once().await.is_err());

    let seen = seen.lock().clone();
    let changes = seen
        .iter()
        .filter(|e| matches!(e, RobotEvent::StateChanged(_)))
        .count();
    assert_eq!(changes, 3);
    assert!(matches!(seen.last(), Some(RobotEvent::PollFailed { .. })));
    assert_eq!(poller.last_state().unwrap().status.jog_mode, 2);
}

#[tokio::test]
async fn test_poller_keeps_running_after_errors() {
    let (url, stub) = spawn_pendant().await;
    stub.state_fails.store(true, Ordering::SeqCst);

    let events = Arc::new(EventBus::new());
    let mut rx = events.receiver();
    let poller = StatePoller::with_interval(
        PendantClient::new(&url).unwrap(),
        events,
        Duration::from_millis(20),
    );
    assert!(poller.start());
    assert!(!poller.start());

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, AppEvent::Robot(RobotEvent::PollFailed { .. })));

    stub.state_fails.store(false, Ordering::SeqCst);
    let recovered = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(AppEvent::Robot(RobotEvent::StateChanged(state))) = rx.recv().await {
                return state;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(recovered.status.axis_count, 4);

    poller.stop();
    assert!(!poller.is_running());
}
