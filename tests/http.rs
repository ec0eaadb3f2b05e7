use chrono::{Duration as Days, Local};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const WINDOW_DAYS: usize = 7;

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    status: String,
    date: String,
    index: Option<usize>,
    revision: u64,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn today() -> String {
    Local::now().date_naive().to_string()
}

fn yesterday() -> String {
    (Local::now().date_naive() - Days::days(1)).to_string()
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn seeded_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("nutrition_chart_http_{}_{}.json", std::process::id(), nanos));

    let seed = json!([
        { "date": yesterday(), "calories": 2000, "weight": 94.1 },
        { "date": today(), "calories": 1850, "weight": 93.75 },
    ]);
    std::fs::write(&path, seed.to_string()).expect("write seed data");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/chart")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = seeded_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_nutrition_chart"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("NUTRITION_WINDOW_DAYS", WINDOW_DAYS.to_string())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn chart(client: &Client, server: &TestServer) -> Value {
    client
        .get(format!("{}/api/chart", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_chart_plots_the_window_ending_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let snapshot = chart(&client, &server).await;
    let data = &snapshot["config"]["data"];

    let labels = data["labels"].as_array().unwrap();
    assert_eq!(labels.len(), WINDOW_DAYS);
    assert_eq!(labels[WINDOW_DAYS - 1], today());
    assert_eq!(labels[WINDOW_DAYS - 2], yesterday());
    assert_eq!(data["datasets"][0]["data"][WINDOW_DAYS - 2], 2000.0);
    assert_eq!(data["datasets"][1]["data"][WINDOW_DAYS - 2], 94.1);
    assert!(data["datasets"][0]["data"][0].is_null());
    assert_eq!(snapshot["config"]["options"]["scales"]["caloriesAxis"]["ticks"]["stepSize"], 100.0);
}

#[tokio::test]
async fn http_update_stores_zero_and_persists() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/nutrition", server.base_url))
        .json(&json!({ "date": today(), "calories": 0 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: UpdateResponse = response.json().await.unwrap();
    assert_eq!(body.status, "applied");
    assert_eq!(body.date, today());
    assert_eq!(body.index, Some(WINDOW_DAYS - 1));

    let snapshot = chart(&client, &server).await;
    assert_eq!(snapshot["revision"], body.revision);
    let data = &snapshot["config"]["data"];
    assert_eq!(data["datasets"][0]["data"][WINDOW_DAYS - 1], 0.0);
    assert_eq!(data["datasets"][1]["data"][WINDOW_DAYS - 1], 93.75);

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&server.data_path).unwrap()).unwrap();
    let entry = stored
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["date"] == today())
        .expect("today persisted");
    assert_eq!(entry["calories"], 0.0);
    assert_eq!(entry["weight"], 93.75);
}

#[tokio::test]
async fn http_update_outside_window_is_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = chart(&client, &server).await;
    let response = client
        .post(format!("{}/api/nutrition", server.base_url))
        .json(&json!({ "date": "2000-01-01", "calories": 1800, "weight": 90.0 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: UpdateResponse = response.json().await.unwrap();
    assert_eq!(body.status, "unmatched");
    assert_eq!(body.index, None);

    let after = chart(&client, &server).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn http_update_rejects_missing_and_malformed_detail() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let empty = client
        .post(format!("{}/api/nutrition", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let malformed = client
        .post(format!("{}/api/nutrition", server.base_url))
        .json(&json!({ "date": "not a date", "calories": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_index_embeds_payload() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let html = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains(r#"<canvas id="nutrition-diagram" data-chart="{&quot;type&quot;:&quot;line&quot;"#));
    assert!(html.contains(r#"data-nutrition="[{&quot;date&quot;"#));
    assert!(html.contains(&format!("&quot;date&quot;:&quot;{}&quot;", yesterday())));
}
