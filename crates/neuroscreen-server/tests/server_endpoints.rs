use neuroscreen_server::{AppConfig, build_app};
use serde_json::Value;
use tokio::task::JoinHandle;

async fn start_server() -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    // Default config points at a model path that does not exist in the test
    // environment, so the server runs with the audio path degraded.
    let app = build_app(&AppConfig::default());

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

/// Render a short sine tone as a 16-bit mono WAV byte buffer.
fn sine_wav_bytes(sample_rate: u32, duration_secs: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let n = (sample_rate as f32 * duration_secs) as usize;
        for i in 0..n {
            let t = i as f32 / sample_rate as f32;
            let v = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn assert_error_body(body: &Value) {
    assert_eq!(body["status"], "error");
    assert!(body["error"].is_string(), "error key must be present: {body}");
}

#[tokio::test]
async fn server_endpoints_work() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "NeuroScreen API");
    assert_eq!(body["status"], "Live");
    assert!(body["endpoints"].is_array());

    // GET /healthz
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz reports degraded while the classifier is missing
    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "degraded");

    // shutdown
    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn predict_audio_without_file_field_is_bad_request() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("something_else", "value");
    let resp = client
        .post(format!("{base}/predict-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn predict_audio_with_non_audio_file_is_bad_request() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let part = reqwest::multipart::Part::bytes(b"these bytes are not audio".to_vec())
        .file_name("note.txt");
    let form = reqwest::multipart::Form::new().part("file", part);
    let resp = client
        .post(format!("{base}/predict-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn predict_audio_with_valid_wav_but_no_model_is_unavailable() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // Valid recording: decodes and extracts fine, then hits the absent model
    let wav = sine_wav_bytes(22_050, 3.0);
    let part = reqwest::multipart::Part::bytes(wav).file_name("voice.wav");
    let form = reqwest::multipart::Form::new().part("file", part);
    let resp = client
        .post(format!("{base}/predict-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn predict_video_without_file_is_bad_request() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("note", "no file attached");
    let resp = client
        .post(format!("{base}/predict-video"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn models_without_api_key_is_unavailable() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/models")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn responses_carry_request_id_header() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/healthz"))
        .header("x-request-id", "test-id-123")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "test-id-123"
    );

    // Generated when absent
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.headers().get("x-request-id").is_some());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
