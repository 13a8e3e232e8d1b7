//! Tests for the HTTP grading client against a local multipart server.

use std::{sync::mpsc, thread, time::Duration};

use axum::{Router, extract::Multipart, http::HeaderMap, routing::post};
use nbcheck::{
    client::{Grader, HttpGrader},
    config::HarnessConfig,
    notebook::{Cell, CellType, Notebook},
};
use serde_json::{Value, json};

/// What the server saw for one upload.
#[derive(Debug, Default)]
struct Received {
    notebook:      Option<String>,
    file_name:     Option<String>,
    content_type:  Option<String>,
    exercise_id:   Option<String>,
    authorization: Option<String>,
}

/// Starts a server answering every upload with `response` after `delay`.
fn serve(response: &'static str, delay: Duration) -> (String, mpsc::Receiver<Received>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test server");
    listener
        .set_nonblocking(true)
        .expect("make listener non-blocking");
    let addr = listener.local_addr().expect("server address");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("build tokio runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            let app = Router::new().route(
                "/upload",
                post(move |headers: HeaderMap, mut multipart: Multipart| {
                    let tx = tx.clone();
                    async move {
                        let mut received = Received {
                            authorization: headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string),
                            ..Received::default()
                        };
                        while let Some(field) = multipart.next_field().await.expect("read field") {
                            let name = field.name().map(str::to_string);
                            let file_name = field.file_name().map(str::to_string);
                            let content_type = field.content_type().map(str::to_string);
                            let text = field.text().await.expect("field text");
                            match name.as_deref() {
                                Some("notebook") => {
                                    received.notebook = Some(text);
                                    received.file_name = file_name;
                                    received.content_type = content_type;
                                }
                                Some("exercise_id") => received.exercise_id = Some(text),
                                _ => {}
                            }
                        }
                        let _ = tx.send(received);
                        tokio::time::sleep(delay).await;
                        response
                    }
                }),
            );
            axum::serve(listener, app).await.expect("serve");
        });
    });

    (format!("http://{addr}/upload"), rx)
}

fn notebook() -> Notebook {
    let mut meta = serde_json::Map::new();
    meta.insert("exercise_id".into(), json!("ex1"));
    Notebook::from_cells(vec![
        Cell::new(CellType::Code, vec!["answer = 42\n".to_string()]).with_metadata(meta),
    ])
}

#[test]
fn uploads_notebook_and_exercise_id_as_multipart() {
    let (url, rx) = serve(
        r#"{"ex1": {"results": {"t": {"passed": true}}, "logs": {"t": "ok"}}}"#,
        Duration::ZERO,
    );
    let grader = HttpGrader::new(&HarnessConfig::builder().upload_url(url).build())
        .expect("build grader");

    let verdict = grader.submit(&notebook(), "ex1").expect("upload succeeds");

    assert_eq!(verdict.exercise_ids(), vec!["ex1"]);
    let received = rx.recv_timeout(Duration::from_secs(5)).expect("server saw the upload");
    assert_eq!(received.exercise_id.as_deref(), Some("ex1"));
    assert_eq!(received.file_name.as_deref(), Some("notebook"));
    assert_eq!(received.content_type.as_deref(), Some("application/json"));
    assert!(received.authorization.is_none());

    let uploaded: Value =
        serde_json::from_str(received.notebook.as_deref().expect("notebook field")).expect("JSON notebook");
    assert_eq!(uploaded["cells"][0]["source"], json!(["answer = 42\n"]));
    assert_eq!(uploaded["cells"][0]["metadata"]["exercise_id"], "ex1");
}

#[test]
fn bearer_token_is_sent_when_configured() {
    let (url, rx) = serve("{}", Duration::ZERO);
    let config = HarnessConfig::builder()
        .upload_url(url)
        .token("s3cret")
        .build();
    let grader = HttpGrader::new(&config).expect("build grader");

    grader.submit(&notebook(), "ex1").expect("upload succeeds");

    let received = rx.recv_timeout(Duration::from_secs(5)).expect("server saw the upload");
    assert_eq!(received.authorization.as_deref(), Some("Bearer s3cret"));
}

#[test]
fn non_json_response_is_an_error() {
    let (url, _rx) = serve("<html>Internal Server Error</html>", Duration::ZERO);
    let grader = HttpGrader::new(&HarnessConfig::builder().upload_url(url).build())
        .expect("build grader");

    let err = grader.submit(&notebook(), "ex1").expect_err("body is not JSON");

    assert!(format!("{err:#}").contains("not a JSON object"));
}

#[test]
fn json_that_is_not_an_object_is_an_error() {
    let (url, _rx) = serve("[1, 2, 3]", Duration::ZERO);
    let grader = HttpGrader::new(&HarnessConfig::builder().upload_url(url).build())
        .expect("build grader");

    assert!(grader.submit(&notebook(), "ex1").is_err());
}

#[test]
fn timeout_bounds_a_hung_upload() {
    let (url, _rx) = serve("{}", Duration::from_secs(5));
    let config = HarnessConfig::builder()
        .upload_url(url)
        .timeout(Duration::from_millis(200))
        .build();
    let grader = HttpGrader::new(&config).expect("build grader");

    assert!(grader.submit(&notebook(), "ex1").is_err());
}

#[test]
fn unreachable_endpoint_is_an_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("free port")
        .port();
    let config = HarnessConfig::builder()
        .upload_url(format!("http://127.0.0.1:{port}/upload"))
        .build();
    let grader = HttpGrader::new(&config).expect("build grader");

    let err = grader.submit(&notebook(), "ex1").expect_err("nothing listens there");

    assert!(format!("{err:#}").contains("Could not upload exercise ex1"));
}
