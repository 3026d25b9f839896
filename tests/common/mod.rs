// Shared helpers for integration tests: a local fake of the GitHub
// pull-request files API and a runner for the compiled binary.
#![allow(dead_code)]

use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server};

pub const OWNER: &str = "octo";
pub const REPO: &str = "widgets";
pub const PULL_REQUEST: u64 = 7;

/// One request seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub authorization: Option<String>,
}

enum Behavior {
    Pages(Vec<Vec<String>>),
    Fixed { status: u16, body: String },
}

/// A local HTTP server answering `GET /repos/{owner}/{repo}/pulls/{n}/files`.
pub struct FakeGithub {
    addr: SocketAddr,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeGithub {
    /// Serve the given pages, linking each to the next with a `Link` header.
    pub fn with_pages(pages: &[&[&str]]) -> Self {
        let pages = pages
            .iter()
            .map(|page| page.iter().map(|f| f.to_string()).collect())
            .collect();
        Self::start(Behavior::Pages(pages))
    }

    /// Answer every request with the same status and body.
    pub fn with_response(status: u16, body: &str) -> Self {
        Self::start(Behavior::Fixed {
            status,
            body: body.to_string(),
        })
    }

    fn start(behavior: Behavior) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fake github"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake github listens on TCP");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    let url = request.url().to_string();
                    let authorization = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());
                    requests.lock().unwrap().push(RecordedRequest {
                        url: url.clone(),
                        authorization,
                    });

                    let response = match &behavior {
                        Behavior::Pages(pages) => page_response(addr, &url, pages),
                        Behavior::Fixed { status, body } => {
                            Response::from_string(body.clone()).with_status_code(*status)
                        }
                    };
                    let _ = request.respond(response);
                }
            })
        };

        FakeGithub {
            addr,
            server,
            requests,
            handle: Some(handle),
        }
    }

    /// Base URL to configure as the GitHub API root.
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeGithub {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn files_path() -> String {
    format!("/repos/{OWNER}/{REPO}/pulls/{PULL_REQUEST}/files")
}

fn page_response(
    addr: SocketAddr,
    url: &str,
    pages: &[Vec<String>],
) -> Response<std::io::Cursor<Vec<u8>>> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    if path != files_path() {
        return Response::from_string(r#"{"message":"Not Found"}"#).with_status_code(404);
    }
    let page: usize = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);

    let files = pages.get(page - 1).cloned().unwrap_or_default();
    let body = serde_json::Value::Array(
        files
            .iter()
            .map(|f| serde_json::json!({"filename": f, "status": "modified"}))
            .collect(),
    );
    let json = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
    let mut response = Response::from_string(body.to_string()).with_header(json);

    if page < pages.len() {
        let next = format!(
            "<http://{addr}{}?per_page=100&page={}>; rel=\"next\", <http://{addr}{}?per_page=100&page={}>; rel=\"last\"",
            files_path(),
            page + 1,
            files_path(),
            pages.len()
        );
        response = response.with_header(Header::from_bytes(&b"Link"[..], next.as_bytes()).unwrap());
    }
    response
}

/// An API root that accepts one connection, reads the request and then
/// never answers. The listener thread exits after `hold`.
pub fn unresponsive_api(hold: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind unresponsive api");
    let addr = listener.local_addr().expect("listener address");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            thread::sleep(hold);
        }
    });
    format!("http://{addr}")
}

// ---- binary runner ----

pub fn binary_path() -> PathBuf {
    let path = PathBuf::from(env!("CARGO_BIN_EXE_drone-skip-pipeline"));
    assert!(path.exists(), "binary not found at {}", path.display());
    path
}

/// Environment of a pull-request build pointed at `api_url`.
pub fn pull_request_env(api_url: &str, rules: &str) -> Vec<(&'static str, String)> {
    vec![
        ("DRONE_BUILD_EVENT", "pull_request".to_string()),
        ("DRONE_REPO_OWNER", OWNER.to_string()),
        ("DRONE_REPO_NAME", REPO.to_string()),
        ("DRONE_PULL_REQUEST", PULL_REQUEST.to_string()),
        ("PLUGIN_GITHUB_API_URL", api_url.to_string()),
        ("PLUGIN_TIMEOUT", "5".to_string()),
        ("PLUGIN_RULES", rules.to_string()),
    ]
}

/// Runs the binary with exactly the given environment.
/// Returns (stdout, stderr, exit_code).
pub fn run_plugin(env: &[(&str, String)]) -> (String, String, i32) {
    run_plugin_with_args(&[], env)
}

/// Like [`run_plugin`], with command-line arguments as well.
pub fn run_plugin_with_args(args: &[&str], env: &[(&str, String)]) -> (String, String, i32) {
    let output = Command::new(binary_path())
        .args(args)
        .env_clear()
        .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to execute binary");

    let stdout = String::from_utf8(output.stdout).expect("stdout not valid UTF-8");
    let stderr = String::from_utf8(output.stderr).expect("stderr not valid UTF-8");
    let exit_code = output.status.code().unwrap_or(-1);
    (stdout, stderr, exit_code)
}
