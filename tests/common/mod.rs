use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

/// `dockhand` with an isolated config file and no inherited launcher/proxy environment.
#[allow(dead_code)]
pub fn dockhand(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dockhand"));
    cmd.env("DOCKHAND_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("DOCKHAND_LAUNCHER_REPO")
        .env_remove("DOCKHAND_LAUNCHER_BRANCH")
        .env_remove("DOCKHAND_LAUNCHER_PATH")
        .env_remove("DOCKHAND_GITHUB_API")
        .env_remove("GITHUB_TOKEN");
    for var in ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY", "http_proxy", "https_proxy", "all_proxy"] {
        cmd.env_remove(var);
    }
    cmd
}

#[allow(dead_code)]
pub struct StubResponse {
    pub status: &'static str,
    pub body: String,
}

/// One-shot HTTP/1.1 server on 127.0.0.1; `respond` maps a request path to a response.
/// Request lines are recorded in arrival order.
#[allow(dead_code)]
pub struct StubServer {
    pub base: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl StubServer {
    pub fn start<F>(respond: F) -> StubServer
    where
        F: Fn(&str, &str) -> StubResponse + Send + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind stub server");
        let port = listener.local_addr().expect("local addr").port();
        let base = format!("http://127.0.0.1:{port}");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let base_for_thread = base.clone();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                // Drain headers
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) if line == "\r\n" || line == "\n" => break,
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
                let request_line = request_line.trim_end().to_string();
                let path = request_line.split_whitespace().nth(1).unwrap_or("").to_string();
                seen.lock().expect("requests lock").push(request_line);
                let resp = respond(&base_for_thread, &path);
                let text = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    resp.status,
                    resp.body.len(),
                    resp.body
                );
                let _ = stream.write_all(text.as_bytes());
                let _ = stream.flush();
            }
        });
        StubServer { base, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[allow(dead_code)]
pub fn listing_json(base: &str, names: &[&str]) -> String {
    let entries: Vec<String> = names
        .iter()
        .map(|n| {
            format!(
                r#"{{"name":"{n}","path":"{n}","type":"file","download_url":"{base}/raw/{n}"}}"#
            )
        })
        .collect();
    format!("[{}]", entries.join(","))
}
