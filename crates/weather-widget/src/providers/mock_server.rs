//! Single-threaded HTTP stub for exercising the real request path in tests.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub(crate) struct MockResponse {
    status: u16,
    reason: &'static str,
    content_type: &'static str,
    body: String,
}

impl MockResponse {
    pub(crate) fn json(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            content_type: "application/json",
            body: body.to_string(),
        }
    }
}

/// Serves `responses` in order, one per accepted connection, and records the
/// request line of each call.
pub(crate) struct MockServer {
    pub(crate) base_url: String,
    request_lines: Arc<Mutex<Vec<String>>>,
    handle: thread::JoinHandle<()>,
}

impl MockServer {
    pub(crate) fn spawn(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.set_nonblocking(true).expect("nonblocking");
        let base_url = format!("http://{}", listener.local_addr().expect("addr"));
        let request_lines = Arc::new(Mutex::new(Vec::new()));
        let captured_request_lines = Arc::clone(&request_lines);

        let handle = thread::spawn(move || {
            for response in responses {
                let start = Instant::now();
                let mut stream = loop {
                    match listener.accept() {
                        Ok((stream, _)) => break stream,
                        Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                            if start.elapsed() > Duration::from_secs(3) {
                                panic!("mock server timed out waiting for request");
                            }
                            thread::sleep(Duration::from_millis(10));
                        }
                        Err(error) => panic!("mock server accept failed: {error}"),
                    }
                };
                stream.set_nonblocking(false).expect("blocking stream");

                let cloned = stream.try_clone().expect("clone stream");
                let mut reader = BufReader::new(cloned);
                let mut head = Vec::new();

                loop {
                    let mut line = String::new();
                    let bytes = reader.read_line(&mut line).expect("read line");
                    if bytes == 0 || line == "\r\n" {
                        break;
                    }
                    head.push(line.trim_end_matches(['\r', '\n']).to_string());
                }

                if let Some(request_line) = head.into_iter().next() {
                    captured_request_lines
                        .lock()
                        .expect("request lock")
                        .push(request_line);
                }

                let response_head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status,
                    response.reason,
                    response.content_type,
                    response.body.len()
                );

                stream
                    .write_all(response_head.as_bytes())
                    .and_then(|_| stream.write_all(response.body.as_bytes()))
                    .expect("write response");
            }
        });

        Self {
            base_url,
            request_lines,
            handle,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().expect("request lock").clone()
    }

    pub(crate) fn join(self) {
        self.handle.join().expect("mock server thread");
    }
}
