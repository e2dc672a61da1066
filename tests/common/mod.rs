#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// A canned HTTP/1.1 response.
pub struct Reply {
    pub status_line: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Pause between the first and second half of the body.
    pub stall: Option<Duration>,
}

impl Reply {
    pub fn new(status_line: &'static str, content_type: &'static str, body: &[u8]) -> Self {
        Reply {
            status_line,
            content_type,
            body: body.to_vec(),
            stall: None,
        }
    }

    pub fn json(body: &str) -> Self {
        Reply::new("200 OK", "application/json", body.as_bytes())
    }

    pub fn bytes(status_line: &'static str, body: &[u8]) -> Self {
        Reply::new(status_line, "image/jpeg", body)
    }

    /// Send half the body, wait `pause`, then send the rest.
    pub fn stalled(mut self, pause: Duration) -> Self {
        self.stall = Some(pause);
        self
    }

    fn send(&self, socket: &mut TcpStream) -> std::io::Result<()> {
        let head = format!(
            "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            self.status_line,
            self.content_type,
            self.body.len()
        );
        socket.write_all(head.as_bytes())?;
        match self.stall {
            Some(pause) => {
                let (first, rest) = self.body.split_at(self.body.len() / 2);
                socket.write_all(first)?;
                socket.flush()?;
                thread::sleep(pause);
                socket.write_all(rest)?;
            }
            None => socket.write_all(&self.body)?,
        }
        socket.flush()
    }
}

/// A local server answering one connection per queued reply, in order.
/// Each raw request it receives is forwarded on `requests`.
pub struct Server {
    pub origin: String,
    requests: Receiver<String>,
}

impl Server {
    pub fn start(replies: Vec<Reply>) -> Server {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let address = listener.local_addr().expect("local address");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for reply in replies {
                let Ok((mut socket, _)) = listener.accept() else {
                    return;
                };
                let request = read_request(&mut socket);
                let _ = reply.send(&mut socket);
                if tx.send(request).is_err() {
                    return;
                }
            }
        });

        Server {
            origin: format!("http://{address}"),
            requests: rx,
        }
    }

    /// Next request the server saw, as raw text.
    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("server received a request")
    }

    pub fn received_nothing(&self) -> bool {
        self.requests.recv_timeout(Duration::from_millis(200)).is_err()
    }
}

fn read_request(socket: &mut TcpStream) -> String {
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = match socket.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let wanted = end + 4 + content_length(&head);
            while buf.len() < wanted {
                match socket.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Request line of a raw request, e.g. `GET /v2/core HTTP/1.1`.
pub fn request_line(raw: &str) -> &str {
    raw.lines().next().unwrap_or_default()
}

/// Value of header `name` (case-insensitive) in a raw request.
pub fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split("\r\n\r\n")
        .next()?
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim())
}

/// Every value of header `name` in a raw request.
pub fn header_count(raw: &str, name: &str) -> usize {
    raw.split("\r\n\r\n")
        .next()
        .unwrap_or_default()
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .filter(|(n, _)| n.trim().eq_ignore_ascii_case(name))
        .count()
}

/// Body of a raw request.
pub fn body(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or_default()
}

pub const SUMMARY: &str = r#"{
    "db_core": {
        "endpoints": {
            "image": "https://arcadia.digitalblasphemy.com",
            "thumb": "https://thumbs.digitalblasphemy.com",
            "web": "https://digitalblasphemy.com"
        }
    }
}"#;
