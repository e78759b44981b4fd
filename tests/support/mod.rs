//! In-process decision service for integration tests
//!
//! Listens on an ephemeral localhost port, records every request in arrival
//! order and answers from a script. Runs on its own thread with a
//! current-thread tokio runtime, serving one connection at a time.

#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

use combat_bridge::protocol::messages::{decode_request, encode_reply};
use combat_bridge::protocol::{read_frame, write_frame, ActionCommand, Reply, Request};

/// How the service answers decision calls
#[derive(Debug, Clone)]
pub enum DecideBehavior {
    Respond(Vec<ActionCommand>),
    /// Reply with a remote error
    ErrorReply,
    /// Close the connection without replying
    Hangup,
}

#[derive(Debug, Default)]
pub struct ServiceLog {
    pub requests: Vec<Request>,
    pub accepted: usize,
    /// Connections the client closed cleanly
    pub closed: usize,
}

pub struct MockService {
    addr: SocketAddr,
    log: Arc<Mutex<ServiceLog>>,
    behavior: Arc<Mutex<DecideBehavior>>,
}

impl MockService {
    pub fn start(behavior: DecideBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let log = Arc::new(Mutex::new(ServiceLog::default()));
        let behavior = Arc::new(Mutex::new(behavior));
        let (server_log, server_behavior) = (log.clone(), behavior.clone());

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                loop {
                    let Ok((mut sock, _peer)) = listener.accept().await else {
                        return;
                    };
                    server_log.lock().unwrap().accepted += 1;
                    serve(&mut sock, &server_log, &server_behavior).await;
                }
            });
        });

        Self {
            addr,
            log,
            behavior,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn set_behavior(&self, behavior: DecideBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().requests.clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.requests().iter().map(Request::kind).collect()
    }

    pub fn accepted(&self) -> usize {
        self.log.lock().unwrap().accepted
    }

    pub fn closed(&self) -> usize {
        self.log.lock().unwrap().closed
    }
}

async fn serve(
    sock: &mut tokio::net::TcpStream,
    log: &Mutex<ServiceLog>,
    behavior: &Mutex<DecideBehavior>,
) {
    loop {
        let payload = match read_frame(sock).await {
            Ok(payload) => payload,
            Err(_) => {
                log.lock().unwrap().closed += 1;
                return;
            }
        };
        let request = decode_request(&payload).unwrap();
        let is_decide = matches!(request, Request::Act { .. } | Request::SendState { .. });
        log.lock().unwrap().requests.push(request);

        let reply = if is_decide {
            match behavior.lock().unwrap().clone() {
                DecideBehavior::Respond(actions) => Reply::Actions { actions },
                DecideBehavior::ErrorReply => Reply::Error {
                    code: "INTERNAL".into(),
                    message: "model unavailable".into(),
                },
                DecideBehavior::Hangup => return,
            }
        } else {
            Reply::Empty
        };
        if write_frame(sock, &encode_reply(&reply).unwrap()).await.is_err() {
            return;
        }
    }
}
