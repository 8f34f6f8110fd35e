use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::protocol::{self, Message, Status};
use crate::store::{CachedStore, PutOutcome};

/// Handles one client connection.
///
/// Alternates between accumulating lines until a blank terminator completes
/// a frame, and dispatching the decoded request against the shared store.
/// Every well-formed or malformed frame is answered with exactly one
/// response frame; only a socket-level failure ends the loop without one.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    store: Arc<Mutex<CachedStore>>,
    max_frame_lines: usize,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        store: Arc<Mutex<CachedStore>>,
        max_frame_lines: usize,
    ) -> Self {
        Self {
            stream,
            peer,
            store,
            max_frame_lines,
        }
    }

    /// Runs the request loop until the client disconnects or the socket
    /// errors. The stream is dropped on every exit path.
    pub fn run(mut self) {
        debug!("client {} connected", self.peer);
        match self.serve() {
            Ok(()) => debug!("client {} disconnected", self.peer),
            Err(e) => info!("connection to {} lost: {}", self.peer, e),
        }
    }

    fn serve(&mut self) -> Result<()> {
        let reader = BufReader::new(self.stream.try_clone()?);
        let mut lines: Vec<String> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');

            if line.is_empty() {
                let response = self.dispatch(&lines);
                lines.clear();
                self.send(&response)?;
                continue;
            }

            if lines.len() >= self.max_frame_lines {
                // Unbounded frames would let one client exhaust memory;
                // answer once and hang up
                warn!("client {} exceeded frame line cap", self.peer);
                self.send(&Message::error(Status::GetError, "Request too large"))?;
                return Ok(());
            }

            lines.push(line.to_string());
        }

        Ok(())
    }

    /// Decode and execute one frame, producing the single response frame.
    ///
    /// Protocol failures and response-statused "requests" are reported on
    /// the generic GET_ERROR channel, matching what existing clients
    /// expect.
    fn dispatch(&self, lines: &[String]) -> Message {
        let request = match protocol::decode(lines) {
            Ok(request) => request,
            Err(e) => {
                info!("unable to decode request from {}: {}", self.peer, e);
                return Message::error(Status::GetError, "Invalid request");
            }
        };

        match request.status {
            Status::Get => self.handle_get(request),
            Status::Put => self.handle_put(request),
            status => {
                info!("client {} sent non-request status {}", self.peer, status);
                Message::error(Status::GetError, "Invalid request")
            }
        }
    }

    fn handle_get(&self, request: Message) -> Message {
        let key = match request.key {
            Some(key) => key,
            None => return Message::error(Status::GetError, "Invalid request"),
        };

        info!("handling GET request: {}", key);
        match self.store.lock().get(&key) {
            Ok(value) => Message::success(Status::GetSuccess, key, value),
            Err(e) => {
                info!("GET {} failed: {}", key, e);
                e.to_response(Status::GetError)
            }
        }
    }

    fn handle_put(&self, request: Message) -> Message {
        let key = match request.key {
            Some(key) => key,
            None => return Message::error(Status::GetError, "Invalid request"),
        };
        let value = request.value;

        info!("handling PUT request: {}", key);
        let result = self.store.lock().put(&key, value.as_deref());
        match result {
            Ok(PutOutcome::Inserted) => {
                Message::success(Status::PutSuccess, key, value.unwrap_or_default())
            }
            Ok(PutOutcome::Updated) => {
                Message::success(Status::PutUpdate, key, value.unwrap_or_default())
            }
            Ok(PutOutcome::Deleted(old)) => Message::success(Status::DeleteSuccess, key, old),
            Err(e) => {
                info!("PUT {} failed: {}", key, e);
                let deleting = value.as_deref().map_or(true, str::is_empty);
                e.to_response(if deleting {
                    Status::DeleteError
                } else {
                    Status::PutError
                })
            }
        }
    }

    fn send(&mut self, response: &Message) -> Result<()> {
        self.stream
            .write_all(protocol::encode(response).as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }
}
