use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::{self, Message, Status};

/// Blocking client for the line protocol.
///
/// Requests are fire-and-forget: `get` and `put` write a frame and return.
/// A reader thread decodes response frames and delivers them on the channel
/// returned by [`connect`](Client::connect); responses match requests by
/// protocol order only, there are no correlation ids.
pub struct Client {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    reader: Option<JoinHandle<()>>,
}

impl Client {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
            reader: None,
        }
    }

    /// Establish the connection and start the response reader.
    ///
    /// Decoded responses arrive on the returned receiver in wire order. A
    /// malformed server frame is surfaced as a GET_ERROR message rather
    /// than silently dropped.
    pub fn connect(&mut self) -> Result<Receiver<Message>> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))?;
        info!("connected to {}:{}", self.host, self.port);

        let (tx, rx) = crossbeam_channel::unbounded();
        let read_stream = stream.try_clone()?;
        let reader = thread::Builder::new()
            .name("response-reader".to_string())
            .spawn(move || read_loop(read_stream, tx))?;

        self.stream = Some(stream);
        self.reader = Some(reader);
        Ok(rx)
    }

    /// Send a GET request for the key.
    pub fn get(&mut self, key: &str) -> Result<()> {
        self.send(&Message::get(key))
    }

    /// Send a PUT request; `None` (or an empty value) requests a delete.
    pub fn put(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        self.send(&Message::put(key, value.map(str::to_string)))
    }

    /// Tear down the connection and join the reader thread.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            info!("tearing down the connection");
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn send(&mut self, message: &Message) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::ConnectionClosed)?;
        stream.write_all(protocol::encode(message).as_bytes())?;
        stream.flush()?;
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Accumulate response frames and push decoded messages to the channel
/// until the socket closes or the receiver is dropped.
fn read_loop(stream: TcpStream, tx: Sender<Message>) {
    let reader = BufReader::new(stream);
    let mut lines: Vec<String> = Vec::new();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("response reader stopping: {}", e);
                break;
            }
        };
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            let message = protocol::decode(&lines).unwrap_or_else(|e| {
                info!("unable to decode response: {}", e);
                Message::error(Status::GetError, "Invalid response from server")
            });
            lines.clear();
            if tx.send(message).is_err() {
                break;
            }
            continue;
        }

        lines.push(line.to_string());
    }
    debug!("response reader stopped");
}
