//! BizHawk connector client.
//!
//! The connector Lua script running inside BizHawk listens on the first free
//! port in 43055-43059 and speaks newline-delimited JSON: each line is an
//! array of requests, answered by one line holding an array of responses in
//! the same order.

use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bluesphere_core::{Error, MemorySource, ReadRequest, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of consecutive ports the connector script may bind to
const PORT_RANGE: u16 = 5;

/// A request that gets no answer within this time drops the connection
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum Request<'a> {
    Ping,
    System,
    MemorySize {
        domain: &'a str,
    },
    Read {
        address: u64,
        size: usize,
        domain: &'a str,
    },
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum Response {
    Pong,
    SystemResponse { value: String },
    MemorySizeResponse { value: u64 },
    ReadResponse { value: String },
    Error { err: String },
    #[serde(other)]
    Unknown,
}

/// Connection to the BizHawk connector script
///
/// Requests and replies are matched by order only, so once a write or read
/// fails the stream can no longer be trusted and every later request fails
/// with [`Error::NotConnected`].
pub struct BizHawkConnector {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    port: u16,
    broken: bool,
}

impl BizHawkConnector {
    /// Connect to the first connector script listening at `host:port` or the ports after it
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let mut last_error = None;

        for candidate in port..port.saturating_add(PORT_RANGE) {
            match TcpStream::connect((host, candidate)) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(REQUEST_TIMEOUT))?;
                    stream.set_nodelay(true)?;
                    let writer = stream.try_clone()?;
                    debug!("Connected to BizHawk connector on port {}", candidate);
                    return Ok(Self {
                        reader: BufReader::new(stream),
                        writer,
                        port: candidate,
                        broken: false,
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(Error::NotConnected(format!(
            "no BizHawk connector on {}:{}-{} ({})",
            host,
            port,
            port.saturating_add(PORT_RANGE - 1),
            last_error.map_or_else(|| "no ports tried".to_string(), |e| e.to_string())
        )))
    }

    /// Port the connector script was found on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Check the connector script is alive
    pub fn ping(&mut self) -> Result<()> {
        match self.send_one(Request::Ping)? {
            Response::Pong => Ok(()),
            other => Err(unexpected("PONG", &other)),
        }
    }

    /// System id of the loaded core (e.g. "GEN")
    pub fn system(&mut self) -> Result<String> {
        match self.send_one(Request::System)? {
            Response::SystemResponse { value } => Ok(value),
            other => Err(unexpected("SYSTEM_RESPONSE", &other)),
        }
    }

    fn send_one(&mut self, request: Request<'_>) -> Result<Response> {
        let mut responses = self.send_requests(&[request])?;
        responses
            .pop()
            .ok_or_else(|| Error::Protocol("empty response list".to_string()))
    }

    fn send_requests(&mut self, requests: &[Request<'_>]) -> Result<Vec<Response>> {
        if self.broken {
            return Err(Error::NotConnected("BizHawk connection is out of sync".to_string()));
        }

        let mut line = serde_json::to_string(requests)?;
        line.push('\n');

        let reply = self.exchange(&line).inspect_err(|_| self.broken = true)?;
        let responses = parse_responses(&reply)?;
        if responses.len() != requests.len() {
            return Err(Error::UnexpectedResponse {
                expected: format!("{} responses", requests.len()),
                actual: format!("{} responses", responses.len()),
            });
        }
        Ok(responses)
    }

    /// Write one request line and read the reply line
    fn exchange(&mut self, line: &str) -> Result<String> {
        self.writer.write_all(line.as_bytes()).map_err(map_io)?;

        let mut reply = String::new();
        let read = self.reader.read_line(&mut reply).map_err(map_io)?;
        if read == 0 {
            return Err(Error::NotConnected("BizHawk closed the connection".to_string()));
        }
        Ok(reply)
    }
}

impl MemorySource for BizHawkConnector {
    fn read(&mut self, requests: &[ReadRequest]) -> Result<Vec<Vec<u8>>> {
        let batch: Vec<Request<'_>> = requests
            .iter()
            .map(|r| Request::Read {
                address: r.address,
                size: r.size,
                domain: r.domain,
            })
            .collect();

        self.send_requests(&batch)?
            .into_iter()
            .map(|response| match response {
                Response::ReadResponse { value } => STANDARD
                    .decode(value.as_bytes())
                    .map_err(|e| Error::Protocol(format!("invalid base64 in read response: {}", e))),
                other => Err(unexpected("READ_RESPONSE", &other)),
            })
            .collect()
    }

    fn memory_size(&mut self, domain: &str) -> Result<u64> {
        match self.send_one(Request::MemorySize { domain })? {
            Response::MemorySizeResponse { value } => Ok(value),
            other => Err(unexpected("MEMORY_SIZE_RESPONSE", &other)),
        }
    }
}

/// Parse one response line, turning connector-side errors into request failures
fn parse_responses(line: &str) -> Result<Vec<Response>> {
    let responses: Vec<Response> = serde_json::from_str(line.trim_end())?;

    let errors: Vec<&str> = responses
        .iter()
        .filter_map(|r| match r {
            Response::Error { err } => Some(err.as_str()),
            _ => None,
        })
        .collect();
    if !errors.is_empty() {
        return Err(Error::RequestFailed(errors.join("; ")));
    }

    Ok(responses)
}

fn unexpected(expected: &str, actual: &Response) -> Error {
    Error::UnexpectedResponse {
        expected: expected.to_string(),
        actual: format!("{:?}", actual),
    }
}

/// Socket failures are never retried on the same stream: a late reply would
/// be read as the answer to the next request
fn map_io(e: io::Error) -> Error {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => {
            Error::NotConnected("BizHawk request timed out".to_string())
        }
        _ => Error::NotConnected(e.to_string()),
    }
}
