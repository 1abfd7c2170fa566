//!  Yado Hotel Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! MCP server integration tests over the streamable HTTP transport.

#![cfg(feature = "mcp")]

use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::Duration;
use tracing::debug;

const TIMEOUT: Duration = Duration::from_secs(3);
const BINARY: &str = env!("CARGO_BIN_EXE_yado-hotel-mcp");

fn get_free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

fn spawn_http_server(port: u16) -> Result<Child> {
    Command::new(BINARY)
        .arg("http")
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg(port.to_string())
        .env("APPLICATION_ID", "test-app-id")
        .env_remove("YADO_POLICY_FILE")
        .env("RUST_LOG", "warn")
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .context("Failed to spawn MCP HTTP server")
}

async fn connect_with_retry(port: u16) -> Result<TcpStream> {
    let start = std::time::Instant::now();
    loop {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(stream) => return Ok(stream),
            Err(e) if start.elapsed() < TIMEOUT => {
                debug!("Server not ready yet: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Err(e) => return Err(e).context("Failed to connect"),
        }
    }
}

/// Sends `initialize` and returns the raw HTTP response head and body.
async fn mcp_http_initialize(stream: &mut TcpStream, port: u16) -> Result<String> {
    let init_request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test-client","version":"1.0"}}}"#;

    let request = format!(
        "POST /mcp HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nContent-Type: application/json\r\nAccept: application/json, text/event-stream\r\nContent-Length: {}\r\n\r\n{}",
        port,
        init_request.len(),
        init_request
    );
    stream.write_all(request.as_bytes()).await?;

    let mut response = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match tokio::time::timeout(TIMEOUT, stream.read(&mut buf)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => {
                response.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&response);
                if text.contains("\"id\":1") && text.contains("\"result\"") {
                    break;
                }
            }
            Ok(Err(e)) => return Err(e).context("Read error"),
        }
    }
    Ok(String::from_utf8_lossy(&response).into_owned())
}

fn session_id(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("mcp-session-id")
            .then(|| value.trim().to_string())
    })
}

#[tokio::test]
async fn test_mcp_http_server_starts() -> Result<()> {
    let port = get_free_port()?;
    let mut child = spawn_http_server(port)?;

    let mut stream = connect_with_retry(port).await?;
    let response = mcp_http_initialize(&mut stream, port)
        .await
        .context("Initialize failed")?;
    debug!("Initialize response: {}", &response[..response.len().min(300)]);

    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("\"capabilities\""), "{}", response);
    let session = session_id(&response).context("No session ID")?;
    assert!(!session.is_empty(), "Should have session ID");

    drop(stream);
    let _ = child.kill().await;
    let _ = child.wait().await;
    Ok(())
}
