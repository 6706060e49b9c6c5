//! Echo server: answers every request with its own body (or the path when
//! there is none), one thread per connection.
//!
//! Run with `cargo run --example echo_server`, then:
//!
//! ```sh
//! curl -v http://127.0.0.1:8080/hello -d 'some data'
//! ```

use framewire::connection::ServerConnection;
use framewire::protocol::{Entity, HttpError, ParseError, Request, Response};
use http::StatusCode;
use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::thread;
use tracing::{error, info};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let listener = TcpListener::bind("127.0.0.1:8080")?;
    info!("listening on 127.0.0.1:8080");

    for stream in listener.incoming() {
        let stream = stream?;
        thread::spawn(move || {
            if let Err(e) = serve(stream) {
                error!("connection ended: {e}");
            }
        });
    }
    Ok(())
}

fn serve(stream: TcpStream) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    info!(%peer, "accepted connection");

    let reader = stream.try_clone()?;
    let mut conn = ServerConnection::new(reader, stream);

    loop {
        let response = match conn.read() {
            Ok(request) => echo(&request),
            Err(HttpError::ReadError { source: ParseError::ConnectionClosed }) => {
                info!(%peer, "peer closed connection");
                return Ok(());
            }
            Err(HttpError::ReadError { source }) => Response::from_parse_error(&source),
            Err(HttpError::SendError { .. }) => unreachable!("read never yields a send error"),
        };

        if let Err(e) = conn.send(&response) {
            error!(%peer, "send failed: {e}");
            return Ok(());
        }
    }
}

fn echo(request: &Request) -> Response {
    let body = match request.entity() {
        Some(entity) => {
            let mut body = Vec::new();
            match entity.content().and_then(|mut c| c.read_to_end(&mut body)) {
                Ok(_) => body,
                Err(e) => {
                    error!("reading request body failed: {e}");
                    return Response::new(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
        None => format!("echo from {}\n", request.path()).into_bytes(),
    };

    let mut response =
        Response::with_entity(StatusCode::OK, Entity::from_bytes(body.clone(), false, false));
    response.headers_mut().insert("content-type", "text/plain");
    response.headers_mut().insert("content-length", body.len().to_string());
    response
}
