//! A blocking HTTP/1.1 message framing and transfer-encoding engine.
//!
//! The crate splits message handling into three layers:
//!
//! - [`protocol`]: the message model: heads, header fields, the
//!   [`Entity`](protocol::Entity) body store with its memory/disk hybrid
//!   backing and gzip handling
//! - [`codec`]: pure byte codecs over buffers: header framing, start-line
//!   and header-field decoding, chunked and fixed-length body codecs
//! - [`connection`]: blocking drivers that run the codecs over `std::io`
//!   streams, one connection per thread
//!
//! Both sides of the protocol are covered: [`ServerConnection`] reads
//! requests and sends responses, [`ClientConnection`] sends requests and
//! reads responses. Bodies are materialized eagerly, so every `read` returns
//! a complete message and leaves the stream aligned on the next one.
//!
//! [`ServerConnection`]: connection::ServerConnection
//! [`ClientConnection`]: connection::ClientConnection
//!
//! # Example
//!
//! A minimal echo server, one thread per connection:
//!
//! ```no_run
//! use framewire::connection::ServerConnection;
//! use framewire::protocol::{Entity, Response};
//! use http::StatusCode;
//! use std::net::TcpListener;
//!
//! fn main() -> std::io::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080")?;
//!     for stream in listener.incoming() {
//!         let stream = stream?;
//!         std::thread::spawn(move || {
//!             let reader = stream.try_clone().expect("clone stream");
//!             let mut conn = ServerConnection::new(reader, stream);
//!             while let Ok(request) = conn.read() {
//!                 let body = format!("hello from {}", request.path()).into_bytes();
//!                 let mut response = Response::with_entity(
//!                     StatusCode::OK,
//!                     Entity::from_bytes(body.clone(), false, false),
//!                 );
//!                 response.headers_mut().insert("content-length", body.len().to_string());
//!                 if conn.send(&response).is_err() {
//!                     break;
//!                 }
//!             }
//!         });
//!     }
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod connection;
pub mod protocol;

mod utils;
