//! WebSocket transport for live search channels.

use axum::extract::ws::{Message, WebSocket};

use scrapjobs_service::{BoxFuture, ChannelError, QueryChannel};

/// What one inbound frame means to the search loop.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
	Payload(String),
	Closed,
	Ignored,
}

pub struct WsChannel {
	socket: WebSocket,
}
impl WsChannel {
	pub fn new(socket: WebSocket) -> Self {
		Self { socket }
	}

	/// Sends a close frame. The peer may already be gone, so failures are only logged.
	pub async fn close(mut self) {
		if let Err(err) = self.socket.send(Message::Close(None)).await {
			tracing::debug!(error = %err, "Failed to send WebSocket close frame.");
		}
	}
}

impl QueryChannel for WsChannel {
	fn recv(&mut self) -> BoxFuture<'_, Result<Option<String>, ChannelError>> {
		Box::pin(async move {
			loop {
				let Some(message) = self.socket.recv().await else { return Ok(None) };
				let message = message.map_err(|err| ChannelError(err.to_string()))?;

				match classify(message)? {
					Frame::Payload(payload) => return Ok(Some(payload)),
					Frame::Closed => return Ok(None),
					Frame::Ignored => continue,
				}
			}
		})
	}

	fn send(&mut self, payload: String) -> BoxFuture<'_, Result<(), ChannelError>> {
		Box::pin(async move {
			self.socket
				.send(Message::Text(payload.into()))
				.await
				.map_err(|err| ChannelError(err.to_string()))
		})
	}
}

fn classify(message: Message) -> Result<Frame, ChannelError> {
	match message {
		Message::Text(text) => Ok(Frame::Payload(text.as_str().to_owned())),
		Message::Binary(bytes) => String::from_utf8(bytes.to_vec())
			.map(Frame::Payload)
			.map_err(|err| ChannelError(format!("Binary frame is not valid UTF-8: {err}."))),
		Message::Close(_) => Ok(Frame::Closed),
		// Ping and pong are answered by the transport.
		_ => Ok(Frame::Ignored),
	}
}
