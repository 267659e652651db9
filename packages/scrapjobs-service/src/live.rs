//! Long-lived search channel: one query at a time, answered in order, until the peer
//! goes away or something fails.

use serde::Serialize;

use crate::{BoxFuture, Error, ScrapjobsService, SearchRequest};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

/// Transport underneath a live search channel.
pub trait QueryChannel
where
	Self: Send,
{
	/// Next text payload from the peer, or `None` once the peer has closed the channel.
	fn recv(&mut self) -> BoxFuture<'_, Result<Option<String>, ChannelError>>;

	fn send(&mut self, payload: String) -> BoxFuture<'_, Result<(), ChannelError>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
	PeerClosed,
	DecodeFailed,
	StoreFailed,
	ReceiveFailed,
	SendFailed,
}
impl CloseReason {
	pub fn is_failure(self) -> bool {
		!matches!(self, Self::PeerClosed)
	}
}

#[derive(Debug)]
pub enum ChannelState {
	Open,
	AwaitingQuery,
	Processing(SearchRequest),
	Closed(CloseReason),
}
impl ChannelState {
	fn name(&self) -> &'static str {
		match self {
			Self::Open => "open",
			Self::AwaitingQuery => "awaiting_query",
			Self::Processing(_) => "processing",
			Self::Closed(_) => "closed",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
	pub queries_served: u64,
	pub reason: CloseReason,
}

impl ScrapjobsService {
	/// Drives `channel` until it closes. A payload that fails to decode closes the channel
	/// rather than being skipped, and so does any storage failure.
	pub async fn serve_channel<C>(&self, channel: &mut C) -> ChannelSummary
	where
		C: QueryChannel + ?Sized,
	{
		let mut state = ChannelState::Open;
		let mut queries_served = 0_u64;

		loop {
			let next = match state {
				ChannelState::Open => ChannelState::AwaitingQuery,
				ChannelState::AwaitingQuery => match channel.recv().await {
					Ok(Some(payload)) => match SearchRequest::decode(&payload) {
						Ok(req) => ChannelState::Processing(req),
						Err(err) => {
							tracing::warn!(
								error = %err,
								"Closing live channel on undecodable payload."
							);

							ChannelState::Closed(CloseReason::DecodeFailed)
						},
					},
					Ok(None) => ChannelState::Closed(CloseReason::PeerClosed),
					Err(err) => {
						tracing::warn!(error = %err, "Live channel receive failed.");

						ChannelState::Closed(CloseReason::ReceiveFailed)
					},
				},
				ChannelState::Processing(req) => match self.search(req).await {
					Ok(results) => match serde_json::to_string(&results) {
						Ok(payload) => match channel.send(payload).await {
							Ok(()) => {
								queries_served += 1;

								ChannelState::AwaitingQuery
							},
							Err(err) => {
								tracing::warn!(error = %err, "Live channel send failed.");

								ChannelState::Closed(CloseReason::SendFailed)
							},
						},
						Err(err) => {
							tracing::error!(error = %err, "Failed to encode search results.");

							ChannelState::Closed(CloseReason::SendFailed)
						},
					},
					Err(err) => {
						log_search_failure(&err);

						ChannelState::Closed(CloseReason::StoreFailed)
					},
				},
				ChannelState::Closed(reason) => {
					tracing::info!(queries_served, reason = ?reason, "Live channel closed.");

					return ChannelSummary { queries_served, reason };
				},
			};

			tracing::debug!(state = next.name(), "Live channel transition.");

			state = next;
		}
	}
}

fn log_search_failure(err: &Error) {
	if err.is_store_failure() {
		tracing::warn!(error = %err, "Closing live channel after storage failure.");
	} else {
		tracing::warn!(error = %err, "Closing live channel after search failure.");
	}
}
