use std::sync::Arc;

use serde_json::Value;

use super::{MemoryStore, ScriptedChannel, job, service_with};
use scrapjobs_service::{ChannelError, CloseReason};

fn store() -> Arc<MemoryStore> {
	Arc::new(MemoryStore::with_jobs(vec![
		job("https://jobs.test/1", "Backend engineer", "Rust services", &["remote"]),
		job("https://jobs.test/2", "Data engineer", "Python pipelines", &["onsite"]),
	]))
}

#[tokio::test]
async fn answers_each_query_in_order_until_peer_closes() {
	let service = service_with(store());
	let mut channel =
		ScriptedChannel::with_frames(&[r#"{"query":"rust"}"#, "{}", r##"{"query":"#onsite"}"##]);
	let summary = service.serve_channel(&mut channel).await;

	assert_eq!(summary.queries_served, 3);
	assert_eq!(summary.reason, CloseReason::PeerClosed);
	assert!(!summary.reason.is_failure());
	assert_eq!(channel.sent.len(), 3);

	let first: Value = serde_json::from_str(&channel.sent[0]).expect("Failed to parse reply.");
	let second: Value = serde_json::from_str(&channel.sent[1]).expect("Failed to parse reply.");
	let third: Value = serde_json::from_str(&channel.sent[2]).expect("Failed to parse reply.");

	assert_eq!(first[0]["Url"], "https://jobs.test/1");
	assert_eq!(second, Value::Array(Vec::new()));
	assert_eq!(third[0]["Url"], "https://jobs.test/2");
}

#[tokio::test]
async fn undecodable_payload_closes_without_reading_further() {
	let service = service_with(store());
	let mut channel =
		ScriptedChannel::with_frames(&[r#"{"query":"rust"}"#, "not json", r#"{"query":"x"}"#]);
	let summary = service.serve_channel(&mut channel).await;

	assert_eq!(summary.queries_served, 1);
	assert_eq!(summary.reason, CloseReason::DecodeFailed);
	assert_eq!(channel.recv_calls, 2);
	assert_eq!(channel.inbound.len(), 1);
}

#[tokio::test]
async fn storage_failure_closes_the_channel() {
	let service = service_with(Arc::new(MemoryStore {
		fail_after_writes: Some(0),
		..Default::default()
	}));
	let mut channel = ScriptedChannel::with_frames(&[r#"{"query":"rust"}"#]);
	let summary = service.serve_channel(&mut channel).await;

	assert_eq!(summary.queries_served, 0);
	assert_eq!(summary.reason, CloseReason::StoreFailed);
	assert!(channel.sent.is_empty());
}

#[tokio::test]
async fn blank_query_is_answered_without_storage() {
	let store = store();
	let service = service_with(store.clone());
	let mut channel = ScriptedChannel::with_frames(&[r#"{"query":"   "}"#]);
	let summary = service.serve_channel(&mut channel).await;

	assert_eq!(summary.queries_served, 1);
	assert_eq!(channel.sent, vec!["[]".to_string()]);
	assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn send_and_receive_failures_are_reported() {
	let service = service_with(store());
	let mut failing_send =
		ScriptedChannel { fail_sends: true, ..ScriptedChannel::with_frames(&["{}"]) };
	let summary = service.serve_channel(&mut failing_send).await;

	assert_eq!(summary.reason, CloseReason::SendFailed);
	assert_eq!(summary.queries_served, 0);

	let mut failing_recv = ScriptedChannel::default();

	failing_recv.inbound.push_back(Err(ChannelError("connection reset".to_string())));

	let summary = service.serve_channel(&mut failing_recv).await;

	assert_eq!(summary.reason, CloseReason::ReceiveFailed);
	assert!(summary.reason.is_failure());
}
