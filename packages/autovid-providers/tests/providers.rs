use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	net::TcpListener,
	task::JoinHandle,
};

use autovid_config::YoutubeProviderConfig;
use autovid_providers::{Error, youtube::YoutubeClient};

fn provider_config(api_base: String, api_key: Option<&str>) -> YoutubeProviderConfig {
	YoutubeProviderConfig {
		api_base,
		api_key: api_key.map(str::to_string),
		timeout_ms: 2_000,
		locale: "it".to_string(),
		region: "IT".to_string(),
		max_results: 10,
	}
}

/// Serves one canned response and hands back the raw request line.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr = listener.local_addr().expect("Failed to read local address.");
	let handle = tokio::spawn(async move {
		let (mut socket, _) = listener.accept().await.expect("Failed to accept connection.");
		let mut buf = vec![0_u8; 8_192];
		let read = socket.read(&mut buf).await.expect("Failed to read request.");
		let request = String::from_utf8_lossy(&buf[..read]).to_string();
		let response = format!(
			"{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
			body.len()
		);

		socket.write_all(response.as_bytes()).await.expect("Failed to write response.");

		request.lines().next().unwrap_or_default().to_string()
	});

	(format!("http://{addr}/youtube/v3"), handle)
}

#[test]
fn client_requires_an_api_key() {
	let cfg = provider_config("http://localhost".to_string(), Some("  "));

	assert!(matches!(YoutubeClient::new(&cfg), Err(Error::InvalidRequest { .. })));
}

#[tokio::test]
async fn search_sends_the_documented_parameters() {
	let body = serde_json::json!({
		"items": [{ "id": { "kind": "youtube#video", "videoId": "vid1" } }]
	})
	.to_string();
	let (base, server) = serve_once("HTTP/1.1 200 OK", body).await;
	let client =
		YoutubeClient::new(&provider_config(base, Some("secret"))).expect("Failed to build client.");
	let ids = client.search("Alfa Romeo Giulia review").await.expect("Search failed.");
	let request_line = server.await.expect("Server task failed.");

	assert_eq!(ids, vec!["vid1".to_string()]);
	assert!(request_line.starts_with("GET /youtube/v3/search?"), "{request_line}");

	for param in [
		"part=snippet",
		"q=Alfa+Romeo+Giulia+review",
		"type=video",
		"maxResults=10",
		"relevanceLanguage=it",
		"regionCode=IT",
		"videoEmbeddable=true",
		"safeSearch=moderate",
		"order=relevance",
		"key=secret",
	] {
		assert!(request_line.contains(param), "Missing {param} in {request_line}");
	}
}

#[tokio::test]
async fn videos_batch_ids_into_one_call() {
	let body = serde_json::json!({
		"items": [
			{ "id": "a", "contentDetails": { "duration": "PT3M" } },
			{ "id": "b" }
		]
	})
	.to_string();
	let (base, server) = serve_once("HTTP/1.1 200 OK", body).await;
	let client =
		YoutubeClient::new(&provider_config(base, Some("secret"))).expect("Failed to build client.");
	let videos =
		client.videos(&["a".to_string(), "b".to_string()]).await.expect("Detail lookup failed.");
	let request_line = server.await.expect("Server task failed.");

	assert_eq!(videos.len(), 2);
	assert_eq!(videos[0].duration_sec, 180);
	assert!(request_line.contains("part=snippet%2CcontentDetails%2Cstatistics%2Cstatus"));
	assert!(request_line.contains("id=a%2Cb"));
}

#[tokio::test]
async fn non_success_status_is_reported() {
	let (base, server) =
		serve_once("HTTP/1.1 403 Forbidden", r#"{"error":{"code":403}}"#.to_string()).await;
	let client =
		YoutubeClient::new(&provider_config(base, Some("secret"))).expect("Failed to build client.");
	let err = client.search("anything").await.expect_err("Expected status error.");

	let _ = server.await;

	assert!(matches!(err, Error::Status { endpoint: "search", status } if status.as_u16() == 403));
}

#[tokio::test]
async fn oversized_detail_batches_are_rejected_locally() {
	let client = YoutubeClient::new(&provider_config("http://127.0.0.1:9".to_string(), Some("k")))
		.expect("Failed to build client.");
	let ids = (0..51).map(|i| format!("id{i}")).collect::<Vec<_>>();

	assert!(matches!(client.videos(&ids).await, Err(Error::InvalidRequest { .. })));
	assert!(client.videos(&[]).await.expect("Empty lookup must succeed.").is_empty());
}
