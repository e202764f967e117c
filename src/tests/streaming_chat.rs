// Streamed chat completions end to end: token fetch, request shape and
// event delivery through the decoder.

#[cfg(test)]
mod test {

    use httpmock::Method::POST;
    use httpmock::MockServer;

    use crate::client::options::ChatOptions;
    use crate::error::Error;
    use crate::models::{ChatResponse, Message};
    use crate::stream::event::StreamEvent;
    use crate::tests::common::{client, mock_valid_token, stream_chunk};

    const CHAT_PATH: &str = "/api/v1/chat/completions";

    async fn run_stream(client: &crate::Client) -> (Vec<StreamEvent<ChatResponse>>, crate::Result<()>) {
        let mut events = Vec::new();
        let result = client
            .chat_stream(vec![Message::user("Tell me a story")], &ChatOptions::new(), |event| {
                events.push(event)
            })
            .await;
        (events, result)
    }

    #[tokio::test]
    async fn chunks_are_delivered_in_order_then_done() {
        let server = MockServer::start_async().await;
        mock_valid_token(&server, "stream-token").await;
        let body = format!(
            "data: {}\n\ndata: {}\n\ndata: [DONE]\n\n",
            stream_chunk("Once upon"),
            stream_chunk(" a time")
        );
        let chat = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(CHAT_PATH)
                    .header("authorization", "Bearer stream-token")
                    .header("accept", "text/event-stream");
                then.status(200).header("content-type", "text/event-stream").body(body);
            })
            .await;

        let (events, result) = run_stream(&client(&server)).await;

        assert!(result.is_ok());
        assert_eq!(chat.hits_async().await, 1);
        assert_eq!(events.len(), 3);

        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Chunk(chunk) => chunk.content().map(str::to_owned),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Once upon a time");
        assert!(events[2].is_done());
        assert_eq!(events.iter().filter(|e| e.is_done()).count(), 1);
    }

    #[tokio::test]
    async fn malformed_chunk_is_reported_and_skipped() {
        let server = MockServer::start_async().await;
        mock_valid_token(&server, "stream-token").await;
        let body = format!("data: not-json\n\ndata: {}\n\ndata: [DONE]\n", stream_chunk("ok"));
        server
            .mock_async(|when, then| {
                when.method(POST).path(CHAT_PATH);
                then.status(200).header("content-type", "text/event-stream").body(body);
            })
            .await;

        let (events, result) = run_stream(&client(&server)).await;

        assert!(result.is_ok());
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], StreamEvent::Failed(e) if e.is_decode()));
        assert!(matches!(&events[1], StreamEvent::Chunk(c) if c.content() == Some("ok")));
        assert!(events[2].is_done());
    }

    #[tokio::test]
    async fn stream_without_done_ends_quietly() {
        let server = MockServer::start_async().await;
        mock_valid_token(&server, "stream-token").await;
        let body = format!("data: {}\n\n", stream_chunk("partial"));
        server
            .mock_async(|when, then| {
                when.method(POST).path(CHAT_PATH);
                then.status(200).header("content-type", "text/event-stream").body(body);
            })
            .await;

        let (events, result) = run_stream(&client(&server)).await;

        assert!(result.is_ok());
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_done());
    }

    #[tokio::test]
    async fn api_error_is_returned_before_any_event() {
        let server = MockServer::start_async().await;
        mock_valid_token(&server, "stream-token").await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(CHAT_PATH);
                then.status(500).body("internal failure");
            })
            .await;

        let (events, result) = run_stream(&client(&server)).await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
        assert!(err.to_string().contains("internal failure"));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn invalid_messages_never_reach_the_network() {
        let server = MockServer::start_async().await;
        let oauth = mock_valid_token(&server, "stream-token").await;
        let client = client(&server);

        let mut calls = 0;
        let result = client
            .chat_stream(Vec::new(), &ChatOptions::new(), |_: StreamEvent<ChatResponse>| calls += 1)
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(calls, 0);
        assert_eq!(oauth.hits_async().await, 0);
    }
}
