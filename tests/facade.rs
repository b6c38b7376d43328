//! Contract of the endpoint services against an in-process transport.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use http::{HeaderMap, Method, StatusCode};
use openai_kit::{
    AssistantId, Error, ResponseMeta, TransportErrorKind, TransportRequest, TransportResponse,
};
use serde_json::{Value, json};

type Reply = Box<dyn Fn(&TransportRequest) -> Result<TransportResponse, Error> + Send + Sync>;

/// Records every request and answers with a canned reply.
struct Recorder {
    calls: Mutex<Vec<TransportRequest>>,
    reply: Reply,
}

impl Recorder {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn replying_json(status: StatusCode, body: Value) -> Arc<Self> {
        Self::new(Box::new(move |_| {
            Ok(TransportResponse {
                status,
                headers: HeaderMap::new(),
                body: serde_json::to_vec(&body).unwrap(),
                meta: ResponseMeta::default(),
            })
        }))
    }

    fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn handle(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        let reply = (self.reply)(&req);
        self.calls.lock().unwrap().push(req);
        reply
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl openai_kit::AsyncTransport for Recorder {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        self.handle(req)
    }
}

#[cfg(feature = "blocking")]
impl openai_kit::BlockingTransport for Recorder {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        self.handle(req)
    }
}

fn assistant_json(id: &str) -> Value {
    json!({
        "id": id,
        "object": "assistant",
        "created_at": 1,
        "model": "gpt-4o",
        "tools": []
    })
}

fn connection_refused() -> Reply {
    Box::new(|req| {
        Err(Error::Transport {
            method: req.method.clone(),
            path: req.url.path().into(),
            kind: TransportErrorKind::Connect,
            source: "connection refused".into(),
        })
    })
}

#[test]
fn services_are_send_sync_and_clone() {
    fn assert_shareable<T: Send + Sync + Clone + 'static>() {}
    #[cfg(feature = "async")]
    assert_shareable::<openai_kit::api::AssistantsService>();
    #[cfg(feature = "blocking")]
    assert_shareable::<openai_kit::api::BlockingAssistantsService>();
}

#[cfg(feature = "async")]
mod async_facade {
    use super::*;
    use openai_kit::{Client, CreateAssistantRequest, ListAssistantsParams};

    fn client(transport: Arc<Recorder>) -> Result<Client> {
        Ok(Client::builder("https://api.example.test/v1")?
            .api_key("sk-test")
            .project("proj_1")
            .transport(transport)
            .build()?)
    }

    #[tokio::test]
    async fn constructing_a_service_sends_nothing() -> Result<()> {
        let recorder = Recorder::replying_json(StatusCode::OK, json!({}));
        let client = client(recorder.clone())?;

        let _first = client.assistants();
        let _second = openai_kit::api::AssistantsService::new(client.clone());

        assert!(recorder.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_issues_exactly_one_request_and_decodes_reply() -> Result<()> {
        let recorder = Recorder::replying_json(
            StatusCode::OK,
            json!({
                "object": "list",
                "data": [assistant_json("asst_1")],
                "first_id": "asst_1",
                "last_id": "asst_1",
                "has_more": false
            }),
        );
        let client = client(recorder.clone())?;

        let page = client
            .assistants()
            .list(&ListAssistantsParams::new().limit(1))
            .await?;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, AssistantId::new("asst_1"));

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        let sent = &calls[0];
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url.as_str(), "https://api.example.test/v1/assistants");
        assert_eq!(sent.query, vec![("limit".to_string(), "1".to_string())]);
        assert_eq!(sent.headers.get("authorization").unwrap(), "Bearer sk-test");
        assert_eq!(sent.headers.get("openai-beta").unwrap(), "assistants=v2");
        assert_eq!(sent.headers.get("openai-project").unwrap(), "proj_1");
        assert!(sent.body.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn create_sends_json_payload() -> Result<()> {
        let recorder = Recorder::replying_json(StatusCode::OK, assistant_json("asst_new"));
        let client = client(recorder.clone())?;

        client
            .assistants()
            .create(&CreateAssistantRequest::new("gpt-4o").name("Helper"))
            .await?;

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        let body = calls[0].body.as_ref().expect("json body");
        assert_eq!(body.content_type.as_ref().unwrap(), "application/json");
        let sent: Value = serde_json::from_slice(&body.bytes)?;
        assert_eq!(sent, json!({ "model": "gpt-4o", "name": "Helper" }));
        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_reaches_caller_unchanged() -> Result<()> {
        let recorder = Recorder::new(connection_refused());
        let client = client(recorder.clone())?;

        let err = client
            .assistants()
            .retrieve("asst_1")
            .await
            .expect_err("transport failure");

        match &err {
            Error::Transport {
                method,
                path,
                kind,
                source,
            } => {
                assert_eq!(*method, Method::GET);
                assert_eq!(&**path, "/v1/assistants/asst_1");
                assert_eq!(*kind, TransportErrorKind::Connect);
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
        assert_eq!(recorder.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn blank_id_fails_before_reaching_transport() -> Result<()> {
        let recorder = Recorder::replying_json(StatusCode::OK, assistant_json("asst_1"));
        let client = client(recorder.clone())?;

        let err = client.assistants().delete("").await.expect_err("blank id");
        assert_eq!(err.kind(), openai_kit::ErrorKind::InvalidConfig);
        assert!(recorder.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn separate_services_match_a_shared_one() -> Result<()> {
        let recorder = Recorder::replying_json(StatusCode::OK, assistant_json("asst_9"));
        let client = client(recorder.clone())?;

        let shared = client.assistants();
        let a = shared.retrieve("asst_9").await?;
        let b = shared.retrieve("asst_9").await?;
        let c = client.assistants().retrieve("asst_9").await?;
        let d = client.assistants().retrieve("asst_9").await?;
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(c, d);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 4);
        for call in &calls[1..] {
            assert_eq!(call.method, calls[0].method);
            assert_eq!(call.url, calls[0].url);
            assert_eq!(call.headers, calls[0].headers);
            assert_eq!(call.query, calls[0].query);
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_share_one_transport() -> Result<()> {
        let recorder = Recorder::new(Box::new(|req| {
            let id = req.url.path_segments().and_then(|mut s| s.next_back()).unwrap_or_default();
            Ok(TransportResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: serde_json::to_vec(&assistant_json(id)).unwrap(),
                meta: ResponseMeta::default(),
            })
        }));
        let assistants = client(recorder.clone())?.assistants();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let assistants = assistants.clone();
            tasks.push(tokio::spawn(async move {
                let id = format!("asst_{i}");
                let assistant = assistants.retrieve(id.as_str()).await?;
                assert_eq!(assistant.id.as_str(), id);
                Ok::<_, Error>(())
            }));
        }
        for task in tasks {
            task.await??;
        }

        assert_eq!(recorder.calls().len(), 32);
        Ok(())
    }

    #[tokio::test]
    async fn oversized_retry_after_ms_does_not_abort_the_call() -> Result<()> {
        let recorder = Recorder::new(Box::new(|_| {
            let mut headers = HeaderMap::new();
            headers.insert("retry-after-ms", http::HeaderValue::from_static("1e30"));
            Ok(TransportResponse {
                status: StatusCode::TOO_MANY_REQUESTS,
                headers,
                body: br#"{"error":{"message":"slow down","type":"requests","code":"rate_limit_exceeded"}}"#.to_vec(),
                meta: ResponseMeta::default(),
            })
        }));
        let client = client(recorder.clone())?;

        let err = client
            .assistants()
            .list(&ListAssistantsParams::new())
            .await
            .expect_err("rate limited");

        assert_eq!(err.kind(), openai_kit::ErrorKind::RateLimited);
        assert_eq!(err.retry_after(), None);
        assert_eq!(recorder.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn http_status_errors_keep_request_context() -> Result<()> {
        let recorder = Recorder::replying_json(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "Incorrect API key provided: sk-test.", "type": "invalid_request_error", "code": "invalid_api_key" } }),
        );
        let client = client(recorder.clone())?;

        let err = client
            .assistants()
            .list(&ListAssistantsParams::new())
            .await
            .expect_err("auth failure");

        assert!(err.is_auth_error());
        let http = err.http().expect("http error");
        assert_eq!(http.code.as_deref(), Some("invalid_api_key"));
        assert_eq!(
            http.message.as_deref(),
            Some("Incorrect API key provided: <redacted>.")
        );
        Ok(())
    }
}

#[cfg(feature = "blocking")]
mod blocking_facade {
    use super::*;
    use openai_kit::{BlockingClient, ModifyAssistantRequest};

    #[test]
    fn modify_issues_one_post_with_json_body() -> Result<()> {
        let recorder = Recorder::replying_json(StatusCode::OK, assistant_json("asst_1"));
        let client = BlockingClient::builder("https://api.example.test/v1")?
            .api_key("sk-test")
            .transport(recorder.clone())
            .build()?;

        let assistants = client.assistants();
        assert!(recorder.calls().is_empty());

        assistants.modify("asst_1", &ModifyAssistantRequest::new().instructions("short"))?;

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(
            calls[0].url.as_str(),
            "https://api.example.test/v1/assistants/asst_1"
        );
        let sent: Value = serde_json::from_slice(&calls[0].body.as_ref().unwrap().bytes)?;
        assert_eq!(sent, json!({ "instructions": "short" }));
        Ok(())
    }

    #[test]
    fn transport_failure_reaches_caller_unchanged() -> Result<()> {
        let recorder = Recorder::new(connection_refused());
        let client = BlockingClient::builder("https://api.example.test/v1")?
            .transport(recorder.clone())
            .build()?;

        let err = client.assistants().retrieve("asst_1").expect_err("failure");
        assert_eq!(err.kind(), openai_kit::ErrorKind::Transport);
        assert_eq!(err.to_string(), "Transport error during GET /v1/assistants/asst_1: connection refused");
        Ok(())
    }
}
