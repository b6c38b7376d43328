use crate::transport::request::Request;
use crate::{
    Assistant, AssistantDeleted, AssistantId, AssistantList, CreateAssistantRequest, Error,
    ListAssistantsParams, ModifyAssistantRequest,
};
use http::{HeaderName, HeaderValue};

const RESOURCE: &str = "assistants";

/// Header opting into the v2 Assistants API.
pub const ASSISTANTS_BETA: (&str, &str) = ("openai-beta", "assistants=v2");

fn route(req: Request) -> Request {
    req.header(
        HeaderName::from_static(ASSISTANTS_BETA.0),
        HeaderValue::from_static(ASSISTANTS_BETA.1),
    )
}

fn item_segments(id: &AssistantId) -> Result<[&str; 2], Error> {
    if id.as_str().trim().is_empty() {
        return Err(Error::InvalidConfig {
            message: "assistant id must not be empty".into(),
            source: None,
        });
    }
    Ok([RESOURCE, id.as_str()])
}

/// Route builders shared by the async and blocking services.
pub(crate) mod routes {
    use super::*;

    /// `POST /assistants`
    pub(crate) fn create(body: &CreateAssistantRequest) -> Result<Request, Error> {
        route(Request::post([RESOURCE])).json(body)
    }

    /// `GET /assistants?limit=&order=&after=&before=`
    pub(crate) fn list(params: &ListAssistantsParams) -> Request {
        route(Request::get([RESOURCE]).query_pairs(params.query_pairs()))
    }

    /// `GET /assistants/<id>`
    pub(crate) fn retrieve(id: &AssistantId) -> Result<Request, Error> {
        Ok(route(Request::get(item_segments(id)?)))
    }

    /// `POST /assistants/<id>`
    pub(crate) fn modify(id: &AssistantId, body: &ModifyAssistantRequest) -> Result<Request, Error> {
        route(Request::post(item_segments(id)?)).json(body)
    }

    /// `DELETE /assistants/<id>`
    pub(crate) fn delete(id: &AssistantId) -> Result<Request, Error> {
        Ok(route(Request::delete(item_segments(id)?)))
    }
}

#[cfg(feature = "tracing")]
fn trace_operation(operation: &'static str) {
    tracing::debug!(resource = RESOURCE, operation, "dispatching");
}

#[cfg(not(feature = "tracing"))]
fn trace_operation(_operation: &'static str) {}

/// OpenAI Assistants APIs.
///
/// Holds only a handle to the shared [`crate::Client`]; cloning is cheap and every
/// clone talks to the same transport stack. Construction performs no I/O.
#[derive(Clone)]
#[cfg(feature = "async")]
pub struct AssistantsService {
    client: crate::Client,
}

#[cfg(feature = "async")]
impl AssistantsService {
    #[must_use]
    pub fn new(client: crate::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "async")]
impl AssistantsService {
    /// `POST /assistants`
    pub async fn create(&self, request: &CreateAssistantRequest) -> Result<Assistant, Error> {
        trace_operation("create");
        self.client.send_json(routes::create(request)?).await
    }

    /// `GET /assistants`
    pub async fn list(&self, params: &ListAssistantsParams) -> Result<AssistantList, Error> {
        trace_operation("list");
        self.client.send_json(routes::list(params)).await
    }

    /// `GET /assistants/<id>`
    pub async fn retrieve(&self, id: impl Into<AssistantId>) -> Result<Assistant, Error> {
        trace_operation("retrieve");
        self.client.send_json(routes::retrieve(&id.into())?).await
    }

    /// `POST /assistants/<id>`
    pub async fn modify(
        &self,
        id: impl Into<AssistantId>,
        request: &ModifyAssistantRequest,
    ) -> Result<Assistant, Error> {
        trace_operation("modify");
        self.client
            .send_json(routes::modify(&id.into(), request)?)
            .await
    }

    /// `DELETE /assistants/<id>`
    pub async fn delete(&self, id: impl Into<AssistantId>) -> Result<AssistantDeleted, Error> {
        trace_operation("delete");
        self.client.send_json(routes::delete(&id.into())?).await
    }
}

/// OpenAI Assistants APIs (blocking).
#[cfg(feature = "blocking")]
#[derive(Clone)]
pub struct BlockingAssistantsService {
    client: crate::BlockingClient,
}

#[cfg(feature = "blocking")]
impl BlockingAssistantsService {
    #[must_use]
    pub fn new(client: crate::BlockingClient) -> Self {
        Self { client }
    }
}

#[cfg(feature = "blocking")]
impl BlockingAssistantsService {
    /// `POST /assistants`
    pub fn create(&self, request: &CreateAssistantRequest) -> Result<Assistant, Error> {
        trace_operation("create");
        self.client.send_json(routes::create(request)?)
    }

    /// `GET /assistants`
    pub fn list(&self, params: &ListAssistantsParams) -> Result<AssistantList, Error> {
        trace_operation("list");
        self.client.send_json(routes::list(params))
    }

    /// `GET /assistants/<id>`
    pub fn retrieve(&self, id: impl Into<AssistantId>) -> Result<Assistant, Error> {
        trace_operation("retrieve");
        self.client.send_json(routes::retrieve(&id.into())?)
    }

    /// `POST /assistants/<id>`
    pub fn modify(
        &self,
        id: impl Into<AssistantId>,
        request: &ModifyAssistantRequest,
    ) -> Result<Assistant, Error> {
        trace_operation("modify");
        self.client.send_json(routes::modify(&id.into(), request)?)
    }

    /// `DELETE /assistants/<id>`
    pub fn delete(&self, id: impl Into<AssistantId>) -> Result<AssistantDeleted, Error> {
        trace_operation("delete");
        self.client.send_json(routes::delete(&id.into())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssistantTool, ListOrder};
    use http::Method;
    use serde_json::{Value, json};

    fn body_json(req: &Request) -> Value {
        serde_json::from_slice(&req.body.as_ref().unwrap().bytes).unwrap()
    }

    #[test]
    fn every_route_carries_the_beta_header() {
        let id = AssistantId::new("asst_1");
        let requests = [
            routes::create(&CreateAssistantRequest::new("gpt-4o")).unwrap(),
            routes::list(&ListAssistantsParams::new()),
            routes::retrieve(&id).unwrap(),
            routes::modify(&id, &ModifyAssistantRequest::new()).unwrap(),
            routes::delete(&id).unwrap(),
        ];
        for req in requests {
            assert_eq!(req.headers.get("openai-beta").unwrap(), "assistants=v2");
        }
    }

    #[test]
    fn create_route_posts_json_body() {
        let body = CreateAssistantRequest::new("gpt-4o")
            .instructions("be brief")
            .tool(AssistantTool::file_search());
        let req = routes::create(&body).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.segments, vec!["assistants"]);
        assert_eq!(
            body_json(&req),
            json!({
                "model": "gpt-4o",
                "instructions": "be brief",
                "tools": [{ "type": "file_search" }]
            })
        );
    }

    #[test]
    fn list_route_maps_params_to_query() {
        let req = routes::list(&ListAssistantsParams::new().limit(5).order(ListOrder::Asc));
        assert_eq!(req.method, Method::GET);
        assert!(req.body.is_none());
        assert_eq!(
            req.query,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("order".to_string(), "asc".to_string()),
            ]
        );
    }

    #[test]
    fn item_routes_address_the_assistant() {
        let id = AssistantId::new("asst_42");
        let retrieve = routes::retrieve(&id).unwrap();
        assert_eq!(retrieve.method, Method::GET);
        assert_eq!(retrieve.segments, vec!["assistants", "asst_42"]);

        let modify = routes::modify(&id, &ModifyAssistantRequest::new().name("n")).unwrap();
        assert_eq!(modify.method, Method::POST);
        assert_eq!(body_json(&modify), json!({ "name": "n" }));

        let delete = routes::delete(&id).unwrap();
        assert_eq!(delete.method, Method::DELETE);
        assert_eq!(delete.segments, vec!["assistants", "asst_42"]);
    }

    #[test]
    fn blank_assistant_id_is_rejected() {
        let err = routes::retrieve(&AssistantId::new("  ")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidConfig);
        assert!(routes::delete(&AssistantId::new("")).is_err());
    }
}
