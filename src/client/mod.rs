//! The request facade: typed call methods over the pooled transport.
//!
//! Every operation is generic over a serializable input payload and a
//! deserializable result shape; responses are read fully as text and decoded
//! as JSON. All failures surface as [`RestClientError`].

pub mod body;
pub mod headers;
pub mod query;

use crate::config::ClientConfig;
use crate::error::RestClientError;
use crate::transport::{PooledClient, RawResponse, RequestSpec};
use self::body::{ContentType, FormMode, adapt_body};
use self::headers::{cookie_headers, token_headers};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

/// Typed convenience client over one shared [`PooledClient`].
///
/// Construct it once and pass it to callers; there is no process global.
/// Cheap to clone, clones share the transport.
#[derive(Debug, Clone)]
pub struct RestClient {
    transport: PooledClient,
    form_mode: FormMode,
}

impl RestClient {
    /// Wraps an explicitly constructed transport.
    pub fn new(transport: PooledClient) -> Self {
        RestClient {
            transport,
            form_mode: FormMode::default(),
        }
    }

    /// Builds the transport from `config` and wraps it.
    pub fn from_config(config: &ClientConfig) -> Result<Self, RestClientError> {
        Ok(Self::new(PooledClient::new(config)?))
    }

    /// Opts into lenient form adaptation: fields that cannot be
    /// string-converted are logged and skipped instead of failing the call.
    pub fn with_form_mode(mut self, mode: FormMode) -> Self {
        self.form_mode = mode;
        self
    }

    /// The underlying shared transport.
    pub fn transport(&self) -> &PooledClient {
        &self.transport
    }

    /// Closes the underlying transport; subsequent calls fail fast.
    pub fn close(&self) {
        self.transport.close();
    }

    /// Executes one logical call.
    ///
    /// The body is adapted for `content_type` (see
    /// [`adapt_body`](body::adapt_body)), `extra_headers` are laid over the
    /// content type's own header set, the response is read fully as text and
    /// decoded as JSON into `T`. Transport failures, non-success statuses,
    /// empty bodies and undecodable bodies all surface as
    /// [`RestClientError`].
    #[instrument(skip(self, extra_headers, body))]
    pub async fn exchange<B, T>(
        &self,
        url: &str,
        method: Method,
        content_type: ContentType,
        extra_headers: HeaderMap,
        body: Option<&B>,
    ) -> Result<T, RestClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let adapted = adapt_body(body, content_type, self.form_mode)?;
        debug!("Adapted request body: {:?}", adapted);

        let mut request_headers = content_type.headers();
        request_headers.extend(extra_headers);

        let response = self
            .transport
            .execute(RequestSpec {
                url: url.to_string(),
                method,
                headers: request_headers,
                body: adapted,
            })
            .await?;

        decode_response(response, url)
    }

    /// Bare GET, decoding the JSON response into `T`.
    pub async fn get_for_object<T>(&self, url: &str) -> Result<T, RestClientError>
    where
        T: DeserializeOwned,
    {
        self.exchange::<(), T>(url, Method::GET, ContentType::Json, HeaderMap::new(), None)
            .await
    }

    /// GET with the payload carried in the URL.
    ///
    /// A mapping-shaped payload is serialized into a query string and
    /// appended to `url` with an empty body; any other shape is sent as a
    /// JSON-encoded GET body.
    pub async fn get_with_query_params<B, T>(
        &self,
        url: &str,
        params: &B,
    ) -> Result<T, RestClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match query::to_query_string(params)? {
            Some(query_string) => {
                let full_url = format!("{url}{query_string}");
                self.exchange::<(), T>(
                    &full_url,
                    Method::GET,
                    ContentType::Json,
                    HeaderMap::new(),
                    None,
                )
                .await
            }
            None => {
                self.exchange(url, Method::GET, ContentType::Json, HeaderMap::new(), Some(params))
                    .await
            }
        }
    }

    /// GET carrying the caller's access token in the `accesstoken` header.
    pub async fn get_with_bearer_token<B, T>(
        &self,
        url: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<T, RestClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let auth = token_headers(token)?;
        self.exchange(url, Method::GET, ContentType::Json, auth, body)
            .await
    }

    /// GET carrying the given cookies plus the `ignore-identity: true`
    /// marker header.
    pub async fn get_with_cookies<T>(
        &self,
        url: &str,
        cookies: &[String],
    ) -> Result<T, RestClientError>
    where
        T: DeserializeOwned,
    {
        let cookie_set = cookie_headers(cookies)?;
        self.exchange::<(), T>(url, Method::GET, ContentType::Json, cookie_set, None)
            .await
    }

    /// POST with a JSON body.
    pub async fn post_for_object<B, T>(&self, url: &str, body: &B) -> Result<T, RestClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.exchange(url, Method::POST, ContentType::Json, HeaderMap::new(), Some(body))
            .await
    }

    /// POST with an explicit JSON entity. Kept distinct from
    /// [`post_for_object`](Self::post_for_object) for call-site clarity; the
    /// wire behavior is identical.
    pub async fn post_for_json_entity<B, T>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, RestClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.exchange(url, Method::POST, ContentType::Json, HeaderMap::new(), Some(body))
            .await
    }

    /// POST with the urlencoded-form content type; mapping and record bodies
    /// flatten into form fields per the adaptation rule.
    pub async fn post_for_form<B, T>(&self, url: &str, body: &B) -> Result<T, RestClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.exchange(url, Method::POST, ContentType::Form, HeaderMap::new(), Some(body))
            .await
    }
}

fn decode_response<T: DeserializeOwned>(
    response: RawResponse,
    url: &str,
) -> Result<T, RestClientError> {
    if !response.status.is_success() {
        let status = response.status.as_u16();
        let reason = response
            .status
            .canonical_reason()
            .unwrap_or("Unknown error");
        // Servers put the useful diagnostic in the body, so carry a snippet
        let snippet: String = response.body.chars().take(200).collect();
        let message = if snippet.trim().is_empty() {
            reason.to_string()
        } else {
            format!("{reason}: {snippet}")
        };
        error!("HTTP {status} - {message} (URL: {url})");
        return Err(RestClientError::status(status, message, url));
    }

    if response.body.trim().is_empty() {
        return Err(RestClientError::empty_body(url));
    }

    match serde_json::from_str::<T>(&response.body) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!("Failed to decode response: {e} (URL: {url})");
            error!(
                "Response text (first 200 chars): {}",
                &response.body.chars().take(200).collect::<String>()
            );
            Err(RestClientError::decode(e.to_string(), url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        message: String,
        count: i32,
    }

    #[derive(Serialize)]
    struct FormPayload {
        a: String,
        b: i32,
    }

    fn test_client() -> RestClient {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        RestClient::from_config(&ClientConfig::default()).expect("Failed to build client")
    }

    fn greeting_json() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(r#"{"message":"hello","count":2}"#)
    }

    #[tokio::test]
    async fn test_get_for_object_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/greet"))
            .respond_with(greeting_json())
            .mount(&server)
            .await;

        let client = test_client();
        let greeting: Greeting = client
            .get_for_object(&format!("{}/greet", server.uri()))
            .await
            .expect("Request failed");

        assert_eq!(
            greeting,
            Greeting {
                message: "hello".to_string(),
                count: 2
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_response_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client();
        let result: Result<Greeting, _> = client.get_for_object(&server.uri()).await;
        assert!(matches!(result, Err(RestClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_empty_response_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let client = test_client();
        let result: Result<Greeting, _> = client.get_for_object(&server.uri()).await;
        assert!(matches!(result, Err(RestClientError::EmptyBody { .. })));
    }

    #[tokio::test]
    async fn test_error_status_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client();
        let result: Result<Greeting, _> = client.get_for_object(&server.uri()).await;
        assert!(matches!(
            result,
            Err(RestClientError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_error_status_carries_body_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = test_client();
        let result: Result<Greeting, _> = client.get_for_object(&server.uri()).await;
        match result {
            Err(RestClientError::Status {
                status, message, ..
            }) => {
                assert_eq!(status, 502);
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_for_form_sends_urlencoded_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("a=x&b=5"))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client();
        let payload = FormPayload {
            a: "x".to_string(),
            b: 5,
        };
        let _: Greeting = client
            .post_for_form(&format!("{}/submit", server.uri()), &payload)
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_post_for_object_sends_json_unconverted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_string(r#"{"a":"x","b":5}"#))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client();
        let payload = FormPayload {
            a: "x".to_string(),
            b: 5,
        };
        let _: Greeting = client
            .post_for_object(&format!("{}/submit", server.uri()), &payload)
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_get_with_query_params_appends_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "puck"))
            .and(query_param("limit", "10"))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client();
        let params = serde_json::json!({"limit": 10, "q": "puck"});
        let _: Greeting = client
            .get_with_query_params(&format!("{}/search", server.uri()), &params)
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_get_with_query_params_falls_back_to_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(body_string("[1,2,3]"))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client();
        let params = vec![1, 2, 3];
        let _: Greeting = client
            .get_with_query_params(&format!("{}/search", server.uri()), &params)
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_get_with_bearer_token_attaches_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("accesstoken", "tok-42"))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client();
        let _: Greeting = client
            .get_with_bearer_token::<(), _>(&server.uri(), None, "tok-42")
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_get_with_cookies_attaches_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cookie", "session=abc; lang=fi"))
            .and(header("ignore-identity", "true"))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client();
        let cookies = vec!["session=abc".to_string(), "lang=fi".to_string()];
        let _: Greeting = client
            .get_with_cookies(&server.uri(), &cookies)
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_strict_form_mode_rejects_nested_payload() {
        let client = test_client();
        let payload = serde_json::json!({"a": "x", "nested": {"deep": true}});
        let result: Result<Greeting, _> = client
            .post_for_form("http://localhost/never-sent", &payload)
            .await;
        assert!(matches!(result, Err(RestClientError::BodyAdaptation { .. })));
    }

    #[tokio::test]
    async fn test_lenient_form_mode_skips_nested_payload_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string("a=x"))
            .respond_with(greeting_json())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client().with_form_mode(FormMode::Lenient);
        let payload = serde_json::json!({"a": "x", "nested": {"deep": true}});
        let _: Greeting = client
            .post_for_form(&server.uri(), &payload)
            .await
            .expect("Request failed");
    }

    #[tokio::test]
    async fn test_closed_client_fails_fast() {
        let client = test_client();
        client.close();

        let result: Result<Greeting, _> = client.get_for_object("http://localhost/closed").await;
        assert!(matches!(result, Err(RestClientError::PoolClosed)));
    }
}
