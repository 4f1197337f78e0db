//! Gateway client operations.
//!
//! [`BraspagClient`] ties the pieces together: it resolves a resource against the right host,
//! builds an authenticated request, sends it through a [`Transport`] and normalizes the
//! outcome. Business rejections (HTTP 400) come back as [`GatewayResponse::Failure`];
//! timeouts and other transport failures are returned as errors.

use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    config::{ClientConfig, GatewayHosts},
    error::{BraspagError, Result},
    guid::is_valid_guid,
    request::{Payload, RequestBuilder, RequestOptions},
    response::{
        GatewayResponse, TransactionEnvelope, decode, normalize_error,
        normalize_get_transaction_data,
    },
    router::{ResourceRouter, sale_resource},
    transport::{HttpTransport, Transport},
};

/// Parameters for [`BraspagClient::get_transaction_data`].
#[derive(Debug, Clone, Default)]
pub struct GetTransactionDataParams {
    /// Gateway payment id (GUID).
    pub transaction_id: String,
    /// Optional body; a GET normally carries none.
    pub payload: Option<Payload>,
    /// Correlation id to reuse. A fresh one is generated when `None`.
    pub request_id: Option<String>,
    /// Complete header set replacing the defaults.
    pub headers: Option<Vec<(String, String)>>,
}

impl GetTransactionDataParams {
    /// Parameters for the given payment id with default options.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self { transaction_id: transaction_id.into(), ..Self::default() }
    }
}

/// Braspag gateway client.
///
/// Cheap to share by reference across tasks: all state is immutable after construction and
/// the default transport pools its connections.
///
/// # Examples
///
/// ```no_run
/// use braspag_rest::{
///     BraspagClient, GatewayResponse,
///     client::GetTransactionDataParams,
///     config::ClientConfig,
/// };
///
/// # async fn example() -> braspag_rest::Result<()> {
/// let config = ClientConfig::new("94e5ea52-79b0-7dba-1867-be7b081edd97", "merchant-key");
/// let client = BraspagClient::new(config)?;
///
/// let params = GetTransactionDataParams::new("782a56e2-2dae-11e2-b3ee-080027d29772");
/// match client.get_transaction_data(params).await? {
///     GatewayResponse::Success(envelope) => println!("status {}", envelope.transaction.status),
///     GatewayResponse::Failure(rejection) => println!("rejected: {:?}", rejection.errors()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BraspagClient<T = HttpTransport> {
    builder: RequestBuilder,
    router: ResourceRouter,
    transport: T,
}

impl BraspagClient<HttpTransport> {
    /// Creates a client for the configured environment over a new [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if the configuration is invalid, or
    /// [`BraspagError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, HttpTransport::new()?)
    }
}

impl<T: Transport> BraspagClient<T> {
    /// Creates a client for the configured environment over the given transport.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if the configuration is invalid.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let hosts = config.environment.hosts();
        Self::with_hosts(config, hosts, transport)
    }

    /// Creates a client against explicit hosts instead of the environment's.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if the configuration or either host is invalid.
    pub fn with_hosts(config: ClientConfig, hosts: GatewayHosts<'_>, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            router: ResourceRouter::new(hosts)?,
            builder: RequestBuilder::new(config),
            transport,
        })
    }

    /// Resource router in use.
    #[must_use]
    pub const fn router(&self) -> &ResourceRouter {
        &self.router
    }

    /// Transport in use.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one authenticated request and decodes the JSON response.
    ///
    /// `query` selects the query host; otherwise the transaction host is used. An empty
    /// success body decodes to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Propagates every transport outcome other than success, including
    /// [`BraspagError::GatewayClientError`] for HTTP 400. Returns
    /// [`BraspagError::InvalidResponse`] if a success body is not JSON.
    pub async fn request(
        &self,
        resource: &str,
        method: Method,
        payload: Option<&Payload>,
        options: &RequestOptions,
        query: bool,
    ) -> Result<Value> {
        let url = self.router.resolve(resource, query)?;
        let descriptor = self.builder.build(url, method, payload, options)?;
        let response = self.transport.fetch(&descriptor).await?;

        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        decode(&response.body)
    }

    /// Retrieves a sale and normalizes its first transaction.
    ///
    /// # Errors
    ///
    /// - [`BraspagError::InvalidArgument`] if `transaction_id` is not a GUID; nothing is sent
    /// - [`BraspagError::Timeout`] if the gateway does not answer in time
    /// - [`BraspagError::Transport`] for any other transport failure
    /// - [`BraspagError::InvalidResponse`] if the gateway's body cannot be normalized
    #[instrument(skip(self, params), fields(transaction_id = %params.transaction_id))]
    pub async fn get_transaction_data(
        &self,
        params: GetTransactionDataParams,
    ) -> Result<GatewayResponse<TransactionEnvelope>> {
        if !is_valid_guid(&params.transaction_id) {
            return Err(BraspagError::InvalidArgument(format!(
                "transaction id '{}' is not a valid GUID",
                params.transaction_id
            )));
        }

        let options = RequestOptions { request_id: params.request_id, headers: params.headers };
        let resource = sale_resource(&params.transaction_id);

        match self.request(&resource, Method::GET, params.payload.as_ref(), &options, true).await {
            Ok(raw) => {
                info!("transaction data retrieved");
                normalize_get_transaction_data(&raw).map(GatewayResponse::Success)
            }
            Err(BraspagError::GatewayClientError { status, body }) => {
                info!(status, "gateway rejected transaction query");
                normalize_error(&decode(&body)?).map(GatewayResponse::Failure)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::{
        error::TIMEOUT_STATUS,
        request::RequestDescriptor,
        response::{ErrorEnvelope, GatewayError},
        transport::{RawResponse, sealed},
    };

    const TRANSACTION_ID: &str = "782a56e2-2dae-11e2-b3ee-080027d29772";

    type Responder = Box<dyn Fn() -> Result<RawResponse> + Send + Sync>;

    struct FakeTransport {
        respond: Responder,
        seen: Mutex<Vec<RequestDescriptor>>,
    }

    impl FakeTransport {
        fn new(respond: impl Fn() -> Result<RawResponse> + Send + Sync + 'static) -> Self {
            Self { respond: Box::new(respond), seen: Mutex::new(Vec::new()) }
        }

        fn json(status: u16, body: Value) -> Self {
            Self::new(move || Ok(RawResponse { status, body: body.to_string().into_bytes() }))
        }

        fn requests(&self) -> Vec<RequestDescriptor> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl sealed::private::Sealed for FakeTransport {}

    impl Transport for FakeTransport {
        async fn fetch<'a>(&'a self, request: &'a RequestDescriptor) -> Result<RawResponse> {
            self.seen.lock().unwrap().push(request.clone());
            (self.respond)()
        }
    }

    fn client(transport: FakeTransport) -> BraspagClient<FakeTransport> {
        BraspagClient::with_transport(ClientConfig::new("merchant-id", "merchant-key"), transport)
            .unwrap()
    }

    fn rejection(body: Value) -> FakeTransport {
        FakeTransport::new(move || {
            Err(BraspagError::GatewayClientError {
                status: 400,
                body: body.to_string().into_bytes(),
            })
        })
    }

    #[tokio::test]
    async fn test_invalid_guid_sends_nothing() {
        let client = client(FakeTransport::json(200, json!({})));

        for id in ["", "not-a-guid", "782a56e2-2dae-11e2-b3ee-080027d2977g"] {
            let result = client.get_transaction_data(GetTransactionDataParams::new(id)).await;
            assert!(matches!(result, Err(BraspagError::InvalidArgument(_))), "id {id:?}");
        }
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_success_is_normalized() {
        let client = client(FakeTransport::json(200, json!({
            "MerchantOrderId": "abc",
            "Payment": {"Status": 1, "PaymentId": TRANSACTION_ID, "Amount": 100}
        })));

        let response = client
            .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
            .await
            .unwrap();

        let envelope = response.success().unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.order_id.as_deref(), Some("abc"));
        assert_eq!(envelope.transaction.amount, Some(100));
    }

    #[tokio::test]
    async fn test_request_targets_query_host_with_headers() {
        let client = client(FakeTransport::json(200, json!({"Payment": {"Status": 1}})));

        let params = GetTransactionDataParams {
            request_id: Some("req-1".to_owned()),
            ..GetTransactionDataParams::new(TRANSACTION_ID)
        };
        client.get_transaction_data(params).await.unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.as_str(),
            format!("https://apiqueryhomolog.braspag.com.br/v2/sales/{TRANSACTION_ID}")
        );
        assert_eq!(request.header("MerchantId"), Some("merchant-id"));
        assert_eq!(request.header("MerchantKey"), Some("merchant-key"));
        assert_eq!(request.request_id(), Some("req-1"));
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn test_custom_headers_replace_defaults() {
        let client = client(FakeTransport::json(200, json!({"Payment": {"Status": 1}})));

        let params = GetTransactionDataParams {
            headers: Some(vec![("X-Trace".to_owned(), "t".to_owned())]),
            ..GetTransactionDataParams::new(TRANSACTION_ID)
        };
        client.get_transaction_data(params).await.unwrap();

        let request = &client.transport().requests()[0];
        assert_eq!(request.headers, vec![("X-Trace".to_owned(), "t".to_owned())]);
    }

    #[tokio::test]
    async fn test_rejection_object_becomes_error_variant() {
        let client = client(rejection(json!({"Code": 123, "Message": "bad request"})));

        let response = client
            .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
            .await
            .unwrap();

        assert_eq!(
            response,
            GatewayResponse::Failure(ErrorEnvelope::Error(GatewayError {
                code: 123,
                message: "bad request".to_owned(),
            }))
        );
    }

    #[tokio::test]
    async fn test_rejection_array_becomes_errors_variant() {
        let client = client(rejection(json!([{"Code": 1, "Message": "a"}])));

        let response = client
            .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
            .await
            .unwrap();

        assert_eq!(
            response.failure(),
            Some(ErrorEnvelope::Errors(vec![GatewayError { code: 1, message: "a".to_owned() }]))
        );
    }

    #[tokio::test]
    async fn test_timeout_is_propagated() {
        let client = client(FakeTransport::new(|| {
            Err(BraspagError::Timeout { status: TIMEOUT_STATUS, message: "timed out".to_owned() })
        }));

        let result =
            client.get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID)).await;
        assert!(matches!(result, Err(BraspagError::Timeout { status: 599, .. })));
    }

    #[tokio::test]
    async fn test_unparseable_rejection_is_invalid_response() {
        let client = client(FakeTransport::new(|| {
            Err(BraspagError::GatewayClientError { status: 400, body: b"Bad Request".to_vec() })
        }));

        let result =
            client.get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID)).await;
        assert!(matches!(result, Err(BraspagError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_generic_request_uses_transaction_host() {
        let client = client(FakeTransport::json(201, json!({"Payment": {"Status": 1}})));

        let payload = Payload::Json(json!({"MerchantOrderId": "2017051001"}));
        let value = client
            .request("/v2/sales/", Method::POST, Some(&payload), &RequestOptions::default(), false)
            .await
            .unwrap();

        assert_eq!(value["Payment"]["Status"], json!(1));
        let request = &client.transport().requests()[0];
        assert_eq!(request.url.as_str(), "https://apihomolog.braspag.com.br/v2/sales/");
        assert_eq!(request.body.as_deref(), Some("{\"MerchantOrderId\":\"2017051001\"}"));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let client = client(FakeTransport::new(|| Ok(RawResponse { status: 200, body: vec![] })));

        let value = client
            .request("/v2/sales/x/void", Method::PUT, None, &RequestOptions::default(), false)
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig { timeout_secs: 0, ..ClientConfig::new("m", "k") };
        let result = BraspagClient::with_transport(config, FakeTransport::json(200, json!({})));
        assert!(matches!(result, Err(BraspagError::Config(_))));
    }

    #[test]
    fn test_custom_hosts() {
        let client = BraspagClient::with_hosts(
            ClientConfig::new("m", "k"),
            GatewayHosts { query_url: "http://127.0.0.1:1", transaction_url: "http://127.0.0.1:2" },
            FakeTransport::json(200, json!({})),
        )
        .unwrap();
        assert_eq!(client.router().query_url().as_str(), "http://127.0.0.1:1/");
        assert_eq!(client.router().transaction_url().as_str(), "http://127.0.0.1:2/");
    }
}
