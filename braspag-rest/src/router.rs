//! Resource routing between the query and transaction hosts.

use url::Url;

use crate::{
    config::GatewayHosts,
    error::{BraspagError, Result},
};

/// Resolves resource paths against the gateway's base hosts.
///
/// The host pair is parsed once at construction and never re-evaluated.
#[derive(Debug, Clone)]
pub struct ResourceRouter {
    query_url: Url,
    transaction_url: Url,
}

impl ResourceRouter {
    /// Creates a router for the given hosts.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if either host is not an absolute URL.
    pub fn new(hosts: GatewayHosts<'_>) -> Result<Self> {
        Ok(Self {
            query_url: parse_host(hosts.query_url)?,
            transaction_url: parse_host(hosts.transaction_url)?,
        })
    }

    /// Joins `resource` onto the query host when `query` is set, else onto the
    /// transaction host.
    ///
    /// Uses RFC 3986 reference resolution: absolute paths replace the host's path,
    /// relative paths are resolved against it.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::InvalidArgument`] if the resource cannot be joined.
    ///
    /// # Examples
    ///
    /// ```
    /// use braspag_rest::{config::Environment, router::ResourceRouter};
    ///
    /// let router = ResourceRouter::new(Environment::Sandbox.hosts())?;
    /// let url = router.resolve("/v2/sales/782a56e2-2dae-11e2-b3ee-080027d29772", true)?;
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://apiqueryhomolog.braspag.com.br/v2/sales/782a56e2-2dae-11e2-b3ee-080027d29772"
    /// );
    /// # Ok::<(), braspag_rest::BraspagError>(())
    /// ```
    pub fn resolve(&self, resource: &str, query: bool) -> Result<Url> {
        let base = if query { &self.query_url } else { &self.transaction_url };
        base.join(resource).map_err(|e| {
            BraspagError::InvalidArgument(format!("invalid resource '{resource}': {e}"))
        })
    }

    /// Base URL of the query host.
    #[must_use]
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Base URL of the transaction host.
    #[must_use]
    pub fn transaction_url(&self) -> &Url {
        &self.transaction_url
    }
}

fn parse_host(host: &str) -> Result<Url> {
    Url::parse(host)
        .map_err(|e| BraspagError::Config(format!("invalid gateway host '{host}': {e}")))
}

/// Path of a sale, relative to the gateway host root.
#[must_use]
pub fn sale_resource(payment_id: &str) -> String {
    format!("/v2/sales/{payment_id}")
}
