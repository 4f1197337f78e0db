//! Braspag REST: async client for the Braspag Pagador payment gateway.
//!
//! The gateway exposes two hosts per environment: a query host for read operations and a
//! transaction host for everything else. Every request is authenticated by the merchant's
//! `MerchantId`/`MerchantKey` pair and carries a `RequestId` correlation header.
//!
//! This crate covers the full call path of a query:
//!
//! ```text
//! transaction id ──► guid ──► router ──► request ──► transport ──► response
//!   (validate)              (host)     (headers)    (classify)   (normalize)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use braspag_rest::{
//!     BraspagClient, GatewayResponse,
//!     client::GetTransactionDataParams,
//!     config::ClientConfig,
//! };
//!
//! # async fn example() -> braspag_rest::Result<()> {
//! let client = BraspagClient::new(ClientConfig::from_env()?)?;
//!
//! let params = GetTransactionDataParams::new("782a56e2-2dae-11e2-b3ee-080027d29772");
//! match client.get_transaction_data(params).await? {
//!     GatewayResponse::Success(envelope) => {
//!         println!("order {:?}: status {}", envelope.order_id, envelope.transaction.status);
//!     }
//!     GatewayResponse::Failure(rejection) => {
//!         for error in rejection.errors() {
//!             println!("{}: {}", error.code, error.message);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Outcomes
//!
//! - success: [`GatewayResponse::Success`] with a normalized [`TransactionEnvelope`]
//! - HTTP 400: [`GatewayResponse::Failure`] with an
//!   [`ErrorEnvelope`](response::ErrorEnvelope) in the shape the gateway used
//! - no response in time: [`BraspagError::Timeout`] with status 599
//! - anything else on the wire: [`BraspagError::Transport`]
//!
//! # Module Organization
//!
//! - [`client`]: gateway operations
//! - [`config`]: TOML/env configuration and environment hosts
//! - [`error`]: error taxonomy
//! - [`guid`]: transaction id validation
//! - [`masking`]: card number masking for logs
//! - [`observer`]: pre- and post-call observability records
//! - [`request`]: authenticated request construction
//! - [`response`]: response normalization
//! - [`router`]: query vs transaction host selection
//! - [`transport`]: single-attempt HTTP transport

pub mod client;
pub mod config;
pub mod error;
pub mod guid;
pub mod masking;
pub mod observer;
pub mod request;
pub mod response;
pub mod router;
pub mod transport;

pub use client::{BraspagClient, GetTransactionDataParams};
pub use config::{ClientConfig, Environment};
pub use error::{BraspagError, Result};
pub use response::{ErrorEnvelope, GatewayResponse, Transaction, TransactionEnvelope};
