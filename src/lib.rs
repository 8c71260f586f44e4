//! Async client for the Amazon Advertising API.
//!
//! Every call funnels through one executor that composes the auth headers,
//! dispatches the request and normalizes the result into an [`ApiResponse`].
//! The per-resource surface is the [`resources::OPERATIONS`] table.
//!
//! ```no_run
//! # async fn run() -> amazon_ads::Result<()> {
//! use amazon_ads::{AdsClient, ClientConfig};
//!
//! let client = AdsClient::connect(ClientConfig::from_env()?).await?;
//! client.set_profile_id("1234567890");
//! let campaigns = client.call("listSponsoredDisplayCampaigns", &[], None).await?;
//! if campaigns.success {
//!     println!("{}", campaigns.text().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod regions;
pub mod resources;
pub mod response;
pub mod transport;

pub use auth::TokenGrant;
pub use client::AdsClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use executor::{ApiRequest, Base};
pub use resources::{CampaignType, Family, Operation};
pub use response::{ApiResponse, ResponseBody, ResponseKind};
