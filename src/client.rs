use log::debug;
use serde_json::Value;

use crate::auth::TokenGrant;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::executor::{ApiRequest, Executor};
use crate::resources::{self, CampaignType, Operation};
use crate::response::ApiResponse;

/// Amazon Advertising API client.
///
/// Share it behind an `Arc` for concurrent use. The access token and the
/// profile scope are the only mutable state and both sit behind locks.
#[derive(Debug)]
pub struct AdsClient {
    executor: Executor,
}

impl AdsClient {
    /// Validates `config`, resolves endpoints and, when only a refresh
    /// token was supplied, exchanges it for an access token.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let executor = Executor::new(&config)?;
        if !executor.tokens().has_token() {
            executor.refresh_access_token().await?;
        }
        debug!("connected to {}", executor.base_url());
        Ok(Self { executor })
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    pub fn profile_id(&self) -> Option<String> {
        self.executor.profile_id()
    }

    /// Scopes every following request to an advertiser profile.
    pub fn set_profile_id(&self, profile_id: impl Into<String>) {
        self.executor.set_profile_id(Some(profile_id.into()));
    }

    pub fn clear_profile_id(&self) {
        self.executor.set_profile_id(None);
    }

    pub fn access_token(&self) -> String {
        self.executor.tokens().bearer()
    }

    pub fn set_access_token(&self, token: impl Into<String>) -> Result<()> {
        self.executor.tokens().set_access_token(token)
    }

    pub async fn refresh_access_token(&self) -> Result<TokenGrant> {
        self.executor.refresh_access_token().await
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.executor.execute(request).await
    }

    pub async fn invoke(&self, operation: &Operation, ids: &[&str], params: Option<Value>) -> Result<ApiResponse> {
        let request = operation.request(ids, params)?;
        self.executor.execute(request).await
    }

    /// Calls an operation from the table by name, e.g.
    /// `client.call("getSponsoredDisplayCampaign", &["123"], None)`.
    pub async fn call(&self, name: &str, ids: &[&str], params: Option<Value>) -> Result<ApiResponse> {
        let operation = resources::find_operation(name)?;
        self.invoke(operation, ids, params).await
    }

    pub async fn user_profile(&self) -> Result<ApiResponse> {
        self.call("getUserProfile", &[], None).await
    }

    /// Requests a report; the campaign type prefix comes from the
    /// `campaignType` field of `params`.
    pub async fn request_report(&self, record_type: &str, params: Value) -> Result<ApiResponse> {
        let prefix = CampaignType::from_params(Some(&params)).prefix();
        self.call("requestReport", &[prefix, record_type], Some(params)).await
    }

    pub async fn request_snapshot(&self, record_type: &str, params: Option<Value>) -> Result<ApiResponse> {
        let prefix = CampaignType::from_params(params.as_ref()).prefix();
        self.call("requestSnapshot", &[prefix, record_type], params).await
    }

    pub fn operations(&self) -> &'static [Operation] {
        resources::operations()
    }

    pub fn find_operation(&self, name: &str) -> Result<&'static Operation> {
        resources::find_operation(name)
    }
}
