//! Typed wrappers for the results and product endpoints.
//!
//! Each method is a thin delegation to the generic [`Client`] so credential
//! attachment and failure handling stay in one place.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::client::{Batch, Client};
use super::error::ClientError;
use super::paging::PagePlacement;
use super::transport::{Connector, Transport};
use crate::auth::SessionToken;
use crate::config::Config;

/// `getRunResults(runIds, limit, offset, sortMode, filter)`, and the same
/// leading arguments for `getRunResults_v2`.
const RUN_RESULTS_PLACEMENT: PagePlacement = PagePlacement::At(1);

/// Client for the product-scoped results service.
pub struct ViewerClient<T: Transport> {
    client: Client<T>,
}

impl<T: Transport> ViewerClient<T> {
    pub fn connect<C>(
        connector: &C,
        config: &Config,
        product: &str,
        token: Option<&SessionToken>,
    ) -> Result<Self, ClientError>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.connect(&config.viewer_path(product))?;
        Ok(Self::new(Client::new(transport, token, config)?))
    }

    pub fn new(client: Client<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub async fn batch(&self) -> Result<Batch<'_, T>, ClientError> {
        self.client.batch().await
    }

    pub async fn api_version(&self) -> Result<String, ClientError> {
        self.client.request("getAPIVersion", &[]).await
    }

    pub async fn run_data<R: DeserializeOwned>(
        &self,
        filter: Value,
    ) -> Result<Vec<R>, ClientError> {
        self.client.request("getRunData", &[filter]).await
    }

    /// One page of results for the given runs.
    pub async fn run_results<R: DeserializeOwned>(
        &self,
        run_ids: &[i64],
        limit: usize,
        offset: usize,
        sort_mode: Value,
        filter: Value,
    ) -> Result<Vec<R>, ClientError> {
        let args = [json!(run_ids), json!(limit), json!(offset), sort_mode, filter];
        self.client.request("getRunResults", &args).await
    }

    pub async fn run_result_count(
        &self,
        run_ids: &[i64],
        filter: Value,
    ) -> Result<i64, ClientError> {
        self.client
            .request("getRunResultCount", &[json!(run_ids), filter])
            .await
    }

    /// Every result of the given runs, across as many pages as the server needs.
    pub async fn all_run_results<R: DeserializeOwned>(
        &self,
        run_ids: &[i64],
        sort_mode: Value,
        filter: Value,
    ) -> Result<Vec<R>, ClientError> {
        let fixed = [json!(run_ids), sort_mode, filter];
        self.client
            .fetch_all_as("getRunResults", &fixed, RUN_RESULTS_PLACEMENT)
            .await
    }

    /// [`ViewerClient::all_run_results`] over `getRunResults_v2`, which takes
    /// comparison data after the filter. Pass `null` for a plain listing.
    pub async fn all_run_results_v2<R: DeserializeOwned>(
        &self,
        run_ids: &[i64],
        sort_mode: Value,
        filter: Value,
        cmp_data: Value,
    ) -> Result<Vec<R>, ClientError> {
        let fixed = [json!(run_ids), sort_mode, filter, cmp_data];
        self.client
            .fetch_all_as("getRunResults_v2", &fixed, RUN_RESULTS_PLACEMENT)
            .await
    }
}

/// Client for the server-wide product configuration endpoint.
pub struct ProductClient<T: Transport> {
    client: Client<T>,
}

impl<T: Transport> ProductClient<T> {
    pub fn connect<C>(
        connector: &C,
        config: &Config,
        token: Option<&SessionToken>,
    ) -> Result<Self, ClientError>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.connect(&config.products_endpoint)?;
        Ok(Self::new(Client::new(transport, token, config)?))
    }

    pub fn new(client: Client<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub async fn package_version(&self) -> Result<String, ClientError> {
        self.client.request("getPackageVersion", &[]).await
    }

    pub async fn products<R: DeserializeOwned>(
        &self,
        endpoint_filter: Option<&str>,
        name_filter: Option<&str>,
    ) -> Result<Vec<R>, ClientError> {
        self.client
            .request("getProducts", &[json!(endpoint_filter), json!(name_filter)])
            .await
    }

    pub async fn current_product<R: DeserializeOwned>(&self) -> Result<R, ClientError> {
        self.client.request("getCurrentProduct", &[]).await
    }
}
