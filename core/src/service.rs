//! Collaborator facade tying the client, a transport and the record store
//! together.
//!
//! # Design
//! `AdService` is what UI code talks to when it does not want to drive the
//! build/execute/parse steps itself. A successful generation is written to
//! the store; a failed one leaves the store exactly as it was. There is no
//! retry, queueing or cancellation: two overlapping calls both land, last
//! writer wins.

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::AdClient;
use crate::config::AdConfig;
use crate::error::AdError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::storage::KeyValueStorage;
use crate::store::{ProductRecordStore, SubscriptionId};
use crate::types::{ManualFields, ProductData};

pub struct AdService<T> {
    client: AdClient,
    transport: T,
    store: Arc<ProductRecordStore>,
}

impl<T: HttpTransport> AdService<T> {
    pub fn new(client: AdClient, transport: T, store: Arc<ProductRecordStore>) -> Self {
        Self {
            client,
            transport,
            store,
        }
    }

    /// Build the client and store from `config`, loading any persisted record.
    pub fn from_config(config: &AdConfig, transport: T, storage: Arc<dyn KeyValueStorage>) -> Self {
        let store = ProductRecordStore::with_key(storage, config.storage_key.clone());
        Self::new(AdClient::new(&config.base_url), transport, Arc::new(store))
    }

    pub fn store(&self) -> &Arc<ProductRecordStore> {
        &self.store
    }

    /// Generate an ad from a product page URL.
    pub fn request_ad_from_url(&self, url: &str) -> Result<ProductData, AdError> {
        let request = self.client.build_create_ad(url)?;
        let response = self.execute(request)?;
        self.commit(self.client.parse_create_ad(response))
    }

    /// Generate an ad from fields the user typed in.
    pub fn request_ad_from_fields(&self, fields: &ManualFields) -> Result<ProductData, AdError> {
        let request = self.client.build_generate_ad_prompt(fields)?;
        let response = self.execute(request)?;
        self.commit(self.client.parse_generate_ad_prompt(fields, response))
    }

    pub fn current_product(&self) -> Option<ProductData> {
        self.store.current()
    }

    pub fn on_product_data_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ProductData) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AdError> {
        let path = request.path.clone();
        self.transport.execute(request).map_err(|e| {
            warn!(path = %path, error = %e, "ad request did not complete");
            AdError::from(e)
        })
    }

    fn commit(&self, parsed: Result<ProductData, AdError>) -> Result<ProductData, AdError> {
        match parsed {
            Ok(product) => {
                info!(product = product.id(), "ad generated");
                self.store.set_current(product.clone());
                Ok(product)
            }
            Err(e) => {
                warn!(error = %e, "ad generation failed, keeping current record");
                Err(e)
            }
        }
    }
}
