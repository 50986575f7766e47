//! HTTP forwarder: groups a batch by destination, compacts every group and
//! POSTs it to `<remote_url>/<full_topic>`.

use crate::{
    config::{ForwardMode, ForwarderConfig},
    core::{encode_group, encode_uncompacted, group_records, Address, Groups, Record, SenmlRecord},
    error::{DeliveryError, Error, Result},
    forwarder::MessageRepository,
};
use log::debug;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};

/// Status the remote endpoint must answer with for a delivery to count
pub const EXPECTED_STATUS: StatusCode = StatusCode::ACCEPTED;

/// Header carrying the publisher of a group
pub const PUBLISHER_HEADER: &str = "MF-Publisher";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Forwards record batches to a remote HTTP endpoint.
///
/// Holds no per-batch state; one instance may serve concurrent batches.
pub struct HttpForwarder {
    config: ForwarderConfig,
    client: Client,
}

impl HttpForwarder {
    pub fn new(config: ForwarderConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpForwarder { config, client })
    }

    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// Group `records` by destination and encode every group for the wire.
    pub fn encode(&self, records: &[Record]) -> Groups<SenmlRecord> {
        let groups = group_records(records, self.config.address_key);
        match self.config.mode {
            ForwardMode::Compact => groups.map(|_, group| encode_group(&group)),
            ForwardMode::Passthrough => groups.map(|_, group| encode_uncompacted(&group)),
        }
    }

    pub fn target_url(&self, address: &Address) -> String {
        format!("{}/{}", self.config.remote_url.trim_end_matches('/'), address.full_topic)
    }

    /// Deliver every group in order, stopping at the first failure.
    ///
    /// Groups delivered before the failure stay delivered.
    pub async fn dispatch(&self, packs: &Groups<SenmlRecord>) -> Result<()> {
        for (address, pack) in packs.iter() {
            self.deliver(address, pack).await?;
        }
        Ok(())
    }

    async fn deliver(
        &self,
        address: &Address,
        pack: &[SenmlRecord],
    ) -> std::result::Result<(), DeliveryError> {
        let body = serde_json::to_vec(pack)?;
        let url = self.target_url(address);
        debug!("POST {} ({} records, publisher {})", url, pack.len(), address.publisher);

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(PUBLISHER_HEADER, &address.publisher)
            .body(body);
        if let Some(token) = &self.config.remote_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != EXPECTED_STATUS {
            return Err(DeliveryError::Rejected { status: status.to_string() });
        }
        Ok(())
    }
}

impl MessageRepository for HttpForwarder {
    async fn save(&self, records: &[Record]) -> Result<()> {
        let packs = self.encode(records);
        self.dispatch(&packs).await
    }
}
