//! Proof-of-reserve feed: the HTTP response shape and the per-execution
//! observation merged by consensus.

use chainbind_core::consensus::{aggregate_field, AggregationStrategy};
use chainbind_core::types::HttpRequest;
use chainbind_core::{ConsensusAggregate, ConsensusError, ContractError, HttpFetcher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Body returned by the proof-of-reserve endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PorResponse {
    pub account_name: String,
    pub total_trust: f64,
    pub total_token: f64,
    /// Set by the feed operator to halt reserve updates.
    pub ripcord: bool,
    pub updated_at: DateTime<Utc>,
}

/// One execution's view of the reserve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveInfo {
    pub last_updated: DateTime<Utc>,
    pub total_reserve: f64,
}

impl ConsensusAggregate for ReserveInfo {
    fn aggregate(observations: Vec<Self>) -> Result<Self, ConsensusError> {
        let last_updated: Vec<_> = observations.iter().map(|o| o.last_updated).collect();
        let total_reserve: Vec<_> = observations.iter().map(|o| o.total_reserve).collect();
        Ok(Self {
            last_updated: aggregate_field("lastUpdated", AggregationStrategy::Median, &last_updated)?,
            total_reserve: aggregate_field(
                "totalReserve",
                AggregationStrategy::Median,
                &total_reserve,
            )?,
        })
    }
}

impl From<PorResponse> for ReserveInfo {
    fn from(resp: PorResponse) -> Self {
        Self {
            last_updated: resp.updated_at,
            total_reserve: resp.total_token,
        }
    }
}

/// Fetch and validate the feed once.
pub async fn fetch_por(http: &dyn HttpFetcher, url: &str) -> Result<ReserveInfo, WorkflowError> {
    let resp = http
        .send_request(HttpRequest::get(url))
        .await
        .map_err(ContractError::from)?;
    if resp.status_code >= 400 {
        return Err(WorkflowError::HttpStatus {
            status: resp.status_code,
        });
    }

    let por: PorResponse = serde_json::from_slice(&resp.body)
        .map_err(|e| WorkflowError::InvalidResponse(e.to_string()))?;
    if por.ripcord {
        return Err(WorkflowError::Ripcord);
    }
    Ok(por.into())
}
