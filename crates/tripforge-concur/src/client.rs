use crate::auth::ApiAccess;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use tripforge_core::error::ImportError;
use tripforge_core::model::TripRequest;

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

/// Thin client for the travel-request endpoints. One POST per operation;
/// any non-2xx response is a failure with the body captured verbatim.
pub struct ExpenseClient {
    http: reqwest::Client,
    access: ApiAccess,
}

impl ExpenseClient {
    pub fn new(http: reqwest::Client, access: ApiAccess) -> Self {
        ExpenseClient { http, access }
    }

    /// Create the parent travel request; returns its id.
    pub async fn create_request(&self, trip: &TripRequest) -> Result<String, ImportError> {
        let body = json!({
            "name": trip.name,
            "startDate": trip.start_date,
            "endDate": trip.end_date,
            "mainDestination": { "value": trip.destination },
            "businessPurpose": trip
                .business_purpose
                .clone()
                .unwrap_or_else(|| trip.name.clone()),
        });
        let url = format!("{}/travelrequest/v4/requests", self.access.api_base);
        let created = self.post(&url, &body).await?;
        info!("Created travel request {}", created.id);
        Ok(created.id)
    }

    /// Attach one expected expense to an existing travel request.
    pub async fn create_expected_expense(
        &self,
        request_id: &str,
        payload: &Value,
    ) -> Result<String, ImportError> {
        let url = format!(
            "{}/travelrequest/v4/requests/{}/expenses",
            self.access.api_base, request_id
        );
        let created = self.post(&url, payload).await?;
        Ok(created.id)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<CreatedResource, ImportError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ImportError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::Transport(format!(
                "POST {url} returned {status}: {body}"
            )));
        }
        response
            .json::<CreatedResource>()
            .await
            .map_err(|e| ImportError::Transport(format!("POST {url} returned no id: {e}")))
    }
}
