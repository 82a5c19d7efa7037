use crate::auth::{CredentialProvider, TokenState};
use crate::client::ExpenseClient;
use crate::expense::{ExpenseCodes, expected_expense_payload};
use async_trait::async_trait;
use tripforge_core::error::ImportError;
use tripforge_core::model::{LineItem, TripRequest};
use tripforge_engine::report::Reporter;
use tripforge_engine::submit::{ParentHandle, PlanSubmitter};

/// REST-path submitter: the parent is a travel request, each line item one
/// expected-expense POST. Differs from the browser path only in transport.
pub struct RestSubmitter<C: CredentialProvider> {
    provider: C,
    codes: ExpenseCodes,
    currency: String,
    http: reqwest::Client,
    // Bound at parent creation; items reuse the same access and trip
    // context for the rest of the run.
    client: Option<ExpenseClient>,
    trip: Option<TripRequest>,
}

impl<C: CredentialProvider> RestSubmitter<C> {
    pub fn new(provider: C, codes: ExpenseCodes, currency: impl Into<String>) -> Self {
        RestSubmitter {
            provider,
            codes,
            currency: currency.into(),
            http: reqwest::Client::new(),
            client: None,
            trip: None,
        }
    }
}

#[async_trait]
impl<C: CredentialProvider> PlanSubmitter for RestSubmitter<C> {
    async fn create_parent(
        &mut self,
        trip: &TripRequest,
        reporter: &mut dyn Reporter,
    ) -> Result<ParentHandle, ImportError> {
        reporter.progress("Requesting Concur access token");
        let access = match self
            .provider
            .get_token()
            .await
            .map_err(|e| ImportError::Transport(e.to_string()))?
        {
            TokenState::Ready(access) => access,
            TokenState::AuthRequired => {
                return Err(ImportError::Validation(
                    "Not connected to SAP Concur. Please authenticate first.".into(),
                ));
            }
        };

        let client = ExpenseClient::new(self.http.clone(), access);
        let id = client.create_request(trip).await?;
        reporter.progress(&format!("Created travel request {id}"));

        self.client = Some(client);
        self.trip = Some(trip.clone());
        Ok(ParentHandle(id))
    }

    async fn submit(
        &mut self,
        parent: &ParentHandle,
        item: LineItem<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        let (client, trip) = match (&self.client, &self.trip) {
            (Some(client), Some(trip)) => (client, trip),
            _ => {
                return Err(ImportError::Validation(
                    "No travel request in scope; parent creation must run first.".into(),
                ));
            }
        };

        let payload = expected_expense_payload(trip, item, &self.codes, &self.currency);
        let id = client.create_expected_expense(&parent.0, &payload).await?;
        reporter.progress(&format!(
            "Created expected {} expense {id}",
            item.category().label()
        ));
        Ok(())
    }
}
