//! Plan submission: one fixed script of primitive steps per category.
//!
//! A submitter catches every step failure at its own boundary and reports
//! it as an `ImportError` carrying the offending field or selector; nothing
//! escapes as a panic or driver-level fault.

use crate::page::Page;
use crate::primitives::{
    StepOptions, click_element, fill_value, resolve_affordance, select_dropdown_by_text,
    wait_for_element,
};
use crate::report::Reporter;
use async_trait::async_trait;
use tripforge_core::adapter::{ControlKind, FieldBinding, SiteAdapter};
use tripforge_core::error::{ImportError, PageError};
use tripforge_core::model::{LineItem, SiteCredentials, TripRequest};

/// Scope identifier for line items: the created trip's URL on the UI path,
/// or the travel request id on the REST path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentHandle(pub String);

impl std::fmt::Display for ParentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Executes the per-category submission script against one destination.
#[async_trait]
pub trait PlanSubmitter: Send {
    /// Create the parent trip or travel request. A failure here is fatal
    /// for the whole run.
    async fn create_parent(
        &mut self,
        trip: &TripRequest,
        reporter: &mut dyn Reporter,
    ) -> Result<ParentHandle, ImportError>;

    /// Submit one line item under a previously created parent. Mutates the
    /// target site on success; on confirmation timeout the site may be left
    /// indeterminate (accepted risk, no reconciliation pass).
    async fn submit(
        &mut self,
        parent: &ParentHandle,
        item: LineItem<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError>;
}

/// Browser-automation submitter: drives a `Page` through the selector
/// tables of a declarative `SiteAdapter`.
pub struct UiSubmitter<P: Page> {
    page: P,
    adapter: SiteAdapter,
    opts: StepOptions,
    credentials: Option<SiteCredentials>,
}

impl<P: Page> UiSubmitter<P> {
    pub fn new(page: P, adapter: SiteAdapter, opts: StepOptions) -> Self {
        UiSubmitter {
            page,
            adapter,
            opts,
            credentials: None,
        }
    }

    /// Credentials for the adapter's login form. Without them the session
    /// is assumed to be signed in already.
    pub fn with_credentials(mut self, credentials: Option<SiteCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Hand the session back, e.g. to close it after a run.
    pub fn into_page(self) -> P {
        self.page
    }

    async fn fill_bound_field(
        &mut self,
        binding: &FieldBinding,
        value: Option<&str>,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        let Some(value) = value else {
            reporter.progress(&format!(
                "No source value for field \"{}\", skipping",
                binding.field
            ));
            return Ok(());
        };

        match binding.control {
            ControlKind::Text => {
                fill_value(&mut self.page, reporter, &binding.selector, value, self.opts).await?;
            }
            ControlKind::Typeahead => {
                let outcome =
                    fill_value(&mut self.page, reporter, &binding.selector, value, self.opts)
                        .await?;
                if outcome == crate::primitives::FillOutcome::Filled {
                    self.commit_typeahead(&binding.selector, reporter).await?;
                }
            }
            ControlKind::Select => {
                select_dropdown_by_text(&mut self.page, reporter, &binding.selector, value, self.opts)
                    .await?;
            }
        }
        Ok(())
    }

    /// Typeaheads need an Enter press to adopt the first suggestion.
    /// Drivers without key support just leave the raw text in place.
    async fn commit_typeahead(
        &mut self,
        selector: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        match self.page.press_key(selector, "Enter").await {
            Ok(()) => Ok(()),
            Err(PageError::NotSupported(_)) => {
                reporter.progress(&format!(
                    "Driver cannot press keys; leaving typeahead {selector} as typed"
                ));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run the adapter's sign-in script, when one is configured and
    /// credentials are available. Credential values are filled without
    /// echoing them into progress messages.
    async fn sign_in(&mut self, reporter: &mut dyn Reporter) -> Result<(), ImportError> {
        let Some(form) = self.adapter.login.clone() else {
            return Ok(());
        };
        let Some(credentials) = self.credentials.clone() else {
            reporter.progress(
                "No site credentials configured; assuming the session is already signed in",
            );
            return Ok(());
        };

        reporter.progress(&format!("Signing in at {}", form.url));
        self.page.navigate(&form.url).await?;

        for binding in &form.fields {
            let Some(value) = credentials.field(&binding.field) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            reporter.progress(&format!("Filling sign-in field \"{}\"", binding.field));
            if !wait_for_element(&mut self.page, reporter, &binding.selector, self.opts).await? {
                let error = ImportError::ElementNotFound {
                    role: format!("sign-in {}", binding.field),
                    selector: binding.selector.clone(),
                    timeout_ms: self.opts.timeout.as_millis() as u64,
                };
                reporter.error(&error.to_string());
                return Err(error);
            }
            self.page.set_value(&binding.selector, value).await?;
        }

        self.click_affordance(&form.submit, reporter).await?;
        self.await_confirmation(
            &form.success,
            "sign-in was submitted but never confirmed",
            reporter,
        )
        .await
    }

    async fn click_affordance(
        &mut self,
        affordance: &tripforge_core::adapter::Affordance,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        let selector = resolve_affordance(&mut self.page, reporter, affordance, self.opts).await?;
        click_element(&mut self.page, reporter, &selector, self.opts).await
    }

    async fn await_confirmation(
        &mut self,
        selector: &str,
        what: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        if wait_for_element(&mut self.page, reporter, selector, self.opts).await? {
            return Ok(());
        }
        let error = ImportError::ConfirmationTimeout(format!(
            "{what} (marker {selector} absent after {}ms)",
            self.opts.timeout.as_millis()
        ));
        reporter.error(&error.to_string());
        Err(error)
    }
}

#[async_trait]
impl<P: Page> PlanSubmitter for UiSubmitter<P> {
    async fn create_parent(
        &mut self,
        trip: &TripRequest,
        reporter: &mut dyn Reporter,
    ) -> Result<ParentHandle, ImportError> {
        if !self.page.is_ready().await {
            self.page.launch().await?;
        }
        self.sign_in(reporter).await?;

        let form = self.adapter.trip.clone();
        self.page.navigate(&form.create_url).await?;

        for binding in &form.fields {
            self.fill_bound_field(binding, trip.field(&binding.field), reporter)
                .await?;
        }

        self.click_affordance(&form.save, reporter).await?;
        self.await_confirmation(
            &form.confirm,
            &format!("trip \"{}\" was saved but never confirmed", trip.name),
            reporter,
        )
        .await?;

        let url = self.page.current_url().await?;
        Ok(ParentHandle(url))
    }

    async fn submit(
        &mut self,
        parent: &ParentHandle,
        item: LineItem<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        let category = item.category();
        let form = self
            .adapter
            .plan(category)
            .cloned()
            .ok_or_else(|| {
                ImportError::Validation(format!(
                    "Adapter \"{}\" has no form mapping for {}",
                    self.adapter.name,
                    category.label()
                ))
            })?;

        // Each item starts from the trip page; site state after one save
        // decides which selectors exist for the next.
        self.page.navigate(&parent.0).await?;

        for affordance in &form.open {
            self.click_affordance(affordance, reporter).await?;
        }

        if !wait_for_element(&mut self.page, reporter, &form.ready, self.opts).await? {
            let error = ImportError::ElementNotFound {
                role: format!("{} form", category.label()),
                selector: form.ready.clone(),
                timeout_ms: self.opts.timeout.as_millis() as u64,
            };
            reporter.error(&error.to_string());
            return Err(error);
        }

        for binding in &form.fields {
            self.fill_bound_field(binding, item.field(&binding.field), reporter)
                .await?;
        }

        self.click_affordance(&form.save, reporter).await?;
        self.await_confirmation(
            &form.confirm,
            &format!("{} save was clicked but never confirmed", category.label()),
            reporter,
        )
        .await
    }
}
