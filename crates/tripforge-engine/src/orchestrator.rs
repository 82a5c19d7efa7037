//! Import orchestration: one run = parent creation, then every category in
//! fixed order, strictly sequential, no retries, no mid-run abort except a
//! parent failure.

use crate::report::Reporter;
use crate::submit::{ParentHandle, PlanSubmitter};
use tripforge_core::model::{Category, ImportRequest, ImportSummary};
use tripforge_core::protocol::RunOutcome;

/// State machine for one import run, owned exclusively for its duration.
/// `total` is bumped before each attempt, so the summary never undercounts
/// an item that was started.
pub struct ImportRun<'a> {
    submitter: &'a mut dyn PlanSubmitter,
    reporter: &'a mut dyn Reporter,
    summary: ImportSummary,
    errors: Vec<String>,
}

impl<'a> ImportRun<'a> {
    pub fn new(submitter: &'a mut dyn PlanSubmitter, reporter: &'a mut dyn Reporter) -> Self {
        ImportRun {
            submitter,
            reporter,
            summary: ImportSummary::default(),
            errors: Vec::new(),
        }
    }

    /// Drive the run to its terminal state and emit the result exactly once.
    pub async fn execute(mut self, request: &ImportRequest) -> RunOutcome {
        self.reporter.progress("Import process started.");

        // Init: nothing remote happens without at least a trip name.
        if request.trip_details.name.trim().is_empty() {
            let message = "Trip Name is required.".to_string();
            self.reporter.error(&message);
            self.summary.begin_attempt();
            self.summary.record_failure();
            self.errors.push(message);
            return self.finish();
        }

        // CreatingParent: a hard precondition, not a retryable peer.
        self.reporter.progress(&format!(
            "Processing trip: {}",
            request.trip_details.name
        ));
        self.summary.begin_attempt();
        let parent = match self
            .submitter
            .create_parent(&request.trip_details, self.reporter)
            .await
        {
            Ok(parent) => {
                self.summary.record_success();
                self.reporter.progress(&format!(
                    "Successfully processed trip: {}.",
                    request.trip_details.name
                ));
                self.reporter
                    .progress(&format!("Main trip processed. Scope: {parent}"));
                parent
            }
            Err(error) => {
                let message = format!(
                    "Failed to create trip \"{}\": {error}",
                    request.trip_details.name
                );
                self.reporter.error(&message);
                self.summary.record_failure();
                self.errors.push(message);
                return self.finish();
            }
        };

        // ImportingCategory(k): fixed order, input order within a category,
        // one failure never touches the items after it.
        for category in Category::ORDER {
            self.import_category(request, category, &parent).await;
        }

        self.finish()
    }

    async fn import_category(
        &mut self,
        request: &ImportRequest,
        category: Category,
        parent: &ParentHandle,
    ) {
        let items = request.items(category);
        if items.is_empty() {
            return;
        }
        let label = category.label();
        let count = items.len();
        self.reporter
            .progress(&format!("Starting to import {count} {label}(s)."));

        for (index, item) in items.into_iter().enumerate() {
            self.summary.begin_attempt();
            let description = item.describe(index);
            self.reporter.progress(&format!(
                "Importing {label} {} of {count}: {description}",
                index + 1
            ));

            match self.submitter.submit(parent, item, self.reporter).await {
                Ok(()) => {
                    self.summary.record_success();
                    self.reporter
                        .progress(&format!("Successfully added {label} {}.", index + 1));
                }
                Err(error) => {
                    self.summary.record_failure();
                    let message = format!(
                        "Failed to add {label} {} ({description}): {error}",
                        index + 1
                    );
                    self.reporter.error(&message);
                    self.errors.push(message);
                }
            }
        }
    }

    /// Done: finalize and report exactly once.
    fn finish(self) -> RunOutcome {
        debug_assert!(self.summary.is_settled());
        let outcome = RunOutcome::new(self.summary, self.errors);
        self.reporter.complete(&outcome);
        outcome
    }
}
