//! Form-fill primitives.
//!
//! Each primitive performs one bounded wait-then-act step against a live
//! page session, reports progress either way, and never retries beyond its
//! single timeout window.

use crate::page::{Page, PageError};
use crate::report::Reporter;
use std::time::Duration;
use tokio::time::Instant;
use tripforge_core::adapter::Affordance;
use tripforge_core::error::ImportError;

/// Per-step timing. Timeouts are local to each primitive and never escalate
/// to a run-level deadline.
#[derive(Debug, Clone, Copy)]
pub struct StepOptions {
    pub timeout: Duration,
    pub poll: Duration,
}

impl Default for StepOptions {
    fn default() -> Self {
        StepOptions {
            timeout: Duration::from_millis(5_000),
            poll: Duration::from_millis(150),
        }
    }
}

impl StepOptions {
    pub fn from_millis(timeout_ms: u64, poll_ms: u64) -> Self {
        StepOptions {
            timeout: Duration::from_millis(timeout_ms),
            poll: Duration::from_millis(poll_ms),
        }
    }
}

/// Result of a value-bearing primitive: either the value was applied, or it
/// was empty and the step was skipped without touching the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    Filled,
    SkippedEmpty,
}

/// Poll until a visible element matches the selector or the timeout
/// elapses. Absence is `Ok(false)`, never an error; only driver faults
/// propagate.
pub async fn wait_for_element<P, R>(
    page: &mut P,
    reporter: &mut R,
    selector: &str,
    opts: StepOptions,
) -> Result<bool, PageError>
where
    P: Page + ?Sized,
    R: Reporter + ?Sized,
{
    reporter.progress(&format!(
        "Waiting for element: {selector} (timeout: {}ms)",
        opts.timeout.as_millis()
    ));

    let deadline = Instant::now() + opts.timeout;
    loop {
        if page.query(selector).await? {
            reporter.progress(&format!("Element found: {selector}"));
            return Ok(true);
        }
        if Instant::now() >= deadline {
            reporter.progress(&format!(
                "Element NOT found after {}ms: {selector}",
                opts.timeout.as_millis()
            ));
            return Ok(false);
        }
        tokio::time::sleep(opts.poll).await;
    }
}

/// Resolve an affordance's ordered candidate selectors: all candidates are
/// probed each poll pass, in order, and the first match wins.
pub async fn resolve_affordance<P, R>(
    page: &mut P,
    reporter: &mut R,
    affordance: &Affordance,
    opts: StepOptions,
) -> Result<String, ImportError>
where
    P: Page + ?Sized,
    R: Reporter + ?Sized,
{
    reporter.progress(&format!("Locating \"{}\"", affordance.name));

    let deadline = Instant::now() + opts.timeout;
    loop {
        for candidate in &affordance.candidates {
            if page.query(candidate).await? {
                reporter.progress(&format!(
                    "Located \"{}\" via {candidate}",
                    affordance.name
                ));
                return Ok(candidate.clone());
            }
        }
        if Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(opts.poll).await;
    }

    let error = ImportError::ElementNotFound {
        role: affordance.name.clone(),
        selector: affordance.candidates.join(", "),
        timeout_ms: opts.timeout.as_millis() as u64,
    };
    reporter.error(&error.to_string());
    Err(error)
}

/// Fill a value into the element matching the selector. An empty value is a
/// no-op (`SkippedEmpty`), distinguishable from "found but empty"; a
/// missing element is a failure.
pub async fn fill_value<P, R>(
    page: &mut P,
    reporter: &mut R,
    selector: &str,
    value: &str,
    opts: StepOptions,
) -> Result<FillOutcome, ImportError>
where
    P: Page + ?Sized,
    R: Reporter + ?Sized,
{
    if value.trim().is_empty() {
        reporter.progress(&format!("No value for {selector}, skipping"));
        return Ok(FillOutcome::SkippedEmpty);
    }

    reporter.progress(&format!(
        "Attempting to fill value in \"{selector}\" with \"{value}\""
    ));
    if !wait_for_element(page, reporter, selector, opts).await? {
        let error = ImportError::ElementNotFound {
            role: "fillValue".into(),
            selector: selector.into(),
            timeout_ms: opts.timeout.as_millis() as u64,
        };
        reporter.error(&error.to_string());
        return Err(error);
    }

    page.set_value(selector, value).await?;
    reporter.progress(&format!("Value filled for {selector}."));
    Ok(FillOutcome::Filled)
}

/// Click the element matching the selector.
pub async fn click_element<P, R>(
    page: &mut P,
    reporter: &mut R,
    selector: &str,
    opts: StepOptions,
) -> Result<(), ImportError>
where
    P: Page + ?Sized,
    R: Reporter + ?Sized,
{
    reporter.progress(&format!("Attempting to click element: {selector}"));
    if !wait_for_element(page, reporter, selector, opts).await? {
        let error = ImportError::ElementNotFound {
            role: "clickElement".into(),
            selector: selector.into(),
            timeout_ms: opts.timeout.as_millis() as u64,
        };
        reporter.error(&error.to_string());
        return Err(error);
    }

    page.click(selector).await?;
    reporter.progress(&format!("Clicked element: {selector}."));
    Ok(())
}

/// Select the option whose visible label case-insensitively contains the
/// given text. Empty text is a no-op; a present control with no matching
/// option is a failure.
pub async fn select_dropdown_by_text<P, R>(
    page: &mut P,
    reporter: &mut R,
    selector: &str,
    text: &str,
    opts: StepOptions,
) -> Result<FillOutcome, ImportError>
where
    P: Page + ?Sized,
    R: Reporter + ?Sized,
{
    if text.trim().is_empty() {
        reporter.progress(&format!("No selection for {selector}, skipping"));
        return Ok(FillOutcome::SkippedEmpty);
    }

    reporter.progress(&format!(
        "Attempting to select in dropdown \"{selector}\" by text: \"{text}\""
    ));
    if !wait_for_element(page, reporter, selector, opts).await? {
        let error = ImportError::ElementNotFound {
            role: "selectDropdownByText".into(),
            selector: selector.into(),
            timeout_ms: opts.timeout.as_millis() as u64,
        };
        reporter.error(&error.to_string());
        return Err(error);
    }

    let wanted = text.to_lowercase();
    let labels = page.option_labels(selector).await?;
    let matched = labels
        .iter()
        .find(|label| label.to_lowercase().contains(&wanted));

    match matched {
        Some(label) => {
            page.select_by_label(selector, label).await?;
            reporter.progress(&format!("Selected \"{text}\" in dropdown {selector}."));
            Ok(FillOutcome::Filled)
        }
        None => {
            let error = ImportError::OptionNotFound {
                selector: selector.into(),
                text: text.into(),
            };
            reporter.error(&error.to_string());
            Err(error)
        }
    }
}
