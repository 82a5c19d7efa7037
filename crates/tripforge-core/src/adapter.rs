//! Declarative target-site adapter schema.
//!
//! An adapter is pure configuration: selector tables for one destination
//! web UI, opaque to the orchestrator. Each logical affordance carries an
//! ordered list of candidate selectors, tried in order, first match wins.

use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One logical affordance (a button, a link) with its candidate selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affordance {
    /// Name used in progress and error messages.
    pub name: String,
    /// Candidate CSS selectors, in preference order.
    pub candidates: Vec<String>,
}

impl Affordance {
    pub fn new(name: impl Into<String>, candidates: &[&str]) -> Self {
        Affordance {
            name: name.into(),
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// How a bound field is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// Plain input; value set with synthetic input/change/blur events.
    #[default]
    Text,
    /// Autocomplete input; value set, then Enter pressed to commit the
    /// first suggestion.
    Typeahead,
    /// Native select; option chosen by case-insensitive label match.
    Select,
}

/// Binding of one logical source field to one control on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    /// Logical field name (matches the item's field, used in messages).
    pub field: String,
    pub selector: String,
    #[serde(default)]
    pub control: ControlKind,
}

impl FieldBinding {
    pub fn text(field: &str, selector: &str) -> Self {
        FieldBinding {
            field: field.into(),
            selector: selector.into(),
            control: ControlKind::Text,
        }
    }

    pub fn typeahead(field: &str, selector: &str) -> Self {
        FieldBinding {
            field: field.into(),
            selector: selector.into(),
            control: ControlKind::Typeahead,
        }
    }

    pub fn select(field: &str, selector: &str) -> Self {
        FieldBinding {
            field: field.into(),
            selector: selector.into(),
            control: ControlKind::Select,
        }
    }
}

/// Fixed script for the sign-in page. Optional: adapters for sessions that
/// are authenticated out of band simply omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginForm {
    /// Absolute URL of the sign-in page.
    pub url: String,
    /// Bindings for the logical credential fields ("email", "password").
    pub fields: Vec<FieldBinding>,
    pub submit: Affordance,
    /// Selector whose appearance proves the session is signed in.
    pub success: String,
}

/// Fixed script for the parent trip form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripForm {
    /// Absolute URL of the trip creation page.
    pub create_url: String,
    pub fields: Vec<FieldBinding>,
    pub save: Affordance,
    /// Selector whose appearance proves the trip was created.
    pub confirm: String,
}

/// Fixed script for one category's "add plan" form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanForm {
    /// Affordances clicked in order to reach the form (e.g. "Add a Plan",
    /// then the category pill).
    pub open: Vec<Affordance>,
    /// Selector that marks the form's field group as rendered.
    pub ready: String,
    pub fields: Vec<FieldBinding>,
    pub save: Affordance,
    /// Confirmation marker awaited after save.
    pub confirm: String,
}

/// Selector/field map for one destination web UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAdapter {
    pub name: String,
    #[serde(default)]
    pub login: Option<LoginForm>,
    pub trip: TripForm,
    pub plans: HashMap<Category, PlanForm>,
}

impl SiteAdapter {
    pub fn plan(&self, category: Category) -> Option<&PlanForm> {
        self.plans.get(&category)
    }

    /// Built-in adapter for the TripIt web UI, with the selectors observed
    /// on its trip and plan creation pages in mid-2025. These are guesses
    /// against a third-party site and are expected to be overridden from
    /// configuration when they drift.
    pub fn tripit() -> Self {
        let add_plan = Affordance::new(
            "Add a Plan",
            &[
                r#"a[aria-label="Add a Plan"]"#,
                r#"button[aria-label="Add a Plan"]"#,
            ],
        );
        let back_on_trip = r#"a[aria-label="Add a Plan"], button[aria-label="Add a Plan"]"#;

        let mut plans = HashMap::new();
        plans.insert(
            Category::Flights,
            PlanForm {
                open: vec![
                    add_plan.clone(),
                    Affordance::new(
                        "Flight plan type",
                        &[
                            r#"[data-cy="more-plan-types-flight"]"#,
                            r#"[aria-label*="Flight"]"#,
                        ],
                    ),
                ],
                ready: r#"[data-cy="flight-form-container"]"#.into(),
                fields: vec![
                    FieldBinding::typeahead(
                        "airline",
                        r#"input[name="flight-form-0-airline-input"]"#,
                    ),
                    FieldBinding::text(
                        "flightNumber",
                        r#"input[data-cy="flight-form-0-flight-number"]"#,
                    ),
                    FieldBinding::text(
                        "depDate",
                        r#"input[data-cy="flight-form-0-start-date-input"]"#,
                    ),
                ],
                save: Affordance::new(
                    "Save flight",
                    &[r#"button[data-cy="footer-segment-edit-save"]"#],
                ),
                confirm: back_on_trip.into(),
            },
        );
        plans.insert(
            Category::Hotels,
            PlanForm {
                open: vec![
                    add_plan.clone(),
                    Affordance::new(
                        "Lodging plan type",
                        &[
                            r#"[data-cy="more-plan-types-lodging"]"#,
                            r#"[aria-label*="Lodging"]"#,
                        ],
                    ),
                ],
                ready: r#"[data-cy="lodging-form-container"]"#.into(),
                fields: vec![
                    FieldBinding::typeahead("name", r#"input[data-cy="lodging-form-supplier"]"#),
                    FieldBinding::text("checkinDate", r#"input[data-cy="lodging-form-start-date-input"]"#),
                    FieldBinding::text(
                        "checkoutDate",
                        r#"input[data-cy="lodging-form-end-date-input"]"#,
                    ),
                ],
                save: Affordance::new(
                    "Save lodging",
                    &[r#"button[data-cy="footer-segment-edit-save"]"#],
                ),
                confirm: back_on_trip.into(),
            },
        );
        plans.insert(
            Category::Transportation,
            PlanForm {
                open: vec![
                    add_plan.clone(),
                    Affordance::new(
                        "Transportation plan type",
                        &[
                            r#"[data-cy="more-plan-types-transportation"]"#,
                            r#"[data-cy="more-plan-types-car"]"#,
                            r#"[aria-label*="Transport"]"#,
                        ],
                    ),
                ],
                ready: r#"[data-cy="transport-form-container"]"#.into(),
                fields: vec![
                    FieldBinding::select("type", r#"select[data-cy="transport-form-type"]"#),
                    FieldBinding::text("vendor", r#"input[data-cy="transport-form-carrier"]"#),
                    FieldBinding::text(
                        "startDate",
                        r#"input[data-cy="transport-form-start-date-input"]"#,
                    ),
                ],
                save: Affordance::new(
                    "Save transportation",
                    &[r#"button[data-cy="footer-segment-edit-save"]"#],
                ),
                confirm: back_on_trip.into(),
            },
        );
        plans.insert(
            Category::Activities,
            PlanForm {
                open: vec![
                    add_plan.clone(),
                    Affordance::new(
                        "Activity plan type",
                        &[
                            r#"[data-cy="more-plan-types-activity"]"#,
                            r#"[aria-label*="Activity"]"#,
                        ],
                    ),
                ],
                ready: r#"[data-cy="activity-form-container"]"#.into(),
                fields: vec![
                    FieldBinding::text("name", r#"input[data-cy="activity-form-event-name"]"#),
                    FieldBinding::text("date", r#"input[data-cy="activity-form-start-date-input"]"#),
                    FieldBinding::typeahead("location", r#"input[data-cy="activity-form-venue"]"#),
                ],
                save: Affordance::new(
                    "Save activity",
                    &[r#"button[data-cy="footer-segment-edit-save"]"#],
                ),
                confirm: back_on_trip.into(),
            },
        );
        plans.insert(
            Category::Todos,
            PlanForm {
                open: vec![
                    add_plan.clone(),
                    Affordance::new(
                        "Note plan type",
                        &[
                            r#"[data-cy="more-plan-types-note"]"#,
                            r#"[aria-label*="Note"]"#,
                        ],
                    ),
                ],
                ready: r#"[data-cy="note-form-container"]"#.into(),
                fields: vec![
                    FieldBinding::text("description", r#"textarea[data-cy="note-form-details"]"#),
                    FieldBinding::text("dueDate", r#"input[data-cy="note-form-start-date-input"]"#),
                ],
                save: Affordance::new(
                    "Save note",
                    &[r#"button[data-cy="footer-segment-edit-save"]"#],
                ),
                confirm: back_on_trip.into(),
            },
        );

        SiteAdapter {
            name: "tripit".into(),
            login: Some(LoginForm {
                url: "https://www.tripit.com/account/login".into(),
                fields: vec![
                    FieldBinding::text("email", r#"input[name="login_email_address"]"#),
                    FieldBinding::text("password", r#"input[name="login_password"]"#),
                ],
                submit: Affordance::new(
                    "Sign in",
                    &[
                        r#"form#authenticate button[type="submit"]"#,
                        r#"form#authenticate input[type="submit"]"#,
                    ],
                ),
                success: r#"a[href*="logout"]"#.into(),
            }),
            trip: TripForm {
                create_url: "https://www.tripit.com/app/trip/create".into(),
                fields: vec![
                    FieldBinding::text("name", "#trip-name"),
                    FieldBinding::typeahead("destination", r#"[id^="typeahead-input-"]"#),
                    FieldBinding::text("startDate", "#trip-start-date-input"),
                    FieldBinding::text("endDate", "#trip-end-date-input"),
                ],
                save: Affordance::new("Save trip", &[r#"[data-cy="trip-form-save"]"#]),
                confirm: back_on_trip.into(),
            },
            plans,
        }
    }
}
