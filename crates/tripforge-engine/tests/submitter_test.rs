use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tripforge_core::adapter::{Affordance, FieldBinding, LoginForm, PlanForm, SiteAdapter, TripForm};
use tripforge_core::error::{ImportError, PageError};
use tripforge_core::model::{Category, Flight, LineItem, SiteCredentials, Transportation, TripRequest};
use tripforge_core::protocol::{ImportMessage, RunOutcome};
use tripforge_engine::page::{NavigationResult, Page};
use tripforge_engine::primitives::StepOptions;
use tripforge_engine::report::Reporter;
use tripforge_engine::submit::{ParentHandle, PlanSubmitter, UiSubmitter};

#[derive(Default)]
struct RecordingReporter {
    messages: Vec<ImportMessage>,
}

impl RecordingReporter {
    fn error_messages(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                ImportMessage::Progress {
                    message,
                    is_error: true,
                } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn progress(&mut self, message: &str) {
        self.messages.push(ImportMessage::progress(message));
    }
    fn error(&mut self, message: &str) {
        self.messages.push(ImportMessage::error(message));
    }
    fn complete(&mut self, outcome: &RunOutcome) {
        self.messages.push(ImportMessage::result(outcome));
    }
}

/// Scripted page: a fixed set of selectors resolves, every interaction is
/// recorded in order.
struct MockPage {
    present: HashSet<String>,
    options: HashMap<String, Vec<String>>,
    ops: Vec<String>,
    url: String,
    ready: bool,
}

impl MockPage {
    fn with_selectors(present: &[&str]) -> Self {
        MockPage {
            present: present.iter().map(|s| s.to_string()).collect(),
            options: HashMap::new(),
            ops: Vec::new(),
            url: "about:blank".into(),
            ready: false,
        }
    }
}

#[async_trait]
impl Page for MockPage {
    async fn launch(&mut self) -> Result<(), PageError> {
        self.ops.push("launch".into());
        self.ready = true;
        Ok(())
    }
    async fn close(&mut self) -> Result<(), PageError> {
        self.ready = false;
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        self.ready
    }
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, PageError> {
        self.ops.push(format!("navigate:{url}"));
        self.url = url.to_string();
        Ok(NavigationResult {
            url: url.to_string(),
            title: "mock".into(),
            status: 200,
        })
    }
    async fn current_url(&mut self) -> Result<String, PageError> {
        Ok(self.url.clone())
    }
    async fn query(&mut self, selector: &str) -> Result<bool, PageError> {
        Ok(self.present.contains(selector))
    }
    async fn set_value(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        self.ops.push(format!("set:{selector}={value}"));
        Ok(())
    }
    async fn click(&mut self, selector: &str) -> Result<(), PageError> {
        self.ops.push(format!("click:{selector}"));
        Ok(())
    }
    async fn option_labels(&mut self, selector: &str) -> Result<Vec<String>, PageError> {
        Ok(self.options.get(selector).cloned().unwrap_or_default())
    }
    async fn select_by_label(&mut self, selector: &str, label: &str) -> Result<(), PageError> {
        self.ops.push(format!("select:{selector}={label}"));
        Ok(())
    }
    async fn press_key(&mut self, selector: &str, key: &str) -> Result<(), PageError> {
        self.ops.push(format!("press:{selector}:{key}"));
        Ok(())
    }
}

fn test_adapter() -> SiteAdapter {
    let mut plans = HashMap::new();
    plans.insert(
        Category::Flights,
        PlanForm {
            open: vec![
                Affordance::new("Add a Plan", &["#add-plan"]),
                // First candidate is stale on purpose; the second resolves.
                Affordance::new("Flight plan type", &["#old-flight-pill", "#flight-pill"]),
            ],
            ready: "#flight-form".into(),
            fields: vec![
                FieldBinding::text("airline", "#airline"),
                FieldBinding::text("flightNumber", "#flight-no"),
                FieldBinding::text("depDate", "#dep-date"),
            ],
            save: Affordance::new("Save flight", &["#save-flight"]),
            confirm: "#add-plan".into(),
        },
    );
    plans.insert(
        Category::Transportation,
        PlanForm {
            open: vec![Affordance::new("Add transport", &["#add-transport"])],
            ready: "#transport-form".into(),
            fields: vec![
                FieldBinding::select("type", "#transport-type"),
                FieldBinding::text("vendor", "#transport-vendor"),
            ],
            save: Affordance::new("Save transport", &["#save-transport"]),
            confirm: "#add-plan".into(),
        },
    );

    SiteAdapter {
        name: "testsite".into(),
        login: None,
        trip: TripForm {
            create_url: "https://travel.test/trips/new".into(),
            fields: vec![
                FieldBinding::text("name", "#trip-name"),
                FieldBinding::typeahead("destination", "#destination"),
                FieldBinding::text("startDate", "#start-date"),
            ],
            save: Affordance::new("Save trip", &["#save-trip"]),
            confirm: "#add-plan".into(),
        },
        plans,
    }
}

fn adapter_with_login() -> SiteAdapter {
    let mut adapter = test_adapter();
    adapter.login = Some(LoginForm {
        url: "https://travel.test/login".into(),
        fields: vec![
            FieldBinding::text("email", "#login-email"),
            FieldBinding::text("password", "#login-password"),
        ],
        submit: Affordance::new("Sign in", &["#login-submit"]),
        success: "#logged-in".into(),
    });
    adapter
}

fn fast() -> StepOptions {
    StepOptions::from_millis(40, 10)
}

fn trip() -> TripRequest {
    TripRequest {
        name: "Tokyo Trip".into(),
        start_date: "2025-06-27".into(),
        end_date: "2025-07-02".into(),
        destination: "Tokyo".into(),
        business_purpose: None,
    }
}

#[tokio::test]
async fn parent_creation_follows_the_trip_script() {
    let page = MockPage::with_selectors(&[
        "#trip-name",
        "#destination",
        "#start-date",
        "#save-trip",
        "#add-plan",
    ]);
    let mut submitter = UiSubmitter::new(page, test_adapter(), fast());
    let mut reporter = RecordingReporter::default();

    let parent = submitter
        .create_parent(&trip(), &mut reporter)
        .await
        .unwrap();
    assert_eq!(parent, ParentHandle("https://travel.test/trips/new".into()));

    let ops = submitter.into_page().ops;
    assert_eq!(
        ops,
        vec![
            "launch",
            "navigate:https://travel.test/trips/new",
            "set:#trip-name=Tokyo Trip",
            "set:#destination=Tokyo",
            "press:#destination:Enter",
            "set:#start-date=2025-06-27",
            "click:#save-trip",
        ]
    );
}

#[tokio::test]
async fn configured_login_form_is_driven_before_the_trip_script() {
    let page = MockPage::with_selectors(&[
        "#login-email",
        "#login-password",
        "#login-submit",
        "#logged-in",
        "#trip-name",
        "#destination",
        "#start-date",
        "#save-trip",
        "#add-plan",
    ]);
    let credentials = SiteCredentials {
        email: "traveler@example.com".into(),
        password: "hunter2".into(),
    };
    let mut submitter = UiSubmitter::new(page, adapter_with_login(), fast())
        .with_credentials(Some(credentials));
    let mut reporter = RecordingReporter::default();

    submitter
        .create_parent(&trip(), &mut reporter)
        .await
        .unwrap();

    let ops = submitter.into_page().ops;
    assert_eq!(
        &ops[..5],
        &[
            "launch",
            "navigate:https://travel.test/login",
            "set:#login-email=traveler@example.com",
            "set:#login-password=hunter2",
            "click:#login-submit",
        ]
    );
    assert!(ops.contains(&"navigate:https://travel.test/trips/new".to_string()));
    // The password never appears in the progress stream.
    assert!(
        reporter
            .messages
            .iter()
            .all(|m| !matches!(m, tripforge_core::protocol::ImportMessage::Progress { message, .. }
                if message.contains("hunter2")))
    );
}

#[tokio::test]
async fn login_form_without_credentials_assumes_a_signed_in_session() {
    let page = MockPage::with_selectors(&[
        "#trip-name",
        "#destination",
        "#start-date",
        "#save-trip",
        "#add-plan",
    ]);
    let mut submitter = UiSubmitter::new(page, adapter_with_login(), fast());
    let mut reporter = RecordingReporter::default();

    submitter
        .create_parent(&trip(), &mut reporter)
        .await
        .unwrap();

    let ops = submitter.into_page().ops;
    // Straight to trip creation; the login page is never visited.
    assert_eq!(ops[1], "navigate:https://travel.test/trips/new");
    assert!(!ops.iter().any(|op| op.contains("login")));
}

#[tokio::test]
async fn flight_submission_uses_fallback_candidate_and_skips_empty_fields() {
    let page = MockPage::with_selectors(&[
        "#add-plan",
        "#flight-pill",
        "#flight-form",
        "#airline",
        "#flight-no",
        "#dep-date",
        "#save-flight",
    ]);
    let mut submitter = UiSubmitter::new(page, test_adapter(), fast());
    let mut reporter = RecordingReporter::default();

    let flight = Flight {
        airline: "ANA".into(),
        flight_number: "101".into(),
        // depDate left empty: must be skipped, not failed.
        ..Flight::default()
    };
    let parent = ParentHandle("https://travel.test/trips/42".into());
    submitter
        .submit(&parent, LineItem::Flight(&flight), &mut reporter)
        .await
        .unwrap();

    let ops = submitter.into_page().ops;
    assert_eq!(
        ops,
        vec![
            "navigate:https://travel.test/trips/42",
            "click:#add-plan",
            "click:#flight-pill",
            "set:#airline=ANA",
            "set:#flight-no=101",
            "click:#save-flight",
        ]
    );
    assert!(reporter.error_messages().is_empty());
}

#[tokio::test]
async fn dropdown_field_is_selected_by_label() {
    let mut page = MockPage::with_selectors(&[
        "#add-plan",
        "#add-transport",
        "#transport-form",
        "#transport-type",
        "#transport-vendor",
        "#save-transport",
    ]);
    page.options.insert(
        "#transport-type".into(),
        vec!["Car Rental".into(), "Train / Rail".into(), "Taxi".into()],
    );
    let mut submitter = UiSubmitter::new(page, test_adapter(), fast());
    let mut reporter = RecordingReporter::default();

    let transport = Transportation {
        kind: "train".into(),
        vendor: "JR".into(),
        ..Transportation::default()
    };
    let parent = ParentHandle("https://travel.test/trips/42".into());
    submitter
        .submit(&parent, LineItem::Transportation(&transport), &mut reporter)
        .await
        .unwrap();

    let ops = submitter.into_page().ops;
    assert!(ops.contains(&"select:#transport-type=Train / Rail".to_string()));
    assert!(ops.contains(&"set:#transport-vendor=JR".to_string()));
}

#[tokio::test]
async fn missing_form_marker_fails_the_item_with_its_selector() {
    // The flight form never renders.
    let page = MockPage::with_selectors(&["#add-plan", "#flight-pill"]);
    let mut submitter = UiSubmitter::new(page, test_adapter(), fast());
    let mut reporter = RecordingReporter::default();

    let flight = Flight {
        airline: "ANA".into(),
        ..Flight::default()
    };
    let parent = ParentHandle("https://travel.test/trips/42".into());
    let error = submitter
        .submit(&parent, LineItem::Flight(&flight), &mut reporter)
        .await
        .unwrap_err();

    match error {
        ImportError::ElementNotFound { role, selector, .. } => {
            assert_eq!(role, "flight form");
            assert_eq!(selector, "#flight-form");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!reporter.error_messages().is_empty());
}

#[tokio::test]
async fn absent_confirmation_marker_is_a_confirmation_timeout() {
    let mut adapter = test_adapter();
    adapter
        .plans
        .get_mut(&Category::Flights)
        .unwrap()
        .confirm = "#flight-saved-row".into();

    let page = MockPage::with_selectors(&[
        "#add-plan",
        "#flight-pill",
        "#flight-form",
        "#airline",
        "#flight-no",
        "#dep-date",
        "#save-flight",
    ]);
    let mut submitter = UiSubmitter::new(page, adapter, fast());
    let mut reporter = RecordingReporter::default();

    let flight = Flight {
        airline: "ANA".into(),
        flight_number: "101".into(),
        dep_date: "2025-06-27".into(),
        ..Flight::default()
    };
    let parent = ParentHandle("https://travel.test/trips/42".into());
    let error = submitter
        .submit(&parent, LineItem::Flight(&flight), &mut reporter)
        .await
        .unwrap_err();

    assert!(error.is_unconfirmed());
    assert!(error.to_string().contains("#flight-saved-row"));
    // The save click did happen; the outcome on the remote site is unknown.
    assert!(
        submitter
            .into_page()
            .ops
            .contains(&"click:#save-flight".to_string())
    );
}

#[tokio::test]
async fn category_without_mapping_is_rejected_before_navigation() {
    let page = MockPage::with_selectors(&[]);
    let mut submitter = UiSubmitter::new(page, test_adapter(), fast());
    let mut reporter = RecordingReporter::default();

    let hotel = tripforge_core::model::Hotel {
        name: "Park Hotel".into(),
        ..Default::default()
    };
    let parent = ParentHandle("https://travel.test/trips/42".into());
    let error = submitter
        .submit(&parent, LineItem::Hotel(&hotel), &mut reporter)
        .await
        .unwrap_err();

    assert!(matches!(error, ImportError::Validation(_)));
    assert!(submitter.into_page().ops.is_empty());
}
