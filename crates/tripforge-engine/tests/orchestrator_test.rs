use async_trait::async_trait;
use tripforge_core::error::ImportError;
use tripforge_core::model::{Activity, Flight, Hotel, ImportRequest, LineItem, Todo, Transportation, TripRequest};
use tripforge_core::protocol::{ImportMessage, RunOutcome};
use tripforge_engine::orchestrator::ImportRun;
use tripforge_engine::report::Reporter;
use tripforge_engine::submit::{ParentHandle, PlanSubmitter};

#[derive(Default)]
struct RecordingReporter {
    messages: Vec<ImportMessage>,
}

impl RecordingReporter {
    fn results(&self) -> Vec<&ImportMessage> {
        self.messages
            .iter()
            .filter(|m| matches!(m, ImportMessage::Result { .. }))
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

/// Test double: trips whose name contains "fail" fail to create; flight
/// items whose airline contains "timeout" hit a confirmation timeout.
#[derive(Default)]
struct ScriptedSubmitter {
    calls: Vec<String>,
}

#[async_trait]
impl PlanSubmitter for ScriptedSubmitter {
    async fn create_parent(
        &mut self,
        trip: &TripRequest,
        _reporter: &mut dyn Reporter,
    ) -> Result<ParentHandle, ImportError> {
        self.calls.push(format!("parent:{}", trip.name));
        if trip.name.to_lowercase().contains("fail") {
            return Err(ImportError::Validation(format!(
                "Simulated failure creating trip: {}",
                trip.name
            )));
        }
        Ok(ParentHandle(format!(
            "https://travel.test/trips/{}",
            trip.name.replace(' ', "_")
        )))
    }

    async fn submit(
        &mut self,
        _parent: &ParentHandle,
        item: LineItem<'_>,
        _reporter: &mut dyn Reporter,
    ) -> Result<(), ImportError> {
        let label = item.category().label();
        self.calls.push(format!("{label}:{}", item.describe(0)));
        if let LineItem::Flight(flight) = item
            && flight.airline.to_lowercase().contains("timeout")
        {
            return Err(ImportError::ConfirmationTimeout(format!(
                "flight save was clicked but never confirmed ({} {})",
                flight.airline, flight.flight_number
            )));
        }
        Ok(())
    }
}

fn tokyo_request() -> ImportRequest {
    ImportRequest {
        trip_details: TripRequest {
            name: "Tokyo Trip".into(),
            start_date: "2025-06-27".into(),
            end_date: "2025-07-02".into(),
            destination: "Tokyo".into(),
            business_purpose: None,
        },
        flights: vec![Flight {
            airline: "ANA".into(),
            flight_number: "101".into(),
            ..Flight::default()
        }],
        ..ImportRequest::default()
    }
}

#[tokio::test]
async fn successful_run_counts_parent_and_item() {
    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();

    let outcome = ImportRun::new(&mut submitter, &mut reporter)
        .execute(&tokyo_request())
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.summary.total, 2);
    assert_eq!(outcome.summary.successful, 2);
    assert_eq!(outcome.summary.failed, 0);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn item_confirmation_timeout_is_isolated() {
    let mut request = tokyo_request();
    request.flights[0].airline = "ANA-timeout".into();

    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();
    let outcome = ImportRun::new(&mut submitter, &mut reporter)
        .execute(&request)
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.summary.total, 2);
    assert_eq!(outcome.summary.successful, 1);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("never confirmed"));
}

#[tokio::test]
async fn parent_failure_skips_every_category() {
    let mut request = tokyo_request();
    request.trip_details.name = "Tokyo fail Trip".into();
    request.hotels.push(Hotel {
        name: "Park Hotel".into(),
        ..Hotel::default()
    });

    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();
    let outcome = ImportRun::new(&mut submitter, &mut reporter)
        .execute(&request)
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.summary.total, 1);
    assert_eq!(outcome.summary.successful, 0);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    // No item submitter invocation happened.
    assert_eq!(submitter.calls, vec!["parent:Tokyo fail Trip"]);
}

#[tokio::test]
async fn missing_trip_name_fails_before_any_remote_call() {
    let mut request = tokyo_request();
    request.trip_details.name = "   ".into();

    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();
    let outcome = ImportRun::new(&mut submitter, &mut reporter)
        .execute(&request)
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.summary.total, 1);
    assert_eq!(outcome.summary.failed, 1);
    assert!(submitter.calls.is_empty());
    assert_eq!(outcome.errors, vec!["Trip Name is required.".to_string()]);
}

#[tokio::test]
async fn categories_processed_in_fixed_order() {
    let mut request = tokyo_request();
    request.flights.push(Flight {
        airline: "JAL".into(),
        flight_number: "77".into(),
        ..Flight::default()
    });
    request.todos.push(Todo {
        description: "Pack passport".into(),
        ..Todo::default()
    });
    request.activities.push(Activity {
        name: "Sumo match".into(),
        ..Activity::default()
    });
    request.transportation.push(Transportation {
        kind: "Train".into(),
        vendor: "JR".into(),
        ..Transportation::default()
    });
    request.hotels.push(Hotel {
        name: "Park Hotel".into(),
        ..Hotel::default()
    });

    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();
    let outcome = ImportRun::new(&mut submitter, &mut reporter)
        .execute(&request)
        .await;

    assert!(outcome.success);
    assert_eq!(
        submitter.calls,
        vec![
            "parent:Tokyo Trip",
            "flight:ANA 101",
            "flight:JAL 77",
            "hotel:Park Hotel",
            "transportation:Train - JR",
            "activity:Sumo match",
            "note/TODO:Pack passport",
        ]
    );
}

#[tokio::test]
async fn exactly_one_terminal_message_and_it_is_last() {
    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();
    ImportRun::new(&mut submitter, &mut reporter)
        .execute(&tokyo_request())
        .await;

    let results = reporter.results();
    assert_eq!(results.len(), 1);
    assert!(matches!(
        reporter.messages.last(),
        Some(ImportMessage::Result { .. })
    ));
}

#[tokio::test]
async fn summary_is_settled_at_done() {
    let mut request = tokyo_request();
    request.flights[0].airline = "timeout-air".into();
    request.todos.push(Todo {
        description: "Pack passport".into(),
        ..Todo::default()
    });

    let mut submitter = ScriptedSubmitter::default();
    let mut reporter = RecordingReporter::default();
    let outcome = ImportRun::new(&mut submitter, &mut reporter)
        .execute(&request)
        .await;

    assert_eq!(
        outcome.summary.total,
        outcome.summary.successful + outcome.summary.failed
    );
    assert_eq!(outcome.summary.total, 3);
}
