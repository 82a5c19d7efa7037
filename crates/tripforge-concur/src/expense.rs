//! Expected-expense payload construction: one LineItem becomes one JSON
//! body via a category→expense-type-code lookup table.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tripforge_core::model::{Category, LineItem, TripRequest};

/// Category→expense-type-code table. The defaults match the common SAP
/// Concur configuration; tenants with custom types override via settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCodes(HashMap<Category, String>);

impl Default for ExpenseCodes {
    fn default() -> Self {
        let mut codes = HashMap::new();
        codes.insert(Category::Flights, "AIRFR".to_string());
        codes.insert(Category::Hotels, "LODNG".to_string());
        codes.insert(Category::Transportation, "GRTRN".to_string());
        codes.insert(Category::Activities, "ENTOT".to_string());
        codes.insert(Category::Todos, "MISCL".to_string());
        ExpenseCodes(codes)
    }
}

impl ExpenseCodes {
    pub fn code(&self, category: Category) -> &str {
        self.0
            .get(&category)
            .map(|s| s.as_str())
            .unwrap_or("MISCL")
    }
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

/// The item's primary date: its own leading date field, falling back to the
/// trip's start date.
fn transaction_date<'a>(trip: &'a TripRequest, item: LineItem<'a>) -> &'a str {
    let own = match item {
        LineItem::Flight(f) => f.dep_date.as_str(),
        LineItem::Hotel(h) => h.checkin_date.as_str(),
        LineItem::Transportation(t) => t.start_date.as_str(),
        LineItem::Activity(a) => a.date.as_str(),
        LineItem::Todo(t) => t.due_date.as_str(),
    };
    first_non_empty(&[own, &trip.start_date]).unwrap_or("")
}

fn location<'a>(trip: &'a TripRequest, item: LineItem<'a>) -> &'a str {
    let own = match item {
        LineItem::Flight(f) => f.dep_city.as_str(),
        LineItem::Hotel(h) => h.city.as_str(),
        LineItem::Transportation(t) => t.start_loc.as_str(),
        LineItem::Activity(a) => a.location.as_str(),
        LineItem::Todo(t) => t.location.as_str(),
    };
    first_non_empty(&[own, &trip.destination]).unwrap_or("")
}

/// Only activities carry an amount in the source form; everything else is
/// an expected expense with an amount to be filled in later.
fn amount(item: LineItem<'_>) -> f64 {
    match item {
        LineItem::Activity(a) => a.cost.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Build the expected-expense body for one item.
pub fn expected_expense_payload(
    trip: &TripRequest,
    item: LineItem<'_>,
    codes: &ExpenseCodes,
    currency: &str,
) -> Value {
    let mut payload = json!({
        "expenseType": { "code": codes.code(item.category()) },
        "transactionDate": transaction_date(trip, item),
        "transactionAmount": { "value": amount(item), "currency": currency },
        "businessPurpose": trip
            .business_purpose
            .clone()
            .unwrap_or_else(|| trip.name.clone()),
        "location": { "value": location(trip, item) },
    });

    if let LineItem::Flight(flight) = item {
        payload["tripData"] = json!({
            "segmentType": "AIR",
            "tripType": "ONE_WAY",
            "legs": [{
                "vendor": flight.airline,
                "flightNumber": flight.flight_number,
                "startDate": flight.dep_date,
                "startTime": flight.dep_time,
                "endDate": flight.arr_date,
                "endTime": flight.arr_time,
                "startLocation": flight.dep_city,
                "endLocation": flight.arr_city,
            }],
        });
    }

    payload
}
