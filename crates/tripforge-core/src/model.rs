use serde::{Deserialize, Serialize};

/// The top-level trip (or travel request) all line items attach to.
/// Immutable once a run starts; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_purpose: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub flight_number: String,
    #[serde(default)]
    pub dep_city: String,
    #[serde(default)]
    pub dep_date: String,
    #[serde(default)]
    pub dep_time: String,
    #[serde(default)]
    pub arr_city: String,
    #[serde(default)]
    pub arr_date: String,
    #[serde(default)]
    pub arr_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub checkin_date: String,
    #[serde(default)]
    pub checkout_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub start_loc: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_loc: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub cost: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub location: String,
}

/// The five import categories, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Flights,
    Hotels,
    Transportation,
    Activities,
    Todos,
}

impl Category {
    /// Fixed category processing order. Runs always drain categories in
    /// this sequence, and items within a category in input order.
    pub const ORDER: [Category; 5] = [
        Category::Flights,
        Category::Hotels,
        Category::Transportation,
        Category::Activities,
        Category::Todos,
    ];

    /// Human label used in progress and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Flights => "flight",
            Category::Hotels => "hotel",
            Category::Transportation => "transportation",
            Category::Activities => "activity",
            Category::Todos => "note/TODO",
        }
    }
}

/// Borrowed, tagged view of one line item. Identity is positional within
/// its category list; items never reference each other.
#[derive(Debug, Clone, Copy)]
pub enum LineItem<'a> {
    Flight(&'a Flight),
    Hotel(&'a Hotel),
    Transportation(&'a Transportation),
    Activity(&'a Activity),
    Todo(&'a Todo),
}

impl LineItem<'_> {
    pub fn category(&self) -> Category {
        match self {
            LineItem::Flight(_) => Category::Flights,
            LineItem::Hotel(_) => Category::Hotels,
            LineItem::Transportation(_) => Category::Transportation,
            LineItem::Activity(_) => Category::Activities,
            LineItem::Todo(_) => Category::Todos,
        }
    }

    /// Value of one logical source field, by its wire name. Adapters bind
    /// controls to these names; `None` means the name does not exist for
    /// this category (as opposed to existing but being empty).
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match (self, name) {
            (LineItem::Flight(f), "airline") => &f.airline,
            (LineItem::Flight(f), "flightNumber") => &f.flight_number,
            (LineItem::Flight(f), "depCity") => &f.dep_city,
            (LineItem::Flight(f), "depDate") => &f.dep_date,
            (LineItem::Flight(f), "depTime") => &f.dep_time,
            (LineItem::Flight(f), "arrCity") => &f.arr_city,
            (LineItem::Flight(f), "arrDate") => &f.arr_date,
            (LineItem::Flight(f), "arrTime") => &f.arr_time,
            (LineItem::Hotel(h), "name") => &h.name,
            (LineItem::Hotel(h), "city") => &h.city,
            (LineItem::Hotel(h), "checkinDate") => &h.checkin_date,
            (LineItem::Hotel(h), "checkoutDate") => &h.checkout_date,
            (LineItem::Transportation(t), "type") => &t.kind,
            (LineItem::Transportation(t), "vendor") => &t.vendor,
            (LineItem::Transportation(t), "startLoc") => &t.start_loc,
            (LineItem::Transportation(t), "startDate") => &t.start_date,
            (LineItem::Transportation(t), "startTime") => &t.start_time,
            (LineItem::Transportation(t), "endLoc") => &t.end_loc,
            (LineItem::Transportation(t), "endDate") => &t.end_date,
            (LineItem::Transportation(t), "endTime") => &t.end_time,
            (LineItem::Activity(a), "name") => &a.name,
            (LineItem::Activity(a), "location") => &a.location,
            (LineItem::Activity(a), "date") => &a.date,
            (LineItem::Activity(a), "time") => &a.time,
            (LineItem::Activity(a), "cost") => &a.cost,
            (LineItem::Todo(t), "description") => &t.description,
            (LineItem::Todo(t), "dueDate") => &t.due_date,
            (LineItem::Todo(t), "location") => &t.location,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Short human description for progress messages. Falls back to a
    /// positional name when the leading fields are empty.
    pub fn describe(&self, index: usize) -> String {
        let text = match self {
            LineItem::Flight(f) => format!("{} {}", f.airline, f.flight_number),
            LineItem::Hotel(h) => h.name.clone(),
            LineItem::Transportation(t) => format!("{} - {}", t.kind, t.vendor),
            LineItem::Activity(a) => a.name.clone(),
            LineItem::Todo(t) => t.description.clone(),
        };
        if text.trim().is_empty() || text.trim() == "-" {
            format!("item {}", index + 1)
        } else {
            text.trim().to_string()
        }
    }
}

impl TripRequest {
    /// Value of one logical trip field, by its wire name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "startDate" => Some(&self.start_date),
            "endDate" => Some(&self.end_date),
            "destination" => Some(&self.destination),
            "businessPurpose" => Some(self.business_purpose.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

/// Sign-in credentials for the automated browser path, supplied through
/// configuration. Values are filled into the login form without being
/// echoed into progress messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCredentials {
    pub email: String,
    pub password: String,
}

impl SiteCredentials {
    /// Value of one credential field, by its logical name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

/// Caller-facing import request: the parent trip plus one list per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub trip_details: TripRequest,
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub hotels: Vec<Hotel>,
    #[serde(default)]
    pub transportation: Vec<Transportation>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl ImportRequest {
    /// Line items of one category, in input order.
    pub fn items(&self, category: Category) -> Vec<LineItem<'_>> {
        match category {
            Category::Flights => self.flights.iter().map(LineItem::Flight).collect(),
            Category::Hotels => self.hotels.iter().map(LineItem::Hotel).collect(),
            Category::Transportation => self
                .transportation
                .iter()
                .map(LineItem::Transportation)
                .collect(),
            Category::Activities => self.activities.iter().map(LineItem::Activity).collect(),
            Category::Todos => self.todos.iter().map(LineItem::Todo).collect(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.flights.len()
            + self.hotels.len()
            + self.transportation.len()
            + self.activities.len()
            + self.todos.len()
    }
}

/// Running tally for one import. `total` counts attempts and is bumped
/// before each one, so `total >= successful + failed` holds at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
}

impl ImportSummary {
    pub fn begin_attempt(&mut self) {
        self.total += 1;
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
        debug_assert!(self.total >= self.successful + self.failed);
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
        debug_assert!(self.total >= self.successful + self.failed);
    }

    /// A run succeeds overall only when nothing failed.
    pub fn overall_success(&self) -> bool {
        self.failed == 0
    }

    /// True once every begun attempt has been resolved one way or the other.
    pub fn is_settled(&self) -> bool {
        self.total == self.successful + self.failed
    }
}

/// OAuth credential held by a credential provider. The orchestrator only
/// ever borrows a short-lived copy for the duration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds at which the access token stops being valid.
    pub expires_at: u64,
    pub api_base: String,
}

impl Credential {
    /// Expiry check with a skew margin, so a token about to lapse mid-run
    /// is refreshed up front.
    pub fn is_expired(&self, now_unix: u64, skew_secs: u64) -> bool {
        self.expires_at <= now_unix.saturating_add(skew_secs)
    }
}
