//! In-memory mock backend.
//!
//! Stands in for a real service: every operation waits for a simulated
//! network delay and all data resets when the process restarts.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{error, info};

use crate::menu::{seed_menu, MenuItem};

pub const RESERVATION_FAILED_MESSAGE: &str =
    "Our apologies. We were unable to process your reservation at this time. Please call us directly.";
pub const RESERVATION_SENT_MESSAGE: &str = "Your reservation request has been sent.";

pub const MAX_GUESTS: u32 = 12;

/// Source of the current menu, as seen by the chat assistant.
#[async_trait]
pub trait MenuProvider: Send + Sync {
    async fn menu_items(&self) -> anyhow::Result<Vec<MenuItem>>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("Menu item already exists: {0}")]
    DuplicateMenuItem(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(u64),

    #[error("Invalid reservation: {0}")]
    InvalidReservation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// Reservation form contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub guests: u32,
    #[serde(default)]
    pub requests: String,
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

impl ReservationRequest {
    /// Apply the same constraints the reservation form enforces.
    pub fn validate(&self) -> Result<(), StoreError> {
        let invalid = |msg: &str| Err(StoreError::InvalidReservation(msg.to_string()));

        if self.name.trim().is_empty() {
            return invalid("name is required");
        }

        let email_regex =
            EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
        if !email_regex.is_match(self.email.trim()) {
            return invalid("email is not valid");
        }

        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return invalid("date must be YYYY-MM-DD");
        }
        if NaiveTime::parse_from_str(&self.time, "%H:%M").is_err() {
            return invalid("time must be HH:MM");
        }

        if !(1..=MAX_GUESTS).contains(&self.guests) {
            return Err(StoreError::InvalidReservation(format!(
                "guests must be between 1 and {}",
                MAX_GUESTS
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: u64,
    pub status: ReservationStatus,
    #[serde(flatten)]
    pub details: ReservationRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
    pub source: String,
    pub rating: u8,
}

fn seed_testimonials() -> Vec<Testimonial> {
    let review = |quote: &str, name: &str| Testimonial {
        quote: quote.to_string(),
        name: name.to_string(),
        source: "Google Review".to_string(),
        rating: 5,
    };

    vec![
        review(
            "The best Carbonara I've had outside of Rome. The ambiance is perfect for a date night. We'll be back for sure!",
            "Alexandra P.",
        ),
        review(
            "An absolute gem! From the 'Tuscan Sunset' cocktail to the Filet Mignon, every single detail was impeccable. The service was top-notch.",
            "David L.",
        ),
        review(
            "A truly memorable dining experience. The Panna Cotta was divine, and the chef's passion is evident in every dish. Highly recommended.",
            "Maria S.",
        ),
    ]
}

#[derive(Default)]
struct Data {
    menu: Vec<MenuItem>,
    testimonials: Vec<Testimonial>,
    reservations: Vec<Reservation>,
    last_reservation_id: u64,
}

pub struct MockBackend {
    data: RwLock<Data>,
    delay: Duration,
}

impl MockBackend {
    /// Backend seeded with the opening menu and testimonials.
    pub fn new(delay: Duration) -> Self {
        Self::with_menu(seed_menu(), delay)
    }

    pub fn with_menu(menu: Vec<MenuItem>, delay: Duration) -> Self {
        Self {
            data: RwLock::new(Data {
                menu,
                testimonials: seed_testimonials(),
                ..Data::default()
            }),
            delay,
        }
    }

    async fn latency(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }

    // ==================== Menu ====================

    pub async fn fetch_menu(&self) -> Vec<MenuItem> {
        self.latency().await;
        self.data.read().await.menu.clone()
    }

    pub async fn add_menu_item(&self, item: MenuItem) -> Result<MenuItem, StoreError> {
        self.latency().await;
        let mut data = self.data.write().await;
        if data.menu.iter().any(|existing| existing.name == item.name) {
            return Err(StoreError::DuplicateMenuItem(item.name));
        }
        data.menu.push(item.clone());
        info!("Added menu item '{}'", item.name);
        Ok(item)
    }

    /// Replace the item with the same name.
    pub async fn update_menu_item(&self, item: MenuItem) -> Result<MenuItem, StoreError> {
        self.latency().await;
        let mut data = self.data.write().await;
        match data.menu.iter_mut().find(|existing| existing.name == item.name) {
            Some(existing) => {
                *existing = item.clone();
                info!("Updated menu item '{}'", item.name);
                Ok(item)
            }
            None => {
                error!("Menu item not found for update: {}", item.name);
                Err(StoreError::MenuItemNotFound(item.name))
            }
        }
    }

    /// Remove the item with this name. Removing an unknown name is not an error.
    pub async fn delete_menu_item(&self, name: &str) {
        self.latency().await;
        let mut data = self.data.write().await;
        let before = data.menu.len();
        data.menu.retain(|item| item.name != name);
        if data.menu.len() < before {
            info!("Deleted menu item '{}'", name);
        }
    }

    // ==================== Testimonials ====================

    pub async fn fetch_testimonials(&self) -> Vec<Testimonial> {
        self.latency().await;
        self.data.read().await.testimonials.clone()
    }

    // ==================== Reservations ====================

    /// Submit a reservation request.
    ///
    /// Validation problems are errors. A simulated backend failure (any name
    /// containing "fail") is a normal outcome with `success == false`.
    pub async fn submit_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<SubmissionOutcome, StoreError> {
        request.validate()?;
        self.latency().await;

        if request.name.to_lowercase().contains("fail") {
            error!("Reservation submission failed for '{}'", request.name);
            return Ok(SubmissionOutcome {
                success: false,
                message: RESERVATION_FAILED_MESSAGE.to_string(),
            });
        }

        let mut data = self.data.write().await;
        // Timestamp ids, bumped when two requests land in the same millisecond
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let id = now.max(data.last_reservation_id + 1);
        data.last_reservation_id = id;

        data.reservations.push(Reservation {
            id,
            status: ReservationStatus::Pending,
            details: request,
        });
        info!("Reservation {} submitted", id);

        Ok(SubmissionOutcome {
            success: true,
            message: RESERVATION_SENT_MESSAGE.to_string(),
        })
    }

    pub async fn fetch_reservations(&self) -> Vec<Reservation> {
        self.latency().await;
        self.data.read().await.reservations.clone()
    }

    pub async fn update_reservation_status(
        &self,
        id: u64,
        status: ReservationStatus,
    ) -> Result<Reservation, StoreError> {
        self.latency().await;
        let mut data = self.data.write().await;
        match data.reservations.iter_mut().find(|r| r.id == id) {
            Some(reservation) => {
                reservation.status = status;
                info!("Reservation {} is now {:?}", id, status);
                Ok(reservation.clone())
            }
            None => {
                error!("Reservation not found for status update: {}", id);
                Err(StoreError::ReservationNotFound(id))
            }
        }
    }
}

#[async_trait]
impl MenuProvider for MockBackend {
    async fn menu_items(&self) -> anyhow::Result<Vec<MenuItem>> {
        Ok(self.fetch_menu().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{Category, Tag};

    fn backend() -> MockBackend {
        MockBackend::new(Duration::ZERO)
    }

    fn request(name: &str) -> ReservationRequest {
        ReservationRequest {
            name: name.to_string(),
            email: "guest@example.com".to_string(),
            phone: "555-0100".to_string(),
            date: "2025-06-14".to_string(),
            time: "19:30".to_string(),
            guests: 2,
            requests: String::new(),
        }
    }

    fn dish(name: &str) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            category: Category::Desserts,
            price: "$8".to_string(),
            description: "Sweet".to_string(),
            ingredients: vec!["Sugar".to_string()],
            tags: vec![Tag::Vegan],
        }
    }

    // ==================== Menu Tests ====================

    #[tokio::test]
    async fn test_fetch_menu_returns_seed() {
        let menu = backend().fetch_menu().await;
        assert_eq!(menu.len(), 8);
        assert_eq!(menu[0].name, "Bruschetta al Pomodoro");
    }

    #[tokio::test]
    async fn test_add_menu_item() {
        let backend = backend();
        backend.add_menu_item(dish("Sorbetto")).await.expect("Should add");

        let menu = backend.fetch_menu().await;
        assert_eq!(menu.len(), 9);
        assert_eq!(menu.last().unwrap().name, "Sorbetto");
    }

    #[tokio::test]
    async fn test_add_duplicate_menu_item_rejected() {
        let backend = backend();
        let result = backend.add_menu_item(dish("Tiramisu")).await;
        assert_eq!(result, Err(StoreError::DuplicateMenuItem("Tiramisu".to_string())));
        assert_eq!(backend.fetch_menu().await.len(), 8);
    }

    #[tokio::test]
    async fn test_update_menu_item_by_name() {
        let backend = backend();
        let mut updated = dish("Tiramisu");
        updated.price = "$11".to_string();

        backend.update_menu_item(updated).await.expect("Should update");

        let menu = backend.fetch_menu().await;
        let tiramisu = menu.iter().find(|i| i.name == "Tiramisu").unwrap();
        assert_eq!(tiramisu.price, "$11");
        assert_eq!(menu.len(), 8);
    }

    #[tokio::test]
    async fn test_update_unknown_menu_item_fails() {
        let result = backend().update_menu_item(dish("Gelato")).await;
        assert_eq!(result, Err(StoreError::MenuItemNotFound("Gelato".to_string())));
    }

    #[tokio::test]
    async fn test_delete_menu_item() {
        let backend = backend();
        backend.delete_menu_item("Calamari Fritti").await;
        backend.delete_menu_item("Not On The Menu").await;

        let menu = backend.fetch_menu().await;
        assert_eq!(menu.len(), 7);
        assert!(menu.iter().all(|i| i.name != "Calamari Fritti"));
    }

    #[tokio::test]
    async fn test_menu_provider_reflects_current_menu() {
        let backend = backend();
        backend.delete_menu_item("Tiramisu").await;
        let items = backend.menu_items().await.unwrap();
        assert_eq!(items.len(), 7);
    }

    // ==================== Testimonial Tests ====================

    #[tokio::test]
    async fn test_fetch_testimonials() {
        let testimonials = backend().fetch_testimonials().await;
        assert_eq!(testimonials.len(), 3);
        assert!(testimonials.iter().all(|t| t.rating == 5));
    }

    // ==================== Reservation Tests ====================

    #[tokio::test]
    async fn test_submit_reservation_success() {
        let backend = backend();
        let outcome = backend.submit_reservation(request("Ana Popescu")).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, RESERVATION_SENT_MESSAGE);

        let reservations = backend.fetch_reservations().await;
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].status, ReservationStatus::Pending);
        assert_eq!(reservations[0].details.name, "Ana Popescu");
    }

    #[tokio::test]
    async fn test_submit_reservation_simulated_failure() {
        let backend = backend();
        let outcome = backend.submit_reservation(request("Please FAIL me")).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.message, RESERVATION_FAILED_MESSAGE);
        assert!(backend.fetch_reservations().await.is_empty());
    }

    #[tokio::test]
    async fn test_reservation_ids_are_unique() {
        let backend = backend();
        for name in ["A", "B", "C"] {
            backend.submit_reservation(request(name)).await.unwrap();
        }
        let reservations = backend.fetch_reservations().await;
        assert!(reservations[0].id < reservations[1].id);
        assert!(reservations[1].id < reservations[2].id);
    }

    #[tokio::test]
    async fn test_update_reservation_status() {
        let backend = backend();
        backend.submit_reservation(request("Ana")).await.unwrap();
        let id = backend.fetch_reservations().await[0].id;

        let updated = backend
            .update_reservation_status(id, ReservationStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Confirmed);
        assert_eq!(
            backend.fetch_reservations().await[0].status,
            ReservationStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_update_unknown_reservation_fails() {
        let result = backend()
            .update_reservation_status(42, ReservationStatus::Cancelled)
            .await;
        assert_eq!(result, Err(StoreError::ReservationNotFound(42)));
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_accepts_well_formed_request() {
        assert!(request("Ana").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut blank = request("   ");
        assert!(blank.validate().is_err());
        blank.name = "Ana".to_string();

        let mut email = blank.clone();
        email.email = "not-an-email".to_string();
        assert!(email.validate().is_err());

        let mut date = blank.clone();
        date.date = "14/06/2025".to_string();
        assert!(date.validate().is_err());

        let mut time = blank.clone();
        time.time = "7pm".to_string();
        assert!(time.validate().is_err());
    }

    #[test]
    fn test_validate_guest_bounds() {
        let mut req = request("Ana");
        for (guests, ok) in [(0, false), (1, true), (12, true), (13, false)] {
            req.guests = guests;
            assert_eq!(req.validate().is_ok(), ok, "guests = {}", guests);
        }
    }

    #[tokio::test]
    async fn test_invalid_reservation_is_not_stored() {
        let backend = backend();
        let mut req = request("Ana");
        req.guests = 0;

        let result = backend.submit_reservation(req).await;
        assert!(matches!(result, Err(StoreError::InvalidReservation(_))));
        assert!(backend.fetch_reservations().await.is_empty());
    }

    #[test]
    fn test_reservation_serializes_flat() {
        let reservation = Reservation {
            id: 7,
            status: ReservationStatus::Pending,
            details: request("Ana"),
        };
        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["guests"], 2);
    }
}
