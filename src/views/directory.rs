use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::models::bookings::{Booking, BookingDetail, UserAggregate};
use crate::models::profiles::UserProfile;
use crate::repositories::{BookingStore, ProfileStore};
use crate::services::ServiceError;

/// Folds the full booking list into per-user aggregates. A booking without an
/// amount contributes 0 to the total.
pub fn aggregate_bookings(bookings: &[Booking]) -> HashMap<String, UserAggregate> {
    let mut aggregates: HashMap<String, UserAggregate> = HashMap::new();
    for booking in bookings {
        let entry = aggregates.entry(booking.user_id.clone()).or_default();
        entry.booking_count += 1;
        entry.total_spent += booking.total_amount.unwrap_or(0.0);
    }
    aggregates
}

/// Case-insensitive substring filter on username or full name. A blank term
/// keeps everything, in the original order.
pub fn filter_profiles<'a>(profiles: &'a [UserProfile], term: &str) -> Vec<&'a UserProfile> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return profiles.iter().collect();
    }

    profiles
        .iter()
        .filter(|profile| {
            profile.username.to_lowercase().contains(&term)
                || profile.full_name.to_lowercase().contains(&term)
        })
        .collect()
}

/// Booking row as it appears in the modal, with the amount pre-formatted for
/// display.
#[derive(Clone, Debug, Serialize)]
pub struct BookingEntry {
    #[serde(flatten)]
    pub booking: BookingDetail,
    pub display_amount: String,
}

/// At most one modal is open at a time, so the modal is a single union rather
/// than per-modal visibility flags.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectoryModal {
    None,
    Details {
        profile: UserProfile,
        aggregate: UserAggregate,
    },
    Bookings {
        profile: UserProfile,
        bookings: Vec<BookingEntry>,
    },
}

#[derive(Serialize)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub booking_count: u64,
    pub total_spent: f64,
}

#[derive(Serialize)]
pub struct DirectorySnapshot {
    pub users: Vec<DirectoryEntry>,
    pub total: usize,
    pub modal: DirectoryModal,
}

/// The admin user-management page: all profiles with their booking aggregates,
/// a search box, and a details/bookings modal.
pub struct DirectoryView {
    profiles: Vec<UserProfile>,
    aggregates: HashMap<String, UserAggregate>,
    search: String,
    modal: DirectoryModal,
    generation: u64,
    profile_store: Arc<dyn ProfileStore>,
    booking_store: Arc<dyn BookingStore>,
}

impl DirectoryView {
    pub fn new(profile_store: Arc<dyn ProfileStore>, booking_store: Arc<dyn BookingStore>) -> Self {
        Self {
            profiles: Vec::new(),
            aggregates: HashMap::new(),
            search: String::new(),
            modal: DirectoryModal::None,
            generation: 0,
            profile_store,
            booking_store,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Fetches all profiles and all bookings concurrently and recomputes the
    /// aggregates. Fetch failures are logged and degrade to an empty list.
    pub async fn load(&mut self) {
        let (profiles, bookings) = tokio::join!(
            self.profile_store.get_all(),
            self.booking_store.get_all()
        );

        self.profiles = match profiles {
            Ok(profiles) => profiles,
            Err(e) => {
                log::error!("Error loading users: {e}");
                Vec::new()
            }
        };

        let bookings = match bookings {
            Ok(bookings) => bookings,
            Err(e) => {
                log::error!("Error loading bookings: {e}");
                Vec::new()
            }
        };
        self.aggregates = aggregate_bookings(&bookings);
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn visible(&self) -> Vec<&UserProfile> {
        filter_profiles(&self.profiles, &self.search)
    }

    pub fn aggregate_for(&self, user_id: &str) -> UserAggregate {
        self.aggregates.get(user_id).copied().unwrap_or_default()
    }

    pub fn modal(&self) -> &DirectoryModal {
        &self.modal
    }

    /// Opens the detail modal for an already-loaded profile. Pure display, no
    /// further fetches.
    pub fn open_details(&mut self, user_id: &str) -> Result<(), ServiceError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| ServiceError::Validation("Unknown user".to_string()))?;

        let aggregate = self.aggregate_for(user_id);
        self.modal = DirectoryModal::Details { profile, aggregate };
        Ok(())
    }

    /// Opens the bookings modal, fetching that one user's bookings on demand.
    /// A failed fetch shows an empty list.
    pub async fn open_bookings(&mut self, user_id: &str) -> Result<(), ServiceError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| ServiceError::Validation("Unknown user".to_string()))?;

        let bookings = match self.booking_store.get_user_bookings(user_id).await {
            Ok(bookings) => bookings,
            Err(e) => {
                log::error!("Error loading user bookings: {e}");
                Vec::new()
            }
        };

        let bookings = bookings
            .into_iter()
            .map(|booking| BookingEntry {
                display_amount: booking.display_amount(),
                booking,
            })
            .collect();
        self.modal = DirectoryModal::Bookings { profile, bookings };
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = DirectoryModal::None;
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        let users: Vec<DirectoryEntry> = self
            .visible()
            .into_iter()
            .map(|profile| {
                let aggregate = self.aggregate_for(&profile.user_id);
                DirectoryEntry {
                    profile: profile.clone(),
                    booking_count: aggregate.booking_count,
                    total_spent: aggregate.total_spent,
                }
            })
            .collect();

        DirectorySnapshot {
            total: users.len(),
            users,
            modal: self.modal.clone(),
        }
    }
}
