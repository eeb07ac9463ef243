//! backend.rs
//!
//! Клиент REST-бэкенда, который хранит автобусы, расписания, брони,
//! заморозки и отмены.
//!
//! Ключевые компоненты:
//! 1.  **CircuitBreaker**: "Автоматический выключатель". После серии сбоев
//!     перестаёт пускать запросы к бэкенду, пока не истечёт таймаут.
//! 2.  **BackendClient**: HTTP-клиент поверх `reqwest`. Токен сессии
//!     пробрасывается в каждый запрос, все вызовы идут через `CircuitBreaker`.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::{BackendConfig, CircuitBreakerConfig};
use crate::models::{Booking, Bus, Cancellation, FrozenSeat, GuestBooking, Schedule, Session, TripRecords};

/// Состояния "Автоматического выключателя".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Нормальный режим, запросы разрешены.
    Closed,
    /// Запросы заблокированы после серии сбоев.
    Open,
    /// Таймаут истёк, пропускаем пробный запрос.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    /// Счетчик последовательных сбоев.
    failure_count: AtomicU32,
    /// Момент, когда выключатель разомкнулся.
    opened_at: Mutex<Option<Instant>>,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            opened_at: Mutex::new(None),
            failure_threshold: failure_threshold.max(1),
            timeout_duration: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(config.failure_threshold, config.timeout_seconds)
    }

    /// Проверяет, можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let opened_at = *self.opened_at.lock().unwrap_or_else(|e| e.into_inner());
                let expired = opened_at.map_or(true, |at| at.elapsed() >= self.timeout_duration);
                if expired {
                    *state = CircuitState::HalfOpen;
                    info!("Circuit breaker transitioning to HalfOpen state");
                }
                expired
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::HalfOpen => {
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
                info!("Circuit breaker recovered - transitioning to Closed state");
            }
            CircuitState::Closed => self.failure_count.store(0, Ordering::Relaxed),
            // запоздавший ответ, начатый до размыкания
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let open = match *state {
            CircuitState::Closed if failure_count >= self.failure_threshold => {
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    failure_count, self.failure_threshold
                );
                true
            }
            CircuitState::HalfOpen => {
                warn!("Circuit breaker test failed - returning to Open state");
                true
            }
            _ => false,
        };

        if open {
            *state = CircuitState::Open;
            *self.opened_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
        }
    }

    pub fn get_state(&self) -> CircuitState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("circuit breaker is open - backend temporarily unavailable")]
    CircuitOpen,
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status} for {path}")]
    Status { status: reqwest::StatusCode, path: String },
    #[error("backend resource not found: {path}")]
    NotFound { path: String },
}

impl BackendError {
    /// Сбой самого бэкенда, а не ответ на некорректный запрос.
    fn is_outage(&self) -> bool {
        match self {
            BackendError::Http(_) => true,
            BackendError::Status { status, .. } => status.is_server_error(),
            BackendError::CircuitOpen | BackendError::NotFound { .. } => false,
        }
    }
}

/// Коллекции приходят либо голым массивом, либо в обёртке `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Item<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Item<T> {
    fn into_inner(self) -> T {
        match self {
            Item::Wrapped { data } | Item::Bare(data) => data,
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl BackendClient {
    pub fn from_config(
        config: &BackendConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()?,
            circuit_breaker: Arc::new(CircuitBreaker::from_config(breaker)),
        })
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state()
    }

    /// GET через Circuit Breaker. 404 и 4xx не считаются сбоем бэкенда.
    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking backend request to {}", path);
            return Err(BackendError::CircuitOpen);
        }

        let result = async {
            let response = self
                .http_client
                .get(format!("{}{}", self.base_url, path))
                .query(query)
                .bearer_auth(&session.token)
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(BackendError::NotFound { path: path.to_string() });
            }
            if !status.is_success() {
                return Err(BackendError::Status { status, path: path.to_string() });
            }
            Ok(response.json::<T>().await?)
        }
        .await;

        match &result {
            Err(e) if e.is_outage() => {
                error!("Backend request {} failed: {}", path, e);
                self.circuit_breaker.record_failure();
            }
            _ => self.circuit_breaker.record_success(),
        }
        result
    }

    pub async fn fetch_bus(&self, session: &Session, bus_id: &str) -> Result<Bus, BackendError> {
        let bus: Item<Bus> = self.get_json(session, &format!("/buses/{}", bus_id), &[]).await?;
        Ok(bus.into_inner())
    }

    pub async fn fetch_schedules(&self, session: &Session, bus_id: &str) -> Result<Vec<Schedule>, BackendError> {
        let listing: Listing<Schedule> = self
            .get_json(session, "/schedules", &[("bus_id", bus_id.to_string())])
            .await?;
        Ok(listing.into_vec())
    }

    async fn fetch_trip_collection<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        bus_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<T>, BackendError> {
        let query = [
            ("bus_id", bus_id.to_string()),
            ("departure_date", date.format("%Y-%m-%d").to_string()),
        ];
        let listing: Listing<T> = self.get_json(session, path, &query).await?;
        Ok(listing.into_vec())
    }

    /// Четыре коллекции рейса забираются параллельно.
    pub async fn fetch_trip_records(
        &self,
        session: &Session,
        bus_id: &str,
        date: NaiveDate,
    ) -> Result<TripRecords, BackendError> {
        let (bookings, guest_bookings, frozen_seats, cancellations) = futures::try_join!(
            self.fetch_trip_collection::<Booking>(session, "/bookings", bus_id, date),
            self.fetch_trip_collection::<GuestBooking>(session, "/guest-bookings", bus_id, date),
            self.fetch_trip_collection::<FrozenSeat>(session, "/frozen-seats", bus_id, date),
            self.fetch_trip_collection::<Cancellation>(session, "/cancellations", bus_id, date),
        )?;

        info!(
            "Fetched trip {} on {}: {} bookings, {} guest bookings, {} frozen, {} cancellations",
            bus_id,
            date,
            bookings.len(),
            guest_bookings.len(),
            frozen_seats.len(),
            cancellations.len()
        );

        Ok(TripRecords {
            bookings,
            guest_bookings,
            frozen_seats,
            cancellations,
        })
    }
}
