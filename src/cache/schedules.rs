use crate::cache::CacheService;
use crate::models::Session;
use crate::services::backend::BackendError;

fn dates_key(bus_id: &str) -> String {
    format!("schedule_dates:{}", bus_id)
}

impl CacheService {
    /// Даты отправления автобуса в том виде, как их прислал бэкенд.
    pub async fn get_schedule_dates(&self, session: &Session, bus_id: &str) -> Result<Vec<String>, BackendError> {
        let key = dates_key(bus_id);
        if let Some(dates) = self.read_json::<Vec<String>>(&key).await {
            return Ok(dates);
        }

        let dates: Vec<String> = self
            .backend
            .fetch_schedules(session, bus_id)
            .await?
            .into_iter()
            .filter(|s| s.bus_id.as_deref().map_or(true, |id| id == bus_id))
            .filter_map(|s| s.departure_date)
            .collect();

        self.write_json(&key, &dates, self.ttl.schedule_ttl_seconds).await;
        Ok(dates)
    }
}
