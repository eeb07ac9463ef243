use crate::cache::CacheService;
use crate::models::{Bus, Session};
use crate::services::backend::BackendError;

fn bus_key(bus_id: &str) -> String {
    format!("bus:{}", bus_id)
}

impl CacheService {
    // Получить автобус: сначала кеш, потом бэкенд
    pub async fn get_bus(&self, session: &Session, bus_id: &str) -> Result<Bus, BackendError> {
        let key = bus_key(bus_id);
        if let Some(bus) = self.read_json::<Bus>(&key).await {
            return Ok(bus);
        }

        let bus = self.backend.fetch_bus(session, bus_id).await?;
        self.write_json(&key, &bus, self.ttl.bus_ttl_seconds).await;
        Ok(bus)
    }
}
