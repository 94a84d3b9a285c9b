// Application state for HTTP handlers
use crate::application::ingest_service::SharedTelegram;
use crate::application::readings_service::ReadingsService;

#[derive(Clone)]
pub struct AppState {
    pub readings_service: ReadingsService,
    pub last_telegram: SharedTelegram,
}
