// Application state for HTTP handlers
use crate::application::insights_service::InsightsService;

#[derive(Clone)]
pub struct AppState {
    pub insights_service: InsightsService,
}
