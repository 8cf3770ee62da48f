use std::sync::Arc;
use crate::domain::ports::{
    UserRepository, ExperienceRepository, SlotRepository, BookingRepository,
};
use crate::domain::services::session_service::SessionService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub experience_repo: Arc<dyn ExperienceRepository>,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub sessions: Arc<SessionService>,
}
