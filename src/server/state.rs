use crate::location::LocationResolver;
use crate::risk::RiskOrchestrator;
use std::sync::Mutex;

pub struct AppState {
    pub orchestrator: Mutex<RiskOrchestrator>,
    pub resolver: Mutex<LocationResolver>,
}
