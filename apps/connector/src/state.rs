use pamsync_application::ConnectorService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub connector_service: ConnectorService,
}
