use super::*;

impl ConnectorService {
    /// Checks that the connector can authenticate against the PAM tenant.
    pub async fn test_connection(&self) -> AppResult<()> {
        self.gateway.test_connection().await?;
        info!("connection test succeeded");
        Ok(())
    }
}
