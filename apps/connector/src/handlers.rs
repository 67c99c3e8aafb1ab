use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use pamsync_application::{ConnectorService, OutputSink};
use pamsync_core::{AppError, AppResult};
use pamsync_domain::{Account, Entitlement};
use serde::Serialize;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::dto::{AccountResponse, Command, CommandRequest, EntitlementResponse, HealthResponse};
use crate::error::ApiResult;
use crate::state::AppState;

const NDJSON: &str = "application/x-ndjson";

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn command_handler(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> ApiResult<Response> {
    let command = Command::try_from(request)?;
    let invocation_id = Uuid::new_v4();
    let span = info_span!("command", command = command.name(), %invocation_id);

    let body = run_command(&state.connector_service, command)
        .instrument(span)
        .await
        .inspect_err(|error| error!(%invocation_id, error = %error, "command failed"))?;

    Ok(([(CONTENT_TYPE, NDJSON)], body).into_response())
}

async fn run_command(service: &ConnectorService, command: Command) -> AppResult<Vec<u8>> {
    let mut sink = NdjsonSink::default();

    match command {
        Command::TestConnection => {
            service.test_connection().await?;
            sink.write(&serde_json::json!({}))?;
        }
        Command::ListAccounts => service.list_accounts(&mut sink).await?,
        Command::ReadAccount { identity } => {
            let account = service.read_account(identity.as_str()).await?;
            sink.write(&AccountResponse::from(account))?;
        }
        Command::CreateAccount(input) => {
            let account = service.create_account(input).await?;
            sink.write(&AccountResponse::from(account))?;
        }
        Command::UpdateAccount { identity, changes } => {
            let account = service
                .update_account(identity.as_str(), &changes)
                .await?;
            sink.write(&AccountResponse::from(account))?;
        }
        Command::ListEntitlements(entitlement_type) => {
            service
                .list_entitlements(entitlement_type, &mut sink)
                .await?;
        }
    }

    info!(entity_count = sink.count, "command completed");
    Ok(sink.body)
}

/// Buffers emitted entities as newline-delimited JSON.
#[derive(Debug, Default)]
struct NdjsonSink {
    body: Vec<u8>,
    count: usize,
}

impl NdjsonSink {
    fn write<T>(&mut self, item: &T) -> AppResult<()>
    where
        T: Serialize,
    {
        serde_json::to_writer(&mut self.body, item).map_err(|error| {
            AppError::Internal(format!("failed to encode command output: {error}"))
        })?;
        self.body.push(b'\n');
        self.count += 1;
        Ok(())
    }
}

#[async_trait]
impl OutputSink<Account> for NdjsonSink {
    async fn send(&mut self, item: Account) -> AppResult<()> {
        self.write(&AccountResponse::from(item))
    }
}

#[async_trait]
impl OutputSink<Entitlement> for NdjsonSink {
    async fn send(&mut self, item: Entitlement) -> AppResult<()> {
        self.write(&EntitlementResponse::from(item))
    }
}
