//! Widget API Lambda entry point
//!
//! Serves the widget endpoints behind API Gateway:
//! - `/api/widget/session` - mint (POST) and describe (GET) widget sessions
//! - `/api/chat/customer` - customer identity behind a session
//! - `/api/mailboxes/{slug}/webhook` - HMAC-signed server-to-server callbacks

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;
use tracing_subscriber::EnvFilter;
use widget_gate_handler::AppState;
use widget_gate_handler::config::HandlerConfig;
use widget_gate_handler::handle_api_gateway_event;
use widget_gate_handler::store::{DynamoMailboxStore, MailboxStore};

async fn function_handler<S: MailboxStore>(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    state: &AppState<S>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let request_id = event.context.request_id.clone();
    let response = handle_api_gateway_event(state, &event.payload).await;

    info!(
        "{} {} -> {} ({})",
        event.payload.http_method,
        event.payload.path.as_deref().unwrap_or("/"),
        response.status_code,
        request_id
    );

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch adds its own timestamps
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    info!("Widget API handler starting");

    let config = HandlerConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let aws_config = aws_config::load_from_env().await;
    let dynamodb = DynamoDbClient::new(&aws_config);
    let store = DynamoMailboxStore::new(dynamodb, config.mailboxes_table.clone());

    let state = AppState::new(config, store);

    run(service_fn(|event: LambdaEvent<ApiGatewayProxyRequest>| {
        function_handler(event, &state)
    }))
    .await
}
