use std::sync::Arc;

use crate::{
    auth::{decode_secret_key, AuthConfig, AuthManager},
    config::Config,
};
use finbot_ai::{
    ChatCompletionClient, ChatConfig, ChatService, OpenRouterClient, TitleGenerator,
    TitleGeneratorConfig,
};
use finbot_core::{
    budgets::{BudgetService, BudgetServiceTrait},
    goals::{GoalService, GoalServiceTrait},
    insights::{FinancialContextBuilder, FinancialContextServiceTrait},
    portfolio::{PortfolioService, PortfolioServiceTrait},
    rate_limit::RateLimiter,
    transactions::{TransactionService, TransactionServiceTrait},
    users::UserRepositoryTrait,
};
use finbot_storage_sqlite::{
    db, BudgetRepository, ConversationRepository, DbPool, GoalRepository, PortfolioRepository,
    TransactionRepository, UserRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub pool: Arc<DbPool>,
    pub user_repository: Arc<dyn UserRepositoryTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub financial_context: Arc<dyn FinancialContextServiceTrait>,
    pub chat_service: Arc<ChatService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub auth: Arc<AuthManager>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let client: Arc<dyn ChatCompletionClient> = Arc::new(OpenRouterClient::new(
        config.openrouter_api_key.clone(),
        config.openrouter_model.clone(),
    ));
    build_state_with_client(config, client).await
}

/// Builds the state with a caller-supplied completion client.
pub async fn build_state_with_client(
    config: &Config,
    client: Arc<dyn ChatCompletionClient>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let jwt_secret = decode_secret_key(&config.jwt_secret)?;
    let auth = Arc::new(AuthManager::new(&AuthConfig {
        jwt_secret,
        access_token_ttl: config.access_token_ttl,
    }));

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let transaction_repository =
        Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let budget_repository = Arc::new(BudgetRepository::new(pool.clone(), writer.clone()));
    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let conversation_repository =
        Arc::new(ConversationRepository::new(pool.clone(), writer.clone()));

    let transaction_service = Arc::new(TransactionService::new(transaction_repository.clone()));
    let budget_service = Arc::new(BudgetService::new(
        budget_repository.clone(),
        transaction_repository.clone(),
    ));
    let goal_service = Arc::new(GoalService::new(goal_repository.clone()));
    let portfolio_service = Arc::new(PortfolioService::new(portfolio_repository.clone()));
    let financial_context: Arc<dyn FinancialContextServiceTrait> =
        Arc::new(FinancialContextBuilder::new(
            transaction_repository,
            budget_repository,
            goal_repository,
            portfolio_repository,
        ));

    if config.openrouter_api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; chat requests will fail");
    }
    let titles = Arc::new(TitleGenerator::new(
        client.clone(),
        TitleGeneratorConfig::default(),
    ));
    let chat_service = Arc::new(ChatService::new(
        conversation_repository,
        client,
        titles,
        financial_context.clone(),
        ChatConfig::default(),
    ));

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));

    Ok(Arc::new(AppState {
        pool,
        user_repository,
        transaction_service,
        budget_service,
        goal_service,
        portfolio_service,
        financial_context,
        chat_service,
        rate_limiter,
        auth,
    }))
}
