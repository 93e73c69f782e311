use std::sync::Arc;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use mongodb::Client;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

use planner_data::repositories::{MongoAccountRepository, MongoStudyPlanRepository};
use planner_domain::{
    AccountService, AccountServiceImpl, JwtTokenService, Pbkdf2HashingService,
    StudyPlanServiceImpl, TokenConfig,
};
use study_planner::config::AppConfig;
use study_planner::plan_generator::OpenAiPlanGenerator;
use study_planner::proto_stub::study_planner::protobuf::account_grpc_service_server::AccountGrpcServiceServer;
use study_planner::proto_stub::study_planner::protobuf::study_plan_grpc_service_server::StudyPlanGrpcServiceServer;
use study_planner::service::{AccountGrpcServiceImpl, StudyPlanGrpcServiceImpl};

const USERS_COLLECTION: &str = "users";
const STUDY_PLANS_COLLECTION: &str = "study_plans";
const SALT_LENGTH: usize = 16;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let client = Client::with_uri_str(&config.mongo_uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let db = Arc::new(RwLock::new(client.database(&config.mongo_db_name)));

    let account_repository = Arc::new(MongoAccountRepository::new(
        db.clone(),
        USERS_COLLECTION.to_string(),
    ));
    account_repository
        .ensure_indexes()
        .await
        .context("Failed to create account indexes")?;

    let plan_repository = Arc::new(MongoStudyPlanRepository::new(
        db,
        STUDY_PLANS_COLLECTION.to_string(),
    ));
    plan_repository
        .ensure_indexes()
        .await
        .context("Failed to create study plan indexes")?;

    let token_service = Arc::new(JwtTokenService::new(TokenConfig::new(
        config.jwt.secret.clone(),
        config.jwt.audience.clone(),
        config.jwt.issuer.clone(),
        Algorithm::HS256,
    )));
    let hashing_service = Arc::new(Pbkdf2HashingService::new(
        config.password.hash_iterations,
        SALT_LENGTH,
        config.password.max_length,
    ));

    let account_service: Arc<dyn AccountService> = Arc::new(AccountServiceImpl::new(
        account_repository,
        token_service,
        hashing_service,
    ));

    let plan_generator = Arc::new(
        OpenAiPlanGenerator::new(config.plan_api.clone())
            .context("Failed to build plan API client")?,
    );
    let plan_service = Arc::new(StudyPlanServiceImpl::new(
        account_service.clone(),
        plan_repository,
        plan_generator,
    ));

    info!(addr = %config.listen_addr, db = %config.mongo_db_name, "Starting study planner gRPC server");

    Server::builder()
        .add_service(AccountGrpcServiceServer::new(AccountGrpcServiceImpl::new(
            account_service,
        )))
        .add_service(StudyPlanGrpcServiceServer::new(StudyPlanGrpcServiceImpl::new(
            plan_service,
        )))
        .serve_with_shutdown(config.listen_addr, shutdown_signal())
        .await
        .context("gRPC server failed")?;

    Ok(())
}
