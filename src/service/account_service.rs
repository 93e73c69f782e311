use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::mapper::IntoStatus;
use crate::proto_stub::study_planner::protobuf::account_grpc_service_server::AccountGrpcService;
use crate::proto_stub::study_planner::protobuf::{
    AuthenticateRequest, AuthenticateResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use planner_domain::service::AccountService;

pub struct AccountGrpcServiceImpl {
    account_service: Arc<dyn AccountService>,
}

impl AccountGrpcServiceImpl {
    pub fn new(account_service: Arc<dyn AccountService>) -> Self {
        Self { account_service }
    }
}

#[tonic::async_trait]
impl AccountGrpcService for AccountGrpcServiceImpl {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();

        if req.username.is_empty() || req.password.is_empty() {
            return Err(Status::invalid_argument("Username and password are required"));
        }

        self.account_service
            .register(&req.username, &req.password)
            .await
            .map_err(IntoStatus::into_status)?;

        Ok(Response::new(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
        }))
    }

    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();

        // Empty credentials are just wrong credentials.
        let session_token = self
            .account_service
            .login(&req.username, &req.password)
            .await
            .map_err(IntoStatus::into_status)?;

        Ok(Response::new(LoginResponse { session_token }))
    }

    async fn authenticate(
        &self,
        request: Request<AuthenticateRequest>,
    ) -> Result<Response<AuthenticateResponse>, Status> {
        let req = request.into_inner();

        if req.session_token.is_empty() {
            return Err(Status::invalid_argument("Session token is required"));
        }

        let username = self
            .account_service
            .authenticate(&req.session_token)
            .map_err(IntoStatus::into_status)?;

        Ok(Response::new(AuthenticateResponse { username }))
    }
}
