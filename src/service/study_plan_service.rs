use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::mapper::IntoStatus;
use crate::proto_stub::study_planner::protobuf::study_plan_grpc_service_server::StudyPlanGrpcService;
use crate::proto_stub::study_planner::protobuf::{
    GeneratePlanRequest, GeneratePlanResponse, GetPlansRequest, GetPlansResponse,
    StudyPlanMessage,
};
use planner_domain::plan_service::StudyPlanService;

pub struct StudyPlanGrpcServiceImpl {
    plan_service: Arc<dyn StudyPlanService>,
}

impl StudyPlanGrpcServiceImpl {
    pub fn new(plan_service: Arc<dyn StudyPlanService>) -> Self {
        Self { plan_service }
    }
}

#[tonic::async_trait]
impl StudyPlanGrpcService for StudyPlanGrpcServiceImpl {
    async fn generate_plan(
        &self,
        request: Request<GeneratePlanRequest>,
    ) -> Result<Response<GeneratePlanResponse>, Status> {
        let req = request.into_inner();

        if req.session_token.is_empty() || req.user_id.is_empty() || req.subject.is_empty() {
            return Err(Status::invalid_argument(
                "Session token, user id and subject are required",
            ));
        }

        let plan = self
            .plan_service
            .generate_plan(&req.session_token, &req.user_id, &req.subject)
            .await
            .map_err(IntoStatus::into_status)?;

        Ok(Response::new(GeneratePlanResponse {
            plan: Some(plan.into()),
        }))
    }

    async fn get_plans(
        &self,
        request: Request<GetPlansRequest>,
    ) -> Result<Response<GetPlansResponse>, Status> {
        let req = request.into_inner();

        if req.session_token.is_empty() || req.user_id.is_empty() {
            return Err(Status::invalid_argument("Session token and user id are required"));
        }

        let plans = self
            .plan_service
            .get_plans(&req.session_token, &req.user_id)
            .await
            .map_err(IntoStatus::into_status)?;

        Ok(Response::new(GetPlansResponse {
            plans: plans.into_iter().map(StudyPlanMessage::from).collect(),
        }))
    }
}
