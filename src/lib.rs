pub mod config;
pub mod mapper;
pub mod plan_generator;
pub mod service;

pub mod proto_stub {
    pub mod study_planner {
        pub mod protobuf {
            tonic::include_proto!("study_planner.protobuf");
        }
    }
}
