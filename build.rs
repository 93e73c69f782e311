use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_protos(
            &["study_planner_protobuf_scheme/study_planner/protobuf/study_planner_service.proto"],
            &["study_planner_protobuf_scheme"],
        )?;

    Ok(())
}
