fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_prost_build::configure()
        .type_attribute(".", "#[derive(serde::Serialize)]")
        .build_server(true)
        .build_client(true)
        .out_dir("src/infrastructure/grpc/generated")
        .compile_protos(&["proto/transfer.proto"], &["proto"])?;
    Ok(())
}
