fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        // serde derives so request/response payloads can be logged as JSON
        .type_attribute(".bookstore", "#[derive(serde::Serialize, serde::Deserialize)]")
        .compile_protos(&["proto/bookstore.proto"], &["proto"])?;
    Ok(())
}
