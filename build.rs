fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/chat.proto");

    tonic_build::configure()
        .type_attribute(".", "#[derive(serde::Serialize, serde::Deserialize)]")
        .compile_protos(&["proto/chat.proto"], &["."])
        .unwrap_or_else(|e| panic!("protobuf compile error: {}", e));

    Ok(())
}
