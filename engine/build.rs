fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/pricing.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true) // Client stubs are handy for integration tests and tooling.
        .compile(&["proto/pricing.proto"], &["proto"])?;
    Ok(())
}
