use processor::runtime::{boot, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let (registry, config) = boot::boot()?;
    serve::serve(registry, config).await
}
