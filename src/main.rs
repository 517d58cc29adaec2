#[tokio::main]
async fn main() -> std::io::Result<()> {
    broadside_server::frameworks::server::run_with_config().await
}
