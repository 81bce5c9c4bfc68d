use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    movie_client::run().await
}
