mod app;
mod cli;
mod context;
mod prober;
mod release;
mod resolver;
mod rest;
mod storage;
mod tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
