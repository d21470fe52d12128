use clap::Parser;
use coinduel::hosting::Config;
use coinduel::hosting::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coinduel::logging();
    Server::run(Config::parse()).await
}
