use clap::Parser;
use labelled_upload::{server, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    server::run(Config::parse()).await
}
