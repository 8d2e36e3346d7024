use clap::Parser;
use dotenvy::dotenv;
use env_logger::Env;
use log::info;
use loyalty_server::{cli::Arguments, config::ServerConfig, server::run_server};

#[actix_web::main]
async fn main() {
    dotenv().ok();
    let args = Arguments::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();
    let config = ServerConfig::from_args(args);

    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
