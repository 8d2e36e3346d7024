use clap::Parser;

/// Loyalty points gateway server.
///
/// Every flag can also be set through the environment variable named next to it. Flags win over the environment.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Arguments {
    /// Address to listen on, as host:port
    #[arg(short = 'a', long = "address", env = "RUN_ADDRESS", default_value = "localhost:8080")]
    pub run_address: String,
    /// SQLite database URL
    #[arg(short = 'd', long = "database", env = "DATABASE_URI", default_value = "sqlite://data/loyalty.db")]
    pub database_uri: String,
    /// Base URL of the accrual authority
    #[arg(short = 'r', long = "accrual", env = "ACCRUAL_SYSTEM_ADDRESS", default_value = "http://localhost:8081")]
    pub accrual_address: String,
    /// Log level. RUST_LOG takes precedence if it is set
    #[arg(short = 'l', long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
