use reviewer_appointment::config::Config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = reviewer_appointment::run(config).await {
        log::error!("[server] {}", e);
        std::process::exit(1);
    }
}
