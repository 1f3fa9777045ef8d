use pickup_schedule::{api_server, env_manager};

#[tokio::main]
async fn main() {
    if let Err(e) = env_manager::load_env_file() {
        eprintln!("Could not prepare .env file: {}", e);
    }
    pickup_schedule::init_logger();

    println!("[SERVER] Starting server...");

    let config = match pickup_schedule::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = api_server::start_api_server(config).await {
        eprintln!("Error starting server: {:#}", e);
        std::process::exit(1);
    }
}
