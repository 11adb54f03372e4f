use std::env;
use std::thread;
use switchyard::application::config::{Config, ConfigLoader};
use switchyard::application::handler::health_handler::HEALTH_PATH;
use switchyard::application::handler::{ErrorPageHandler, HealthHandler};
use switchyard::application::server::Server;
use switchyard::common::logger;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [config_file]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(1) {
        Some(path) => match ConfigLoader::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing config file: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    logger::init(&config.log_level);

    let mut server = Server::new();
    let registered = server
        .route(HEALTH_PATH, "GET", HealthHandler::handler())
        .and_then(|()| server.not_found(ErrorPageHandler::handler()));
    if let Err(e) = registered {
        eprintln!("Error registering routes: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.start_with(&config) {
        eprintln!("Error starting server: {}", e);
        std::process::exit(1);
    }

    println!(
        "Listening on http://{}",
        server.local_addr().map(|a| a.to_string()).unwrap_or_default()
    );

    // Serve until the process is killed
    loop {
        thread::park();
    }
}
