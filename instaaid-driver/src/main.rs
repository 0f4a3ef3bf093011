use instaaid_shared::utilities::config;
use instaaid_shared::state_machine::login_flow::Route;

mod flows;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    std::panic::set_hook(Box::new(|info| {
        log::error!("Application panicked: {}", info);
    }));

    config::init();

    let route = flows::login::run().await?;
    if route == Route::Dashboard {
        flows::rides::run().await?;
    }
    Ok(())
}
