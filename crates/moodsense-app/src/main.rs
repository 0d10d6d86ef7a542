#![warn(missing_docs)]
//! # moodsense-app binary
//!
//! CLI entry point printing the resolved runtime configuration.

/// CLI entry point.
fn main() {
    env_logger::init();

    let api_base = moodsense_app::api_base_from_env();

    println!("moodsense-app {}", moodsense_app::app_version());
    println!("api_base={api_base} ({})", moodsense_app::API_BASE_ENV);
    println!(
        "auto_open={} ({})",
        moodsense_app::auto_open_from_env(),
        moodsense_app::AUTO_OPEN_ENV
    );

    match moodsense_app::detect_mood_endpoint(&api_base) {
        Ok(endpoint) => println!("detect_mood_endpoint={endpoint}"),
        Err(error) => {
            eprintln!("invalid configuration: {error}");
            std::process::exit(1);
        }
    }
}
