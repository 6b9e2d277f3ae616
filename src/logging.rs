use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PLAN_GATEWAY_LOG";

pub fn init_tracing(component: &str) {
    let default_filter = format!("info,plan_gateway=debug,{component}=debug");

    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init();
}
