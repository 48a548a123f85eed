use taglog::transport::StdoutTransport;
use taglog::{Logger, LoggerConfig};

const CONFIG: &str = r#"{
    "tx_buffer_size": 128,
    "level": "INFO",
    "logs": { "sensor": "VERBOSE", "mqtt": "ERROR" }
}"#;

fn main() {
    let config: LoggerConfig = serde_json::from_str(CONFIG).unwrap();
    let mut logger = Logger::from_config(&config, Some(Box::new(StdoutTransport)));
    logger.add_on_log_callback(|severity, tag, message| {
        if severity <= taglog::Severity::Error {
            eprintln!("alert [{tag}]: {message}");
        }
    });
    taglog::global::install(Box::leak(Box::new(logger))).unwrap();
    taglog::global::with_logger(Logger::dump_config);

    for reading in [21.5, 22.25, 23.0] {
        taglog::verbose!("sensor", "temperature %.2f C", reading);
    }
    taglog::info!("app", "uptime %u s, heap %zu bytes", 42u32, 20480usize);
    taglog::debug!("app", "not shown at INFO");
    taglog::warn!("mqtt", "reconnecting");
    taglog::error!("mqtt", &taglog::flash_str!("broker %s refused: %d\n"), "10.0.0.2", -5);

    log::info!(target: "app", "facade message with {} args", 2);
    taglog::info!("app", "%s", "a message far longer than the render buffer can hold is cut short instead of being dropped, so the start of it still shows up");
}
