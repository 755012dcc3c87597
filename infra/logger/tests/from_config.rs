use mkp_domain::config::LoggingConfig;
use mkp_logger::Logger;
use std::time::Duration;

#[test]
fn from_config_writes_json_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let log_dir = tmp_dir.path().join("logs");
    let config = LoggingConfig {
        name: "integration-from-config".to_owned(),
        level: "debug".to_owned(),
        console: false,
        json: true,
        directory: Some(log_dir.clone()),
        env_filter: None,
    };

    let logger = Logger::from_config(&config)?;
    assert!(logger.guard().is_some());

    tracing::info!(step = 3, "structured record");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = std::fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = std::fs::read_to_string(log_file)?;
    assert!(contents.contains("\"step\":3"), "json record should carry structured fields");
    Ok(())
}
