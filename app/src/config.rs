use greenhouse_core::DEFAULT_MAX_SOIL_TEMPERATURE;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    database_url: Option<String>,
    server_port: u16,
    db_max_connections: u32,
    max_soil_temperature: i32,
    request_timeout_ms: u64,
}

impl Config {
    pub fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn max_soil_temperature(&self) -> i32 {
        self.max_soil_temperature
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid number, got {:?}", key, value)),
        Err(_) => default,
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());
    let server_port = env_or("SERVER_PORT", 8080);
    let db_max_connections = env_or("DB_MAX_CONNECTIONS", 5);
    let max_soil_temperature = env_or("MAX_SOIL_TEMPERATURE", DEFAULT_MAX_SOIL_TEMPERATURE);
    let request_timeout_ms = env_or("REQUEST_TIMEOUT_MS", 5000);

    if db_max_connections == 0 {
        panic!("DB_MAX_CONNECTIONS must be at least 1");
    }

    Config {
        database_url,
        server_port,
        db_max_connections,
        max_soil_temperature,
        request_timeout_ms,
    }
});

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_env_default() {
        assert_eq!(42, env_or("GREENHOUSE_TEST_UNSET_VALUE", 42));
    }

    #[test]
    fn test_env_parsed() {
        env::set_var("GREENHOUSE_TEST_TIMEOUT", " 250 ");
        assert_eq!(250u64, env_or("GREENHOUSE_TEST_TIMEOUT", 5000u64));
    }

    #[test]
    #[should_panic]
    fn test_env_invalid() {
        env::set_var("GREENHOUSE_TEST_PORT", "eighty");
        let _: u16 = env_or("GREENHOUSE_TEST_PORT", 8080);
    }
}
