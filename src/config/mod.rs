use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub fees: FeesConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Учетные данные администратора (единственный вход в панель)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub admin_user: String,
    pub admin_access_key: String,
}

// Настройки обслуживания абонентской платы
#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    pub overdue_sweep_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "library_system=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            auth: AuthConfig {
                admin_user: env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string()),
                admin_access_key: env::var("ADMIN_ACCESS_KEY").expect("ADMIN_ACCESS_KEY must be set"),
            },
            fees: FeesConfig {
                overdue_sweep_seconds: env::var("OVERDUE_SWEEP_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .expect("OVERDUE_SWEEP_SECONDS must be a valid number"),
            },
        }
    }
}
