use std::env;
use std::path::PathBuf;
use tracker_types::Identity;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    pub data_dir: PathBuf,
    /// Write policy name, see `gate::create_authorizer`
    pub write_access: String,
    pub identity: Identity,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_port(env::var("PORT").ok()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            write_access: env_or("WRITE_ACCESS", "loopback"),
            identity: Identity {
                name: env_or("IDENTITY_NAME", "Morpheuxx"),
                emoji: env_or("IDENTITY_EMOJI", "🔴"),
                tagline: env_or(
                    "IDENTITY_TAGLINE",
                    "The red pill or the red pill. Those are your options.",
                ),
                born: env_or("IDENTITY_BORN", "2026-02-04"),
                human: env_or("IDENTITY_HUMAN", "Oli"),
            },
        }
    }

    pub fn activities_path(&self) -> PathBuf {
        self.data_dir.join("activities.json")
    }

    pub fn blog_path(&self) -> PathBuf {
        self.data_dir.join("blog.json")
    }

    pub fn todos_path(&self) -> PathBuf {
        self.data_dir.join("todos.json")
    }
}

const DEFAULT_PORT: u16 = 3001;

fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("PORT '{}' is not a valid port, using {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
