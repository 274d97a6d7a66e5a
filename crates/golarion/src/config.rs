use anyhow::{Context, Result};
use chrono::NaiveTime;
use golarion_calendar::DEFAULT_YEAR_OFFSET;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::fs;
use std::path::Path;

use crate::commands::validate_year_offset;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscordConfig {
    pub token: String,
    #[serde(default)]
    pub admins: Vec<u64>,
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: "YOUR_DISCORD_BOT_TOKEN".to_string(),
            admins: vec![],
            admin_role: default_admin_role(),
        }
    }
}

fn default_admin_role() -> String {
    "Admin".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://golarion.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// 起動時の年オフセット。コマンドで変更した値は再起動すると戻る
    pub year_offset: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            year_offset: DEFAULT_YEAR_OFFSET,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 日次更新を投稿する現地時刻
    #[serde_as(as = "DisplayFromStr")]
    pub time: NaiveTime,
    pub job_id: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            time: NaiveTime::from_hms_opt(2, 0, 0).unwrap_or_default(),
            job_id: "daily_update".to_string(),
        }
    }
}

pub fn open_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
    let config: Config = toml::from_str(&content).context("Failed to parse configuration file")?;
    validate_year_offset(config.calendar.year_offset).context("Invalid [calendar] year_offset")?;
    Ok(config)
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_example_config() {
        let content = include_str!("../../../config.example.toml");
        let config: Config = toml::from_str(content).expect("Failed to parse config.example.toml");

        let expected = Config {
            discord: DiscordConfig {
                token: "YOUR_DISCORD_BOT_TOKEN".to_string(),
                admins: vec![123456789012345678],
                admin_role: "Admin".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://golarion.db".to_string(),
            },
            calendar: CalendarConfig { year_offset: 2697 },
            schedule: ScheduleConfig {
                time: NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
                job_id: "daily_update".to_string(),
            },
        };

        assert_eq!(config, expected);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str(
            r#"
            [discord]
            token = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.admin_role, "Admin");
        assert_eq!(config.calendar.year_offset, DEFAULT_YEAR_OFFSET);
        assert_eq!(config.schedule, ScheduleConfig::default());
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        write_default_config(&path).unwrap();
        let config = open_config(&path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn rejects_invalid_schedule_time() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [discord]
            token = "abc"

            [schedule]
            time = "25:00:00"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_year_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [discord]
            token = "abc"

            [calendar]
            year_offset = 9223372036854775807
            "#,
        )
        .unwrap();

        let error = open_config(&path).unwrap_err();
        assert!(error.to_string().contains("year_offset"));
    }

    #[test]
    fn accepts_negative_year_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [discord]
            token = "abc"

            [calendar]
            year_offset = -2024
            "#,
        )
        .unwrap();

        assert_eq!(open_config(&path).unwrap().calendar.year_offset, -2024);
    }
}
