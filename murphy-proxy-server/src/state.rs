/* This file is part of the Murphy Video Proxy project
*
*  Copyright (C) 2025 Murphy Video Proxy contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::env;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reqwest_timeout_secs: f64,
    pub enable_timings_header: bool,
    pub listen: ListenConfig,
    pub murphy: MurphyConfig,
    #[serde(skip)]
    pub startup_timestamp: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reqwest_timeout_secs: 20.,
            enable_timings_header: false,
            listen: ListenConfig::default(),
            murphy: MurphyConfig::default(),
            startup_timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ListenConfig {
    pub tcp: Option<(String, u16)>,
    pub unix: Option<String>,
    pub unix_mode: Option<u32>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            tcp: Some(("0.0.0.0".to_owned(), 3000)),
            unix: None,
            unix_mode: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct MurphyConfig {
    pub api_url: String,
    pub product_page_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: String,
}

impl Default for MurphyConfig {
    fn default() -> Self {
        Self {
            api_url: "http://ws.murphysmagic.com/V4.asmx".to_owned(),
            product_page_url: "https://www.murphysmagic.com/product.aspx".to_owned(),
            username: None,
            password: None,
            user_agent: "Mozilla/5.0".to_owned(),
        }
    }
}

impl MurphyConfig {
    /// `MURPHY_USERNAME`/`MURPHY_PASSWORD` take priority over the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(username) = env::var("MURPHY_USERNAME") {
            self.username = Some(username);
        }
        if let Ok(password) = env::var("MURPHY_PASSWORD") {
            self.password = Some(password);
        }
    }

    /// Both halves are required for the inventory API, there is no partial auth.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.password.as_deref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let serialized = toml::to_string(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.listen.tcp, Some(("0.0.0.0".to_owned(), 3000)));
        assert_eq!(parsed.murphy.api_url, "http://ws.murphysmagic.com/V4.asmx");
        assert!(parsed.murphy.credentials().is_none());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parsed: AppConfig = toml::from_str("[murphy]\nusername = \"shop\"\npassword = \"hunter2\"\n").unwrap();
        assert_eq!(parsed.murphy.credentials(), Some(("shop", "hunter2")));
        assert_eq!(parsed.murphy.user_agent, "Mozilla/5.0");
        assert!((parsed.reqwest_timeout_secs - 20.).abs() < f64::EPSILON);
    }

    #[test]
    fn credentials_require_both_halves() {
        let config = MurphyConfig {
            username: Some("shop".to_owned()),
            ..MurphyConfig::default()
        };
        assert!(config.credentials().is_none());
        let config = MurphyConfig {
            password: Some("hunter2".to_owned()),
            ..config
        };
        assert_eq!(config.credentials(), Some(("shop", "hunter2")));
    }
}
