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

use serde::{Deserialize, Serialize};

/// A fresh signed video URL for a single product.
///
/// The URL is time-limited by the vendor and should be requested again
/// whenever the player is (re)loaded, never stored.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VideoResponse {
    pub video_url: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StatusResponse {
    // general server build data
    pub server_version: Option<String>,
    pub server_git_hash: Option<String>,
    pub server_git_dirty: Option<bool>,
    pub server_build_timestamp: Option<i64>,
    pub server_startup_timestamp: Option<i64>,
    // lookup strategy availability
    pub inventory_api_enabled: bool,
}
