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
#![allow(clippy::needless_pass_by_value)]
use actix_web::{get, http::StatusCode, web, Responder};
use chrono::DateTime;
use cloneable_errors::{anyhow, ErrContext};
use log::error;
use murphy_proxy_api::{StatusResponse, VideoResponse};
use reqwest::Client;
use serde::Deserialize;

use crate::{built_info, errors::{self, Error}, murphy, state::AppConfig};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(helo)
       .service(get_status)
       .service(get_video);
}

type JsonResult<T> = errors::Result<web::Json<T>>;

#[get("/")]
async fn helo() -> impl Responder {
    "hi"
}

#[get("/status")]
async fn get_status(config: web::Data<AppConfig>) -> JsonResult<StatusResponse> {
    Ok(web::Json(StatusResponse {
        server_version: Some(built_info::PKG_VERSION.into()),
        server_git_hash: built_info::GIT_COMMIT_HASH.map(std::convert::Into::into),
        server_git_dirty: built_info::GIT_DIRTY,
        server_build_timestamp: DateTime::parse_from_rfc2822(built_info::BUILT_TIME_UTC).ok().map(|t| t.timestamp()),
        server_startup_timestamp: Some(config.startup_timestamp.timestamp()),
        inventory_api_enabled: config.murphy.credentials().is_some(),
    }))
}

#[derive(Deserialize, Debug)]
struct VideoQuery {
    product_id: u32,
}

#[get("/video")]
async fn get_video(query: web::Query<VideoQuery>, client: web::Data<Client>, config: web::Data<AppConfig>) -> JsonResult<VideoResponse> {
    let product_id = query.product_id;
    let video_url = match murphy::fetch_video_url(&client, &config, product_id).await {
        Ok(url) => url,
        Err(err) => {
            let err = err.context(format!("Failed to fetch a video URL for product {product_id}"));
            error!("{err:?}");
            return Err(Error::from(err).set_status(StatusCode::BAD_GATEWAY));
        },
    };
    match video_url {
        Some(video_url) => Ok(web::Json(VideoResponse { video_url })),
        None => Err(Error::from(anyhow!("Product {product_id} has no video")).set_status(StatusCode::NOT_FOUND)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use crate::state::MurphyConfig;

    use super::*;

    #[actix_web::test]
    async fn helo_responds() {
        let app = test::init_service(App::new().service(helo)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn status_reports_strategy_availability() {
        let config = AppConfig {
            murphy: MurphyConfig {
                username: Some("shop".to_owned()),
                password: Some("hunter2".to_owned()),
                ..MurphyConfig::default()
            },
            ..AppConfig::default()
        };
        let app = test::init_service(App::new().app_data(web::Data::new(config)).service(get_status)).await;
        let resp: StatusResponse = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/status").to_request()).await;
        assert!(resp.inventory_api_enabled);
        assert_eq!(resp.server_version.as_deref(), Some(built_info::PKG_VERSION));
    }

    #[actix_web::test]
    async fn video_requires_a_numeric_product_id() {
        // query deserialization rejects these before any app data is touched
        let app = test::init_service(App::new().service(get_video)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/video?product_id=banana").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/video").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
