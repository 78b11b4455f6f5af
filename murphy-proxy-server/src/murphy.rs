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

use std::sync::LazyLock;

use cloneable_errors::{ErrorContext, ResContext};
use log::{debug, warn};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::state::AppConfig;

const SOAP_NAMESPACE: &str = "http://www.murphysmagicsupplies.com/";
const SOAP_ACTION: &str = "\"http://www.murphysmagicsupplies.com/GetInventoryItems\"";

/// Element path of the signed URL inside a `GetInventoryItems` response,
/// not counting the soap envelope wrapper.
const VIDEO_URL_PATH: &[&str] = &["InventoryItem", "Videos", "Video", "VideoURL"];

// The product page embeds the player via
// ProductPageVidify("<id>", "<title>", "<poster>", "<signed url>");
// and the fourth argument is the only part we care about.
static VIDIFY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ProductPageVidify\("[^"]*",\s*"[^"]*",\s*"[^"]*",\s*"(https://[^"]+)""#)
        .expect("Should be able to parse the vidify regex")
});

/// Fetch a fresh signed video URL for a product.
///
/// Tries the inventory SOAP API when credentials are configured, then falls
/// back to scraping the public product page. `Ok(None)` means the product
/// exists but carries no video on either path.
pub async fn fetch_video_url(client: &Client, config: &AppConfig, product_id: u32) -> Result<Option<String>, ErrorContext> {
    if let Some((username, password)) = config.murphy.credentials() {
        match fetch_via_inventory_api(client, config, username, password, product_id).await {
            Ok(Some(url)) => return Ok(Some(url)),
            Ok(None) => debug!("Inventory API returned no video for product {product_id}, trying the product page"),
            Err(err) => warn!("Inventory API lookup for product {product_id} failed, trying the product page: {err:?}"),
        }
    }
    fetch_via_product_page(client, config, product_id).await
}

async fn fetch_via_inventory_api(client: &Client, config: &AppConfig, username: &str, password: &str, product_id: u32) -> Result<Option<String>, ErrorContext> {
    let envelope = build_inventory_envelope(username, password, product_id);
    let resp = client.post(&config.murphy.api_url)
        .header(CONTENT_TYPE, "text/xml; charset=utf-8")
        .header("SOAPAction", SOAP_ACTION)
        .body(envelope)
        .send().await.context("Failed to send the inventory request")?;
    let resp = resp.error_for_status().context("Inventory request failed")?;
    let body = resp.text().await.context("Failed to receive the inventory response")?;
    extract_signed_video_url(&body)
}

async fn fetch_via_product_page(client: &Client, config: &AppConfig, product_id: u32) -> Result<Option<String>, ErrorContext> {
    let mut url = reqwest::Url::parse(&config.murphy.product_page_url).context("Invalid product page URL")?;
    url.query_pairs_mut().append_pair("id", &product_id.to_string());
    let resp = client.get(url).send().await.context("Failed to send the product page request")?;
    let resp = resp.error_for_status().context("Product page request failed")?;
    let page = resp.text().await.context("Failed to receive the product page")?;
    Ok(extract_player_url(&page).map(str::to_owned))
}

fn build_inventory_envelope(username: &str, password: &str, product_id: u32) -> String {
    let username = escape(username);
    let password = escape(password);
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
         xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body>\
         <GetInventoryItems xmlns=\"{SOAP_NAMESPACE}\">\
         <authentication><Username>{username}</Username><Password>{password}</Password></authentication>\
         <itemIds><int>{product_id}</int></itemIds>\
         </GetInventoryItems>\
         </soap:Body>\
         </soap:Envelope>"
    )
}

/// Walk the inventory response and pull out the first
/// `InventoryItem/Videos/Video/VideoURL` text node.
///
/// The schema is fixed, so this is plain path navigation. A response without
/// a video entry is `Ok(None)`, only malformed XML is an error.
fn extract_signed_video_url(xml: &str) -> Result<Option<String>, ErrorContext> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut saw_video_entry = false;
    loop {
        match reader.read_event().context("Failed to parse the inventory response XML")? {
            Event::Start(start) => {
                path.push(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
                if path_ends_with(&path, &VIDEO_URL_PATH[..3]) {
                    saw_video_entry = true;
                }
            },
            Event::End(_) => { path.pop(); },
            Event::Text(text) if path_ends_with(&path, VIDEO_URL_PATH) => {
                let url = text.unescape().context("Failed to unescape the VideoURL text")?;
                let url = url.trim();
                if !url.is_empty() {
                    return Ok(Some(url.to_owned()));
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }
    if saw_video_entry {
        warn!("Inventory item has a video entry without a VideoURL");
    }
    Ok(None)
}

fn extract_player_url(page: &str) -> Option<&str> {
    VIDIFY_REGEX.captures(page).and_then(|captures| captures.get(1)).map(|m| m.as_str())
}

fn path_ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path.iter().rev().zip(suffix.iter().rev()).all(|(elem, expected)| elem.as_str() == *expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    <GetInventoryItemsResponse xmlns="http://www.murphysmagicsupplies.com/">
      <items>
        <InventoryItem>
          <Id>71186</Id>
          <Name>Impossible Card</Name>
          <Videos>
            <Video>
              <Filename>impossible_card.mp4</Filename>
              <VideoURL>https://cdn.example.com/impossible_card.mp4?Expires=1700000000&amp;Signature=abc123</VideoURL>
            </Video>
          </Videos>
        </InventoryItem>
      </items>
    </GetInventoryItemsResponse>
  </soap:Body>
</soap:Envelope>"#;

    const VIDEOLESS_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetInventoryItemsResponse xmlns="http://www.murphysmagicsupplies.com/">
      <items>
        <InventoryItem>
          <Id>12345</Id>
          <Name>Sponge Balls</Name>
        </InventoryItem>
      </items>
    </GetInventoryItemsResponse>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn extracts_signed_url_from_inventory_response() {
        let url = extract_signed_video_url(INVENTORY_RESPONSE).unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn.example.com/impossible_card.mp4?Expires=1700000000&Signature=abc123"));
    }

    #[test]
    fn response_without_videos_yields_none() {
        assert_eq!(extract_signed_video_url(VIDEOLESS_RESPONSE).unwrap(), None);
    }

    #[test]
    fn video_entry_without_url_yields_none() {
        let response = INVENTORY_RESPONSE.replace("<VideoURL>https://cdn.example.com/impossible_card.mp4?Expires=1700000000&amp;Signature=abc123</VideoURL>", "");
        assert_eq!(extract_signed_video_url(&response).unwrap(), None);
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        assert!(extract_signed_video_url("<soap:Envelope><soap:Body></nope></soap:Envelope>").is_err());
    }

    #[test]
    fn envelope_carries_credentials_and_product_id() {
        let envelope = build_inventory_envelope("shop", "s&cret", 71186);
        assert!(envelope.starts_with("<?xml"));
        assert!(envelope.contains("<Username>shop</Username>"));
        assert!(envelope.contains("<Password>s&amp;cret</Password>"));
        assert!(envelope.contains("<int>71186</int>"));
        assert!(envelope.contains(SOAP_NAMESPACE));
    }

    #[test]
    fn finds_player_url_in_product_page() {
        let page = r#"<html><body><script>
            ProductPageVidify("71186", "Impossible Card", "https://cdn.example.com/poster.jpg", "https://cdn.example.com/video.mp4?Expires=1700000000&Signature=abc");
        </script></body></html>"#;
        assert_eq!(extract_player_url(page), Some("https://cdn.example.com/video.mp4?Expires=1700000000&Signature=abc"));
    }

    #[test]
    fn page_without_player_yields_none() {
        assert_eq!(extract_player_url("<html><body>out of stock</body></html>"), None);
    }
}
