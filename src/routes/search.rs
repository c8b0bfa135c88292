//! Stateless search proxy over the YouTube Data API: one search call for
//! ids, one videos call for snippet + duration. The sync core never calls
//! this; clients feed the results back in as opaque track metadata.

use axum::{extract::Query, routing::get, Json, Router};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppErr, AppResult};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
const MAX_RESULTS: u32 = 15;

pub fn router() -> Router {
    Router::new().route("/", get(search))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResults {
    results: Vec<SearchItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: String,
    title: String,
    description: String,
    thumbnail: String,
    duration_seconds: u32,
}

async fn search(Query(params): Query<SearchQuery>) -> AppResult<Json<SearchResults>> {
    let q = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or(AppErr::MissingQuery)?;
    let key = env::var("YOUTUBE_API_KEY")
        .map_err(|_| AppErr::Upstream("YouTube API key not configured".into()))?;

    let client = Client::new();
    let ids = search_ids(&client, &q, &key).await?;
    let results = video_details(&client, &ids, &key).await?;
    Ok(Json(SearchResults { results }))
}

/* ---------------- upstream calls ---------------- */

#[derive(Deserialize)]
struct SearchListResponse {
    items: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: SearchHitId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHitId {
    video_id: Option<String>,
}

async fn search_ids(client: &Client, q: &str, key: &str) -> Result<Vec<String>, AppErr> {
    let resp = client
        .get(SEARCH_URL)
        .query(&[
            ("part", "snippet"),
            ("q", q),
            ("type", "video"),
            ("maxResults", &MAX_RESULTS.to_string()),
            ("key", key),
        ])
        .send()
        .await?;
    let resp = check_status(resp)?;
    let body: SearchListResponse = resp.json().await?;
    Ok(body.items.into_iter().filter_map(|hit| hit.id.video_id).collect())
}

#[derive(Deserialize)]
struct VideoListResponse {
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    content_details: ContentDetails,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize)]
struct Thumbnails {
    high: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct ContentDetails {
    duration: String,
}

async fn video_details(
    client: &Client,
    ids: &[String],
    key: &str,
) -> Result<Vec<SearchItem>, AppErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let resp = client
        .get(VIDEOS_URL)
        .query(&[
            ("part", "snippet,contentDetails"),
            ("id", &ids.join(",")),
            ("key", key),
        ])
        .send()
        .await?;
    let resp = check_status(resp)?;
    let body: VideoListResponse = resp.json().await?;

    Ok(body
        .items
        .into_iter()
        .map(|item| SearchItem {
            id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            thumbnail: item.snippet.thumbnails.high.url,
            duration_seconds: duration_seconds(&item.content_details.duration),
        })
        .collect())
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AppErr> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::FORBIDDEN => Err(AppErr::UpstreamForbidden(
            "YouTube API access forbidden (403). Check your API key and quota.".into(),
        )),
        s => {
            tracing::warn!(status = %s, "YouTube API error");
            Err(AppErr::Upstream("YouTube API error".into()))
        }
    }
}

/// ISO-8601 `PT#H#M#S` duration to whole seconds; anything else is 0.
fn duration_seconds(duration: &str) -> u32 {
    let Some(rest) = duration.strip_prefix("PT") else { return 0 };
    let mut total = 0u32;
    let mut num = 0u32;
    for c in rest.chars() {
        if let Some(d) = c.to_digit(10) {
            num = num * 10 + d;
            continue;
        }
        let unit = match c {
            'H' => 3600,
            'M' => 60,
            'S' => 1,
            _ => return 0,
        };
        total += num * unit;
        num = 0;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::duration_seconds;

    #[test]
    fn converts_iso8601_durations() {
        assert_eq!(duration_seconds("PT1H2M3S"), 3723);
        assert_eq!(duration_seconds("PT4M20S"), 260);
        assert_eq!(duration_seconds("PT2H"), 7200);
        assert_eq!(duration_seconds("PT45S"), 45);
        assert_eq!(duration_seconds("PT0S"), 0);
    }

    #[test]
    fn unparseable_durations_fall_back_to_zero() {
        assert_eq!(duration_seconds(""), 0);
        assert_eq!(duration_seconds("P1DT2H"), 0);
        assert_eq!(duration_seconds("PT3X"), 0);
        assert_eq!(duration_seconds("nonsense"), 0);
    }
}
