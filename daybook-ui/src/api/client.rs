//! HTTP API Client
//!
//! Functions for communicating with the Daybook REST API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use gloo_net::http::{Request, Response};
use std::collections::BTreeMap;
use wasm_bindgen_futures::JsFuture;

use crate::state::ReportMode;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:5003";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item("daybook_api_url").ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

// ============ Response Types ============

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Question {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct QuestionSet {
    #[serde(rename = "type")]
    pub mode: ReportMode,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Reflection {
    pub id: i64,
    #[serde(rename = "type")]
    pub mode: ReportMode,
    pub date: String,
    #[serde(default)]
    pub images: Vec<StoredImage>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct StoredImage {
    pub id: i64,
    pub filename: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WeeklyEntry {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub mode: ReportMode,
    #[serde(default)]
    pub priorities: Option<String>,
    #[serde(default)]
    pub reflection: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TaskGroup<T> {
    pub name: String,
    pub tasks: Vec<T>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TodayTask {
    pub title: String,
    #[serde(default)]
    pub project_title: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TodayTasks {
    pub total: usize,
    pub areas: Vec<TaskGroup<TodayTask>>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CompletedTask {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CompletedDay {
    pub date: String,
    pub total_completed: usize,
    pub projects: Vec<TaskGroup<CompletedTask>>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RecentCompleted {
    pub total_completed: usize,
    pub days: Vec<CompletedDay>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CurrentWeather {
    pub temp: i64,
    pub wind_speed: f64,
    pub description: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct HourlyForecast {
    pub time: String,
    pub temp: i64,
    pub description: String,
    #[serde(default)]
    pub precipitation_prob: Option<f64>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub current: CurrentWeather,
    pub today: Vec<HourlyForecast>,
    pub tomorrow: Vec<HourlyForecast>,
}

/// Outcome of an optional daily context fetch
#[derive(Debug, Clone)]
pub enum Context<T> {
    Ready(T),
    /// The server has this integration switched off
    Disabled,
    Failed(String),
}

#[derive(Debug, serde::Deserialize)]
struct CreateReflectionResponse {
    id: i64,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ============ Request Types ============

#[derive(serde::Serialize)]
struct CreateReflectionRequest {
    #[serde(rename = "type")]
    mode: ReportMode,
    answers: BTreeMap<String, String>,
    images: Vec<ImagePayload>,
}

#[derive(serde::Serialize)]
struct ImagePayload {
    filename: String,
    content_type: String,
    data: String,
}

// ============ API Functions ============

/// Fetch the question set for a mode
pub async fn fetch_questions(mode: ReportMode) -> Result<QuestionSet, String> {
    let url = format!("{}/api/questions/{}", get_api_base(), mode.as_str());
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    read_json(response).await
}

/// Fetch the saved reflection for a day, `None` if there is none
pub async fn fetch_reflection(date: &str, mode: ReportMode) -> Result<Option<Reflection>, String> {
    let url = format!("{}/api/reflection/{}/{}", get_api_base(), date, mode.as_str());
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if response.status() == 404 {
        return Ok(None);
    }
    read_json(response).await.map(Some)
}

/// Fetch reflections from the last 7 days
pub async fn fetch_weekly() -> Result<Vec<WeeklyEntry>, String> {
    let url = format!("{}/api/reflection/weekly", get_api_base());
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    read_json(response).await
}

/// Things 3 Today list
pub async fn fetch_today_tasks() -> Context<TodayTasks> {
    fetch_context("/api/tasks/today").await
}

/// Things 3 tasks completed since the start of yesterday
pub async fn fetch_recent_completed() -> Context<RecentCompleted> {
    fetch_context("/api/tasks/completed/recent").await
}

/// Forecast for the server's configured location
pub async fn fetch_weather() -> Context<WeatherReport> {
    fetch_context("/api/weather").await
}

async fn fetch_context<T: serde::de::DeserializeOwned>(path: &str) -> Context<T> {
    let url = format!("{}{}", get_api_base(), path);
    let response = match Request::get(&url).send().await {
        Ok(response) => response,
        Err(e) => return Context::Failed(format!("Network error: {}", e)),
    };

    if response.status() == 503 {
        return Context::Disabled;
    }
    match read_json(response).await {
        Ok(value) => Context::Ready(value),
        Err(e) => Context::Failed(e),
    }
}

/// Submit a reflection; returns the stored id
pub async fn submit_reflection(
    mode: ReportMode,
    answers: BTreeMap<String, String>,
    images: &[web_sys::File],
) -> Result<i64, String> {
    let mut payloads = Vec::with_capacity(images.len());
    for file in images {
        payloads.push(encode_file(file).await?);
    }

    let request = CreateReflectionRequest {
        mode,
        answers,
        images: payloads,
    };

    let response = Request::post(&format!("{}/api/reflection", get_api_base()))
        .json(&request)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    let created: CreateReflectionResponse = read_json(response).await?;
    Ok(created.id)
}

async fn encode_file(file: &web_sys::File) -> Result<ImagePayload, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(ImagePayload {
        filename: file.name(),
        content_type: file.type_(),
        data: STANDARD.encode(bytes),
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, String> {
    if !response.ok() {
        let status = response.status();
        let message = response
            .json::<ApiError>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));
        return Err(message);
    }

    response.json().await.map_err(|e| format!("Parse error: {}", e))
}
