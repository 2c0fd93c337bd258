//! Static informational responses.

use axum::Json;
use serde_json::{json, Value};
use wayfarer_core::offline::DataType;

/// GET /
pub async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Wayfarer travel backend",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Voice Navigation - Find places by voice commands",
            "Offline Mode - Download data for offline use",
            "Image Search - Find destinations from photos",
            "Cough Monitor - Collect and summarise device cough events",
        ],
    }))
}

/// GET /features
pub async fn list_features() -> Json<Value> {
    let supported: Vec<&str> = DataType::ALL.iter().map(|t| t.name()).collect();
    Json(json!({
        "features": {
            "voice_navigation": {
                "endpoint": "/api/voice/process",
                "description": "Find places by voice commands with weather",
                "example": "Find coffee shops",
            },
            "offline_mode": {
                "endpoint": "/api/offline/download",
                "description": "Download & sync offline data",
                "supported_types": supported,
            },
            "image_search": {
                "endpoint": "/api/image/search",
                "description": "Upload image to find destination",
            },
            "cough_monitor": {
                "endpoint": "/api/cough/event",
                "description": "Record cough detections from ESP32 sensors",
                "statistics": ["hour", "today", "week"],
            },
        }
    }))
}
