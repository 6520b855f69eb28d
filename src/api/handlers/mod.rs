pub mod assets;
pub mod health;
pub mod leaderboard;
pub mod metrics;
pub mod portfolio;
pub mod trading;

use serde::Serialize;

/// Uniform JSON envelope for API payloads.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
