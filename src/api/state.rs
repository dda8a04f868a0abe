use std::sync::Arc;

use crate::models::UnifiedMatch;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub league_id: u32,
    pub matches: Arc<Vec<UnifiedMatch>>,
    pub default_regions: Arc<Vec<i32>>,
}
