use serde::Serialize;

/// Admin overview counters.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    /// Accounts awaiting document review (`PENDING`).
    pub pending_registrations: u64,
    /// Approved merchants still waiting for a sale point.
    pub waiting_list: u64,
    pub pending_justifications: u64,
    pub total_sale_points: u64,
    pub occupied_sale_points: u64,
    /// Percentage of occupied sale points, 0 when there are none.
    #[schema(example = 62.5)]
    pub occupation_rate: f64,
}

pub fn occupation_rate(occupied: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (occupied as f64 / total as f64) * 100.0
}
