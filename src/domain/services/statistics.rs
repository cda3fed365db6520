use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::{category::PriceCategory, seat::Seat};

#[derive(Debug, Serialize, Clone)]
pub struct SeatMapStatistics {
    pub total_seats: i64,
    pub seats_by_category: Vec<CategoryCount>,
    pub blocked_count: i64,
    pub accessible_count: i64,
    /// Sum of non-blocked seats' category price.
    pub potential_revenue_cents: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct CategoryCount {
    pub category_id: String,
    pub category_name: String,
    pub seat_count: i64,
}

pub fn compute_statistics(seats: &[Seat], categories: &[PriceCategory]) -> SeatMapStatistics {
    let prices: HashMap<&str, i64> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.unit_price_cents))
        .collect();

    let mut by_category: HashMap<&str, i64> = HashMap::new();
    let mut blocked_count = 0;
    let mut accessible_count = 0;
    let mut potential_revenue_cents = 0;

    for seat in seats {
        *by_category.entry(seat.category_id.as_str()).or_insert(0) += 1;
        if seat.is_blocked {
            blocked_count += 1;
        } else {
            potential_revenue_cents += prices.get(seat.category_id.as_str()).copied().unwrap_or(0);
        }
        if seat.is_accessible {
            accessible_count += 1;
        }
    }

    let seats_by_category = categories
        .iter()
        .map(|c| CategoryCount {
            category_id: c.id.clone(),
            category_name: c.name.clone(),
            seat_count: by_category.get(c.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    SeatMapStatistics {
        total_seats: seats.len() as i64,
        seats_by_category,
        blocked_count,
        accessible_count,
        potential_revenue_cents,
    }
}
