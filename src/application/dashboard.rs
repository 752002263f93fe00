use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::listing::ListQuery;
use crate::domain::order::{Order, OrderStatus, Orders};
use crate::errors::AppError;

use super::context::AdminContext;

/// Orders sampled for the dashboard: the first page of 100.
pub const SAMPLE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// From the backend's `totalRecords`, not the sample.
    pub total_orders: u64,
    pub completed: u64,
    pub paid: u64,
    pub pending: u64,
    pub canceled: u64,
    /// Orders per calendar day (UTC), oldest first.
    pub daily: Vec<(NaiveDate, u64)>,
    /// Open orders by status; terminal statuses are left out.
    pub distribution: Vec<(OrderStatus, u64)>,
}

pub fn summarize(orders: &[Order], total_orders: u64) -> DashboardSummary {
    let count = |status: OrderStatus| {
        orders
            .iter()
            .filter(|o| o.order_status == status.code())
            .count() as u64
    };

    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for day in orders.iter().filter_map(|o| o.order_date) {
        *daily.entry(day.date_naive()).or_default() += 1;
    }

    let mut distribution: BTreeMap<OrderStatus, u64> = BTreeMap::new();
    for status in orders.iter().filter_map(|o| o.status().ok()) {
        if !status.is_terminal() {
            *distribution.entry(status).or_default() += 1;
        }
    }

    DashboardSummary {
        total_orders,
        completed: count(OrderStatus::Completed),
        paid: count(OrderStatus::Paid),
        pending: count(OrderStatus::Pending),
        canceled: count(OrderStatus::Canceled),
        daily: daily.into_iter().collect(),
        distribution: distribution.into_iter().collect(),
    }
}

pub async fn load(ctx: &AdminContext) -> Result<DashboardSummary, AppError> {
    let page = ctx
        .service::<Orders>()
        .list(&ListQuery::new(SAMPLE_SIZE))
        .await?;
    Ok(summarize(&page.items, page.total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::tests::signed_in;
    use crate::domain::user::UserRole;
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn orders() -> serde_json::Value {
        json!({
            "orders": [
                {"_id": "1", "order_status": 1, "order_date": "2024-03-02T10:00:00Z"},
                {"_id": "2", "order_status": 11, "order_date": "2024-03-01T10:00:00Z"},
                {"_id": "3", "order_status": 3, "order_date": "2024-03-02T12:00:00Z"},
                {"_id": "4", "order_status": 1, "order_date": "2024-03-01T18:00:00Z"},
                {"_id": "5", "order_status": "9"}
            ],
            "page": 1, "limit": 100, "totalRecords": 250
        })
    }

    #[tokio::test]
    async fn summarizes_the_first_hundred_orders() {
        let fake = FakeTransport::replying(|_, _| Ok(orders()));
        let (ctx, _) = signed_in(&fake, vec![UserRole::Admin]);
        let summary = load(&ctx).await.unwrap();

        assert_eq!(summary.total_orders, 250);
        assert_eq!(
            (summary.completed, summary.paid, summary.pending, summary.canceled),
            (1, 1, 2, 1)
        );
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        assert_eq!(summary.daily, vec![(day(1), 2), (day(2), 2)]);
        assert_eq!(
            summary.distribution,
            vec![(OrderStatus::Pending, 2), (OrderStatus::Paid, 1)]
        );

        let gets = fake.gets();
        let (_, query) = &gets[0];
        assert!(query.contains(&("limit".to_string(), "100".to_string())));
        assert!(query.contains(&("page".to_string(), "1".to_string())));
    }
}
