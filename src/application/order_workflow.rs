use chrono::{DateTime, Utc};

use crate::domain::access::CrudAction;
use crate::domain::order::{Order, OrderStatus, Orders, StatusUpdate};
use crate::domain::ports::{Method, RequestBody};
use crate::domain::resource::Resource;
use crate::errors::AppError;

use super::context::AdminContext;
use super::crud_service::CrudService;
use super::notifications::Notification;

impl CrudService<Orders> {
    /// `PUT /v1/orders/:id` with a status payload.
    pub async fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<(), AppError> {
        let body = RequestBody::Json(serde_json::to_value(update)?);
        self.transport()
            .send(Method::Put, &format!("{}/{}", Orders::PATH, id), body)
            .await?;
        self.cache().invalidate(Orders::NAME);
        log::info!("Order {} moved to status {}", id, update.order_status);
        Ok(())
    }
}

/// Status selector of the order detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusControl {
    order_id: String,
    current: OrderStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl OrderStatusControl {
    pub fn new(order: &Order) -> Result<Self, AppError> {
        Ok(Self {
            order_id: order.id.clone(),
            current: order.status()?,
            completed_at: order.completed_date,
        })
    }

    pub fn current(&self) -> OrderStatus {
        self.current
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// False once the order is Canceled or Completed.
    pub fn is_interactive(&self) -> bool {
        !self.current.is_terminal()
    }

    /// Selectable statuses; empty for a terminal order.
    pub fn options(&self) -> Vec<OrderStatus> {
        if self.is_interactive() {
            OrderStatus::ALL.to_vec()
        } else {
            Vec::new()
        }
    }

    pub async fn change(
        &mut self,
        ctx: &AdminContext,
        target: OrderStatus,
    ) -> Result<StatusUpdate, AppError> {
        self.change_at(ctx, target, Utc::now()).await
    }

    /// Sends the transition with `now` as the request time. A terminal order
    /// is refused locally and nothing is sent.
    pub async fn change_at(
        &mut self,
        ctx: &AdminContext,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusUpdate, AppError> {
        ctx.authorize::<Orders>(CrudAction::Edit)?;
        let update = match self.current.transition(target, now) {
            Ok(update) => update,
            Err(err) => {
                ctx.notify(Notification::warning(err.to_string()));
                return Err(err.into());
            }
        };

        match ctx
            .service::<Orders>()
            .update_status(&self.order_id, &update)
            .await
        {
            Ok(()) => {
                self.current = target;
                if update.completed_date.is_some() {
                    self.completed_at = update.completed_date;
                }
                ctx.notify(Notification::success(format!(
                    "Order status updated to {}",
                    target.label()
                )));
                Ok(update)
            }
            Err(err) => {
                ctx.notify(Notification::error(err.to_string()));
                Err(err)
            }
        }
    }
}
