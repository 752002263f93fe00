use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::errors::DomainError;
use super::lenient;
use super::reference::Reference;
use super::resource::{contains_keyword, FormMode, Resource};
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Pending = 1,
    Confirmed = 2,
    Canceled = 3,
    PreparingShipping = 4,
    Shipping = 5,
    ShippingCanceled = 6,
    Shipped = 7,
    PendingPayment = 8,
    Paid = 9,
    Refunded = 10,
    Completed = 11,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 11] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Canceled,
        OrderStatus::PreparingShipping,
        OrderStatus::Shipping,
        OrderStatus::ShippingCanceled,
        OrderStatus::Shipped,
        OrderStatus::PendingPayment,
        OrderStatus::Paid,
        OrderStatus::Refunded,
        OrderStatus::Completed,
    ];

    pub fn from_code(code: i64) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(DomainError::UnknownStatus(code))
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::PreparingShipping => "Preparing Shipping",
            OrderStatus::Shipping => "Shipping",
            OrderStatus::ShippingCanceled => "Shipping Canceled",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::PendingPayment => "Pending Payment",
            OrderStatus::Paid => "Paid",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Completed => "Completed",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            OrderStatus::Pending => "#FFB945",
            OrderStatus::Confirmed => "#5B8FF9",
            OrderStatus::Canceled => "#E86452",
            OrderStatus::PreparingShipping => "#A97BF9",
            OrderStatus::Shipping => "#5AD8A6",
            OrderStatus::ShippingCanceled => "#FF9845",
            OrderStatus::Shipped => "#5B8FF9",
            OrderStatus::PendingPayment => "#F6BD16",
            OrderStatus::Paid => "#1E9493",
            OrderStatus::Refunded => "#FF99C3",
            OrderStatus::Completed => "#3de400ff",
        }
    }

    /// Canceled and Completed orders accept no further status change.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::Completed)
    }

    /// Builds the update payload for moving from `self` to `target`.
    ///
    /// Only terminal states are guarded here; any other transition is left
    /// for the backend to judge. Completing an order stamps `now`.
    pub fn transition(
        self,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusUpdate, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::TerminalStatus(self.label()));
        }
        Ok(StatusUpdate {
            order_status: target.code(),
            completed_date: (target == OrderStatus::Completed).then_some(now),
        })
    }
}

/// Body of `PUT /v1/orders/:id` for a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub order_status: i64,
    #[serde(
        default,
        with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentType {
    Cash,
    CreditCard,
    BankTransfer,
    EWallet,
    Unknown,
}

impl PaymentType {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => PaymentType::Cash,
            Some(2) => PaymentType::CreditCard,
            Some(3) => PaymentType::BankTransfer,
            Some(4) => PaymentType::EWallet,
            _ => PaymentType::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::CreditCard => "Credit Card",
            PaymentType::BankTransfer => "Bank Transfer",
            PaymentType::EWallet => "E-Wallet",
            PaymentType::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, rename = "product_id", alias = "_id")]
    pub product: Option<Reference>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, with = "lenient::decimal")]
    pub price: BigDecimal,
    #[serde(default, deserialize_with = "lenient::int")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub discount: f64,
}

impl OrderLine {
    pub fn line_total(&self) -> BigDecimal {
        let discount = BigDecimal::try_from(self.discount).unwrap_or_default();
        let gross = &self.price * BigDecimal::from(self.quantity);
        (gross * (BigDecimal::from(100) - discount) / BigDecimal::from(100)).round(2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub order_id: Option<i64>,
    #[serde(alias = "status", deserialize_with = "lenient::int")]
    pub order_status: i64,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub payment_type: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<Reference>,
    #[serde(default, alias = "staff_id")]
    pub employee_id: Option<Reference>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "street")]
    pub shipping_address: Option<String>,
    #[serde(default, alias = "city")]
    pub shipping_city: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient::timestamp")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "require_date", with = "lenient::timestamp")]
    pub required_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "shipping_date", with = "lenient::timestamp")]
    pub shipped_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient::timestamp")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_details: Vec<OrderLine>,
}

impl Order {
    pub fn status(&self) -> Result<OrderStatus, DomainError> {
        OrderStatus::from_code(self.order_status)
    }

    pub fn payment(&self) -> PaymentType {
        PaymentType::from_code(self.payment_type)
    }

    /// Customer name from the flattened row fields, falling back to the
    /// embedded customer document.
    pub fn customer_name(&self) -> String {
        let flattened = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string();
        if !flattened.is_empty() {
            return flattened;
        }
        self.customer_id
            .as_ref()
            .map(|c| c.display().to_string())
            .unwrap_or_default()
    }

    pub fn total(&self) -> BigDecimal {
        self.order_details
            .iter()
            .map(OrderLine::line_total)
            .fold(BigDecimal::from(0), |acc, line| acc + line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineDraft {
    pub product_id: String,
    pub quantity: i64,
    pub discount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_date: Option<NaiveDate>,
    pub order_details: Vec<OrderLineDraft>,
}

pub struct Orders;

fn date_filter(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

impl Resource for Orders {
    type Record = Order;
    type Draft = OrderDraft;

    const NAME: &'static str = "orders";
    const LABEL: &'static str = "Order";
    const PATH: &'static str = "/v1/orders";
    const COLLECTION_KEY: &'static str = "orders";
    const GATES: ActionGates = ActionGates {
        create: Gate::ADMIN_OR_STAFF,
        edit: Gate::ADMIN_OR_STAFF,
        delete: Gate::ADMIN,
    };

    fn record_id(record: &Order) -> &str {
        &record.id
    }

    fn draft_from(record: &Order) -> OrderDraft {
        OrderDraft {
            customer_id: record.customer_id.as_ref().map(|r| r.id.clone()),
            employee_id: record.employee_id.as_ref().map(|r| r.id.clone()),
            payment_type: record.payment_type,
            shipping_address: record.shipping_address.clone(),
            shipping_city: record.shipping_city.clone(),
            description: record.description.clone(),
            required_date: record.required_date.map(|d| d.date_naive()),
            order_details: record
                .order_details
                .iter()
                .filter_map(|line| {
                    Some(OrderLineDraft {
                        product_id: line.product.as_ref()?.id.clone(),
                        quantity: line.quantity,
                        discount: line.discount,
                    })
                })
                .collect(),
        }
    }

    fn normalize(mut draft: OrderDraft) -> OrderDraft {
        draft.customer_id = draft.customer_id.filter(|c| !c.trim().is_empty());
        draft.order_details.retain(|line| !line.product_id.trim().is_empty());
        draft
    }

    fn validate(draft: &OrderDraft, _mode: FormMode) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.present("customer_id", &draft.customer_id).check(
            "order_details",
            !draft.order_details.is_empty(),
            "Add at least one product",
        );
        for line in &draft.order_details {
            v.check("quantity", line.quantity >= 1, "Quantity must be at least 1")
                .range("discount", Some(line.discount), 0.0..=100.0);
        }
        v.finish()
    }

    fn sort_value(record: &Order, field: &str) -> Option<SortValue> {
        match field {
            "order_date" => record.order_date.map(SortValue::Date),
            "required_date" => record.required_date.map(SortValue::Date),
            "order_status" => Some(SortValue::Number(record.order_status as f64)),
            "customer" | "customer_id" => Some(SortValue::text(record.customer_name())),
            "city" | "shipping_city" => record.shipping_city.as_deref().map(SortValue::text),
            _ => None,
        }
    }

    fn tie_breakers(field: &str) -> &'static [&'static str] {
        match field {
            "order_status" | "city" | "shipping_city" => &["order_date"],
            _ => &[],
        }
    }

    fn matches_keyword(record: &Order, keyword: &str) -> bool {
        contains_keyword(&record.customer_name(), keyword)
            || record.email.as_deref().is_some_and(|e| contains_keyword(e, keyword))
            || record.phone.as_deref().is_some_and(|p| contains_keyword(p, keyword))
            || contains_keyword(&record.id, keyword)
    }

    fn matches_filter(record: &Order, key: &str, value: &str) -> bool {
        let order_day = record.order_date.map(|d| d.date_naive());
        match key {
            "order_status" => value
                .parse::<i64>()
                .map_or(true, |code| record.order_status == code),
            "start_date" => match (date_filter(value), order_day) {
                (Some(start), Some(day)) => day >= start,
                (Some(_), None) => false,
                (None, _) => true,
            },
            "end_date" => match (date_filter(value), order_day) {
                (Some(end), Some(day)) => day <= end,
                (Some(_), None) => false,
                (None, _) => true,
            },
            _ => true,
        }
    }

    fn default_filters() -> &'static [(&'static str, &'static str)] {
        &[("order_status", "1")]
    }
}
