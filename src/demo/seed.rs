use serde_json::{json, Map, Value};

use super::store::{Account, Tables};

pub const ADMIN_EMAIL: &str = "admin@gmail.com";
pub const STAFF_EMAIL: &str = "staff@gmail.com";
pub const DEMO_PASSWORD: &str = "!Qaz123456";

const STAFF_PERMISSIONS: &[&str] = &[
    "order.view",
    "product.view",
    "brand.view",
    "category.view",
    "discount.view",
];
const ADMIN_PERMISSIONS: &[&str] = &[
    "order.view",
    "product.view",
    "brand.view",
    "category.view",
    "discount.view",
    "role.view",
    "roles.view",
    "users.view",
];

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn permissions(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

pub(super) fn populate(tables: &mut Tables) {
    seed_users(tables);
    let brands = seed_simple(
        tables,
        "brands",
        "brand_name",
        &["Shimano", "SRAM", "KMC", "Campagnolo"],
    );
    let categories = seed_simple(
        tables,
        "categories",
        "category_name",
        &["Drivetrain", "Wheels", "Accessories"],
    );
    let products = seed_products(tables, &brands, &categories);
    let customers = seed_customers(tables);
    seed_roles(tables);
    seed_discounts(tables);
    seed_orders(tables, &customers, &products);
    log::debug!("Seeded demo store");
}

fn seed_users(tables: &mut Tables) {
    let accounts = [
        (ADMIN_EMAIL, "Ada", "Admin", "admin", ADMIN_PERMISSIONS),
        (STAFF_EMAIL, "Sam", "Staff", "staff", STAFF_PERMISSIONS),
    ];
    for (email, first, last, role, perms) in accounts {
        let user_id = tables.push(
            "users",
            fields(json!({
                "email": email,
                "first_name": first,
                "last_name": last,
                "roles": [role],
                "active": true,
            })),
        );
        tables.add_account(Account {
            user_id,
            email: email.to_string(),
            password: DEMO_PASSWORD.to_string(),
            permissions: permissions(perms),
        });
    }
}

/// Named, slugged rows; returns the new ids in order.
fn seed_simple(
    tables: &mut Tables,
    table: &'static str,
    name_field: &str,
    names: &[&str],
) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let mut row = Map::new();
            row.insert(name_field.to_string(), json!(name));
            row.insert("slug".to_string(), json!(name.to_lowercase()));
            row.insert(
                "description".to_string(),
                json!(format!("{name} parts and components")),
            );
            tables.push(table, row)
        })
        .collect()
}

/// (id, name, price) of every seeded product.
type ProductRef = (String, String, f64);

fn seed_products(tables: &mut Tables, brands: &[String], categories: &[String]) -> Vec<ProductRef> {
    let catalog: &[(&str, f64, i64, i64, usize, usize)] = &[
        ("Shimano Ultegra 11-speed chain", 39.99, 10, 2023, 0, 0),
        ("Shimano Dura-Ace chain", 54.50, 0, 2024, 0, 0),
        ("SRAM PC-1130 chain", 29.00, 5, 2022, 1, 0),
        ("SRAM Eagle XX1 chain", 79.00, 15, 2024, 1, 0),
        ("KMC X11 chain", 34.90, 0, 2021, 2, 0),
        ("KMC X12 chain", 44.90, 20, 2023, 2, 0),
        ("KMC e-bike chain", 49.00, 0, 2024, 2, 0),
        ("Campagnolo Record chain", 64.00, 5, 2022, 3, 0),
        ("Chain checker tool", 12.50, 0, 2020, 0, 2),
        ("Chain lube 120ml", 9.90, 30, 2023, 2, 2),
        ("Shimano RS770 wheelset", 399.00, 10, 2023, 0, 1),
        ("Campagnolo Zonda wheelset", 449.00, 0, 2022, 3, 1),
        ("SRAM cassette PG-1170", 89.00, 0, 2021, 1, 0),
    ];
    catalog
        .iter()
        .map(|(name, price, discount, year, brand, category)| {
            let slug = crate::domain::slug::slugify(name);
            let id = tables.push(
                "products",
                fields(json!({
                    "product_name": name,
                    "slug": slug,
                    "description": format!("{name}, genuine part"),
                    "price": price,
                    "discount": discount,
                    "stock": 25,
                    "model_year": year,
                    "brand_id": brands.get(*brand),
                    "category_id": categories.get(*category),
                    "thumbnail": format!("/uploads/{slug}.png"),
                })),
            );
            (id, name.to_string(), *price)
        })
        .collect()
}

/// (id, first, last, email, phone, city)
type CustomerRef = (String, &'static str, &'static str, &'static str, &'static str, &'static str);

fn seed_customers(tables: &mut Tables) -> Vec<CustomerRef> {
    let people: [(&str, &str, &str, &str, &str, bool); 5] = [
        ("Linh", "Nguyen", "linh@example.com", "0901000001", "Hanoi", true),
        ("Minh", "Tran", "minh@example.com", "0901000002", "Da Nang", true),
        ("An", "Le", "an@example.com", "0901000003", "Hanoi", false),
        ("Bao", "Pham", "bao@example.com", "0901000004", "Hue", true),
        ("Chi", "Vo", "chi@example.com", "0901000005", "Can Tho", true),
    ];
    people
        .iter()
        .map(|&(first, last, email, phone, city, active)| {
            let id = tables.push(
                "customers",
                fields(json!({
                    "first_name": first,
                    "last_name": last,
                    "email": email,
                    "phone": phone,
                    "city": city,
                    "active": active,
                })),
            );
            (id, first, last, email, phone, city)
        })
        .collect()
}

fn seed_roles(tables: &mut Tables) {
    tables.push(
        "roles",
        fields(json!({
            "name": "admin",
            "description": "Full access",
            "permissions": ADMIN_PERMISSIONS,
        })),
    );
    tables.push(
        "roles",
        fields(json!({
            "name": "staff",
            "description": "Catalog and order desk",
            "permissions": STAFF_PERMISSIONS,
        })),
    );
}

fn seed_discounts(tables: &mut Tables) {
    let discounts = [
        ("SPRING10", "Spring sale", 10.0, "2026-03-01", "2026-05-31", true),
        ("CHAIN20", "Chain week", 20.0, "2026-06-01", "2026-06-07", true),
        ("VIP30", "VIP customers", 30.0, "2026-01-01", "2026-12-31", false),
    ];
    for (code, name, percent, start, end, active) in discounts {
        tables.push(
            "discounts",
            fields(json!({
                "code": code,
                "name": name,
                "discountPercent": percent,
                "startDate": start,
                "endDate": end,
                "isActive": active,
            })),
        );
    }
}

fn seed_orders(tables: &mut Tables, customers: &[CustomerRef], products: &[ProductRef]) {
    // (customer, status, payment, order date, products)
    let orders: [(usize, i64, i64, &str, &[usize]); 8] = [
        (0, 1, 1, "2026-09-01T08:30:00.000Z", &[0, 9]),
        (1, 1, 2, "2026-09-02T10:00:00.000Z", &[3]),
        (2, 2, 1, "2026-09-02T15:45:00.000Z", &[10]),
        (3, 4, 3, "2026-09-03T09:10:00.000Z", &[4, 8]),
        (4, 9, 2, "2026-09-04T11:20:00.000Z", &[5]),
        (0, 3, 1, "2026-09-05T13:00:00.000Z", &[1]),
        (1, 11, 4, "2026-09-06T16:30:00.000Z", &[7, 9]),
        (3, 1, 1, "2026-09-07T07:55:00.000Z", &[2]),
    ];
    for (customer, status, payment, date, lines) in orders {
        let Some((customer_id, first, last, email, phone, city)) = customers.get(customer) else {
            continue;
        };
        let details: Vec<Value> = lines
            .iter()
            .filter_map(|i| products.get(*i))
            .map(|(id, name, price)| {
                json!({
                    "product_id": id,
                    "product_name": name,
                    "price": price,
                    "quantity": 1,
                    "discount": 0,
                })
            })
            .collect();
        let completed = (status == 11).then_some(date);
        let order_id = tables.next_order_id();
        tables.push(
            "orders",
            fields(json!({
                "order_id": order_id,
                "order_status": status,
                "payment_type": payment,
                "customer_id": customer_id,
                "first_name": first,
                "last_name": last,
                "email": email,
                "phone": phone,
                "shipping_address": "12 Bike Lane",
                "shipping_city": city,
                "order_date": date,
                "completed_date": completed,
                "order_details": details,
            })),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::store::DemoStore;

    #[test]
    fn seeds_every_collection() {
        let store = DemoStore::seeded();
        for table in [
            "users",
            "brands",
            "categories",
            "products",
            "customers",
            "roles",
            "discounts",
            "orders",
        ] {
            assert!(!store.all(table).unwrap().is_empty(), "{table} is empty");
        }
    }

    #[test]
    fn enough_chain_products_for_two_pages_of_five() {
        let store = DemoStore::seeded();
        let chains = store
            .all("products")
            .unwrap()
            .into_iter()
            .filter(|p| {
                p["product_name"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains("chain"))
            })
            .count();
        assert!(chains > 5);
    }
}
