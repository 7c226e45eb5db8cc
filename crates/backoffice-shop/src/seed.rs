//! Sample data for a fresh install.
//!
//! Generates a plausible few months of shop activity so grids, charts, and
//! stats have something to show. The generator is seeded, so repeated runs
//! produce the same data set.

use chrono::{Duration, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde_json::{json, Value};

const FIRST_NAMES: [&str; 8] = [
    "Alice", "Bruno", "Chloe", "David", "Emma", "Felix", "Grace", "Hugo",
];
const LAST_NAMES: [&str; 8] = [
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand",
];
const CITIES: [(&str, &str); 5] = [
    ("Paris", "75001"),
    ("Lyon", "69001"),
    ("Marseille", "13001"),
    ("Bordeaux", "33000"),
    ("Lille", "59000"),
];
const CATEGORIES: [(&str, &str); 5] = [
    ("Electronics", "electronics"),
    ("Books", "books"),
    ("Clothing", "clothing"),
    ("Home & Garden", "home-garden"),
    ("Sports", "sports"),
];
const PRODUCT_NAMES: [&str; 10] = [
    "Wireless Keyboard",
    "Noise-Cancelling Headphones",
    "Mechanical Watch",
    "Leather Notebook",
    "Trail Running Shoes",
    "Ceramic Mug Set",
    "Desk Lamp",
    "Yoga Mat",
    "Bluetooth Speaker",
    "Canvas Backpack",
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generates the full sample data set, keyed by model.
pub fn sample_data() -> Vec<(&'static str, Vec<Value>)> {
    let mut rng = StdRng::seed_from_u64(20_240_917);
    let now = Utc::now();
    let stamp = |days_ago: i64, rng: &mut StdRng| {
        (now - Duration::days(days_ago) - Duration::minutes(rng.gen_range(0..1440))).to_rfc3339()
    };

    // Users: one staff account plus customers.
    let mut users = vec![json!({
        "id": 1,
        "username": "admin",
        "email": "admin@example.com",
        "first_name": "Admin",
        "last_name": "User",
        "is_staff": true,
        "is_active": true,
        "date_joined": stamp(365, &mut rng),
    })];
    let mut profiles = Vec::new();
    for i in 0..8u64 {
        let first = FIRST_NAMES[i as usize];
        let last = LAST_NAMES[i as usize];
        let joined_days = rng.gen_range(30..300);
        let id = i + 2;
        users.push(json!({
            "id": id,
            "username": format!("{}.{}", first.to_lowercase(), last.to_lowercase()),
            "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            "first_name": first,
            "last_name": last,
            "is_staff": false,
            "is_active": true,
            "date_joined": stamp(joined_days, &mut rng),
        }));
        let (city, postal_code) = CITIES[rng.gen_range(0..CITIES.len())];
        profiles.push(json!({
            "id": i + 1,
            "user": id,
            "phone": format!("+33 6 {:02} {:02} {:02} {:02}",
                rng.gen_range(10..99), rng.gen_range(10..99),
                rng.gen_range(10..99), rng.gen_range(10..99)),
            "address": format!("{} rue de la République", rng.gen_range(1..120)),
            "city": city,
            "postal_code": postal_code,
            "country": "France",
            "birth_date": null,
            "is_premium": rng.gen_bool(0.3),
            "newsletter_subscribed": rng.gen_bool(0.6),
            "created_at": stamp(joined_days, &mut rng),
            "updated_at": stamp(rng.gen_range(0..30), &mut rng),
        }));
    }

    let mut categories = Vec::new();
    for (i, (name, slug)) in CATEGORIES.iter().enumerate() {
        categories.push(json!({
            "id": i + 1,
            "name": name,
            "slug": slug,
            "description": format!("Everything in {name}"),
            "is_active": true,
            "parent": null,
            "created_at": stamp(320, &mut rng),
            "updated_at": stamp(rng.gen_range(0..60), &mut rng),
        }));
    }

    let mut products = Vec::new();
    let mut prices = Vec::new();
    for (i, name) in PRODUCT_NAMES.iter().enumerate() {
        let price = round2(rng.gen_range(9.0..250.0));
        prices.push(price);
        let slug = name.to_lowercase().replace(' ', "-");
        products.push(json!({
            "id": i + 1,
            "name": name,
            "slug": slug,
            "description": format!("{name}, shop edition."),
            "short_description": name,
            "category": rng.gen_range(1..=CATEGORIES.len()),
            "price": price,
            "compare_price": if rng.gen_bool(0.4) { json!(round2(price * 1.2)) } else { Value::Null },
            "sku": format!("SKU-{:04}", 1000 + i),
            "stock_quantity": rng.gen_range(0..120),
            "is_active": true,
            "is_featured": rng.gen_bool(0.25),
            "weight": round2(rng.gen_range(0.1..5.0)),
            "created_at": stamp(rng.gen_range(60..300), &mut rng),
            "updated_at": stamp(rng.gen_range(0..30), &mut rng),
        }));
    }

    let mut orders = Vec::new();
    let mut items = Vec::new();
    let mut invoices = Vec::new();
    let mut payments = Vec::new();
    let mut item_id = 1u64;
    let mut invoice_id = 1u64;
    let mut payment_id = 1u64;

    for order_id in 1..=30u64 {
        let user = rng.gen_range(2..=9u64);
        let days_ago = rng.gen_range(0..180);
        let created_at = stamp(days_ago, &mut rng);
        let status = ["pending", "processing", "shipped", "delivered", "cancelled"]
            [rng.gen_range(0..5)];
        let (city, postal_code) = CITIES[rng.gen_range(0..CITIES.len())];

        let mut total = 0.0;
        for _ in 0..rng.gen_range(1..=3) {
            let product = rng.gen_range(0..PRODUCT_NAMES.len());
            let quantity = rng.gen_range(1..=4);
            let unit_price = prices[product];
            let subtotal = round2(unit_price * f64::from(quantity));
            total += subtotal;
            items.push(json!({
                "id": item_id,
                "order": order_id,
                "product": product + 1,
                "quantity": quantity,
                "unit_price": unit_price,
                "subtotal": subtotal,
                "created_at": created_at,
            }));
            item_id += 1;
        }
        let total = round2(total);

        orders.push(json!({
            "id": order_id,
            "user": user,
            "order_number": format!("ORD-{:05}", 10_000 + order_id),
            "status": status,
            "total_amount": total,
            "shipping_address": format!("{} avenue des Ventes", rng.gen_range(1..200)),
            "shipping_city": city,
            "shipping_postal_code": postal_code,
            "shipping_country": "France",
            "notes": null,
            "created_at": created_at,
            "updated_at": created_at,
        }));

        // Shipped and delivered orders are invoiced.
        if status == "shipped" || status == "delivered" {
            let tax = round2(total * 0.2);
            let invoice_status = if status == "delivered" { "paid" } else { "sent" };
            let issued = (now - Duration::days(days_ago)).format("%Y-%m-%d").to_string();
            let due = (now - Duration::days(days_ago) + Duration::days(30))
                .format("%Y-%m-%d")
                .to_string();
            invoices.push(json!({
                "id": invoice_id,
                "order": order_id,
                "invoice_number": format!("INV-{:05}", 20_000 + invoice_id),
                "status": invoice_status,
                "subtotal": total,
                "tax_amount": tax,
                "total_amount": round2(total + tax),
                "issued_date": issued,
                "due_date": due,
                "notes": null,
                "created_at": created_at,
                "updated_at": created_at,
            }));

            if invoice_status == "paid" {
                let method = ["credit_card", "bank_transfer", "paypal"][rng.gen_range(0..3)];
                payments.push(json!({
                    "id": payment_id,
                    "invoice": invoice_id,
                    "amount": round2(total + tax),
                    "method": method,
                    "status": "completed",
                    "transaction_id": format!("TXN-{:08}", rng.gen_range(10_000_000u64..99_999_999)),
                    "payment_date": created_at,
                    "notes": null,
                    "created_at": created_at,
                    "updated_at": created_at,
                }));
                payment_id += 1;
            }
            invoice_id += 1;
        }
    }

    vec![
        ("accounts.user", users),
        ("accounts.userprofile", profiles),
        ("catalog.category", categories),
        ("catalog.product", products),
        ("sales.order", orders),
        ("sales.orderitem", items),
        ("sales.invoice", invoices),
        ("sales.payment", payments),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn data_map() -> HashMap<&'static str, Vec<Value>> {
        sample_data().into_iter().collect()
    }

    #[test]
    fn test_counts() {
        let data = data_map();
        assert_eq!(data["accounts.user"].len(), 9);
        assert_eq!(data["accounts.userprofile"].len(), 8);
        assert_eq!(data["catalog.category"].len(), 5);
        assert_eq!(data["catalog.product"].len(), 10);
        assert_eq!(data["sales.order"].len(), 30);
        assert!(!data["sales.orderitem"].is_empty());
    }

    #[test]
    fn test_deterministic() {
        let first = serde_json::to_string(&sample_data()).unwrap();
        // Timestamps derive from "now", so only compare stable fields.
        let second = serde_json::to_string(&sample_data()).unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_item_subtotals_sum_to_order_total() {
        let data = data_map();
        for order in &data["sales.order"] {
            let order_id = order["id"].as_u64().unwrap();
            let total: f64 = data["sales.orderitem"]
                .iter()
                .filter(|item| item["order"].as_u64() == Some(order_id))
                .map(|item| item["subtotal"].as_f64().unwrap())
                .sum();
            let declared = order["total_amount"].as_f64().unwrap();
            assert!((declared - (total * 100.0).round() / 100.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_invoices_only_for_shipped_or_delivered() {
        let data = data_map();
        let shipped: Vec<u64> = data["sales.order"]
            .iter()
            .filter(|o| {
                let s = o["status"].as_str().unwrap();
                s == "shipped" || s == "delivered"
            })
            .map(|o| o["id"].as_u64().unwrap())
            .collect();
        assert_eq!(data["sales.invoice"].len(), shipped.len());
        for invoice in &data["sales.invoice"] {
            assert!(shipped.contains(&invoice["order"].as_u64().unwrap()));
        }
    }

    #[test]
    fn test_payments_reference_paid_invoices() {
        let data = data_map();
        let paid: Vec<u64> = data["sales.invoice"]
            .iter()
            .filter(|i| i["status"] == "paid")
            .map(|i| i["id"].as_u64().unwrap())
            .collect();
        assert_eq!(data["sales.payment"].len(), paid.len());
        for payment in &data["sales.payment"] {
            assert!(paid.contains(&payment["invoice"].as_u64().unwrap()));
            assert_eq!(payment["status"], "completed");
        }
    }

    #[test]
    fn test_orders_reference_customers() {
        let data = data_map();
        for order in &data["sales.order"] {
            let user = order["user"].as_u64().unwrap();
            assert!((2..=9).contains(&user));
        }
    }
}
