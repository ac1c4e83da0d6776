//! Customer fixtures and named Specification factories.

use serde::{Deserialize, Serialize};

use helios_specification::core::Entity;
use helios_specification::specification::{Criterion, Specification};

/// A postal address, nested inside a customer document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub country: String,
}

/// An order, stored as a relation of its customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub number: String,
    pub total: f64,
}

/// The entity used throughout the integration tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub tier: String,
    pub active: bool,
    pub age: Option<i64>,
    pub balance: f64,
    pub address: Address,
    pub tags: Vec<String>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Entity for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn relations() -> &'static [&'static str] {
        &["orders"]
    }
}

impl Customer {
    /// Creates a customer with neutral defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            tier: "bronze".to_string(),
            active: true,
            age: None,
            balance: 0.0,
            address: Address {
                city: "Springfield".to_string(),
                country: "US".to_string(),
            },
            tags: Vec::new(),
            orders: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_age(mut self, age: Option<i64>) -> Self {
        self.age = age;
        self
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_address(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.address = Address {
            city: city.into(),
            country: country.into(),
        };
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }

    /// The same customer without its relations loaded.
    pub fn without_orders(mut self) -> Self {
        self.orders.clear();
        self
    }
}

const NAMES: [&str; 25] = [
    "Ada", "Barbara", "Charles", "Dennis", "Edsger", "Frances", "Grace", "Hedy", "Ivan", "John",
    "Ken", "Linus", "Margaret", "Niklaus", "Ole", "Peter", "Radia", "Sophie", "Tim", "Ursula",
    "Vint", "Whitfield", "Xavier", "Yukihiro", "Zuse",
];

const CITIES: [(&str, &str); 4] = [
    ("London", "UK"),
    ("Paris", "FR"),
    ("Boston", "US"),
    ("Zurich", "CH"),
];

const TIERS: [&str; 3] = ["gold", "silver", "bronze"];

/// A deterministic set of 25 customers with a mix of nulls, tiers, cities
/// and orders.
pub fn customers() -> Vec<Customer> {
    NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let n = i as i64;
            let (city, country) = CITIES[i % CITIES.len()];
            let mut customer = Customer::new(format!("cust-{:02}", i + 1), *name)
                .with_tier(TIERS[i % TIERS.len()])
                .with_active(i % 4 != 3)
                .with_age(if i % 5 == 2 { None } else { Some(20 + (n * 7) % 45) })
                .with_balance((n * 37 % 50) as f64 * 12.5)
                .with_address(city, country);
            if i % 3 != 1 {
                customer = customer.with_email(format!("{}@example.com", name.to_lowercase()));
            }
            if i % 2 == 0 {
                customer = customer.with_tags(&["newsletter"]);
            }
            if i % 6 == 0 {
                customer = customer.with_tags(&["newsletter", "vip"]);
            }
            let orders = (0..(i % 3))
                .map(|k| Order {
                    number: format!("ORD-{:02}-{}", i + 1, k + 1),
                    total: 10.0 * (k as f64 + 1.0) + n as f64,
                })
                .collect();
            customer.with_orders(orders)
        })
        .collect()
}

// ============================================================================
// Named Specifications
// ============================================================================

/// Active customers, alphabetically.
pub fn active_customers_by_name() -> Specification<Customer> {
    Specification::builder()
        .filter(Criterion::eq("active", true))
        .order_by_asc("name")
        .build()
}

/// Gold and silver customers with their orders, richest first.
pub fn premium_customers_with_orders() -> Specification<Customer> {
    Specification::builder()
        .filter(Criterion::one_of("tier", ["gold", "silver"]))
        .include("orders")
        .order_by_desc("balance")
        .build()
}

/// Customers in a city, youngest first (unknown ages first).
pub fn customers_in_city(city: &str) -> Specification<Customer> {
    Specification::builder()
        .filter(Criterion::eq("address.city", city))
        .order_by_asc("age")
        .build()
}

/// Customers without an email address.
pub fn customers_without_email() -> Specification<Customer> {
    Specification::builder()
        .filter(Criterion::is_null("email"))
        .build()
}

/// One page of all customers by id.
pub fn customers_page(page_number: i64, page_size: i64) -> Specification<Customer> {
    Specification::builder()
        .order_by_asc("id")
        .page(page_number, page_size)
        .build()
}

/// Names of customers with an `example.com` address, by name.
pub fn example_domain_names() -> Specification<Customer, String> {
    Specification::builder()
        .filter(Criterion::contains("email", "@example.com"))
        .order_by_asc("name")
        .select(|customer: &Customer| customer.name.clone())
        .build()
}
