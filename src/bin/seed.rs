// src/bin/seed.rs
// DOCUMENTATION: Seeds the default subscription and boost plans through the running API
// PURPOSE: Log in as the super admin and create any missing catalogue plans
use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::process;
use std::time::Duration;

// --- ANSI colours ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct NamedPlan {
    name: String,
}

fn subscription_plans() -> Vec<Value> {
    vec![
        json!({
            "name": "Basic",
            "description": "List one venue for a year",
            "price": 999.0,
            "duration_days": 365,
            "features": ["Verified badge", "Listing in search results"],
            "is_default": true
        }),
        json!({
            "name": "Premium",
            "description": "Priority review and richer listing",
            "price": 2499.0,
            "duration_days": 365,
            "features": ["Verified badge", "Priority review", "Up to 20 images"]
        }),
    ]
}

fn boost_plans() -> Vec<Value> {
    vec![
        json!({
            "name": "Featured Week",
            "description": "Featured section for 7 days",
            "price": 199.0,
            "duration_days": 7,
            "applicable_to": "both",
            "placement": "featured_section",
            "visibility_weight": 5,
            "status": "active"
        }),
        json!({
            "name": "Top of List",
            "description": "Top of search results for 30 days",
            "price": 599.0,
            "duration_days": 30,
            "applicable_to": "reading_room",
            "placement": "top_list",
            "visibility_weight": 10,
            "status": "active"
        }),
    ]
}

struct Seeder {
    base_url: String,
    client: Client,
    token: String,
    created: usize,
    skipped: usize,
}

impl Seeder {
    async fn login(base_url: String, email: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let response = client
            .post(format!("{}/auth/login", base_url))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .context("Login request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Login rejected: HTTP {} - {}", status, body);
        }

        let token: TokenResponse = response.json().await.context("Invalid login response")?;
        Ok(Self {
            base_url,
            client,
            token: token.access_token,
            created: 0,
            skipped: 0,
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn existing_names(&self, path: &str) -> Result<Vec<String>> {
        let plans: Vec<NamedPlan> = self
            .client
            .get(format!("{}{}?include_inactive=true", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(plans.into_iter().map(|p| p.name).collect())
    }

    async fn seed(&mut self, label: &str, path: &str, plans: Vec<Value>) -> Result<()> {
        println!("\n{}{} ({}){}", BOLD, label, path, RESET);
        let existing = self.existing_names(path).await?;

        for plan in plans {
            let name = plan["name"].as_str().unwrap_or_default().to_string();
            if existing.contains(&name) {
                println!("{}  - {} already exists{}", YELLOW, name, RESET);
                self.skipped += 1;
                continue;
            }

            let response = self
                .client
                .post(format!("{}{}", self.base_url, path))
                .bearer_auth(&self.token)
                .json(&plan)
                .send()
                .await?;

            if response.status().is_success() {
                println!("{}  + {} created{}", GREEN, name, RESET);
                self.created += 1;
            } else {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                println!("{}  x {} failed: HTTP {} - {}{}", RED, name, status, body, RESET);
            }
        }
        Ok(())
    }
}

async fn run() -> Result<()> {
    let base_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let email = env::var("SUPER_ADMIN_EMAIL").context("SUPER_ADMIN_EMAIL must be set in .env")?;
    let password =
        env::var("SUPER_ADMIN_PASSWORD").context("SUPER_ADMIN_PASSWORD must be set in .env")?;

    println!("{}Seeding plans on {}{}", CYAN, base_url, RESET);
    let mut seeder = Seeder::login(base_url, &email, &password).await?;

    if !seeder.check_service_health().await {
        bail!("Service health check failed");
    }

    seeder
        .seed("Subscription plans", "/subscriptions/plans", subscription_plans())
        .await?;
    seeder.seed("Boost plans", "/boost/plans", boost_plans()).await?;

    println!(
        "\n{}Done: {} created, {} skipped{}",
        GREEN, seeder.created, seeder.skipped, RESET
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = run().await {
        println!("{}Seeding failed: {:#}{}", RED, e, RESET);
        process::exit(1);
    }
}
