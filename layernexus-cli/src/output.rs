//! Terminal rendering for command results.

use chrono::{DateTime, Utc};
use layernexus_auth::User;
use layernexus_license::{Feature, GateDecision, Indicator, LicenseReadiness, LicenseRecord};

pub fn print_user(user: &User) {
    let role = if user.is_admin { "admin" } else { "user" };
    println!("Signed in as {} (id {}, {role})", user.username, user.id);
    if let Some(last_login) = &user.last_login {
        println!("  last login: {last_login}");
    }
}

pub fn print_record(record: &LicenseRecord) {
    println!(
        "License: {} {} ({})",
        marker(record.status.indicator()),
        record.status.label(),
        record.status
    );
    println!("  {}", record.status.description());
    println!("  last checked:  {}", timestamp(record.last_checked));
    println!("  last verified: {}", timestamp(record.last_verified));
    if let Some(id) = &record.license_id {
        println!("  license id:    {id}");
    }
    if let Some(expires) = record.expires {
        println!("  expires:       {}", expires.format("%Y-%m-%d"));
    }
}

pub fn print_readiness(readiness: &LicenseReadiness) {
    if readiness.ready {
        println!("Server license is configured.");
    } else {
        println!("Server has no usable license key. Run `layernexus license setup <key>`.");
    }
    if let Some(status) = &readiness.status {
        println!("  status: {status}");
    }
    if let Some(detail) = &readiness.detail {
        println!("  detail: {detail}");
    }
    if let Some(id) = &readiness.license_id {
        println!("  license id: {id}");
    }
}

pub fn print_decision(feature: Feature, decision: &GateDecision) {
    let name = match feature {
        Feature::AiCleanup => "AI cleanup",
    };
    match decision.reason {
        None => println!("{name}: available"),
        Some(reason) => println!("{name}: unavailable ({reason})"),
    }
}

fn marker(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Ok => "[ok]",
        Indicator::Warning => "[!]",
        Indicator::Degraded => "[!!]",
        Indicator::Error => "[x]",
        Indicator::Neutral => "[-]",
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || "never".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
