mod common;

use chrono::Duration;
use common::{at_hours, t0};
use layernexus_license::{LicensePolicy, LicenseRecord, LicenseStatus, Verification};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn verified_at(hours: i64) -> LicenseRecord {
    let mut record = LicenseRecord::default();
    record.apply_verification(
        &Verification {
            valid: true,
            license_id: Some("lic-1".to_string()),
            ..Default::default()
        },
        at_hours(hours),
    );
    record
}

fn any_status() -> impl Strategy<Value = LicenseStatus> {
    prop_oneof![
        Just(LicenseStatus::Unchecked),
        Just(LicenseStatus::Valid),
        Just(LicenseStatus::Unknown),
        Just(LicenseStatus::ExpiredOffline),
        Just(LicenseStatus::Invalid),
    ]
}

// ── Freshness ────────────────────────────────────────────────────

#[test]
fn fresh_only_while_valid_inside_ttl() {
    let policy = LicensePolicy::default();
    let record = verified_at(0);

    assert!(record.is_fresh(at_hours(0), &policy));
    assert!(record.is_fresh(at_hours(23), &policy));
    assert!(!record.is_fresh(at_hours(24), &policy));

    let unknown = LicenseRecord {
        status: LicenseStatus::Unknown,
        ..record
    };
    assert!(!unknown.is_fresh(at_hours(1), &policy));
}

#[test]
fn unchecked_record_is_never_fresh() {
    assert!(!LicenseRecord::default().is_fresh(t0(), &LicensePolicy::default()));
}

// ── Transitions ──────────────────────────────────────────────────

#[test]
fn rejection_clears_previous_details() {
    let mut record = verified_at(0);
    record.expires = Some(at_hours(720));

    record.apply_verification(&Verification::default(), at_hours(30));

    assert_eq!(record.status, LicenseStatus::Invalid);
    assert_eq!(record.license_id, None);
    assert_eq!(record.expires, None);
    assert_eq!(record.last_verified, Some(at_hours(30)));
}

#[test]
fn grace_boundary_is_exclusive() {
    let policy = LicensePolicy::default();

    let mut at_boundary = verified_at(0);
    at_boundary.apply_failure(at_hours(72), &policy);
    assert_eq!(at_boundary.status, LicenseStatus::Unknown);

    let mut past_boundary = verified_at(0);
    past_boundary.apply_failure(at_hours(72) + Duration::seconds(1), &policy);
    assert_eq!(past_boundary.status, LicenseStatus::ExpiredOffline);
}

#[test]
fn failure_without_history_is_unknown() {
    let mut record = LicenseRecord::default();

    record.apply_failure(t0(), &LicensePolicy::default());

    assert_eq!(record.status, LicenseStatus::Unknown);
    assert_eq!(record.last_checked, Some(t0()));
    assert_eq!(record.last_verified, None);
}

#[test]
fn grace_without_verification_uses_last_attempt() {
    let policy = LicensePolicy::default();
    let mut record = LicenseRecord::default();

    record.apply_failure(at_hours(0), &policy);
    record.apply_failure(at_hours(50), &policy);
    assert_eq!(record.status, LicenseStatus::Unknown);

    // Without a verification the anchor is the latest attempt.
    record.apply_failure(at_hours(100), &policy);
    assert_eq!(record.status, LicenseStatus::Unknown);
    record.apply_failure(at_hours(173), &policy);
    assert_eq!(record.status, LicenseStatus::ExpiredOffline);
}

#[test]
fn oversized_grace_saturates_instead_of_panicking() {
    let policy = LicensePolicy {
        ttl_secs: 60,
        grace_secs: i64::MAX,
    };
    let mut record = verified_at(0);

    record.apply_failure(at_hours(10_000), &policy);

    assert_eq!(record.status, LicenseStatus::Unknown);
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn persisted_shape_uses_camel_case() {
    let record = verified_at(0);

    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["status"], "valid");
    assert_eq!(value["licenseId"], "lic-1");
    assert!(value["lastChecked"].is_string());
    assert!(value["lastVerified"].is_string());
    assert!(value["expires"].is_null());
}

#[test]
fn partial_records_deserialize_with_defaults() {
    let record: LicenseRecord =
        serde_json::from_str(r#"{"status":"unknown","lastChecked":"2025-06-01T09:00:00Z"}"#)
            .unwrap();

    assert_eq!(record.status, LicenseStatus::Unknown);
    assert_eq!(record.last_checked, Some(t0()));
    assert_eq!(record.last_verified, None);

    let empty: LicenseRecord = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, LicenseRecord::default());
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn failure_status_follows_elapsed_since_verification(
        offline_secs in 1i64..(10 * 24 * 3600),
    ) {
        let policy = LicensePolicy::default();
        let mut record = verified_at(0);

        record.apply_failure(t0() + Duration::seconds(offline_secs), &policy);

        let expected = if offline_secs > policy.grace_secs {
            LicenseStatus::ExpiredOffline
        } else {
            LicenseStatus::Unknown
        };
        prop_assert_eq!(record.status, expected);
        prop_assert_eq!(record.last_verified, Some(t0()));
    }

    #[test]
    fn failure_never_revives_entitlement(
        status in any_status(),
        checked_hours in 0i64..200,
        now_hours in 0i64..400,
    ) {
        let mut record = LicenseRecord {
            status,
            last_checked: Some(at_hours(checked_hours)),
            ..Default::default()
        };

        record.apply_failure(at_hours(now_hours), &LicensePolicy::default());

        prop_assert!(!record.status.is_entitled());
        if status == LicenseStatus::Invalid {
            prop_assert_eq!(record.status, LicenseStatus::Invalid);
        }
        let expected_checked = at_hours(checked_hours.max(now_hours));
        prop_assert_eq!(record.last_checked, Some(expected_checked));
    }
}
