//! Tests for the directory user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

#[fixture]
fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn ada(timestamp: DateTime<Utc>) -> User {
    User::new(
        UserId::new(7).expect("positive id"),
        DisplayName::new("Ada Lovelace").expect("valid name"),
        EmailAddress::new("ada@clinic.test").expect("valid email"),
        Role::Doctor,
        timestamp,
        timestamp,
    )
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i32::MIN)]
fn user_id_rejects_non_positive_values(#[case] raw: i32) {
    assert_eq!(
        UserId::new(raw),
        Err(UserValidationError::NonPositiveId { value: raw })
    );
}

#[rstest]
fn user_id_accepts_positive_values() {
    let id = UserId::new(42).expect("positive id");
    assert_eq!(id.get(), 42);
    assert_eq!(id.to_string(), "42");
}

#[rstest]
fn user_id_deserialisation_validates() {
    let error = serde_json::from_value::<UserId>(json!(0)).expect_err("zero rejected");
    assert!(error.to_string().contains("positive"));
}

#[rstest]
fn display_name_is_trimmed() {
    let name = DisplayName::new("  Grace Hopper \n").expect("valid name");
    assert_eq!(name.as_ref(), "Grace Hopper");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn display_name_rejects_blank(#[case] raw: &str) {
    assert_eq!(DisplayName::new(raw), Err(UserValidationError::EmptyName));
}

#[rstest]
fn display_name_accepts_maximum_length_in_characters() {
    let name = "é".repeat(NAME_MAX);
    let parsed = DisplayName::new(&name).expect("boundary length");
    assert_eq!(parsed.as_ref(), name);
}

#[rstest]
fn display_name_rejects_overlong_values() {
    let name = "a".repeat(NAME_MAX + 1);
    assert_eq!(
        DisplayName::new(name),
        Err(UserValidationError::NameTooLong { max: NAME_MAX })
    );
}

#[rstest]
#[case("ada@clinic.test")]
#[case("Ada.Lovelace+notes@Clinic.Test")]
#[case("  padded@clinic.test  ")]
fn email_accepts_local_at_domain(#[case] raw: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), raw.trim());
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::MalformedEmail)]
#[case("two@@signs", UserValidationError::MalformedEmail)]
#[case("a@b@c", UserValidationError::MalformedEmail)]
#[case("@clinic.test", UserValidationError::MalformedEmail)]
#[case("ada@", UserValidationError::MalformedEmail)]
#[case("ada lovelace@clinic.test", UserValidationError::MalformedEmail)]
fn email_rejects_malformed_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
fn email_rejects_overlong_values() {
    let raw = format!("{}@clinic.test", "a".repeat(EMAIL_MAX));
    assert_eq!(
        EmailAddress::new(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
fn email_preserves_case() {
    let upper = EmailAddress::new("Ada@Clinic.test").expect("valid email");
    let lower = EmailAddress::new("ada@clinic.test").expect("valid email");
    assert_ne!(upper, lower);
}

#[rstest]
#[case(UserValidationError::NonPositiveId { value: 0 }, "id")]
#[case(UserValidationError::NameTooLong { max: NAME_MAX }, "name")]
#[case(UserValidationError::MalformedEmail, "email")]
fn validation_errors_name_their_field(#[case] error: UserValidationError, #[case] field: &str) {
    assert_eq!(error.field(), field);
}

#[rstest]
fn user_serialises_camel_case_without_credentials(ada: User) {
    let value = serde_json::to_value(&ada).expect("serialise user");
    assert_eq!(value.get("id"), Some(&json!(7)));
    assert_eq!(value.get("name"), Some(&json!("Ada Lovelace")));
    assert_eq!(value.get("role"), Some(&json!("doctor")));
    assert!(value.get("createdAt").is_some());
    assert!(value.get("updatedAt").is_some());
    assert!(value.get("password").is_none());
    assert!(value.get("passwordHash").is_none());
}

#[given("a stored account")]
fn a_stored_account(ada: User) -> UserAccount {
    UserAccount {
        user: ada,
        password_hash: PasswordHash::from_stored("$argon2id$v=19$stub"),
    }
}

#[when("the account is reduced to its public record")]
fn the_account_is_reduced(account: UserAccount) -> User {
    account.into_user()
}

#[then("the public record keeps the identity fields")]
fn the_public_record_keeps_identity(user: &User, expected: &User) {
    assert_eq!(user, expected);
    assert_eq!(user.email().as_ref(), "ada@clinic.test");
}

#[rstest]
fn account_reduces_to_public_record(ada: User) {
    let account = a_stored_account(ada.clone());
    let user = the_account_is_reduced(account);
    the_public_record_keeps_identity(&user, &ada);
}
