use rand::Rng;
use time::{Duration, OffsetDateTime};

/// Validity window of an issued code.
pub const OTP_TTL: Duration = Duration::minutes(5);

/// Produce a six-digit code and its expiry. The code is drawn uniformly from
/// [100000, 999999], so it never collapses to fewer digits.
pub fn generate() -> (String, OffsetDateTime) {
    let code = rand::thread_rng().gen_range(100_000..=999_999);
    (code.to_string(), OffsetDateTime::now_utc() + OTP_TTL)
}

/// A submitted code is accepted only while a code is pending, the digits
/// match, and `now` is not past the expiry. At exactly the expiry instant the
/// code is still valid.
pub fn matches(
    stored: Option<&str>,
    expires: Option<OffsetDateTime>,
    submitted: &str,
    now: OffsetDateTime,
) -> bool {
    match (stored, expires) {
        (Some(code), Some(expiry)) => code == submitted && now <= expiry,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_always_six_digits() {
        for _ in 0..200 {
            let (code, _) = generate();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().expect("numeric code");
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn expiry_is_five_minutes_out() {
        let before = OffsetDateTime::now_utc();
        let (_, expires) = generate();
        let after = OffsetDateTime::now_utc();
        assert!(expires >= before + OTP_TTL);
        assert!(expires <= after + OTP_TTL);
    }

    #[test]
    fn accepts_matching_code_within_window() {
        let (code, expires) = generate();
        let issued = expires - OTP_TTL;
        assert!(matches(
            Some(&code),
            Some(expires),
            &code,
            issued + Duration::seconds(299)
        ));
    }

    #[test]
    fn accepts_code_at_exact_expiry_instant() {
        let (code, expires) = generate();
        assert!(matches(Some(&code), Some(expires), &code, expires));
    }

    #[test]
    fn rejects_code_after_expiry() {
        let (code, expires) = generate();
        let issued = expires - OTP_TTL;
        assert!(!matches(
            Some(&code),
            Some(expires),
            &code,
            issued + Duration::seconds(301)
        ));
    }

    #[test]
    fn rejects_wrong_code() {
        let (code, expires) = generate();
        let wrong = if code == "111111" { "222222" } else { "111111" };
        assert!(!matches(
            Some(&code),
            Some(expires),
            wrong,
            expires - Duration::seconds(1)
        ));
    }

    #[test]
    fn rejects_when_no_code_is_pending() {
        let now = OffsetDateTime::now_utc();
        assert!(!matches(None, None, "123456", now));
    }
}
