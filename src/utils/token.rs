use rand::{rngs::OsRng, Rng};

/// Uniform six-digit code in `100000..=999999`.
pub fn generate_otp_code() -> String {
    OsRng.gen_range(100_000u32..=999_999).to_string()
}
