//! Value objects - validated, self-contained domain values

mod hit_points;
mod session_code;
mod user_id;

pub use hit_points::HitPoints;
pub use session_code::{SessionCode, CODE_ALPHABET, GENERATED_CODE_LENGTH};
pub use user_id::UserId;
