pub mod activity_type;
pub mod event;
pub mod user;
pub mod user_activity;
pub mod xp_cache;

pub use user_activity::Reference;
