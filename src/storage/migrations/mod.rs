pub mod sqlite;
#[cfg(feature = "postgres")]
pub mod postgres;
