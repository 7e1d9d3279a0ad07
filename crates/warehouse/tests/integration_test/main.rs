//! Live warehouse tests.
//!
//! These need a PostgreSQL 15+ server described by the `WAREHOUSE_*`
//! variables (a `.env` file works) and are ignored by default:
//! `cargo test -p skillboard-warehouse -- --ignored`.

mod live;
