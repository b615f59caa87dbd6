// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. One module per table family; every function takes
//! `&Database` and runs inside a single writer-thread call.

pub mod conversations;
pub mod escalations;
pub mod messages;
pub mod tenants;

/// Parse a TEXT column into a string-backed enum, reporting failures as a
/// column conversion error so they surface through the normal rusqlite path.
pub(crate) fn column_enum<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
