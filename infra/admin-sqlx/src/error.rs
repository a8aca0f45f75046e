use gantry_admin::AdminError;
use std::borrow::Cow;

/// A specialized [`SqliteAdapterError`] enum of this crate.
#[gantry_derive::gantry_error]
pub enum SqliteAdapterError {
    /// A wrapper for `sqlx` driver errors.
    #[error("SQLite error{}: {source}", format_context(.context))]
    Sqlx {
        #[source]
        source: sqlx::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A table the adapter cannot serve.
    #[error("Introspection error{}: {message}", format_context(.context))]
    Introspection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal SQLite adapter error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<SqliteAdapterError> for AdminError {
    fn from(err: SqliteAdapterError) -> Self {
        Self::database(err)
    }
}
