use std::borrow::Cow;
use std::error::Error as StdError;

/// Boxed error raised by an adapter's persistence layer.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A specialized [`AdminError`] enum of this crate.
#[gantry_derive::gantry_error]
pub enum AdminError {
    /// No registered adapter claims a database URL.
    #[error("No adapter for database '{url}'{}", format_context(.context))]
    NoAdapter { url: String, context: Option<Cow<'static, str>> },

    /// Unknown resource or record.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Rejected input: unknown fields, malformed values, bad options.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two databases expose the same resource id.
    #[error("Duplicate resource '{id}'{}", format_context(.context))]
    DuplicateResource { id: String, context: Option<Cow<'static, str>> },

    /// Failure inside an adapter's persistence layer.
    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: BoxError, context: Option<Cow<'static, str>> },

    /// View rendering failures.
    #[error("Template error{}: {source}", format_context(.context))]
    Template {
        #[source]
        source: tera::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Query strings of generated links.
    #[error("Query encoding error{}: {source}", format_context(.context))]
    Encoding {
        #[source]
        source: serde_urlencoded::ser::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal admin error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AdminError {
    /// Wraps an adapter's driver error.
    pub fn database(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Database { source: Box::new(err), context: None }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}
