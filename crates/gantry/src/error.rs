#[cfg(feature = "admin")]
use gantry_backoffice::BackofficeError;
use std::borrow::Cow;

/// Application composition error type.
#[gantry_derive::gantry_error]
pub enum AppError {
    #[cfg(feature = "admin")]
    #[error("Backoffice unavailable{}: {source}", format_context(.context))]
    Backoffice {
        #[source]
        source: BackofficeError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Application error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
