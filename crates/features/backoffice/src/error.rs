use gantry_kernel::module::ModuleError;
use std::borrow::Cow;

/// Backoffice slice error type.
#[gantry_derive::gantry_error]
pub enum BackofficeError {
    /// The registrar refused the persistence adapter.
    #[error("Adapter registration failed{}: {message}", format_context(.context))]
    Registration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The admin module descriptor could not be built.
    #[error("Backoffice module error{}: {source}", format_context(.context))]
    Module {
        #[source]
        source: ModuleError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Backoffice error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
