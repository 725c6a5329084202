use std::borrow::Cow;

/// Errors raised while assembling the run configuration.
#[mkit_derive::mkit_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", context_suffix(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// The agent port secret could not be read or parsed.
    #[error("Agent port unavailable{}: {message}", context_suffix(.context))]
    Port { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal config error{}: {message}", context_suffix(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
