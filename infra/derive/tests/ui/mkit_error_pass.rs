use mkit_derive::mkit_error;
use std::borrow::Cow;

#[mkit_error]
pub enum DemoError {
    #[error("I/O failure{}: {source}", context_suffix(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal fault{}: {message}", context_suffix(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {}
