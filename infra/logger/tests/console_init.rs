use mkit_logger::{LevelFilter, Logger, LoggerError};

// One process, one global subscriber: the console-only and the
// double-init behavior have to be checked in sequence.
#[test]
fn console_only_init_is_guardless_and_exclusive() {
    let logger = Logger::builder()
        .name("setup-console")
        .console(true)
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    assert!(logger.guard().is_none(), "no file output, no worker guard");

    let err = Logger::builder()
        .name("setup-console-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("the global subscriber can only be set once");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
