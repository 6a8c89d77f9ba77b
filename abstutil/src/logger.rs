/// Intercept messages using the `log` crate and print them to STDERR. The default filter is
/// `info`; override it with `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn setup() {
    use env_logger::{Builder, Env};
    if Builder::from_env(Env::default().default_filter_or("info"))
        .try_init()
        .is_err()
    {
        debug!("Logger already initialized");
    }
}
