use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Installs the fmt subscriber once. Logs go to stderr so that stdout only
/// carries what the presenter prints.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        });
    }
}
