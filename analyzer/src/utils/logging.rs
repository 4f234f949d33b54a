use tracing_subscriber::{
    filter::FilterFn,
    fmt::{
        self,
        format::{Format, Full},
        time::SystemTime,
    },
    prelude::*,
    EnvFilter,
};

/// Target of the per-epoch table lines, printed without level and target so
/// they line up as a table.
pub const EPOCH_SUMMARY_TARGET: &str = "epoch_summary";

fn event_format(with_metadata: bool) -> Format<Full, SystemTime> {
    fmt::format()
        .with_timer(fmt::time::time())
        .with_target(with_metadata)
        .with_level(with_metadata)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
}

fn is_epoch_summary(metadata: &tracing::Metadata<'_>) -> bool {
    metadata.target() == EPOCH_SUMMARY_TARGET
}

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::Layer::default()
                .with_writer(std::io::stdout)
                .event_format(event_format(true))
                .with_filter(FilterFn::new(|metadata: &tracing::Metadata<'_>| {
                    !is_epoch_summary(metadata)
                })),
        )
        .with(
            fmt::Layer::default()
                .with_writer(std::io::stdout)
                .event_format(event_format(false))
                .with_filter(FilterFn::new(is_epoch_summary)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_epoch_summary_lines_omit_level_and_target() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::registry().with(
            fmt::Layer::default()
                .with_writer(move || SharedBuffer(writer.clone()))
                .event_format(event_format(false))
                .with_filter(FilterFn::new(is_epoch_summary)),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: EPOCH_SUMMARY_TARGET, "epoch [0, 900) | 18 miners");
            tracing::info!("regular line");
        });

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(output.contains("epoch [0, 900) | 18 miners"));
        assert!(!output.contains("INFO"));
        assert!(!output.contains(EPOCH_SUMMARY_TARGET));
        assert!(!output.contains("regular line"));
    }
}
