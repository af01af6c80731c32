mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerOptions};

/// Should be called once, at the start of the binary.
/// Installs the stdout tracer, filtered by the `RUST_LOG` environment variable
/// unless the options supply a filter directive of their own.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {{
        let tracer = $crate::tracer::TracerEngine::new($options, env!("CARGO_BIN_NAME"));
        tracing::debug!("Tracer initialised for {}", tracer.service_name());
        tracer
    }};
}
