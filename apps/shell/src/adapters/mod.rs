mod event_bus;

pub use event_bus::LogEventBus;
