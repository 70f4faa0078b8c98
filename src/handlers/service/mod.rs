pub mod async_callback;
