//! On-disk page layouts and their configuration.

/// Layout options.
pub mod options;

/// Typed page views, element records and encoders.
pub mod page;
