//! Fetch error taxonomy.
//!
//! Every fetch reports a single numeric code. The ranges never overlap and
//! cover every way a fetch can end.
//!
//! # Error Code Ranges
//!
//! | Range      | Class      | Description                                   |
//! |------------|------------|-----------------------------------------------|
//! | 0          | Success    | Document fetched and parsed                   |
//! | 1-99       | Transport  | Connection, timeout, DNS (curl numbering)     |
//! | 100-999    | Http       | Non-2xx response, value is the status code    |
//! | 1000-1999  | Decode     | Body is not UTF-8 or not valid JSON          |
//! | 2000+      | Security   | TLS failure, value - 2000 is the transport code |

pub mod codes;

pub use codes::{ErrorClass, FetchCode};
