//! # kt_types
//!
//! Value types shared by the Kraken order desk: fixed-point quantities, the
//! numeric display formatter, order requests and requester identities.

pub mod errors;
pub mod fixed_point;
pub mod order;
pub mod requester;
pub mod serde_helpers;

pub use errors::FixedPointError;
pub use fixed_point::DECIMAL_PLACES;
pub use fixed_point::FIXED_POINT_MULTIPLIER;
pub use fixed_point::FixedPoint;
pub use fixed_point::trim_description;
pub use order::OrderRequest;
pub use order::OrderStatus;
pub use order::OrderType;
pub use order::Side;
pub use order::pair_name;
pub use requester::Requester;
